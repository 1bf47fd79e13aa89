//! TOML key → field name (+ optional suffix).

/// Map a raw TOML key onto a known field, splitting off a trailing suffix when
/// the whole key is not a field. Hyphens are normalized to underscores first.
///
/// Returns `None` when neither the key nor its prefix names a field.
pub fn resolve_key(
    raw_key: &str,
    is_field: impl Fn(&str) -> bool,
) -> Option<(String, Option<String>)> {
    let name = raw_key.replace('-', "_");
    if is_field(&name) {
        return Some((name, None));
    }
    let (field, suffix) = name.rsplit_once('_')?;
    is_field(field).then(|| (field.to_owned(), Some(suffix.to_owned())))
}
