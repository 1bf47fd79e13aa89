//! Record schemas (and optionally an instance) → lines of TOML text.
//!
//! Two styles share one traversal:
//! - [`Style::Template`] documents every field: doc comment, a Mandatory /
//!   Optional / Default annotation, and a placeholder or the current value.
//! - [`Style::Plain`] writes only populated, non-default values.
//!
//! Scalar fields of a table are written first; fields that render as tables are
//! queued as jobs and expanded afterwards, children before siblings. Lines are
//! produced lazily, one table job at a time.
use std::any::TypeId;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::decl::FieldDefault;
use crate::error::Result;
use crate::format::{
    Literal, format_key, format_literal_pair, format_text, format_toml_pair, to_pair,
};
use crate::schema::{FieldSchema, RecordSchema, Scalar, Schema};
use crate::value::{RecordValue, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    Template,
    Plain,
}

/// Lazily render `schema`, filled from `instance` when given.
pub fn generate(
    schema: Arc<RecordSchema>,
    instance: Option<RecordValue>,
    style: Style,
) -> TemplateLines {
    let root = TableJob {
        header: None,
        body: Body::Record(schema),
        value: instance.map(Value::Record),
        docs: Vec::new(),
        optional: false,
        lineage: Vec::new(),
    };
    TemplateLines {
        style,
        jobs: vec![root],
        pending: VecDeque::new(),
        emitted: false,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JOBS
// ————————————————————————————————————————————————————————————————————————————

struct Header {
    path: String,
    array: bool,
}

impl Header {
    fn render(&self) -> String {
        if self.array {
            format!("[[{}]]", self.path)
        } else {
            format!("[{}]", self.path)
        }
    }
}

enum Body {
    Record(Arc<RecordSchema>),
    /// `key = value` lines straight from a table value.
    Untyped,
}

/// One table to render. The root job has no header.
struct TableJob {
    header: Option<Header>,
    body: Body,
    value: Option<Value>,
    docs: Vec<String>,
    optional: bool,
    /// Record types being expanded on the path to this table.
    lineage: Vec<TypeId>,
}

pub struct TemplateLines {
    style: Style,
    /// Pending tables, next one last.
    jobs: Vec<TableJob>,
    pending: VecDeque<String>,
    emitted: bool,
}

impl TemplateLines {
    /// Collect all lines into newline-joined text.
    pub fn to_text(self) -> Result<String> {
        Ok(self.collect::<Result<Vec<_>>>()?.join("\n"))
    }

    fn render(&mut self, job: TableJob) -> Result<()> {
        let mut chunks: Vec<Vec<String>> = Vec::new();
        let mut children: Vec<TableJob> = Vec::new();
        let parent = job.header.as_ref().map(|header| header.path.as_str());

        let separate = match &job.body {
            Body::Record(schema) => {
                let record = job.value.as_ref().and_then(Value::as_record);
                let cyclic = record.is_none()
                    && job.header.is_some()
                    && job.lineage.contains(&schema.handle.id());
                if cyclic {
                    tracing::trace!(record = schema.name(), "not expanding recursive table");
                } else {
                    let mut lineage = job.lineage.clone();
                    lineage.push(schema.handle.id());
                    for field in schema.included_fields() {
                        let value = record.and_then(|record| record.get(&field.name));
                        match self.table_jobs(field, value, record.is_some(), parent, &lineage)? {
                            Some(jobs) => children.extend(jobs),
                            None => {
                                let lines = self.field_lines(field, value)?;
                                if !lines.is_empty() {
                                    chunks.push(lines);
                                }
                            }
                        }
                    }
                }
                true
            }
            Body::Untyped => {
                if let Some(value) = &job.value {
                    if let (_, Literal::Table(entries)) = to_pair(value)? {
                        let lines: Vec<String> = entries
                            .iter()
                            .map(|(key, literal)| format_literal_pair(key, literal))
                            .collect();
                        if !lines.is_empty() {
                            chunks.push(lines);
                        }
                    }
                }
                false
            }
        };

        let mut lines = Vec::new();
        if let Some(header) = &job.header {
            // A table whose content all lives in child tables needs no header of its own.
            if !chunks.is_empty() || children.is_empty() {
                if self.emitted {
                    lines.push(String::new());
                }
                lines.extend(job.docs.iter().cloned());
                if job.optional && self.style == Style::Template {
                    lines.push("# Optional table.".to_owned());
                }
                lines.push(header.render());
                self.emitted = true;
            }
        }
        for chunk in chunks {
            if separate && self.style == Style::Template && self.emitted {
                lines.push(String::new());
            }
            lines.extend(chunk);
            self.emitted = true;
        }

        tracing::trace!(
            table = parent.unwrap_or("<root>"),
            lines = lines.len(),
            children = children.len(),
            "rendered table"
        );
        self.jobs.extend(children.into_iter().rev());
        self.pending.extend(lines);
        Ok(())
    }

    // ----- fields -----

    /// Table jobs for a field that renders as table(s); `None` renders it inline.
    /// An empty vector means the field is omitted.
    fn table_jobs(
        &self,
        field: &FieldSchema,
        value: Option<&Value>,
        in_instance: bool,
        parent: Option<&str>,
        lineage: &[TypeId],
    ) -> Result<Option<Vec<TableJob>>> {
        let key = format_key(&field.name.replace('_', "-"));
        let path = match parent {
            Some(parent) => format!("{parent}.{key}"),
            None => key,
        };

        let (element, array) = match &field.schema {
            Schema::Record(_) => (&field.schema, false),
            Schema::Mapping(element) | Schema::Sequence(element) => (
                element.as_ref(),
                matches!(field.schema, Schema::Sequence(_)),
            ),
            _ => return Ok(None),
        };
        let body = match element {
            Schema::Record(handle) => Body::Record(handle.schema()?),
            Schema::Any => Body::Untyped,
            _ => return Ok(None),
        };

        let items: Vec<(String, Option<Value>)> = match (&field.schema, value) {
            (_, None) => {
                if in_instance || (self.style == Style::Plain && field.has_default()) {
                    return Ok(Some(Vec::new()));
                }
                let placeholder = match &field.schema {
                    Schema::Mapping(_) if matches!(body, Body::Record(_)) => {
                        format!("{path}.<name>")
                    }
                    _ => path,
                };
                vec![(placeholder, None)]
            }
            (_, Some(value))
                if self.style == Style::Plain && self.equals_default(field, value)? =>
            {
                return Ok(Some(Vec::new()));
            }
            (Schema::Record(_), Some(value)) => vec![(path, Some(value.clone()))],
            (Schema::Mapping(_), Some(Value::Table(entries))) => match body {
                Body::Record(_) => entries
                    .iter()
                    .map(|(name, entry)| {
                        (format!("{path}.{}", format_key(name)), Some(entry.clone()))
                    })
                    .collect(),
                Body::Untyped => vec![(path, value.cloned())],
            },
            (Schema::Sequence(_), Some(Value::Array(entries)))
                if !entries.is_empty()
                    && (matches!(body, Body::Record(_))
                        || entries.iter().all(Value::is_table_like)) =>
            {
                entries.iter().map(|entry| (path.clone(), Some(entry.clone()))).collect()
            }
            _ => return Ok(None),
        };

        let mut docs = match &body {
            Body::Record(schema) => comment_lines(schema.doc.as_deref()),
            Body::Untyped => Vec::new(),
        };
        docs.extend(comment_lines(field.doc.as_deref()));

        Ok(Some(
            items
                .into_iter()
                .map(|(path, value)| TableJob {
                    header: Some(Header { path, array }),
                    body: match &body {
                        Body::Record(schema) => Body::Record(schema.clone()),
                        Body::Untyped => Body::Untyped,
                    },
                    value,
                    docs: docs.clone(),
                    optional: field.has_default(),
                    lineage: lineage.to_vec(),
                })
                .collect(),
        ))
    }

    fn field_lines(&self, field: &FieldSchema, value: Option<&Value>) -> Result<Vec<String>> {
        let key = field.name.replace('_', "-");
        let current = match value {
            Some(value) if !self.equals_default(field, value)? => Some(value),
            _ => None,
        };

        let mut lines = comment_lines(field.doc.as_deref());
        match self.style {
            Style::Plain => {
                let Some(value) = current else {
                    return Ok(Vec::new());
                };
                lines.push(format_toml_pair(&key, value)?);
            }
            Style::Template => {
                match &field.default {
                    FieldDefault::Required | FieldDefault::Absent => {
                        let required = field.default == FieldDefault::Required;
                        let marker = if required { "# Mandatory." } else { "# Optional." };
                        lines.push(marker.to_owned());
                        if current.is_none() {
                            lines.push(format!(
                                "{}{} = {}",
                                if required { "" } else { "# " },
                                format_key(&key),
                                placeholder(&field.schema)?
                            ));
                        }
                    }
                    FieldDefault::Value(default) => {
                        lines.push("# Default:".to_owned());
                        lines.push(format!("# {}", format_toml_pair(&key, default)?));
                    }
                }
                if let Some(value) = current {
                    lines.push(format_toml_pair(&key, value)?);
                }
            }
        }
        Ok(lines)
    }

    /// Compared by TOML rendering, so equivalent values of different shapes match.
    fn equals_default(&self, field: &FieldSchema, value: &Value) -> Result<bool> {
        match &field.default {
            FieldDefault::Value(default) => Ok(to_pair(default)? == to_pair(value)?),
            _ => Ok(false),
        }
    }
}

impl Iterator for TemplateLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(line));
            }
            let job = self.jobs.pop()?;
            if let Err(err) = self.render(job) {
                self.jobs.clear();
                return Some(Err(err));
            }
        }
    }
}

/// `# `-prefixed doc lines; multi-paragraph docs end with a bare `#`.
fn comment_lines(doc: Option<&str>) -> Vec<String> {
    let Some(doc) = doc else {
        return Vec::new();
    };
    let mut lines: Vec<&str> = doc.split('\n').collect();
    if lines.contains(&"") {
        lines.push("");
    }
    lines
        .into_iter()
        .map(|line| format!("# {line}").trim_end().to_owned())
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// PLACEHOLDERS
// ————————————————————————————————————————————————————————————————————————————

/// Example value for a field without a current value.
pub fn placeholder(schema: &Schema) -> Result<String> {
    placeholder_in(schema, &mut Vec::new())
}

fn placeholder_in(schema: &Schema, visiting: &mut Vec<TypeId>) -> Result<String> {
    let text = match schema {
        Schema::Scalar(scalar) => match scalar {
            Scalar::String => "'???'",
            Scalar::Boolean => "true | false",
            Scalar::Integer => "0",
            Scalar::Float => "0.0",
            Scalar::Module => "'fully.qualified.module.name'",
            Scalar::Class(_) => "'fully.qualified.class.name'",
            Scalar::DateTime => "2020-01-01 00:00:00+01:00",
            Scalar::Date => "2020-01-01",
            Scalar::Time | Scalar::Duration => "00:00:00",
            Scalar::Path => "'/path/to/dir_or_file'",
            Scalar::Enum(def) => {
                return Ok(def
                    .members()
                    .map(|member| match member.value() {
                        Some(number) => number.to_string(),
                        None => format_text(&member.name().to_lowercase()),
                    })
                    .collect::<Vec<_>>()
                    .join(" | "));
            }
        },
        Schema::Union(members) => {
            return Ok(members
                .iter()
                .map(|member| placeholder_in(member, visiting))
                .collect::<Result<Vec<_>>>()?
                .join(" | "));
        }
        Schema::Mapping(_) => "{}",
        Schema::Sequence(_) | Schema::Tuple(_) => "[]",
        Schema::Any => "'???'",
        Schema::Record(handle) => {
            if visiting.contains(&handle.id()) {
                return Ok("{}".to_owned());
            }
            visiting.push(handle.id());
            let schema = handle.schema()?;
            let mut entries = Vec::new();
            for field in schema.included_fields() {
                let key = format_key(&field.name.replace('_', "-"));
                entries.push(format!("{key} = {}", placeholder_in(&field.schema, visiting)?));
            }
            visiting.pop();
            return Ok(format!("{{{}}}", entries.join(", ")));
        }
    };
    Ok(text.to_owned())
}
