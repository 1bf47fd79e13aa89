//! Declarations → [`Schema`].
//!
//! Validates each raw [`TypeDecl`] and rewrites it into canonical form:
//! - absent alternatives are stripped from unions, which are flattened and collapsed
//! - `tuple[T, ...]` becomes a sequence, other tuples stay fixed-length
//! - mapping keys must be strings
//! - `class[...]` arguments become class bounds
//!
//! Records are normalized once and cached; a record that is still being built
//! further up the stack is referenced by handle only.
use std::any::TypeId;
use std::sync::Arc;

use super::{ClassBound, FieldSchema, RecordSchema, Scalar, Schema, cache};
use crate::decl::{FieldDef, FieldDefault, Origin, RecordHandle, TypeDecl};
use crate::error::SchemaError;

/// Normalize a single declaration; `context` names the field in errors.
pub fn normalize(decl: &TypeDecl, context: &str) -> Result<Schema, SchemaError> {
    Normalizer::default().normalize(decl, context)
}

#[derive(Default)]
pub(crate) struct Normalizer {
    /// Records under construction, innermost last.
    building: Vec<TypeId>,
    /// Records finished during the current outermost build; cached only once it succeeds.
    pending: Vec<Arc<RecordSchema>>,
}

impl Normalizer {
    pub(crate) fn normalize(
        &mut self,
        decl: &TypeDecl,
        context: &str,
    ) -> Result<Schema, SchemaError> {
        let scalar =
            |scalar: Scalar| -> Result<Schema, SchemaError> { Ok(Schema::Scalar(scalar)) };
        match decl {
            TypeDecl::String => scalar(Scalar::String),
            TypeDecl::Integer => scalar(Scalar::Integer),
            TypeDecl::Float => scalar(Scalar::Float),
            TypeDecl::Boolean => scalar(Scalar::Boolean),
            TypeDecl::Date => scalar(Scalar::Date),
            TypeDecl::Time => scalar(Scalar::Time),
            TypeDecl::DateTime => scalar(Scalar::DateTime),
            TypeDecl::Duration => scalar(Scalar::Duration),
            TypeDecl::Path => scalar(Scalar::Path),
            TypeDecl::Module => scalar(Scalar::Module),
            TypeDecl::Enum(def) => scalar(Scalar::Enum(def.clone())),
            TypeDecl::Any => Ok(Schema::Any),
            TypeDecl::Union(alternatives) => self.union(alternatives, context),
            TypeDecl::Generic { origin, args } => self.generic(origin, args.as_deref(), context),
            TypeDecl::Record(handle) => {
                self.ensure_record(*handle)?;
                Ok(Schema::Record(*handle))
            }
            TypeDecl::Absent => Err(SchemaError::UnsupportedType {
                context: context.to_owned(),
                name: decl.to_string(),
            }),
            TypeDecl::Class(class) => Err(SchemaError::UnsupportedType {
                context: context.to_owned(),
                name: class.full_name(),
            }),
            TypeDecl::Ellipsis | TypeDecl::Unresolved(_) => Err(SchemaError::NotAType {
                context: context.to_owned(),
            }),
        }
    }

    fn union(&mut self, alternatives: &[TypeDecl], context: &str) -> Result<Schema, SchemaError> {
        let members = alternatives
            .iter()
            .filter(|alternative| !matches!(alternative, TypeDecl::Absent))
            .map(|alternative| self.normalize(alternative, context))
            .collect::<Result<Vec<_>, _>>()?;
        if members.is_empty() {
            return Err(SchemaError::EmptyUnion { context: context.to_owned() });
        }
        Ok(Schema::union_of(members))
    }

    fn generic(
        &mut self,
        origin: &Origin,
        args: Option<&[TypeDecl]>,
        context: &str,
    ) -> Result<Schema, SchemaError> {
        let Some(args) = args else {
            return match origin {
                Origin::Class => Ok(Schema::Scalar(Scalar::Class(ClassBound::Any))),
                _ => Err(SchemaError::MissingTypeArguments { context: context.to_owned() }),
            };
        };
        let element_context = format!("{context}[]");
        match origin {
            Origin::Dict | Origin::Mapping => {
                let [key, value] = args else {
                    return Err(SchemaError::MappingArity { context: context.to_owned() });
                };
                if *key != TypeDecl::String {
                    return Err(SchemaError::MappingKey {
                        context: context.to_owned(),
                        key: key.to_string(),
                    });
                }
                let value = self.normalize(value, &element_context)?;
                Ok(Schema::Mapping(Box::new(value)))
            }
            Origin::List | Origin::Sequence => {
                let [element] = args else {
                    return Err(SchemaError::SequenceArity { context: context.to_owned() });
                };
                let element = self.normalize(element, &element_context)?;
                Ok(Schema::Sequence(Box::new(element)))
            }
            Origin::Tuple => match args {
                [element, TypeDecl::Ellipsis] => {
                    let element = self.normalize(element, &element_context)?;
                    Ok(Schema::Sequence(Box::new(element)))
                }
                elements => {
                    let elements = elements
                        .iter()
                        .map(|element| self.normalize(element, &element_context))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Schema::Tuple(elements))
                }
            },
            Origin::Class => class_bound(args, context),
            Origin::Other(name) => Err(SchemaError::UnsupportedGeneric {
                context: context.to_owned(),
                origin: name.clone(),
            }),
        }
    }

    // ----- records -----

    /// Cached schema for `handle`, building it (and anything it references) if needed.
    pub(crate) fn record(
        &mut self,
        handle: RecordHandle,
    ) -> Result<Arc<RecordSchema>, SchemaError> {
        if let Some(schema) = cache::lookup(handle.id()) {
            return Ok(schema);
        }
        if let Some(schema) = self.pending.iter().find(|schema| schema.handle.id() == handle.id()) {
            return Ok(schema.clone());
        }
        self.building.push(handle.id());
        let built = self.build_record(handle);
        self.building.pop();
        let outermost = self.building.is_empty();
        let schema = match built {
            Ok(schema) => Arc::new(schema),
            Err(err) => {
                if outermost {
                    self.pending.clear();
                }
                return Err(err);
            }
        };
        tracing::debug!(record = handle.name(), fields = schema.fields.len(), "normalized record");
        if !outermost {
            self.pending.push(schema.clone());
            return Ok(schema);
        }
        for nested in self.pending.drain(..) {
            cache::insert(nested);
        }
        Ok(cache::insert(schema))
    }

    fn ensure_record(&mut self, handle: RecordHandle) -> Result<(), SchemaError> {
        if self.building.contains(&handle.id()) {
            return Ok(());
        }
        self.record(handle).map(|_| ())
    }

    fn build_record(&mut self, handle: RecordHandle) -> Result<RecordSchema, SchemaError> {
        let doc = handle.definition().doc;
        let mut fields = Vec::new();
        for field in declared_fields(handle) {
            fields.push(self.field(handle, field)?);
        }
        Ok(RecordSchema { handle, doc, fields })
    }

    fn field(&mut self, owner: RecordHandle, field: FieldDef) -> Result<FieldSchema, SchemaError> {
        let optional = field.decl.admits_absent();
        if !field.init {
            return Ok(FieldSchema {
                name: field.name,
                schema: Schema::Any,
                default: field.default,
                doc: field.doc,
                included: false,
                optional,
            });
        }
        let context = format!("{}.{}", owner.name(), field.name);
        let schema = self.normalize(&field.decl, &context)?;
        if optional && field.default != FieldDefault::Absent {
            return Err(SchemaError::OptionalDefault { context });
        }
        Ok(FieldSchema {
            name: field.name,
            schema,
            default: field.default,
            doc: field.doc,
            included: true,
            optional,
        })
    }
}

/// Fields of `handle` with inherited ones first.
fn declared_fields(handle: RecordHandle) -> Vec<FieldDef> {
    let mut chain = vec![handle];
    let mut current = handle.definition().base;
    while let Some(base) = current {
        if chain.contains(&base) {
            break;
        }
        chain.push(base);
        current = base.definition().base;
    }

    let mut fields: Vec<FieldDef> = Vec::new();
    for record in chain.into_iter().rev() {
        for field in record.definition().fields {
            match fields.iter_mut().find(|existing| existing.name == field.name) {
                Some(existing) => *existing = field,
                None => fields.push(field),
            }
        }
    }
    fields
}

fn class_bound(args: &[TypeDecl], context: &str) -> Result<Schema, SchemaError> {
    let [arg] = args else {
        return Err(SchemaError::ClassArity { context: context.to_owned() });
    };
    let bases = match arg {
        TypeDecl::Union(alternatives) => alternatives.as_slice(),
        other => std::slice::from_ref(other),
    };
    if bases.contains(&TypeDecl::Any) {
        return Ok(Schema::Scalar(Scalar::Class(ClassBound::Any)));
    }
    let members = bases
        .iter()
        .map(|base| match base {
            TypeDecl::Class(class) => {
                Ok(Schema::Scalar(Scalar::Class(ClassBound::Class(class.clone()))))
            }
            _ => Err(SchemaError::ClassArgument { context: context.to_owned() }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Schema::union_of(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ClassRef;

    #[test]
    fn optional_collapses_to_inner() {
        let schema = normalize(&TypeDecl::optional(TypeDecl::Integer), "Config.port").unwrap();
        assert_eq!(schema, Schema::Scalar(Scalar::Integer));
    }

    #[test]
    fn nested_unions_flatten_and_dedupe() {
        let decl = TypeDecl::union([
            TypeDecl::Integer,
            TypeDecl::union([TypeDecl::String, TypeDecl::Integer]),
            TypeDecl::Absent,
        ]);
        let schema = normalize(&decl, "Config.value").unwrap();
        assert_eq!(schema.to_string(), "integer | string");
    }

    #[test]
    fn homogeneous_tuple_is_a_sequence() {
        let schema = normalize(&TypeDecl::tuple_of(TypeDecl::String), "Config.names").unwrap();
        assert_eq!(schema.to_string(), "array[string]");
        let schema = normalize(
            &TypeDecl::tuple([TypeDecl::String, TypeDecl::Integer]),
            "Config.pair",
        )
        .unwrap();
        assert_eq!(schema.to_string(), "tuple[string, integer]");
    }

    #[test]
    fn mapping_keys_must_be_strings() {
        let err = normalize(
            &TypeDecl::dict(TypeDecl::Integer, TypeDecl::String),
            "Config.lookup",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mapping 'Config.lookup' has key type 'integer', expected 'string'"
        );
    }

    #[test]
    fn bare_generics_need_arguments() {
        let bare_list = TypeDecl::Generic { origin: Origin::List, args: None };
        let err = normalize(&bare_list, "Config.items").unwrap_err();
        assert!(matches!(err, SchemaError::MissingTypeArguments { .. }));
        let schema = normalize(&TypeDecl::class(), "Config.handler").unwrap();
        assert_eq!(schema, Schema::Scalar(Scalar::Class(ClassBound::Any)));
    }

    #[test]
    fn class_union_becomes_union_of_bounds() {
        let a = ClassRef::new("pkg", "A");
        let b = ClassRef::new("pkg", "B");
        let decl = TypeDecl::class_of(TypeDecl::union([
            TypeDecl::Class(a.clone()),
            TypeDecl::Class(b.clone()),
        ]));
        let schema = normalize(&decl, "Config.handler").unwrap();
        assert_eq!(schema.to_string(), "class[pkg.A] | class[pkg.B]");

        let err = normalize(&TypeDecl::class_of(TypeDecl::Integer), "Config.handler").unwrap_err();
        assert!(matches!(err, SchemaError::ClassArgument { .. }));
    }

    #[test]
    fn non_types_are_rejected() {
        let err = normalize(&TypeDecl::Unresolved("0".into()), "Config.broken").unwrap_err();
        assert_eq!(err.to_string(), "Annotation for field 'Config.broken' is not a type");
        let err = normalize(&TypeDecl::Absent, "Config.nothing").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedType { .. }));
        let other = TypeDecl::Generic {
            origin: Origin::Other("frozenset".into()),
            args: Some(vec![TypeDecl::String]),
        };
        let err = normalize(&other, "Config.set").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedGeneric { .. }));
    }
}
