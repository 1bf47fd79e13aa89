//! Dotted-name resolution against a registry of modules and their members.
//!
//! A dotted name is resolved greedily: the longest prefix naming a registered
//! module is taken as the module, the remaining parts are walked as members.
use indexmap::IndexMap;

use crate::error::ReferenceError;
use crate::value::{ClassRef, ModuleRef, Value};

/// Anything a dotted name can resolve to.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Module(ModuleRef),
    Class(ClassRef),
    Value(Value),
}

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Module(_) => "module",
            Object::Class(_) => "class",
            Object::Value(value) => value.kind(),
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    object: Object,
    members: IndexMap<String, Entry>,
}

impl Entry {
    fn new(object: Object) -> Self {
        Self { object, members: IndexMap::new() }
    }
}

/// Modules by full dotted name, each with its (possibly nested) members.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    modules: IndexMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module and every parent package of it.
    pub fn register_module(&mut self, name: &str) -> &mut Self {
        let mut prefix = String::new();
        for part in name.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            self.modules
                .entry(prefix.clone())
                .or_insert_with(|| Entry::new(Object::Module(ModuleRef::new(prefix.as_str()))));
        }
        self
    }

    /// Register a class under its module; enclosing classes of a nested
    /// qualified name are registered on the way if missing.
    pub fn register_class(&mut self, class: ClassRef) -> &mut Self {
        let module = class.module().to_owned();
        let qualname = class.qualname().to_owned();
        let parts: Vec<&str> = qualname.split('.').collect();
        let entry = self.member_slot(&module, &parts, |partial| {
            Object::Class(ClassRef::new(module.as_str(), partial))
        });
        entry.object = Object::Class(class);
        self
    }

    /// Register a plain value as a module attribute, e.g. `pkg.settings.DEFAULT_PORT`.
    pub fn register_value(&mut self, module: &str, name: &str, value: Value) -> &mut Self {
        let parts: Vec<&str> = name.split('.').collect();
        let entry = self.member_slot(module, &parts, |partial| {
            Object::Class(ClassRef::new(module, partial))
        });
        entry.object = Object::Value(value);
        self
    }

    fn member_slot(
        &mut self,
        module: &str,
        parts: &[&str],
        placeholder: impl Fn(&str) -> Object,
    ) -> &mut Entry {
        self.register_module(module);
        let mut entry = self
            .modules
            .entry(module.to_owned())
            .or_insert_with(|| Entry::new(Object::Module(ModuleRef::new(module))));
        for (index, part) in parts.iter().enumerate() {
            let partial = parts[..=index].join(".");
            entry = entry
                .members
                .entry((*part).to_owned())
                .or_insert_with(|| Entry::new(placeholder(&partial)));
        }
        entry
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolve `dotted` to a registered object; `context` names the field in errors.
    pub fn resolve(&self, dotted: &str, context: &str) -> Result<Object, ReferenceError> {
        let parts: Vec<&str> = dotted.split('.').collect();

        let mut consumed = 0;
        let mut node = None;
        while consumed < parts.len() {
            match self.modules.get(&parts[..=consumed].join(".")) {
                Some(module) => {
                    node = Some(module);
                    consumed += 1;
                }
                None => break,
            }
        }
        let Some(mut node) = node else {
            return Err(ReferenceError::NoModule {
                context: context.to_owned(),
                module: parts[0].to_owned(),
            });
        };

        for (index, name) in parts.iter().enumerate().skip(consumed) {
            node = node.members.get(*name).ok_or_else(|| ReferenceError::NoMember {
                context: context.to_owned(),
                name: (*name).to_owned(),
                parent: parts[..index].join("."),
            })?;
        }
        tracing::trace!(name = dotted, kind = node.object.kind(), "resolved reference");
        Ok(node.object.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_module("tests.example")
            .register_class(ClassRef::new("tests.example", "Outer.Inner"))
            .register_value("tests.example", "LIMIT", Value::Integer(3));
        registry
    }

    #[test]
    fn resolves_modules_and_nested_members() {
        let registry = registry();
        assert_eq!(
            registry.resolve("tests", "ctx").unwrap(),
            Object::Module(ModuleRef::new("tests"))
        );
        let inner = registry.resolve("tests.example.Outer.Inner", "ctx").unwrap();
        assert_eq!(inner.kind(), "class");
        assert_eq!(
            registry.resolve("tests.example.LIMIT", "ctx").unwrap(),
            Object::Value(Value::Integer(3))
        );
    }

    #[test]
    fn missing_top_level_module() {
        let err = registry().resolve("nosuchmodule.Foo", "Config.handler").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Object for 'Config.handler' not found: no top-level module named 'nosuchmodule'"
        );
    }

    #[test]
    fn missing_member_names_its_parent() {
        let err = registry().resolve("tests.example.NoSuchClass", "Config.handler").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Object for 'Config.handler' not found: name 'NoSuchClass' does not exist in 'tests.example'"
        );
    }
}
