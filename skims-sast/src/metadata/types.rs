//! Per-shard declaration summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::model::NodeId;

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub n_id: NodeId,
    pub declared_type: String,
}

/// A declared class, interface, enum, record or object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub n_id: NodeId,
    /// Simple name (`Inner` for `com.acme.Outer.Inner`).
    pub name: String,
    /// `name(Type,Type)` -> method node.
    pub methods: BTreeMap<String, NodeId>,
    pub fields: BTreeMap<String, FieldInfo>,
}

impl ClassInfo {
    pub fn new(n_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            n_id,
            name: name.into(),
            methods: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Overloads of `name`, in signature order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (&'a str, NodeId)> + 'a {
        self.methods
            .iter()
            .filter(move |(signature, _)| method_name(signature) == name)
            .map(|(signature, n_id)| (signature.as_str(), *n_id))
    }

    /// First overload of `name`.
    pub fn method(&self, name: &str) -> Option<NodeId> {
        self.methods_named(name).map(|(_, n_id)| n_id).next()
    }
}

/// `run(String,int)` -> `run`.
pub fn method_name(signature: &str) -> &str {
    signature.split('(').next().unwrap_or(signature)
}

/// Summary of a shard's declarations. Empty for languages without classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShardMetadata {
    /// Package (Java/Kotlin) or outermost namespace (C#).
    pub package: String,
    /// Qualified name -> class.
    pub classes: BTreeMap<String, ClassInfo>,
}

impl ShardMetadata {
    pub fn is_empty(&self) -> bool {
        self.package.is_empty() && self.classes.is_empty()
    }

    /// Find a class by qualified name or by any dotted suffix of it.
    pub fn class(&self, name: &str) -> Option<(&str, &ClassInfo)> {
        if let Some((qualified, info)) = self.classes.get_key_value(name) {
            return Some((qualified.as_str(), info));
        }
        self.classes
            .iter()
            .find(|(qualified, _)| is_dotted_suffix(qualified, name))
            .map(|(qualified, info)| (qualified.as_str(), info))
    }

    /// The class whose body directly declares `method`.
    pub fn class_of_method(&self, method: NodeId) -> Option<(&str, &ClassInfo)> {
        self.classes
            .iter()
            .find(|(_, info)| info.methods.values().any(|m| *m == method))
            .map(|(qualified, info)| (qualified.as_str(), info))
    }
}

/// `com.acme.Service` ends with `Service` and `acme.Service`, not `ervice`.
pub fn is_dotted_suffix(qualified: &str, suffix: &str) -> bool {
    qualified == suffix
        || (qualified.len() > suffix.len()
            && qualified.ends_with(suffix)
            && qualified.as_bytes()[qualified.len() - suffix.len() - 1] == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_suffixes_respect_segments() {
        assert!(is_dotted_suffix("com.acme.Service", "Service"));
        assert!(is_dotted_suffix("com.acme.Service", "acme.Service"));
        assert!(!is_dotted_suffix("com.acme.Service", "ervice"));
        assert!(!is_dotted_suffix("Service", "com.Service"));
    }

    #[test]
    fn overloads_share_a_name() {
        let mut class = ClassInfo::new(NodeId(1), "A");
        class.methods.insert("run(String)".into(), NodeId(5));
        class.methods.insert("run(String,int)".into(), NodeId(9));
        class.methods.insert("stop()".into(), NodeId(12));
        assert_eq!(class.methods_named("run").count(), 2);
        assert_eq!(class.method("stop"), Some(NodeId(12)));
        assert_eq!(class.method("runner"), None);
    }
}
