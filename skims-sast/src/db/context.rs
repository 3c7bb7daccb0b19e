//! Cross-file index of declared classes and methods.

use std::collections::BTreeMap;

use crate::graph::NodeId;
use crate::metadata::types::is_dotted_suffix;
use crate::metadata::method_name;

use super::shard::GraphShard;

/// Where a declaration lives: shard position in the db plus node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeclRef {
    pub shard: usize,
    pub n_id: NodeId,
}

/// Qualified-name lookups over every shard of a `GraphDb`.
#[derive(Debug, Default)]
pub struct GraphDbContext {
    classes: BTreeMap<String, DeclRef>,
    /// `Qualified.Class.method` -> overloads.
    methods: BTreeMap<String, Vec<DeclRef>>,
}

impl GraphDbContext {
    pub(crate) fn index(shards: &[GraphShard]) -> Self {
        let mut context = Self::default();
        for (position, shard) in shards.iter().enumerate() {
            for (qualified, class) in &shard.metadata.classes {
                context.classes.insert(
                    qualified.clone(),
                    DeclRef {
                        shard: position,
                        n_id: class.n_id,
                    },
                );
                for (signature, n_id) in &class.methods {
                    context
                        .methods
                        .entry(format!("{qualified}.{}", method_name(signature)))
                        .or_default()
                        .push(DeclRef {
                            shard: position,
                            n_id: *n_id,
                        });
                }
            }
        }
        context
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.values().map(Vec::len).sum()
    }

    /// A class by qualified name or dotted suffix; the first match in
    /// qualified-name order wins.
    pub fn class(&self, name: &str) -> Option<(&str, DeclRef)> {
        if let Some((qualified, decl)) = self.classes.get_key_value(name) {
            return Some((qualified.as_str(), *decl));
        }
        self.classes
            .iter()
            .find(|(qualified, _)| is_dotted_suffix(qualified, name))
            .map(|(qualified, decl)| (qualified.as_str(), *decl))
    }

    /// Overloads of `method` declared by the class `class_name` resolves to.
    pub fn methods(&self, class_name: &str, method: &str) -> &[DeclRef] {
        self.class(class_name)
            .and_then(|(qualified, _)| self.methods.get(&format!("{qualified}.{method}")))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn qualified_classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}
