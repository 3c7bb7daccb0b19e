//! Syntax steps: the normalized operations a dataflow path is made of.

use serde::Serialize;
use skims_core::types::collections::Deps;

use super::value::Value;
use crate::graph::{LiteralKind, NodeId};

/// Per-step record shared by every variant.
///
/// `dependencies` are absolute indices into the step sequence of the path
/// the step belongs to, always smaller than the step's own index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepMeta {
    pub n_id: NodeId,
    pub danger: bool,
    pub value: Option<Value>,
    pub dependencies: Deps<usize>,
}

impl StepMeta {
    pub fn new(n_id: NodeId, dependencies: Deps<usize>) -> Self {
        Self {
            n_id,
            danger: false,
            value: None,
            dependencies,
        }
    }
}

/// One normalized operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    Assignment {
        var: String,
    },
    ArrayAccess,
    ArrayInitialization,
    ArrayInstantiation,
    BinaryExpression {
        operator: String,
    },
    UnaryExpression {
        operator: String,
    },
    CastExpression {
        cast_type: String,
    },
    CatchClause {
        var: String,
        var_type: String,
    },
    Declaration {
        var: String,
        var_type: Option<String>,
        is_parameter: bool,
        /// Annotations or attributes on a parameter, without `@`/brackets.
        annotations: Vec<String>,
    },
    For,
    If {
        n_id_true: Option<NodeId>,
        n_id_false: Option<NodeId>,
        /// The node the path continues with after the condition.
        next: Option<NodeId>,
    },
    InstanceofExpression {
        instance_type: String,
    },
    Literal {
        value: String,
        value_type: LiteralKind,
    },
    MemberAccessExpression {
        member: String,
        expression: String,
    },
    /// `method` is the dotted call path, e.g. `request.getParameter`.
    MethodInvocation {
        method: String,
    },
    /// A call on a computed receiver; the receiver is the last dependency.
    MethodInvocationChain {
        method: String,
    },
    NoOp,
    ObjectInstantiation {
        object_type: String,
    },
    ParenthesizedExpression,
    Return,
    SymbolLookup {
        symbol: String,
    },
    Switch {
        next: Option<NodeId>,
    },
    SwitchLabelCase,
    SwitchLabelDefault,
    Ternary,
    This,
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assignment { .. } => "assignment",
            Self::ArrayAccess => "array_access",
            Self::ArrayInitialization => "array_initialization",
            Self::ArrayInstantiation => "array_instantiation",
            Self::BinaryExpression { .. } => "binary_expression",
            Self::UnaryExpression { .. } => "unary_expression",
            Self::CastExpression { .. } => "cast_expression",
            Self::CatchClause { .. } => "catch_clause",
            Self::Declaration { .. } => "declaration",
            Self::For => "for",
            Self::If { .. } => "if",
            Self::InstanceofExpression { .. } => "instanceof_expression",
            Self::Literal { .. } => "literal",
            Self::MemberAccessExpression { .. } => "member_access_expression",
            Self::MethodInvocation { .. } => "method_invocation",
            Self::MethodInvocationChain { .. } => "method_invocation_chain",
            Self::NoOp => "no_op",
            Self::ObjectInstantiation { .. } => "object_instantiation",
            Self::ParenthesizedExpression => "parenthesized_expression",
            Self::Return => "return",
            Self::SymbolLookup { .. } => "symbol_lookup",
            Self::Switch { .. } => "switch",
            Self::SwitchLabelCase => "switch_label_case",
            Self::SwitchLabelDefault => "switch_label_default",
            Self::Ternary => "ternary",
            Self::This => "this",
        }
    }

    /// Variable a step defines, for declarations, catch clauses and assignments.
    pub fn defined_var(&self) -> Option<&str> {
        match self {
            Self::Declaration { var, .. }
            | Self::CatchClause { var, .. }
            | Self::Assignment { var } => Some(var),
            _ => None,
        }
    }

    /// Declared type without generic arguments: `List<String>` -> `List`.
    pub fn declared_type_base(&self) -> Option<&str> {
        let var_type = match self {
            Self::Declaration { var_type, .. } => var_type.as_deref()?,
            Self::CatchClause { var_type, .. } => var_type.as_str(),
            _ => return None,
        };
        Some(type_base(var_type))
    }
}

/// Strip generic arguments and a nullable marker from a type name.
pub fn type_base(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.trim_end_matches('?').trim()
}

/// A step plus its evaluation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxStep {
    #[serde(flatten)]
    pub kind: StepKind,
    pub meta: StepMeta,
}

impl SyntaxStep {
    pub fn new(kind: StepKind, n_id: NodeId, dependencies: Deps<usize>) -> Self {
        Self {
            kind,
            meta: StepMeta::new(n_id, dependencies),
        }
    }

    pub fn dependencies(&self) -> &[usize] {
        &self.meta.dependencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_base_drops_generics() {
        assert_eq!(type_base("List<String>"), "List");
        assert_eq!(type_base("java.util.Map<String, List<Integer>>"), "java.util.Map");
        assert_eq!(type_base("String?"), "String");
        assert_eq!(type_base("Cookie"), "Cookie");
    }

    #[test]
    fn defined_vars() {
        let decl = StepKind::Declaration {
            var: "cmd".into(),
            var_type: Some("String".into()),
            is_parameter: false,
            annotations: Vec::new(),
        };
        assert_eq!(decl.defined_var(), Some("cmd"));
        assert_eq!(decl.declared_type_base(), Some("String"));
        assert_eq!(StepKind::NoOp.defined_var(), None);
    }
}
