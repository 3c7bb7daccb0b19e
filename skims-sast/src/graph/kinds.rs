//! Closed classification of grammar productions.
//!
//! Every adapter emits raw `label_type` strings; the builder maps each one
//! to a `NodeKind` once, so control flow, metadata and syntax lowering can
//! match exhaustively instead of comparing strings.

use serde::Serialize;

use crate::scanner::language_detect::Language;

/// Literal categories, matching the evaluator's value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    Null,
}

/// Language-neutral construct category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Root,
    Package,
    Import,
    Class,
    ClassBody,
    /// Methods, constructors, functions, lambdas.
    Method,
    Parameters,
    Parameter,
    Field,
    Block,
    VariableDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    If,
    ElseClause,
    While,
    DoWhile,
    For,
    ForEach,
    Switch,
    SwitchBody,
    SwitchCase,
    SwitchLabel,
    Break,
    Continue,
    Return,
    Throw,
    Try,
    Catch,
    CatchParameter,
    Finally,
    Labeled,
    /// Statements that own a body and flow straight into it
    /// (`synchronized`, `using`, `with`, `export`).
    Compound,
    Assignment,
    Binary,
    Unary,
    Ternary,
    Cast,
    Instanceof,
    Parenthesized,
    ArrayAccess,
    ArrayCreation,
    ArrayInitializer,
    ObjectCreation,
    Call,
    MemberAccess,
    Arguments,
    /// Wrapper around a single argument expression.
    Argument,
    Identifier,
    Type,
    This,
    Literal(LiteralKind),
    /// A named statement with no dedicated rule.
    Statement,
    /// Anonymous token: keyword, operator or punctuation.
    Token,
    Other,
}

impl NodeKind {
    /// Classify a production of `language`.
    pub fn classify(language: Language, label_type: &str, named: bool) -> NodeKind {
        if !named {
            return NodeKind::Token;
        }
        if let Some(kind) = classify_for_language(language, label_type) {
            return kind;
        }
        classify_common(label_type).unwrap_or_else(|| {
            if label_type.ends_with("_statement") {
                NodeKind::Statement
            } else {
                NodeKind::Other
            }
        })
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Self::While | Self::DoWhile | Self::For | Self::ForEach)
    }

    /// Constructs a `break` unwinds to.
    pub fn is_breakable(&self) -> bool {
        self.is_loop() || matches!(self, Self::Switch)
    }

    /// Kinds that take part in control flow as a unit.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::VariableDeclaration
                | Self::ExpressionStatement
                | Self::If
                | Self::While
                | Self::DoWhile
                | Self::For
                | Self::ForEach
                | Self::Switch
                | Self::Break
                | Self::Continue
                | Self::Return
                | Self::Throw
                | Self::Try
                | Self::Labeled
                | Self::Compound
                | Self::Statement
                | Self::Method
                | Self::Class
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

/// Productions whose meaning differs between grammars.
fn classify_for_language(language: Language, label_type: &str) -> Option<NodeKind> {
    let kind = match (language, label_type) {
        (Language::Python, "for_statement") => NodeKind::ForEach,
        (Language::Python, "elif_clause") => NodeKind::If,
        (Language::Python, "call") => NodeKind::Call,
        (Language::Python, "attribute") => NodeKind::MemberAccess,
        (Language::Python, "subscript") => NodeKind::ArrayAccess,
        (Language::Python, "list") => NodeKind::ArrayInitializer,
        (Language::Python, "lambda") => NodeKind::Method,
        (Language::Python, "assignment" | "augmented_assignment") => NodeKind::Assignment,
        (Language::Python, "boolean_operator" | "comparison_operator") => NodeKind::Binary,
        (Language::Python, "not_operator") => NodeKind::Unary,
        (Language::Python, "conditional_expression") => NodeKind::Ternary,
        (Language::Python, "integer" | "float") => NodeKind::Literal(LiteralKind::Number),
        (Language::Python, "none") => NodeKind::Literal(LiteralKind::Null),
        (Language::Python, "with_statement" | "decorated_definition") => NodeKind::Compound,
        (Language::Python, "match_statement") => NodeKind::Switch,
        (Language::Python, "case_clause") => NodeKind::SwitchCase,
        (Language::Python, "raise_statement") => NodeKind::Throw,
        (Language::Python, "except_clause" | "except_group_clause") => NodeKind::Catch,
        (Language::JavaScript | Language::TypeScript, "array") => NodeKind::ArrayInitializer,
        (Language::JavaScript | Language::TypeScript, "function") => NodeKind::Method,
        (Language::JavaScript | Language::TypeScript, "class") => NodeKind::Class,
        (Language::JavaScript | Language::TypeScript, "export_statement") => NodeKind::Compound,
        (Language::JavaScript | Language::TypeScript, "await_expression") => NodeKind::Unary,
        (Language::JavaScript | Language::TypeScript, "number") => {
            NodeKind::Literal(LiteralKind::Number)
        }
        (Language::JavaScript | Language::TypeScript, "undefined") => {
            NodeKind::Literal(LiteralKind::Null)
        }
        (Language::JavaScript | Language::TypeScript, "variable_declaration") => {
            NodeKind::VariableDeclaration
        }
        (Language::CSharp, "variable_declaration") => NodeKind::VariableDeclaration,
        (Language::CSharp, "argument") => NodeKind::Argument,
        (Language::CSharp, "parameter") => NodeKind::Parameter,
        (Language::CSharp, "conditional_expression") => NodeKind::Ternary,
        (Language::CSharp, "is_pattern_expression" | "is_expression") => NodeKind::Instanceof,
        (Language::CSharp, "initializer_expression") => NodeKind::ArrayInitializer,
        (
            Language::CSharp,
            "using_statement" | "lock_statement" | "checked_statement" | "unsafe_statement"
            | "fixed_statement",
        ) => NodeKind::Compound,
        (Language::CSharp, "generic_name" | "qualified_name") => NodeKind::Type,
        (Language::Go, "package_clause") => NodeKind::Package,
        (Language::Go, "statement_list") => NodeKind::Block,
        (Language::Go, "var_spec" | "const_spec") => NodeKind::VariableDeclarator,
        (Language::Go, "short_var_declaration" | "var_declaration" | "const_declaration") => {
            NodeKind::VariableDeclaration
        }
        (Language::Go, "assignment_statement") => NodeKind::Assignment,
        (Language::Go, "index_expression") => NodeKind::ArrayAccess,
        (Language::Go, "composite_literal") => NodeKind::ArrayInitializer,
        (Language::Go, "func_literal") => NodeKind::Method,
        (Language::Go, "type_conversion_expression" | "type_assertion_expression") => NodeKind::Cast,
        (Language::Go, "expression_case" | "default_case" | "type_case" | "communication_case") => {
            NodeKind::SwitchCase
        }
        (Language::Go, "int_literal" | "float_literal" | "imaginary_literal") => {
            NodeKind::Literal(LiteralKind::Number)
        }
        (Language::Go, "interpreted_string_literal" | "raw_string_literal" | "rune_literal") => {
            NodeKind::Literal(LiteralKind::String)
        }
        (Language::Go, "nil") => NodeKind::Literal(LiteralKind::Null),
        (Language::Go, "field_identifier" | "package_identifier") => NodeKind::Identifier,
        (Language::Kotlin, "package_header") => NodeKind::Package,
        (Language::Kotlin, "import_header") => NodeKind::Import,
        (Language::Kotlin, "object_declaration") => NodeKind::Class,
        (Language::Kotlin, "function_body" | "statements" | "control_structure_body") => {
            NodeKind::Block
        }
        (Language::Kotlin, "function_value_parameters") => NodeKind::Parameters,
        (Language::Kotlin, "property_declaration") => NodeKind::VariableDeclaration,
        (Language::Kotlin, "assignment") => NodeKind::Assignment,
        (Language::Kotlin, "if_expression") => NodeKind::If,
        (Language::Kotlin, "when_expression") => NodeKind::Switch,
        (Language::Kotlin, "when_entry") => NodeKind::SwitchCase,
        (Language::Kotlin, "do_while_statement") => NodeKind::DoWhile,
        (Language::Kotlin, "for_statement") => NodeKind::ForEach,
        (Language::Kotlin, "try_expression") => NodeKind::Try,
        (Language::Kotlin, "catch_block") => NodeKind::Catch,
        (Language::Kotlin, "finally_block") => NodeKind::Finally,
        (Language::Kotlin, "navigation_expression") => NodeKind::MemberAccess,
        (Language::Kotlin, "indexing_expression") => NodeKind::ArrayAccess,
        (Language::Kotlin, "value_arguments") => NodeKind::Arguments,
        (Language::Kotlin, "value_argument") => NodeKind::Argument,
        (Language::Kotlin, "anonymous_function" | "lambda_literal") => NodeKind::Method,
        (Language::Kotlin, "type_test") => NodeKind::Instanceof,
        (Language::Kotlin, "as_expression") => NodeKind::Cast,
        (Language::Kotlin, "user_type" | "nullable_type") => NodeKind::Type,
        (Language::Kotlin, "simple_identifier") => NodeKind::Identifier,
        (Language::Kotlin, "prefix_expression" | "postfix_expression") => NodeKind::Unary,
        (
            Language::Kotlin,
            "additive_expression"
            | "multiplicative_expression"
            | "comparison_expression"
            | "equality_expression"
            | "conjunction_expression"
            | "disjunction_expression",
        ) => NodeKind::Binary,
        (Language::Kotlin, "integer_literal" | "real_literal" | "long_literal") => {
            NodeKind::Literal(LiteralKind::Number)
        }
        (Language::Kotlin, "line_string_literal" | "multi_line_string_literal") => {
            NodeKind::Literal(LiteralKind::String)
        }
        (Language::Kotlin, "boolean_literal") => NodeKind::Literal(LiteralKind::Boolean),
        (Language::Kotlin, "jump_expression") => NodeKind::Statement,
        _ => return None,
    };
    Some(kind)
}

fn classify_common(label_type: &str) -> Option<NodeKind> {
    let kind = match label_type {
        "program" | "compilation_unit" | "source_file" | "module" => NodeKind::Root,
        "package_declaration" | "namespace_declaration" | "file_scoped_namespace_declaration" => {
            NodeKind::Package
        }
        "import_declaration" | "import_statement" | "import_from_statement" | "using_directive" => {
            NodeKind::Import
        }
        "class_declaration"
        | "interface_declaration"
        | "enum_declaration"
        | "record_declaration"
        | "struct_declaration"
        | "abstract_class_declaration"
        | "class_definition" => NodeKind::Class,
        "class_body" | "declaration_list" | "interface_body" | "enum_body" => NodeKind::ClassBody,
        "method_declaration"
        | "constructor_declaration"
        | "compact_constructor_declaration"
        | "function_declaration"
        | "generator_function_declaration"
        | "function_definition"
        | "method_definition"
        | "function_expression"
        | "arrow_function"
        | "lambda_expression"
        | "local_function_statement" => NodeKind::Method,
        "formal_parameters" | "parameter_list" | "parameters" | "inferred_parameters" => {
            NodeKind::Parameters
        }
        "formal_parameter"
        | "spread_parameter"
        | "parameter_declaration"
        | "variadic_parameter_declaration"
        | "required_parameter"
        | "optional_parameter"
        | "typed_parameter"
        | "default_parameter"
        | "typed_default_parameter" => NodeKind::Parameter,
        "field_declaration" | "field_definition" | "public_field_definition" => NodeKind::Field,
        "block" | "statement_block" | "constructor_body" => NodeKind::Block,
        "local_variable_declaration" | "local_declaration_statement" | "lexical_declaration" => {
            NodeKind::VariableDeclaration
        }
        "variable_declarator" => NodeKind::VariableDeclarator,
        "expression_statement" => NodeKind::ExpressionStatement,
        "if_statement" => NodeKind::If,
        "else_clause" => NodeKind::ElseClause,
        "while_statement" => NodeKind::While,
        "do_statement" => NodeKind::DoWhile,
        "for_statement" => NodeKind::For,
        "enhanced_for_statement" | "for_in_statement" | "foreach_statement" => NodeKind::ForEach,
        "switch_expression"
        | "switch_statement"
        | "expression_switch_statement"
        | "type_switch_statement"
        | "select_statement" => NodeKind::Switch,
        "switch_block" | "switch_body" => NodeKind::SwitchBody,
        "switch_block_statement_group"
        | "switch_rule"
        | "switch_section"
        | "switch_case"
        | "switch_default" => NodeKind::SwitchCase,
        "switch_label" | "case_switch_label" | "default_switch_label" => NodeKind::SwitchLabel,
        "break_statement" => NodeKind::Break,
        "continue_statement" => NodeKind::Continue,
        "return_statement" => NodeKind::Return,
        "throw_statement" | "throw_expression" => NodeKind::Throw,
        "try_statement" | "try_with_resources_statement" => NodeKind::Try,
        "catch_clause" => NodeKind::Catch,
        "catch_formal_parameter" | "catch_declaration" => NodeKind::CatchParameter,
        "finally_clause" => NodeKind::Finally,
        "labeled_statement" => NodeKind::Labeled,
        "synchronized_statement" => NodeKind::Compound,
        "assignment_expression" | "augmented_assignment_expression" => NodeKind::Assignment,
        "binary_expression" => NodeKind::Binary,
        "unary_expression"
        | "update_expression"
        | "prefix_unary_expression"
        | "postfix_unary_expression" => NodeKind::Unary,
        "ternary_expression" => NodeKind::Ternary,
        "cast_expression" | "as_expression" | "type_assertion" => NodeKind::Cast,
        "instanceof_expression" => NodeKind::Instanceof,
        "parenthesized_expression" => NodeKind::Parenthesized,
        "array_access" | "element_access_expression" | "subscript_expression" => {
            NodeKind::ArrayAccess
        }
        "array_creation_expression" | "implicit_array_creation_expression" => {
            NodeKind::ArrayCreation
        }
        "array_initializer" => NodeKind::ArrayInitializer,
        "object_creation_expression" | "new_expression" => NodeKind::ObjectCreation,
        "method_invocation" | "call_expression" | "invocation_expression" => NodeKind::Call,
        "field_access" | "member_expression" | "member_access_expression" | "selector_expression" => {
            NodeKind::MemberAccess
        }
        "argument_list" | "arguments" => NodeKind::Arguments,
        "identifier"
        | "property_identifier"
        | "shorthand_property_identifier"
        | "scoped_identifier"
        | "dotted_name" => NodeKind::Identifier,
        "type_identifier"
        | "scoped_type_identifier"
        | "generic_type"
        | "array_type"
        | "integral_type"
        | "floating_point_type"
        | "boolean_type"
        | "void_type"
        | "predefined_type"
        | "nullable_type"
        | "type_annotation"
        | "pointer_type"
        | "qualified_type"
        | "slice_type"
        | "map_type"
        | "catch_type" => NodeKind::Type,
        "this" | "this_expression" => NodeKind::This,
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal"
        | "decimal_floating_point_literal"
        | "hex_floating_point_literal"
        | "integer_literal"
        | "real_literal" => NodeKind::Literal(LiteralKind::Number),
        "string_literal"
        | "character_literal"
        | "string"
        | "template_string"
        | "verbatim_string_literal"
        | "raw_string_literal"
        | "text_block" => NodeKind::Literal(LiteralKind::String),
        "true" | "false" | "boolean_literal" => NodeKind::Literal(LiteralKind::Boolean),
        "null_literal" | "null" => NodeKind::Literal(LiteralKind::Null),
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_tokens_are_tokens() {
        assert_eq!(NodeKind::classify(Language::Java, "default", false), NodeKind::Token);
        assert_eq!(NodeKind::classify(Language::Java, "+", false), NodeKind::Token);
    }

    #[test]
    fn language_overrides_win() {
        assert_eq!(NodeKind::classify(Language::Python, "for_statement", true), NodeKind::ForEach);
        assert_eq!(NodeKind::classify(Language::Java, "for_statement", true), NodeKind::For);
        assert_eq!(
            NodeKind::classify(Language::Go, "expression_case", true),
            NodeKind::SwitchCase
        );
    }

    #[test]
    fn unknown_statements_degrade_to_statement() {
        assert_eq!(
            NodeKind::classify(Language::Go, "go_statement", true),
            NodeKind::Statement
        );
        assert_eq!(
            NodeKind::classify(Language::Java, "marker_annotation", true),
            NodeKind::Other
        );
    }
}
