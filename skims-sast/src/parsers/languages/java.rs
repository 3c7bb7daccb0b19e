//! Java.

crate::grammar_adapter!(
    /// Java sources, via `tree-sitter-java`.
    JavaParser => Java
);
