//! Kotlin.

crate::grammar_adapter!(
    /// Kotlin sources. The grammar is the `tree-sitter-kotlin-sg` fork,
    /// which tracks the 0.25 runtime.
    KotlinParser => Kotlin
);
