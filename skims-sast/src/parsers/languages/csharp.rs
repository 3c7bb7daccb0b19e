//! C#.

crate::grammar_adapter!(
    /// C# sources, via `tree-sitter-c-sharp`.
    CSharpParser => CSharp
);
