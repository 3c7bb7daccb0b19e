//! JavaScript, JSX included.

crate::grammar_adapter!(JavaScriptParser => JavaScript);
