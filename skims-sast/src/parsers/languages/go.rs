//! Go.

crate::grammar_adapter!(GoParser => Go);
