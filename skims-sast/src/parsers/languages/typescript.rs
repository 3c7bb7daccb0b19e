//! TypeScript. `.tsx` files pick the TSX grammar through the extension.

crate::grammar_adapter!(TypeScriptParser => TypeScript);
