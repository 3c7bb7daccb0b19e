//! Collection aliases and interning shared by both crates.

pub mod collections;
pub mod interning;

pub use collections::{FxHashMap, FxHashSet};
pub use interning::{normalize_path, PathInterner, SymbolInterner};
