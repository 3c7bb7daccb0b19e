//! String interning for shard paths and qualified symbol names.
//!
//! `lasso::ThreadedRodeo` is shared by the parallel shard builders;
//! once the GraphDB is frozen it is turned into a contention-free `RodeoReader`.

use lasso::{RodeoReader, Spur, ThreadedRodeo};

/// Path interner that normalizes separators before interning, so a shard
/// built from `src\Main.java` and one looked up as `./src/Main.java` agree.
#[derive(Default)]
pub struct PathInterner {
    inner: ThreadedRodeo,
}

impl PathInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path, normalizing it first.
    pub fn intern(&self, path: &str) -> Spur {
        self.inner.get_or_intern(normalize_path(path))
    }

    /// Look up a previously interned path without inserting.
    pub fn get(&self, path: &str) -> Option<Spur> {
        self.inner.get(normalize_path(path))
    }

    pub fn resolve(&self, key: &Spur) -> &str {
        self.inner.resolve(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Freeze into a read-only `RodeoReader`.
    pub fn into_reader(self) -> RodeoReader {
        self.inner.into_reader()
    }
}

/// Backslashes become slashes, `//` collapses, a leading `./` and a
/// trailing `/` are dropped.
pub fn normalize_path(path: &str) -> String {
    let mut result = path.replace('\\', "/");
    while result.contains("//") {
        result = result.replace("//", "/");
    }
    while let Some(stripped) = result.strip_prefix("./") {
        result = stripped.to_string();
    }
    if result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}

/// Interner for dotted symbol names (`com.acme.Service.run`).
#[derive(Default)]
pub struct SymbolInterner {
    inner: ThreadedRodeo,
}

impl SymbolInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, name: &str) -> Spur {
        self.inner.get_or_intern(name)
    }

    /// Intern `namespace.name`, or just `name` when the namespace is empty.
    pub fn intern_qualified(&self, namespace: &str, name: &str) -> Spur {
        if namespace.is_empty() {
            self.inner.get_or_intern(name)
        } else {
            self.inner.get_or_intern(format!("{namespace}.{name}"))
        }
    }

    pub fn get(&self, name: &str) -> Option<Spur> {
        self.inner.get(name)
    }

    pub fn resolve(&self, key: &Spur) -> &str {
        self.inner.resolve(key)
    }

    pub fn into_reader(self) -> RodeoReader {
        self.inner.into_reader()
    }
}
