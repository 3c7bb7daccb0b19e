//! Hash maps and inline vectors used across the graph and evaluator.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// Step dependencies and call arguments. Most steps read one or two values.
pub type Deps<T> = SmallVec<[T; 4]>;

/// Ordered syntax children of one graph node.
pub type Children<T> = SmallVec<[T; 8]>;

/// CFG neighbours. Only branches fan out to more than one.
pub type Fanout<T> = SmallVec<[T; 2]>;
