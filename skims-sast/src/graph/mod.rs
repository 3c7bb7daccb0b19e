//! Shard graph: model, construction, traversal and path enumeration.

pub mod builder;
pub mod kinds;
pub mod model;
pub mod paths;
pub mod traversal;

pub use builder::build;
pub use kinds::{LiteralKind, NodeKind};
pub use model::{CfgEdgeKind, EdgeFilter, EdgeKind, Graph, NodeId, SyntaxNode};
pub use paths::{backward_paths, branches_cfg, paths, PathBounds, PathSearch};
pub use traversal::UNBOUNDED;
