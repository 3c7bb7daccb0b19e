//! # skims-sast
//!
//! Static analysis graph engine.
//! Source files are parsed into per-file syntax graphs, augmented with
//! control flow and declaration metadata, and frozen into a GraphDB.
//! Finding queries run over the db, using the symbolic evaluator to decide
//! whether data reaching a sink is dangerous.

pub mod cfg;
pub mod db;
pub mod graph;
pub mod metadata;
pub mod parsers;
pub mod queries;
pub mod scanner;
pub mod symeval;
pub mod syntax;

pub use db::{build_graph_db, build_graph_db_from_dir, GraphDb, GraphShard};
pub use graph::{Graph, NodeId, NodeKind};
pub use queries::{run_queries, Finding, Method, Vulnerability};
pub use scanner::language_detect::Language;
