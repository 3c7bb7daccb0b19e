//! Control-flow augmentation of shard graphs.

pub mod augmenter;

pub use augmenter::add_control_flow_edges;
