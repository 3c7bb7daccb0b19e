//! Syntax step translation: CFG path nodes to a flat, evaluable sequence.

pub mod lowering;
pub mod readers;
pub mod steps;
pub mod value;

pub use lowering::{lower, lower_node, Lowerer, Lowering};
pub use steps::{type_base, StepKind, StepMeta, SyntaxStep};
pub use value::{Slot, Value};
