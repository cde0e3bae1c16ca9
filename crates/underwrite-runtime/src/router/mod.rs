//! Decision tree routing

mod condition;
#[allow(clippy::module_inception)]
mod router;
mod tree;

pub use router::TreeRouter;
pub use tree::{DecisionTree, NodeId};
