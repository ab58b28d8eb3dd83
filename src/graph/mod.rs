mod dependency_graph;
mod dot;

pub use dependency_graph::{DependencyGraph, GraphError};
pub use dot::to_dot;
