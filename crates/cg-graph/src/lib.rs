//! Call graph data model shared by the extraction pipeline and the query
//! server.

pub mod graph;
pub mod types;

pub use graph::CallGraph;
pub use types::{CallSite, CallerSite, FunctionNode, SourceLocation};
