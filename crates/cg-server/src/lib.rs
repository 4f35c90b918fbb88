//! Query Server (C6): a JSON-RPC tool-call endpoint over a built call
//! graph, exposing `get_callees`, `get_callers`, and `get_call_details`.

pub mod dispatcher;
pub mod protocol;
pub mod tools;

pub use dispatcher::Dispatcher;
pub use protocol::{ContentItem, RpcError, RpcRequest, RpcResponse, ToolCallParams, ToolResult};
