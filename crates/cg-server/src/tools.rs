//! Tool handlers backing the three query operations the server exposes:
//! `get_callees`, `get_callers`, `get_call_details`.

use cg_foundation::error::error_codes;
use cg_graph::{CallGraph, SourceLocation};
use cg_stdlib::StdlibLoader;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::RpcError;

/// Resolve a user-supplied function reference to a single FQN. An exact
/// FQN match wins outright; otherwise the name is treated as a short name
/// and matched against every function's trailing segment. Zero matches is
/// `NotFound`; more than one is `Ambiguous`, with every candidate FQN
/// surfaced so the caller can disambiguate.
/// JSON-RPC reserves -32000..-32099 for implementation-defined server
/// errors; these two occupy that range. The engine's own `E10xx` codes
/// travel alongside in `error.data.errorCode` for callers that key off
/// them rather than the JSON-RPC numeric code.
const JSONRPC_NOT_FOUND: i32 = -32001;
const JSONRPC_AMBIGUOUS: i32 = -32002;

fn resolve_function(graph: &CallGraph, name: &str) -> Result<String, RpcError> {
    if graph.function(name).is_some() {
        return Ok(name.to_string());
    }

    let mut matches = graph.find_by_short_name(name);
    match matches.len() {
        0 => Err(RpcError::new(JSONRPC_NOT_FOUND, format!("no function matches '{name}'"))
            .with_data(serde_json::json!({ "errorCode": error_codes::E1002_NOT_FOUND }))),
        1 => Ok(matches.remove(0).to_string()),
        _ => Err(RpcError::new(
            JSONRPC_AMBIGUOUS,
            format!("'{name}' matches {} functions", matches.len()),
        )
        .with_data(serde_json::json!({
            "errorCode": error_codes::E1003_AMBIGUOUS,
            "candidates": matches,
        }))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCalleesParams {
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCallersParams {
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCallDetailsParams {
    pub caller: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StdlibInfo {
    package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    returns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallEdgeInfo {
    name: String,
    fqn: String,
    location: SourceLocation,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_stdlib: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdlib_info: Option<StdlibInfo>,
}

fn stdlib_info_for(fqn: &str, stdlib: Option<&StdlibLoader>) -> Option<StdlibInfo> {
    let loader = stdlib?;
    let (package_path, name) = fqn.rsplit_once('.')?;
    let function = loader.get_function(package_path, name)?;
    Some(StdlibInfo {
        package: package_path.to_string(),
        signature: Some(function.signature.clone()).filter(|s| !s.is_empty()),
        returns: function
            .returns
            .iter()
            .map(|r| r.type_name.clone())
            .filter(|t| !t.is_empty())
            .collect(),
    })
}

pub fn get_callees(graph: &CallGraph, stdlib: Option<&StdlibLoader>, params: &GetCalleesParams) -> Result<Value, RpcError> {
    let fqn = resolve_function(graph, &params.function)?;

    let callees = graph
        .call_sites(&fqn)
        .iter()
        .filter(|site| site.resolved)
        .map(|site| CallEdgeInfo {
            name: site.target_name.clone(),
            fqn: site.target_fqn.clone(),
            location: site.location.clone(),
            is_stdlib: site.is_stdlib,
            stdlib_info: site.is_stdlib.then(|| stdlib_info_for(&site.target_fqn, stdlib)).flatten(),
        })
        .collect::<Vec<_>>();

    Ok(serde_json::json!({ "function": fqn, "callees": callees }))
}

pub fn get_callers(graph: &CallGraph, params: &GetCallersParams) -> Result<Value, RpcError> {
    let fqn = resolve_function(graph, &params.function)?;

    let callers = graph
        .caller_sites(&fqn)
        .iter()
        .map(|caller| CallEdgeInfo {
            name: caller.caller_fqn.rsplit('.').next().unwrap_or(&caller.caller_fqn).to_string(),
            fqn: caller.caller_fqn.clone(),
            location: caller.location.clone(),
            is_stdlib: false,
            stdlib_info: None,
        })
        .collect::<Vec<_>>();

    Ok(serde_json::json!({ "function": fqn, "callers": callers }))
}

pub fn get_call_details(
    graph: &CallGraph,
    stdlib: Option<&StdlibLoader>,
    params: &GetCallDetailsParams,
) -> Result<Value, RpcError> {
    let caller_fqn = resolve_function(graph, &params.caller)?;

    let site = graph.call_detail(&caller_fqn, &params.target).ok_or_else(|| {
        RpcError::new(
            JSONRPC_NOT_FOUND,
            format!("no call from '{caller_fqn}' to '{}'", params.target),
        )
        .with_data(serde_json::json!({ "errorCode": error_codes::E1002_NOT_FOUND }))
    })?;

    let stdlib_info = (site.resolved && site.is_stdlib)
        .then(|| stdlib_info_for(&site.target_fqn, stdlib))
        .flatten();

    Ok(serde_json::json!({
        "caller": caller_fqn,
        "targetName": site.target_name,
        "targetFqn": site.target_fqn,
        "resolved": site.resolved,
        "isStdlib": site.is_stdlib,
        "location": {
            "file": site.location.file,
            "line": site.location.line,
            "column": site.location.column,
        },
        "stdlibInfo": stdlib_info,
    }))
}
