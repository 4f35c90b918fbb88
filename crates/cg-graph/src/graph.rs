//! The call graph: a plain adjacency-list structure keyed by FQN.
//!
//! This intentionally uses `HashMap`s rather than an arena graph. The
//! invariants the rest of the engine relies on — `callSites[caller]` entries
//! with `resolved = true` always have a matching `edges`/`reverseEdges`
//! pair, duplicate edges only for genuinely repeated call sites — are much
//! easier to keep straight against plain maps than against a graph library's
//! node/edge index split, and nothing downstream needs graph-algorithm
//! primitives (shortest path, SCC, etc.) that would justify the heavier
//! machinery.

use std::collections::HashMap;

use crate::types::{CallSite, CallerSite, FunctionNode};

/// `functions: fqn → function node`, `edges: callerFQN → [calleeFQN]`,
/// `reverseEdges: calleeFQN → [callerFQN]`, `callSites: callerFQN → [CallSite]`,
/// `reverseCallSites: calleeFQN → [CallerSite]` (the same resolved calls as
/// `callSites`, indexed from the other end so a caller's location travels
/// with it).
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    functions: HashMap<String, FunctionNode>,
    edges: HashMap<String, Vec<String>>,
    reverse_edges: HashMap<String, Vec<String>>,
    call_sites: HashMap<String, Vec<CallSite>>,
    reverse_call_sites: HashMap<String, Vec<CallerSite>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function node, inserting it if not already present.
    /// Re-registering the same FQN is a no-op (first declaration wins).
    pub fn add_function(&mut self, node: FunctionNode) {
        self.functions.entry(node.fqn.clone()).or_insert(node);
    }

    /// Record a call site under `caller_fqn`. If the site is `resolved`,
    /// also add the implied edge (and its reverse mirror); unresolved sites
    /// never fabricate an edge.
    pub fn add_call_site(&mut self, caller_fqn: &str, site: CallSite) {
        if site.resolved {
            self.add_edge(caller_fqn, &site.target_fqn);
            self.reverse_call_sites
                .entry(site.target_fqn.clone())
                .or_default()
                .push(CallerSite {
                    caller_fqn: caller_fqn.to_string(),
                    location: site.location.clone(),
                });
        }
        self.call_sites
            .entry(caller_fqn.to_string())
            .or_default()
            .push(site);
    }

    /// Add an edge directly. Duplicate edges between the same pair are
    /// permitted (they represent genuinely distinct call sites) and are not
    /// deduplicated here.
    pub fn add_edge(&mut self, caller_fqn: &str, callee_fqn: &str) {
        self.edges
            .entry(caller_fqn.to_string())
            .or_default()
            .push(callee_fqn.to_string());
        self.reverse_edges
            .entry(callee_fqn.to_string())
            .or_default()
            .push(caller_fqn.to_string());
    }

    pub fn function(&self, fqn: &str) -> Option<&FunctionNode> {
        self.functions.get(fqn)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.functions.values()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Number of recorded call sites that never resolved to a callee —
    /// Pattern 4 of call resolution, kept visible rather than silently
    /// dropped.
    pub fn unresolved_call_site_count(&self) -> usize {
        self.call_sites
            .values()
            .flatten()
            .filter(|site| !site.resolved)
            .count()
    }

    /// FQNs called by `fqn`, in emission order. Duplicates reflect distinct
    /// call sites to the same callee.
    pub fn callees(&self, fqn: &str) -> &[String] {
        self.edges.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// FQNs that call `fqn`.
    pub fn callers(&self, fqn: &str) -> &[String] {
        self.reverse_edges.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Callers of `fqn` along with the call-site location of each call,
    /// the reverse-direction counterpart to `call_sites`.
    pub fn caller_sites(&self, fqn: &str) -> &[CallerSite] {
        self.reverse_call_sites.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn call_sites(&self, caller_fqn: &str) -> &[CallSite] {
        self.call_sites
            .get(caller_fqn)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find every FQN whose final path segment (after the last `.`) equals
    /// `short_name`. Used by the query server to resolve a bare function
    /// name to its set of candidate FQNs.
    pub fn find_by_short_name(&self, short_name: &str) -> Vec<&str> {
        self.functions
            .keys()
            .filter(|fqn| fqn.rsplit('.').next() == Some(short_name))
            .map(String::as_str)
            .collect()
    }

    /// Look up a single call site between `caller_fqn` and a callee whose
    /// short target name is `target_name`.
    pub fn call_detail(&self, caller_fqn: &str, target_name: &str) -> Option<&CallSite> {
        self.call_sites(caller_fqn)
            .iter()
            .find(|site| site.target_name == target_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceLocation;
    use pretty_assertions::assert_eq;

    fn loc() -> SourceLocation {
        SourceLocation::new("main.go", 10, 2)
    }

    #[test]
    fn edges_and_reverse_edges_stay_mirrored() {
        let mut graph = CallGraph::new();
        graph.add_function(FunctionNode::new("main.main", "main", "main"));
        graph.add_function(FunctionNode::new("net/http.Get", "Get", "net/http"));
        graph.add_call_site(
            "main.main",
            CallSite::resolved("Get", "net/http.Get", loc(), true),
        );

        assert_eq!(graph.callees("main.main"), &["net/http.Get".to_string()]);
        assert_eq!(graph.callers("net/http.Get"), &["main.main".to_string()]);

        let caller_sites = graph.caller_sites("net/http.Get");
        assert_eq!(caller_sites.len(), 1);
        assert_eq!(caller_sites[0].caller_fqn, "main.main");
        assert_eq!(caller_sites[0].location, loc());
    }

    #[test]
    fn unresolved_call_site_emits_no_edge() {
        let mut graph = CallGraph::new();
        graph.add_call_site("main.main", CallSite::unresolved("obj.DoThing", loc()));

        assert!(graph.callees("main.main").is_empty());
        assert_eq!(graph.call_sites("main.main").len(), 1);
        assert!(!graph.call_sites("main.main")[0].resolved);
        assert!(graph.caller_sites("obj.DoThing").is_empty());
    }

    #[test]
    fn duplicate_call_sites_to_same_callee_produce_duplicate_edges() {
        let mut graph = CallGraph::new();
        graph.add_call_site(
            "main.main",
            CallSite::resolved("Get", "net/http.Get", loc(), true),
        );
        graph.add_call_site(
            "main.main",
            CallSite::resolved("Get", "net/http.Get", loc(), true),
        );

        assert_eq!(graph.callees("main.main").len(), 2);
        assert_eq!(graph.call_sites("main.main").len(), 2);
    }

    #[test]
    fn unresolved_call_site_count_ignores_resolved_sites() {
        let mut graph = CallGraph::new();
        graph.add_call_site(
            "main.main",
            CallSite::resolved("Get", "net/http.Get", loc(), true),
        );
        graph.add_call_site("main.main", CallSite::unresolved("obj.DoThing", loc()));
        graph.add_call_site("main.main", CallSite::unresolved("other.Thing", loc()));

        assert_eq!(graph.unresolved_call_site_count(), 2);
    }

    #[test]
    fn find_by_short_name_matches_last_segment() {
        let mut graph = CallGraph::new();
        graph.add_function(FunctionNode::new(
            "pkg.User.Save",
            "Save",
            "pkg",
        ).with_receiver("User"));

        let matches = graph.find_by_short_name("Save");
        assert_eq!(matches, vec!["pkg.User.Save"]);
    }
}
