use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::graph::SymbolGraph;
use crate::types::SourceUnit;

/// Weight added to a unit owning a declaration reached by forward tracing.
pub const FOCUS_MATCH_BONUS: i64 = 1000;

/// Weight added to a unit owning a caller of a visited declaration.
pub const CALLER_BONUS: i64 = 500;

/// Propagates relevance weight from a focus symbol across the call graph.
///
/// Weights only ever increase; the tracer runs single-threaded after the
/// graph is complete, so no synchronization is needed.
pub struct FocusTracer<'a> {
    graph: &'a SymbolGraph,
}

impl<'a> FocusTracer<'a> {
    pub fn new(graph: &'a SymbolGraph) -> Self {
        Self { graph }
    }

    /// Traces from `focus` with hop bound `depth`, adding weight in place to
    /// the units owning matched declarations. An empty focus is a no-op.
    ///
    /// Forward pass: bounded breadth-first propagation over rounds 0..=depth.
    /// Each frontier name is matched against the declaration index; a match
    /// not seen before is marked visited, its owning unit gains
    /// [`FOCUS_MATCH_BONUS`], and its callees feed the next round. The
    /// visited set is the only cycle guard.
    ///
    /// Backward pass: one unbounded sweep over the whole call graph. Every
    /// (caller, callee) pair whose callee is a visited declaration key adds
    /// [`CALLER_BONUS`] to the caller's unit — once per pair, so a caller of
    /// N visited callees accumulates N bonuses regardless of hop distance.
    pub fn trace(&self, focus: &str, depth: u32, units: &mut [SourceUnit]) {
        if focus.is_empty() {
            return;
        }

        // Owned keys: the index outlives the weight mutations below.
        let mut unit_index: HashMap<String, usize> = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            unit_index.insert(unit.path.clone(), i);
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: Vec<String> = vec![focus.to_string()];

        for round in 0..=depth {
            if frontier.is_empty() {
                break;
            }
            let mut next: Vec<String> = Vec::new();
            for candidate in &frontier {
                for key in self.graph.matching_keys(candidate) {
                    if !visited.insert(key.to_string()) {
                        continue;
                    }
                    if let Some(decl) = self.graph.declaration(key) {
                        if let Some(&i) = unit_index.get(&decl.path) {
                            units[i].weight += FOCUS_MATCH_BONUS;
                        }
                    }
                    if let Some(callees) = self.graph.callees(key) {
                        next.extend(callees.iter().cloned());
                    }
                }
            }
            debug!(round, matched = visited.len(), frontier = next.len(), "trace round");
            frontier = next;
        }

        for (caller, callees) in self.graph.calls() {
            for callee in callees {
                if !visited.contains(callee) {
                    continue;
                }
                if let Some(decl) = self.graph.declaration(caller) {
                    if let Some(&i) = unit_index.get(&decl.path) {
                        units[i].weight += CALLER_BONUS;
                    }
                }
            }
        }
    }
}
