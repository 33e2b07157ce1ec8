//! Multigraph Knuth-Morris-Pratt search: find every
//! contiguous-by-label walk through a lattice that spells a given token
//! pattern.
//!
//! Built the same way KMP always is — a failure table over the pattern,
//! walked via automaton-state transitions — generalized from a string to
//! a DAG by running the automaton along every outgoing edge instead of
//! along a single next character. A `(NodeId, state)` memo caches the set
//! of match-completions reachable from a state so that nodes shared by
//! many paraphrase paths are only explored once, no matter how many
//! different walks lead into them.
//!
//! Matching stops at the first full match along a given walk — this finds
//! every occurrence that starts at a distinct point in the lattice, but
//! (unlike single-string KMP) does not continue past a match to look for
//! a second, overlapping occurrence within the same walk.

use std::collections::{HashMap, HashSet};

use crate::error::{ParattiError, ParattiResult};
use crate::lattice::{Lattice, NodeId};

/// A single match: the nodes visited (inclusive of both ends) and the
/// edge labels consumed along the way, one shorter than `nodes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmpMatch {
    pub nodes: Vec<NodeId>,
    pub edge_labels: Vec<Vec<u8>>,
}

pub struct LatticeKmp {
    pattern: Vec<Box<[u8]>>,
    failure: Vec<usize>,
}

impl LatticeKmp {
    /// Compile a search for `pattern`, a sequence of token byte strings.
    pub fn new(pattern: Vec<Vec<u8>>) -> ParattiResult<Self> {
        if pattern.is_empty() {
            return Err(ParattiError::InputError(
                "kmp pattern must contain at least one token".to_string(),
            ));
        }
        let pattern: Vec<Box<[u8]>> = pattern.into_iter().map(Vec::into_boxed_slice).collect();
        let failure = build_failure(&pattern);
        Ok(Self { pattern, failure })
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Every walk in `lattice` whose edge labels spell `self.pattern`,
    /// scanning every node as a possible starting point. Matches are
    /// returned in discovery order (by starting node id, then DFS order)
    /// — callers that need a different order (e.g. by offset) sort
    /// themselves.
    pub fn search(&self, lattice: &Lattice) -> Vec<KmpMatch> {
        let mut memo: HashMap<(NodeId, usize), Vec<Vec<NodeId>>> = HashMap::new();
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        let window = self.pattern.len() + 1;

        for i in 0..lattice.size() {
            let start = NodeId(i as u32);
            for mut path in self.completions(lattice, start, 0, &mut memo) {
                // `completions` walks from `start` at state 0 and may pass
                // through several nodes before the automaton ever advances
                // past 0 (or, after a KMP failure fallback, may retain a
                // longer prefix than the match window needs) — only the
                // trailing `window` nodes actually spell the pattern.
                if path.len() < window {
                    continue;
                }
                if path.len() > window {
                    path = path.split_off(path.len() - window);
                }
                if !seen.insert(path.clone()) {
                    continue;
                }
                let edge_labels = path
                    .windows(2)
                    .map(|pair| {
                        let (u, v) = (pair[0], pair[1]);
                        let edge = lattice
                            .edges(u)
                            .iter()
                            .find(|e| e.to == v)
                            .expect("path must follow real edges");
                        lattice.label_bytes(edge.label).to_vec()
                    })
                    .collect();
                results.push(KmpMatch {
                    nodes: path,
                    edge_labels,
                });
            }
        }
        results
    }

    /// All node-paths, starting at `node` inclusive, that complete a match
    /// given the automaton is already in state `state` on arrival at
    /// `node`. Cached per `(node, state)` since the set of completions
    /// depends only on those two values, never on how the walk got there.
    fn completions(
        &self,
        lattice: &Lattice,
        node: NodeId,
        state: usize,
        memo: &mut HashMap<(NodeId, usize), Vec<Vec<NodeId>>>,
    ) -> Vec<Vec<NodeId>> {
        if let Some(cached) = memo.get(&(node, state)) {
            return cached.clone();
        }
        // Insert a placeholder first: this lattice is acyclic, so no
        // (node, state) pair can recurse into itself, but guarding here
        // keeps the function safe even if that ever stops being true.
        memo.insert((node, state), Vec::new());

        let out = if state == self.pattern.len() {
            vec![vec![node]]
        } else {
            let mut out = Vec::new();
            for edge in lattice.edges(node) {
                let label = lattice.label_bytes(edge.label);
                let next_state = advance(&self.pattern, &self.failure, state, label);
                for suffix in self.completions(lattice, edge.to, next_state, memo) {
                    let mut path = Vec::with_capacity(suffix.len() + 1);
                    path.push(node);
                    path.extend(suffix);
                    out.push(path);
                }
            }
            out
        };

        memo.insert((node, state), out.clone());
        out
    }
}

fn advance(pattern: &[Box<[u8]>], failure: &[usize], mut state: usize, label: &[u8]) -> usize {
    loop {
        if &*pattern[state] == label {
            return state + 1;
        }
        if state == 0 {
            return 0;
        }
        state = failure[state - 1];
    }
}

fn build_failure(pattern: &[Box<[u8]>]) -> Vec<usize> {
    let n = pattern.len();
    let mut failure = vec![0usize; n];
    let mut k = 0usize;
    for i in 1..n {
        while k > 0 && pattern[k] != pattern[i] {
            k = failure[k - 1];
        }
        if pattern[k] == pattern[i] {
            k += 1;
        }
        failure[i] = k;
    }
    failure
}
