//! Trunk-span queries.
//!
//! Every node's `(l, r)` bracket is computed once, when the node is created
//! (`lattice::builder`) or read back (`lattice::serialize`), and stored
//! alongside it — there is no separate recomputation pass here. What this
//! module adds is the *path* query: given a walk through the lattice (one
//! concrete choice of paraphrase at each branch), splice the spans of the
//! nodes visited into the single trunk range that walk corresponds to, and
//! rewrite the walk itself into a canonical path over that range (§4.3).

use std::collections::VecDeque;

use crate::error::{ParattiError, ParattiResult};

use super::graph::{Lattice, NodeId};

/// One step of a path through the lattice: the label of the edge taken to
/// reach `node` (empty for the first step of a path, which names only its
/// start node) plus the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub label: Vec<u8>,
    pub node: NodeId,
}

impl PathStep {
    pub fn start(node: NodeId) -> Self {
        PathStep {
            label: Vec::new(),
            node,
        }
    }

    pub fn new(label: impl AsRef<[u8]>, node: NodeId) -> Self {
        PathStep {
            label: label.as_ref().to_vec(),
            node,
        }
    }
}

/// The stored trunk bracket of a single node — a thin, named wrapper around
/// `Lattice::span` so call sites read the same way the FFI surface
/// (`lattice_get_trunk_spans`) does.
pub fn trunk_span_of(lattice: &Lattice, node: NodeId) -> (NodeId, NodeId) {
    lattice.span(node)
}

/// The trunk bracket of every node, indexed by node id.
pub fn trunk_spans(lattice: &Lattice) -> Vec<(NodeId, NodeId)> {
    (0..lattice.size())
        .map(|i| lattice.span(NodeId(i as u32)))
        .collect()
}

fn is_trunk(lattice: &Lattice, node: NodeId) -> bool {
    let (l, r) = lattice.span(node);
    l == node && r == node
}

/// Shortest path from `from` to `to` over forward edges, returned as the
/// steps taken (excluding `from` itself, which the caller already has).
/// Ties among equal-length paths are broken by each node's edge insertion
/// order, giving a deterministic result — BFS visits a node's edges in the
/// order `lattice::builder::renumber` laid them out, so the first path
/// found to any given node is always the same one.
fn shortest_path(lattice: &Lattice, from: NodeId, to: NodeId) -> ParattiResult<Vec<PathStep>> {
    if from == to {
        return Ok(Vec::new());
    }
    let n = lattice.size();
    let mut visited = vec![false; n];
    let mut parent: Vec<Option<(NodeId, &[u8])>> = vec![None; n];
    visited[from.index()] = true;
    let mut queue = VecDeque::new();
    queue.push_back(from);
    'bfs: while let Some(u) = queue.pop_front() {
        for edge in lattice.edges(u) {
            let v = edge.to;
            if visited[v.index()] {
                continue;
            }
            visited[v.index()] = true;
            parent[v.index()] = Some((u, lattice.label_bytes(edge.label)));
            if v == to {
                break 'bfs;
            }
            queue.push_back(v);
        }
    }
    if !visited[to.index()] {
        return Err(ParattiError::InputError(format!(
            "no path from node {} to node {} in lattice",
            from.0, to.0
        )));
    }

    let mut steps = Vec::new();
    let mut cur = to;
    while cur != from {
        let (prev, label) = parent[cur.index()].expect("reachable node has a parent");
        steps.push(PathStep::new(label.to_vec(), cur));
        cur = prev;
    }
    steps.reverse();
    Ok(steps)
}

/// Splice the spans of every node on `path` into the trunk range the whole
/// walk covers: `(trunk_span(path[0].node).l, trunk_span(path.last().node).r)`.
pub fn get_trunk_span_range(
    lattice: &Lattice,
    path: &[PathStep],
) -> ParattiResult<(NodeId, NodeId)> {
    let nodes: Vec<NodeId> = validate_path(lattice, path)?;
    let mut l = u32::MAX;
    let mut r = 0u32;
    for node in &nodes {
        let (sl, sr) = lattice.span(*node);
        l = l.min(sl.0);
        r = r.max(sr.0);
    }
    Ok((NodeId(l), NodeId(r)))
}

fn validate_path(lattice: &Lattice, path: &[PathStep]) -> ParattiResult<Vec<NodeId>> {
    if path.is_empty() {
        return Err(ParattiError::InputError(
            "path must contain at least one step".to_string(),
        ));
    }
    for step in path {
        if step.node.index() >= lattice.size() {
            return Err(ParattiError::InputError(format!(
                "node {} is out of range",
                step.node.0
            )));
        }
    }
    for pair in path.windows(2) {
        let (from, to) = (pair[0].node, pair[1].node);
        let found = lattice
            .edges(from)
            .iter()
            .any(|e| e.to == to && lattice.label_bytes(e.label) == pair[1].label.as_slice());
        if !found {
            return Err(ParattiError::InputError(format!(
                "no edge {} -> {} labelled {:?} in path",
                from.0, to.0, pair[1].label
            )));
        }
    }
    Ok(path.iter().map(|s| s.node).collect())
}

/// The trunk-projected canonical path connecting the outermost trunk nodes
/// `path` touches (§4.3). `path` is a connected walk — `path[0]` names only
/// its start node (empty label); every subsequent step's label must match a
/// real edge from the previous step's node.
///
/// The result starts at `trunk_span(path[0].node).l` and ends at
/// `trunk_span(path.last().node).r`, both trunk nodes. Stretches of `path`
/// that cross a non-trunk node are preserved verbatim in the output;
/// anywhere else — including the hop from a trunk endpoint down into a
/// branch node the path touches, when that node is only reachable through
/// other branches — is filled in with whatever path the lattice actually
/// offers there, via `shortest_path`.
pub fn get_trunk_span(lattice: &Lattice, path: &[PathStep]) -> ParattiResult<Vec<PathStep>> {
    let nodes = validate_path(lattice, path)?;
    let l = lattice.span(nodes[0]).0;
    let r = lattice.span(*nodes.last().unwrap()).1;

    // Chunks: maximal runs of path edges where at least one endpoint is not
    // a trunk node. A trunk-to-trunk edge is trivially recomputable by a
    // fill, so it is dropped rather than preserved.
    struct Chunk {
        start_idx: usize,
        end_idx: usize,
    }
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut i = 0;
    while i + 1 < nodes.len() {
        let trunk_edge = is_trunk(lattice, nodes[i]) && is_trunk(lattice, nodes[i + 1]);
        if trunk_edge {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < nodes.len() && !(is_trunk(lattice, nodes[i]) && is_trunk(lattice, nodes[i + 1]))
        {
            i += 1;
        }
        chunks.push(Chunk {
            start_idx: start,
            end_idx: i,
        });
    }

    let mut out = vec![PathStep::start(NodeId(l.0))];
    let mut cur = NodeId(l.0);
    for chunk in &chunks {
        let chunk_start = nodes[chunk.start_idx];
        if cur != chunk_start {
            out.extend(shortest_path(lattice, cur, chunk_start)?);
        }
        for idx in chunk.start_idx + 1..=chunk.end_idx {
            out.push(path[idx].clone());
        }
        cur = nodes[chunk.end_idx];
    }
    let sink_of_range = NodeId(r.0);
    if cur != sink_of_range {
        out.extend(shortest_path(lattice, cur, sink_of_range)?);
    }
    Ok(out)
}
