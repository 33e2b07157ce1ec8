use std::collections::HashSet;

use crate::dict::{TokenId, TokenTable};
use crate::error::{ParattiError, ParattiResult};

/// A node identifier. Ids are dense and topologically ordered after
/// construction or decoding: `NodeId(0)` is always the source and
/// `NodeId(size - 1)` is always the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One outgoing arc. `label` is a token owned by the lattice's own
/// `TokenTable` — a `Lattice` never borrows from the `PaRattice` that may
/// have built it, so it decodes and re-encodes with nothing but its own
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub to: NodeId,
    pub label: TokenId,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) span: (NodeId, NodeId),
    pub(crate) edges: Vec<Edge>,
}

/// An immutable paraphrase lattice: a directed acyclic multigraph with a
/// single source, a single sink, and a distinguished trunk path spelling the
/// original input.
///
/// Trunk nodes are not tracked separately — a node `v` is on the trunk
/// exactly when its span is `(v, v)`, so the trunk is recovered from the
/// span table alone (`trunk_nodes`). This is also why the wire format
/// (`lattice::serialize`) never stores a trunk list: the span column already
/// carries the information.
pub struct Lattice {
    pub(crate) tokens: TokenTable,
    pub(crate) nodes: Vec<NodeData>,
}

impl Lattice {
    pub(crate) fn from_parts(tokens: TokenTable, nodes: Vec<NodeData>) -> Self {
        Self { tokens, nodes }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn source(&self) -> NodeId {
        NodeId(0)
    }

    pub fn sink(&self) -> NodeId {
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub fn edges(&self, node: NodeId) -> &[Edge] {
        &self.nodes[node.index()].edges
    }

    pub fn span(&self, node: NodeId) -> (NodeId, NodeId) {
        self.nodes[node.index()].span
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    pub fn label_bytes(&self, label: TokenId) -> &[u8] {
        self.tokens.bytes(label)
    }

    /// The total number of edges in the lattice — the capacity a caller must
    /// provide to `lattice::search_index::dump` or the KMP match buffers.
    pub fn required_capacity(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Nodes whose span is `(v, v)` — the trunk, in increasing id order,
    /// which is also trunk order since trunk ids strictly increase.
    pub fn trunk_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.span.0.index() == *i && n.span.1.index() == *i)
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Re-derive the original input by walking the trunk's edge labels.
    pub fn trunk_spelling(&self) -> Vec<&[u8]> {
        let trunk = self.trunk_nodes();
        let mut out = Vec::with_capacity(trunk.len().saturating_sub(1));
        for pair in trunk.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let edge = self.nodes[from.index()]
                .edges
                .iter()
                .find(|e| e.to == to)
                .expect("consecutive trunk nodes must be joined by a trunk edge");
            out.push(self.label_bytes(edge.label));
        }
        out
    }

    /// Validate the six structural invariants of §3. Called after
    /// construction (defensively, in debug-heavy test builds) and always
    /// after `lattice::serialize::from_bytes` decodes a buffer of unknown
    /// provenance.
    pub fn validate(&self) -> ParattiResult<()> {
        let n = self.nodes.len();
        if n == 0 {
            return Err(ParattiError::DecodeError(
                "lattice has no nodes".to_string(),
            ));
        }

        // Invariant 1 (acyclic) + 6 (no duplicate edges): every edge must
        // point to a strictly greater id, and (to, label) pairs must be
        // unique within a node's adjacency list.
        for (i, node) in self.nodes.iter().enumerate() {
            let mut seen = HashSet::new();
            for edge in &node.edges {
                if edge.to.index() <= i {
                    return Err(ParattiError::DecodeError(format!(
                        "edge {} -> {} does not increase node id",
                        i, edge.to.0
                    )));
                }
                if !seen.insert((edge.to, edge.label)) {
                    return Err(ParattiError::DecodeError(format!(
                        "duplicate edge {} -> {} with the same label",
                        i, edge.to.0
                    )));
                }
            }
        }

        // Invariant 2 & 3: single source (id 0) reaching every node, single
        // sink (id n-1) reachable from every node.
        let mut reach_fwd = vec![false; n];
        reach_fwd[0] = true;
        for i in 0..n {
            if reach_fwd[i] {
                for edge in &self.nodes[i].edges {
                    reach_fwd[edge.to.index()] = true;
                }
            }
        }
        if reach_fwd.iter().any(|&r| !r) {
            return Err(ParattiError::DecodeError(
                "some node is not reachable from the source".to_string(),
            ));
        }

        let mut reach_bwd = vec![false; n];
        reach_bwd[n - 1] = true;
        for i in (0..n).rev() {
            for edge in &self.nodes[i].edges {
                if reach_bwd[edge.to.index()] {
                    reach_bwd[i] = true;
                }
            }
        }
        if reach_bwd.iter().any(|&r| !r) {
            return Err(ParattiError::DecodeError(
                "some node cannot reach the sink".to_string(),
            ));
        }

        // Invariant 5: trunk spans are non-decreasing along every edge.
        // `span.l`/`span.r` only need to widen monotonically in general —
        // an interior node of a multi-token paraphrase chain inherits the
        // *same* bracket as every other node on that chain (builder.rs's
        // `task.bracket`), so `r_u > l_v` is expected and fine there. The
        // stricter `r_u ≤ l_v` ("this edge has fully left its expansion and
        // landed back on the trunk") only applies when `v` is itself a
        // trunk node.
        for (i, node) in self.nodes.iter().enumerate() {
            let (l_u, r_u) = node.span;
            for edge in &node.edges {
                let v = edge.to;
                let (l_v, r_v) = self.nodes[v.index()].span;
                let v_is_trunk = l_v == v && r_v == v;
                if l_u.0 > l_v.0 || r_u.0 > r_v.0 || (v_is_trunk && r_u.0 > l_v.0) {
                    return Err(ParattiError::DecodeError(format!(
                        "span ({}, {}) at node {} does not precede span ({}, {}) at node {}",
                        l_u.0, r_u.0, i, l_v.0, r_v.0, edge.to.0
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Lattice {
        // 0 --a--> 1 --b--> 2, plus a branch 0 --ab--> 2
        let mut tokens = TokenTable::new();
        let a = tokens.intern(b"a");
        let b = tokens.intern(b"b");
        let ab = tokens.intern(b"ab");
        let nodes = vec![
            NodeData {
                span: (NodeId(0), NodeId(0)),
                edges: vec![
                    Edge { to: NodeId(1), label: a },
                    Edge { to: NodeId(2), label: ab },
                ],
            },
            NodeData {
                span: (NodeId(0), NodeId(1)),
                edges: vec![Edge { to: NodeId(2), label: b }],
            },
            NodeData {
                span: (NodeId(2), NodeId(2)),
                edges: vec![],
            },
        ];
        Lattice::from_parts(tokens, nodes)
    }

    #[test]
    fn validates_clean_lattice() {
        assert!(toy().validate().is_ok());
    }

    #[test]
    fn trunk_nodes_are_the_span_diagonal() {
        let lat = toy();
        assert_eq!(lat.trunk_nodes(), vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn rejects_backward_edge() {
        let mut tokens = TokenTable::new();
        let a = tokens.intern(b"a");
        let nodes = vec![
            NodeData {
                span: (NodeId(0), NodeId(0)),
                edges: vec![Edge { to: NodeId(1), label: a }],
            },
            NodeData {
                span: (NodeId(0), NodeId(1)),
                edges: vec![Edge { to: NodeId(0), label: a }],
            },
        ];
        let lat = Lattice::from_parts(tokens, nodes);
        assert!(lat.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_edge() {
        let mut tokens = TokenTable::new();
        let a = tokens.intern(b"a");
        let nodes = vec![
            NodeData {
                span: (NodeId(0), NodeId(0)),
                edges: vec![
                    Edge { to: NodeId(1), label: a },
                    Edge { to: NodeId(1), label: a },
                ],
            },
            NodeData {
                span: (NodeId(0), NodeId(0)),
                edges: vec![],
            },
        ];
        let lat = Lattice::from_parts(tokens, nodes);
        assert!(lat.validate().is_err());
    }

    #[test]
    fn rejects_unreachable_node() {
        let mut tokens = TokenTable::new();
        let a = tokens.intern(b"a");
        let nodes = vec![
            NodeData {
                span: (NodeId(0), NodeId(0)),
                edges: vec![Edge { to: NodeId(2), label: a }],
            },
            NodeData {
                span: (NodeId(0), NodeId(0)),
                edges: vec![],
            },
            NodeData {
                span: (NodeId(2), NodeId(2)),
                edges: vec![],
            },
        ];
        let lat = Lattice::from_parts(tokens, nodes);
        assert!(lat.validate().is_err());
    }
}
