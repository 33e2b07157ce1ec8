//! Search-index projection: one record per edge, shaped
//! after the position-increment/position-length fields a Lucene-style
//! synonym graph filter emits, since a paraphrase lattice is structurally
//! the same thing a search-time synonym graph is.
//!
//! Fields follow spec.md §4.6 exactly: `increment` is the gap between this
//! record's `from_node_id` and the previous record's (the very first record
//! in the stream uses `from_node_id + 1`, the Lucene convention of starting
//! position tracking at -1), `length` is `to_node_id - from_node_id`, and
//! `offset_start`/`offset_end` locate the edge back in the original input
//! via the trunk span of its endpoints. Records are ordered by
//! `(from_node_id, to_node_id, label)`, matching `lattice::serialize`'s
//! wire ordering of the same edges.

use super::graph::{Lattice, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndexRecord {
    pub text: Vec<u8>,
    pub increment: u32,
    pub length: u32,
    pub offset_start: u32,
    pub offset_end: u32,
}

/// One record per edge, ordered by `(from_node_id, to_node_id, label)`.
pub fn dump(lattice: &Lattice) -> Vec<SearchIndexRecord> {
    let mut out = Vec::with_capacity(lattice.required_capacity());
    let mut previous_from: Option<u32> = None;
    for i in 0..lattice.size() {
        let from = NodeId(i as u32);
        let (from_l, _) = lattice.span(from);

        let mut edges: Vec<_> = lattice.edges(from).iter().collect();
        edges.sort_by(|a, b| {
            (a.to.0, lattice.label_bytes(a.label)).cmp(&(b.to.0, lattice.label_bytes(b.label)))
        });

        for edge in edges {
            let (_, to_r) = lattice.span(edge.to);
            let increment = match previous_from {
                Some(prev) => from.0 - prev,
                None => from.0 + 1,
            };
            previous_from = Some(from.0);
            out.push(SearchIndexRecord {
                text: lattice.label_bytes(edge.label).to_vec(),
                increment,
                length: edge.to.0 - from.0,
                offset_start: from_l.0,
                offset_end: to_r.0,
            });
        }
    }
    out
}
