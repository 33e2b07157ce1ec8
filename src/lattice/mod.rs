//! The paraphrase lattice itself: construction, trunk
//! queries, binary serialization, DOT export and search-index projection.

pub mod builder;
pub mod dot;
pub mod graph;
pub mod search_index;
pub mod serialize;
pub mod trunk;
mod varint;

pub use builder::{build, DEFAULT_MAX_DEPTH};
pub use graph::{Edge, Lattice, NodeId};
pub use search_index::SearchIndexRecord;
pub use trunk::{get_trunk_span, get_trunk_span_range, trunk_span_of, trunk_spans, PathStep};
