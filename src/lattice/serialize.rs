//! Deterministic binary encoding.
//!
//! Layout: `b"PRTL"` magic, a version byte, a varint node count, then per
//! node (in id order) a varint span `(l, r)`, a varint out-degree, and per
//! edge — sorted by `(to_node_id, label_bytes)` per spec.md §4.4 — a varint
//! target id plus a varint-prefixed label. A CRC-32 over every preceding
//! byte closes the buffer. There is no separate trunk table — a decoded
//! node is on the trunk exactly when its span is `(v, v)`
//! (`lattice::graph::Lattice::trunk_nodes`), so nothing needs to be stored
//! twice.

use crate::dict::TokenTable;
use crate::error::{ParattiError, ParattiResult};

use super::graph::{Edge, Lattice, NodeData, NodeId};
use super::varint;

const MAGIC: &[u8; 4] = b"PRTL";
const VERSION: u8 = 1;
const CHECKSUM_LEN: usize = 4;

/// Encode `lattice` into the wire format described above.
pub fn to_bytes(lattice: &Lattice) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    varint::write(&mut out, lattice.size() as u64);

    for i in 0..lattice.size() {
        let node = NodeId(i as u32);
        let (l, r) = lattice.span(node);
        varint::write(&mut out, l.0 as u64);
        varint::write(&mut out, r.0 as u64);

        let mut edges: Vec<_> = lattice.edges(node).iter().collect();
        edges.sort_by(|a, b| {
            (a.to.0, lattice.label_bytes(a.label)).cmp(&(b.to.0, lattice.label_bytes(b.label)))
        });
        varint::write(&mut out, edges.len() as u64);
        for edge in edges {
            varint::write(&mut out, edge.to.0 as u64);
            let bytes = lattice.label_bytes(edge.label);
            varint::write(&mut out, bytes.len() as u64);
            out.extend_from_slice(bytes);
        }
    }

    let checksum = crc32fast::hash(&out);
    out.extend_from_slice(&checksum.to_le_bytes());
    out
}

/// The number of bytes `to_bytes` would produce — the capacity a caller
/// must provide before calling it. There is no cheaper way to compute this than encoding, so
/// this simply does that and reports the length.
pub fn encoded_size(lattice: &Lattice) -> usize {
    to_bytes(lattice).len()
}

/// Decode a buffer produced by `to_bytes`, re-validating every structural
/// invariant (§3) before returning it — the buffer may have come from
/// anywhere, including a mismatched version of this crate.
pub fn from_bytes(buf: &[u8]) -> ParattiResult<Lattice> {
    if buf.len() < MAGIC.len() + 1 + CHECKSUM_LEN {
        return Err(ParattiError::DecodeError(
            "buffer too short to be a lattice".to_string(),
        ));
    }
    if &buf[..MAGIC.len()] != MAGIC {
        return Err(ParattiError::DecodeError(
            "bad magic bytes".to_string(),
        ));
    }
    let mut pos = MAGIC.len();
    let version = buf[pos];
    pos += 1;
    if version != VERSION {
        return Err(ParattiError::DecodeError(format!(
            "unsupported format version {version}"
        )));
    }

    let body_end = buf.len() - CHECKSUM_LEN;
    let expected = u32::from_le_bytes(buf[body_end..].try_into().unwrap());
    let actual = crc32fast::hash(&buf[..body_end]);
    if actual != expected {
        return Err(ParattiError::DecodeError(
            "checksum mismatch".to_string(),
        ));
    }

    let node_count = varint::read(buf, &mut pos)? as usize;
    let mut tokens = TokenTable::new();
    let mut nodes = Vec::with_capacity(node_count);

    for _ in 0..node_count {
        let l = varint::read(buf, &mut pos)? as u32;
        let r = varint::read(buf, &mut pos)? as u32;
        let degree = varint::read(buf, &mut pos)? as usize;
        let mut edges = Vec::with_capacity(degree);
        for _ in 0..degree {
            let to = varint::read(buf, &mut pos)? as u32;
            let len = varint::read(buf, &mut pos)? as usize;
            if pos + len > body_end {
                return Err(ParattiError::DecodeError(
                    "edge label runs past the end of the buffer".to_string(),
                ));
            }
            let label = tokens.intern(&buf[pos..pos + len]);
            pos += len;
            edges.push(Edge {
                to: NodeId(to),
                label,
            });
        }
        nodes.push(NodeData {
            span: (NodeId(l), NodeId(r)),
            edges,
        });
    }

    if pos != body_end {
        return Err(ParattiError::DecodeError(
            "trailing bytes before the checksum".to_string(),
        ));
    }

    let lattice = Lattice::from_parts(tokens, nodes);
    lattice.validate()?;
    Ok(lattice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::PaRattice;
    use crate::lattice::builder::{build, DEFAULT_MAX_DEPTH};

    fn dict_bytes(groups: &[&[&[&str]]]) -> Vec<Vec<Vec<Vec<u8>>>> {
        groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|phrase| phrase.iter().map(|tok| tok.as_bytes().to_vec()).collect())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn round_trips_a_branching_lattice() {
        let dict = dict_bytes(&[&[&["big", "cat"], &["feline"]]]);
        let pr = PaRattice::new(&dict).unwrap();
        let words: Vec<&[u8]> = vec![b"big", b"cat"];
        let lat = build(&pr, &words, true, DEFAULT_MAX_DEPTH).unwrap();

        let bytes = to_bytes(&lat);
        assert_eq!(bytes.len(), encoded_size(&lat));
        let decoded = from_bytes(&bytes).unwrap();
        assert_eq!(decoded.size(), lat.size());
        assert_eq!(decoded.trunk_spelling(), lat.trunk_spelling());
        assert_eq!(to_bytes(&decoded), bytes, "re-encoding must be byte-stable");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; 16];
        bytes[0] = b'X';
        assert!(from_bytes(&bytes).is_err());
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let pr = PaRattice::new(&[]).unwrap();
        let words: Vec<&[u8]> = vec![b"a", b"b"];
        let lat = build(&pr, &words, true, DEFAULT_MAX_DEPTH).unwrap();
        let mut bytes = to_bytes(&lat);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(from_bytes(&bytes).is_err());
    }
}
