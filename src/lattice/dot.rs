//! DOT graph dump. Output is byte-for-byte stable: nodes
//! are emitted in id order, each node's edges in adjacency-list order —
//! the same order `lattice::serialize` walks the graph in, so the two
//! dumps agree on "the" canonical traversal of a given lattice.

use super::graph::{Lattice, NodeId};

/// Plain dump: nodes named `n_<id>`, no span annotation.
pub fn dump(lattice: &Lattice) -> String {
    render(lattice, false)
}

/// Dump with each node labeled `<id>; (l, r)` — useful when eyeballing how
/// branch nodes bracket against the trunk.
pub fn dump_numbered(lattice: &Lattice) -> String {
    render(lattice, true)
}

fn render(lattice: &Lattice, numbered: bool) -> String {
    let mut out = String::from("digraph parattice {\n");

    for i in 0..lattice.size() {
        let node = NodeId(i as u32);
        if numbered {
            let (l, r) = lattice.span(node);
            out.push_str(&format!(
                "  n_{i} [label=\"{i}; ({}, {})\"];\n",
                l.0, r.0
            ));
        } else {
            out.push_str(&format!("  n_{i};\n"));
        }
    }

    for i in 0..lattice.size() {
        let node = NodeId(i as u32);
        for edge in lattice.edges(node) {
            let label = escape(lattice.label_bytes(edge.label));
            out.push_str(&format!(
                "  n_{i} -> n_{} [label=\"{label}\"];\n",
                edge.to.0
            ));
        }
    }

    out.push_str("}\n");
    out
}

fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for c in String::from_utf8_lossy(bytes).chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::PaRattice;
    use crate::lattice::builder::{build, DEFAULT_MAX_DEPTH};

    #[test]
    fn dump_is_deterministic() {
        let pr = PaRattice::new(&[]).unwrap();
        let words: Vec<&[u8]> = vec![b"a", b"b"];
        let lat = build(&pr, &words, true, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(dump(&lat), dump(&lat));
        assert!(dump(&lat).starts_with("digraph parattice {\n"));
    }

    #[test]
    fn escapes_quotes_in_labels() {
        let dict = vec![vec![
            vec![br#"he said "hi""#.to_vec()],
            vec![b"greeting".to_vec()],
        ]];
        let pr = PaRattice::new(&dict).unwrap();
        let words: Vec<&[u8]> = vec![br#"he said "hi""#];
        let lat = build(&pr, &words, true, DEFAULT_MAX_DEPTH).unwrap();
        assert!(dump(&lat).contains(r#"\"hi\""#));
    }

    #[test]
    fn numbered_dump_embeds_spans() {
        let pr = PaRattice::new(&[]).unwrap();
        let words: Vec<&[u8]> = vec![b"a"];
        let lat = build(&pr, &words, true, DEFAULT_MAX_DEPTH).unwrap();
        assert!(dump_numbered(&lat).contains("; (0, 0)"));
    }
}
