use std::collections::{HashMap, HashSet, VecDeque};

use crate::dict::{PaRattice, TokenId, TokenTable};
use crate::error::{ParattiError, ParattiResult};

use super::graph::{Edge, Lattice, NodeData, NodeId};

/// Default bound on paraphrase recursion depth.
pub const DEFAULT_MAX_DEPTH: u32 = 4;

/// A node in the graph under construction, addressed by a plain `usize`
/// ("draft id") rather than `NodeId` — draft ids are assigned in creation
/// order and are neither final nor necessarily topological; `renumber`
/// produces the `NodeId`s a finished `Lattice` exposes.
struct DraftNode {
    span: (usize, usize),
    edges: Vec<(usize, TokenId)>,
}

/// A pending expansion: `chain[0]..=chain[last]` spells `phrase` (in the
/// dictionary's token space), anchored within trunk bracket `bracket`.
/// Seed tasks have `chain.len() == 2` (a direct trunk-to-trunk span);
/// recursive tasks (matches found inside an already-inserted paraphrase)
/// have longer chains addressing the new chain's own nodes.
struct Task {
    chain: Vec<usize>,
    phrase: Vec<TokenId>,
    bracket: (usize, usize),
    depth: u32,
}

/// Build a paraphrase lattice over `words` using the dictionary `dict`,
/// recursing into newly-inserted paraphrases up to `max_depth` times (§4.2).
///
/// `words` is the input token sequence as raw bytes — the lattice interns
/// its own copy into a private `TokenTable` so that the result is fully
/// self-contained (`lattice::graph::Lattice`'s doc comment).
pub fn build(
    dict: &PaRattice,
    words: &[&[u8]],
    shrink_chains: bool,
    max_depth: u32,
) -> ParattiResult<Lattice> {
    if words.is_empty() {
        return Err(ParattiError::InputError(
            "cannot build a lattice over an empty token sequence".to_string(),
        ));
    }

    let mut tokens = TokenTable::new();
    let local_ids: Vec<TokenId> = words.iter().map(|w| tokens.intern(w)).collect();

    // Sentinel id for words absent from the dictionary's vocabulary: it can
    // never equal a real interned id (no dictionary interns anywhere near
    // u32::MAX tokens), so it simply never matches a trie edge.
    const UNKNOWN: TokenId = TokenId(u32::MAX);
    let dict_words: Vec<TokenId> = words
        .iter()
        .map(|w| dict.token_id(w).unwrap_or(UNKNOWN))
        .collect();

    let n = words.len();
    let mut nodes: Vec<DraftNode> = (0..=n)
        .map(|i| DraftNode {
            span: (i, i),
            edges: Vec::new(),
        })
        .collect();
    for i in 0..n {
        nodes[i].edges.push((i + 1, local_ids[i]));
    }

    let mut queue: VecDeque<Task> = VecDeque::new();
    let mut seen_spans: HashSet<(usize, usize)> = HashSet::new();
    let mut seen_tasks: HashSet<(usize, usize, Vec<TokenId>)> = HashSet::new();
    let mut seen_edges: HashSet<(usize, usize, TokenId)> = HashSet::new();

    for start in 0..n {
        for (end, _group) in dict.phrases_matching(&dict_words, start) {
            if seen_spans.insert((start, end)) {
                queue.push_back(Task {
                    chain: vec![start, end],
                    phrase: dict_words[start..end].to_vec(),
                    bracket: (start, end),
                    depth: 0,
                });
            }
        }
    }

    let mut next_draft_id = nodes.len();
    while let Some(task) = queue.pop_front() {
        expand_task(
            dict,
            &task,
            &mut tokens,
            &mut nodes,
            &mut next_draft_id,
            &mut seen_edges,
            &mut seen_tasks,
            &mut queue,
            max_depth,
        );
    }

    let nodes = if shrink_chains { shrink(nodes) } else { nodes };
    let nodes = renumber(nodes, &tokens);
    let lattice = Lattice::from_parts(tokens, nodes);
    lattice.validate()?;
    Ok(lattice)
}

#[allow(clippy::too_many_arguments)]
fn expand_task(
    dict: &PaRattice,
    task: &Task,
    tokens: &mut TokenTable,
    nodes: &mut Vec<DraftNode>,
    next_draft_id: &mut usize,
    seen_edges: &mut HashSet<(usize, usize, TokenId)>,
    seen_tasks: &mut HashSet<(usize, usize, Vec<TokenId>)>,
    queue: &mut VecDeque<Task>,
    max_depth: u32,
) {
    let from = task.chain[0];
    let to = *task.chain.last().expect("chain is never empty");

    for sibling in dict.siblings_of(&task.phrase) {
        let local: Vec<TokenId> = sibling
            .iter()
            .map(|&id| tokens.intern(dict.tokens().bytes(id)))
            .collect();

        let mut chain = Vec::with_capacity(local.len() + 1);
        chain.push(from);
        for _ in 0..local.len().saturating_sub(1) {
            let id = *next_draft_id;
            *next_draft_id += 1;
            nodes.push(DraftNode {
                span: task.bracket,
                edges: Vec::new(),
            });
            chain.push(id);
        }
        chain.push(to);

        for (i, &label) in local.iter().enumerate() {
            let (u, v) = (chain[i], chain[i + 1]);
            if seen_edges.insert((u, v, label)) {
                nodes[u].edges.push((v, label));
            }
        }

        if task.depth + 1 > max_depth {
            continue;
        }
        for start in 0..sibling.len() {
            for (end, _group) in dict.phrases_matching(sibling, start) {
                let phrase = sibling[start..end].to_vec();
                let key = (chain[start], chain[end], phrase.clone());
                if seen_tasks.insert(key) {
                    queue.push_back(Task {
                        chain: chain[start..=end].to_vec(),
                        phrase,
                        bracket: task.bracket,
                        depth: task.depth + 1,
                    });
                }
            }
        }
    }
}

/// Collapse draft nodes that are behaviorally indistinguishable: same trunk
/// bracket, and the same set of (label, target-behavior) outgoing edges —
/// a standard right-language/bisimulation partition refinement, the same
/// idea DFA minimization uses. Trunk nodes never participate (their bracket
/// `(v, v)` is unique to each of them) and the merge is only ever applied
/// if it cannot introduce a cycle — conservative, but cheap to check and
/// keeps this pass impossible to get subtly wrong.
fn shrink(nodes: Vec<DraftNode>) -> Vec<DraftNode> {
    let n = nodes.len();
    if n == 0 {
        return nodes;
    }

    let mut class: Vec<u32> = {
        let mut map: HashMap<(usize, usize), u32> = HashMap::new();
        nodes
            .iter()
            .map(|node| {
                let next = map.len() as u32;
                *map.entry(node.span).or_insert(next)
            })
            .collect()
    };

    loop {
        let mut map: HashMap<Vec<(u32, u32)>, u32> = HashMap::new();
        let new_class: Vec<u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut sig: Vec<(u32, u32)> = node
                    .edges
                    .iter()
                    .map(|&(to, label)| (label.0, class[to]))
                    .collect();
                sig.sort_unstable();
                sig.dedup();
                sig.insert(0, (u32::MAX, class[i]));
                let next = map.len() as u32;
                *map.entry(sig).or_insert(next)
            })
            .collect();
        if new_class == class {
            break;
        }
        class = new_class;
    }

    let mut rep: HashMap<u32, usize> = HashMap::new();
    for i in 0..n {
        rep.entry(class[i]).or_insert(i);
    }

    let merged: Vec<DraftNode> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let edges = node
                .edges
                .iter()
                .map(|&(to, label)| (rep[&class[to]], label))
                .collect();
            let _ = i;
            DraftNode {
                span: node.span,
                edges,
            }
        })
        .collect();

    if has_cycle(&merged, &rep, &class) {
        // Merging would collapse two sequential positions in the same
        // paraphrase chain into one node; keep the unmerged graph instead.
        return nodes;
    }

    let mut reps: Vec<usize> = rep.values().copied().collect();
    reps.sort_unstable();
    let mut compact: HashMap<usize, usize> = HashMap::new();
    for (new_id, &old_id) in reps.iter().enumerate() {
        compact.insert(old_id, new_id);
    }

    reps.iter()
        .map(|&old_id| {
            let node = &merged[old_id];
            let edges = node
                .edges
                .iter()
                .map(|&(to, label)| (compact[&to], label))
                .collect();
            DraftNode {
                span: node.span,
                edges,
            }
        })
        .collect()
}

/// Cycle check over the representative graph reachable from node 0,
/// addressed via `rep`/`class` so it can run before the final compaction.
fn has_cycle(nodes: &[DraftNode], rep: &HashMap<u32, usize>, class: &[u32]) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }
    let mut mark = vec![Mark::Unvisited; nodes.len()];

    fn visit(
        i: usize,
        nodes: &[DraftNode],
        rep: &HashMap<u32, usize>,
        class: &[u32],
        mark: &mut Vec<Mark>,
    ) -> bool {
        match mark[i] {
            Mark::Done => return false,
            Mark::Visiting => return true,
            Mark::Unvisited => {}
        }
        mark[i] = Mark::Visiting;
        for &(to, _) in &nodes[i].edges {
            let target = rep[&class[to]];
            if visit(target, nodes, rep, class, mark) {
                return true;
            }
        }
        mark[i] = Mark::Done;
        false
    }

    for &start in rep.values() {
        if mark[start] == Mark::Unvisited && visit(start, nodes, rep, class, &mut mark) {
            return true;
        }
    }
    false
}

/// Assign final, topologically-ordered, dense ids via Kahn's algorithm,
/// breaking ties by `(span.0, span.1)` so that node ids increase with trunk
/// position whenever the topology leaves a choice — this is what keeps
/// branch node ids "between" the trunk ids that bracket them, without
/// having to track that placement explicitly during expansion.
///
/// Each node's final adjacency list is sorted by `(to_node_id, label_bytes)`
/// — the same canonical order `lattice::serialize` writes to the wire
/// (§4.4) — so that a freshly-built lattice and one round-tripped through
/// `to_bytes`/`from_bytes` agree on adjacency order byte-for-byte, which
/// `lattice::dot`'s insertion-order traversal depends on for a stable dump.
fn renumber(nodes: Vec<DraftNode>, tokens: &TokenTable) -> Vec<NodeData> {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    let n = nodes.len();
    let mut indeg = vec![0usize; n];
    for node in &nodes {
        for &(to, _) in &node.edges {
            indeg[to] += 1;
        }
    }

    let mut heap: BinaryHeap<Reverse<(usize, usize, usize)>> = BinaryHeap::new();
    for (i, &d) in indeg.iter().enumerate() {
        if d == 0 {
            heap.push(Reverse((nodes[i].span.0, nodes[i].span.1, i)));
        }
    }

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((_, _, i))) = heap.pop() {
        order.push(i);
        for &(to, _) in &nodes[i].edges {
            indeg[to] -= 1;
            if indeg[to] == 0 {
                heap.push(Reverse((nodes[to].span.0, nodes[to].span.1, to)));
            }
        }
    }
    debug_assert_eq!(order.len(), n, "draft graph must be acyclic");

    let mut new_id = vec![0u32; n];
    for (final_id, &draft_id) in order.iter().enumerate() {
        new_id[draft_id] = final_id as u32;
    }

    let mut out: Vec<Option<NodeData>> = (0..n).map(|_| None).collect();
    for (draft_id, node) in nodes.into_iter().enumerate() {
        let mut edges: Vec<Edge> = node
            .edges
            .into_iter()
            .map(|(to, label)| Edge {
                to: NodeId(new_id[to]),
                label,
            })
            .collect();
        edges.sort_by(|a, b| (a.to.0, tokens.bytes(a.label)).cmp(&(b.to.0, tokens.bytes(b.label))));
        out[new_id[draft_id] as usize] = Some(NodeData {
            span: (NodeId(new_id[node.span.0]), NodeId(new_id[node.span.1])),
            edges,
        });
    }
    out.into_iter()
        .map(|n| n.expect("every draft id is assigned exactly one final id"))
        .collect()
}
