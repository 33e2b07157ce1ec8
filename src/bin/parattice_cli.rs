use std::fs;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};

use parattice::dict::PaRattice;
use parattice::kmp::LatticeKmp;
use parattice::lattice::{self, Lattice};

/// Unwrap a Result or print the error and exit.
macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Parser)]
#[command(name = "parattice-cli", about = "Paraphrase lattice build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a lattice and dump it as DOT source
    Dot {
        /// Dictionary file (JSON: groups of phrases of tokens)
        dict_file: String,
        /// Input words, whitespace-separated
        words: String,
        /// Maximum paraphrase recursion depth
        #[arg(long, default_value_t = lattice::DEFAULT_MAX_DEPTH)]
        max_depth: u32,
        /// Annotate each node with its trunk span
        #[arg(long)]
        numbered: bool,
        /// Skip the bisimulation-merge pass over paraphrase chains
        #[arg(long)]
        no_shrink: bool,
    },
    /// Build a lattice and write its binary encoding to a file
    Encode {
        dict_file: String,
        words: String,
        output_file: String,
        #[arg(long, default_value_t = lattice::DEFAULT_MAX_DEPTH)]
        max_depth: u32,
        /// Skip the bisimulation-merge pass over paraphrase chains
        #[arg(long)]
        no_shrink: bool,
    },
    /// Decode a binary lattice file and print summary stats
    Info { lattice_file: String },
    /// Build a lattice and dump its search-index projection as JSON lines
    SearchIndex {
        dict_file: String,
        words: String,
        #[arg(long, default_value_t = lattice::DEFAULT_MAX_DEPTH)]
        max_depth: u32,
        /// Skip the bisimulation-merge pass over paraphrase chains
        #[arg(long)]
        no_shrink: bool,
    },
    /// Build a lattice and search it for a token pattern
    Kmp {
        dict_file: String,
        words: String,
        /// Pattern, whitespace-separated tokens
        pattern: String,
        #[arg(long, default_value_t = lattice::DEFAULT_MAX_DEPTH)]
        max_depth: u32,
        /// Skip the bisimulation-merge pass over paraphrase chains
        #[arg(long)]
        no_shrink: bool,
    },
    /// Build a lattice and rewrite a path into its trunk-projected span
    TrunkSpan {
        dict_file: String,
        words: String,
        /// Path steps as "node" then "label:node" pairs, e.g. "1 stem:4"
        path: String,
        #[arg(long, default_value_t = lattice::DEFAULT_MAX_DEPTH)]
        max_depth: u32,
        /// Skip the bisimulation-merge pass over paraphrase chains
        #[arg(long)]
        no_shrink: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Dot {
            dict_file,
            words,
            max_depth,
            numbered,
            no_shrink,
        } => dot_cmd(&dict_file, &words, !no_shrink, max_depth, numbered),
        Command::Encode {
            dict_file,
            words,
            output_file,
            max_depth,
            no_shrink,
        } => encode_cmd(&dict_file, &words, &output_file, !no_shrink, max_depth),
        Command::Info { lattice_file } => info_cmd(&lattice_file),
        Command::SearchIndex {
            dict_file,
            words,
            max_depth,
            no_shrink,
        } => search_index_cmd(&dict_file, &words, !no_shrink, max_depth),
        Command::Kmp {
            dict_file,
            words,
            pattern,
            max_depth,
            no_shrink,
        } => kmp_cmd(&dict_file, &words, &pattern, !no_shrink, max_depth),
        Command::TrunkSpan {
            dict_file,
            words,
            path,
            max_depth,
            no_shrink,
        } => trunk_span_cmd(&dict_file, &words, &path, !no_shrink, max_depth),
    }
}

fn load_dict(path: &str) -> PaRattice {
    let text = die!(fs::read_to_string(path), "Error reading {path}: {}");
    let groups: Vec<Vec<Vec<String>>> = die!(
        serde_json::from_str(&text),
        "Error parsing dictionary JSON: {}"
    );
    let bytes: Vec<Vec<Vec<Vec<u8>>>> = groups
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|phrase| phrase.into_iter().map(String::into_bytes).collect())
                .collect()
        })
        .collect();
    die!(PaRattice::new(&bytes), "Error building dictionary: {}")
}

fn build_lattice(dict_file: &str, words: &str, shrink: bool, max_depth: u32) -> Lattice {
    let dict = load_dict(dict_file);
    let tokens: Vec<&[u8]> = words.split_whitespace().map(str::as_bytes).collect();
    die!(
        lattice::build(&dict, &tokens, shrink, max_depth),
        "Error building lattice: {}"
    )
}

fn dot_cmd(dict_file: &str, words: &str, shrink: bool, max_depth: u32, numbered: bool) {
    let lat = build_lattice(dict_file, words, shrink, max_depth);
    let dot = if numbered {
        lattice::dot::dump_numbered(&lat)
    } else {
        lattice::dot::dump(&lat)
    };
    print!("{dot}");
}

fn encode_cmd(dict_file: &str, words: &str, output_file: &str, shrink: bool, max_depth: u32) {
    let lat = build_lattice(dict_file, words, shrink, max_depth);
    let bytes = lattice::serialize::to_bytes(&lat);
    die!(
        fs::write(output_file, &bytes),
        "Error writing {output_file}: {}"
    );
    eprintln!(
        "Wrote {output_file} ({} bytes, {} nodes)",
        bytes.len(),
        lat.size()
    );
}

fn info_cmd(lattice_file: &str) {
    let bytes = die!(
        fs::read(Path::new(lattice_file)),
        "Error reading {lattice_file}: {}"
    );
    let lat = die!(
        lattice::serialize::from_bytes(&bytes),
        "Error decoding lattice: {}"
    );
    println!("Nodes:   {}", lat.size());
    println!("Edges:   {}", lat.required_capacity());
    println!("Source:  {}", lat.source().0);
    println!("Sink:    {}", lat.sink().0);
    let spelling: Vec<String> = lat
        .trunk_spelling()
        .iter()
        .map(|w| String::from_utf8_lossy(w).into_owned())
        .collect();
    println!("Trunk:   {}", spelling.join(" "));
}

fn search_index_cmd(dict_file: &str, words: &str, shrink: bool, max_depth: u32) {
    let lat = build_lattice(dict_file, words, shrink, max_depth);
    for record in lattice::search_index::dump(&lat) {
        let text = String::from_utf8_lossy(&record.text);
        println!(
            "{}",
            serde_json::json!({
                "text": text,
                "increment": record.increment,
                "length": record.length,
                "offset_start": record.offset_start,
                "offset_end": record.offset_end,
            })
        );
    }
}

/// Parse "1 stem:4 cell:13" into path steps: the first token is a bare node
/// id (empty label), every following token is "label:node_id".
fn parse_path_arg(spec: &str) -> Vec<lattice::PathStep> {
    let mut steps = Vec::new();
    for (i, tok) in spec.split_whitespace().enumerate() {
        if i == 0 {
            let node: u32 = die!(tok.parse(), "Error parsing path start node {}: {}");
            steps.push(lattice::PathStep::start(lattice::NodeId(node)));
        } else {
            let Some((label, node)) = tok.rsplit_once(':') else {
                eprintln!("Error parsing path step {tok:?}: expected label:node");
                process::exit(1);
            };
            let node: u32 = die!(node.parse(), "Error parsing path node {}: {}");
            steps.push(lattice::PathStep::new(label.as_bytes(), lattice::NodeId(node)));
        }
    }
    steps
}

fn trunk_span_cmd(dict_file: &str, words: &str, path: &str, shrink: bool, max_depth: u32) {
    let lat = build_lattice(dict_file, words, shrink, max_depth);
    let steps = parse_path_arg(path);
    let rewritten = die!(
        lattice::get_trunk_span(&lat, &steps),
        "Error rewriting trunk span: {}"
    );
    let rendered: Vec<String> = rewritten
        .iter()
        .map(|s| {
            format!(
                "({:?},{})",
                String::from_utf8_lossy(&s.label),
                s.node.0
            )
        })
        .collect();
    println!("{}", rendered.join(" "));
}

fn kmp_cmd(dict_file: &str, words: &str, pattern: &str, shrink: bool, max_depth: u32) {
    let lat = build_lattice(dict_file, words, shrink, max_depth);
    let pattern: Vec<Vec<u8>> = pattern
        .split_whitespace()
        .map(|t| t.as_bytes().to_vec())
        .collect();
    let kmp = die!(LatticeKmp::new(pattern), "Error compiling pattern: {}");
    let matches = kmp.search(&lat);
    if matches.is_empty() {
        println!("no matches");
        return;
    }
    for m in &matches {
        let nodes: Vec<String> = m.nodes.iter().map(|n| n.0.to_string()).collect();
        println!("{}", nodes.join(" -> "));
    }
}
