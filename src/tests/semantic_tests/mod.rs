//! Semantic tests for the rewrite/replay/trace pipeline.
//!
//! These check properties of the whole pipeline rather than single functions:
//! a compiled rule index must decode firings back into exactly the atoms the
//! rule mentions, replay must be insensitive to repeated firings, and traces
//! must be sound and complete with respect to the adjacency lists.

use std::collections::BTreeSet;

use crate::compile::{compile_program, CompiledProgram};
use crate::graph::{build, Adjacency, Edge, Provenance};

mod pipeline_semantics;
mod proptests;
mod session_semantics;

/// The transitive-closure program used throughout.
const ANCESTOR: &str = "\
% ancestor
anc(X,Y) :- par(X,Y).
anc(X,Z) :- anc(X,Y), anc(Y,Z).
";

fn compiled(source: &str) -> CompiledProgram {
    compile_program(source).expect("program should compile")
}

fn provenance(source: &str, output: &str) -> Provenance {
    build(&compiled(source).index, output).expect("output should match index")
}

fn edge(from: &str, to: &str) -> Edge {
    (from.to_string(), to.to_string())
}

/// Every node backward-reachable from `root`, by plain worklist search.
fn backward_reachable(adjacency: &Adjacency, root: &str) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut work = vec![root.to_string()];
    while let Some(node) = work.pop() {
        if !seen.insert(node.clone()) {
            continue;
        }
        for producer in adjacency.incoming(&node) {
            work.push(producer.clone());
        }
    }
    seen
}
