//! gddb: a graphical debugger for Datalog programs.
//!
//! Rules are rewritten so that every application of a rule leaves behind a
//! ground auxiliary "firing" tuple. Replaying those tuples from the
//! evaluator's output rebuilds the provenance graph, which can then be traced
//! backwards from any derived fact and drawn with Graphviz.

pub mod syntax;
pub mod parser;
pub mod compile;
pub mod graph;
pub mod trace;
pub mod style;
pub mod render;
pub mod session;
pub mod repl;

#[cfg(test)]
mod tests;
