//! Backward derivation traces.
//!
//! A trace walks `incoming` adjacency from a query atom with a three-colour
//! depth-first search. Edges into a node still on the DFS stack close a
//! cycle in the derivation graph and are reported separately as back edges.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{Adjacency, Edge};
use crate::render::Scene;
use crate::style::Category;

/// Highlight colour of a full trace unless the user picks one.
pub const DEFAULT_TRACE_COLOR: &str = "red";
/// Colour everything outside a full trace is dimmed to.
pub const DIM_COLOR: &str = "gray";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{atom} is not in the provenance graph")]
pub struct NotFoundError {
    pub atom: String,
}

/// DFS state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// The backward-reachable subgraph of one atom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub root: String,
    pub nodes: BTreeSet<String>,
    /// Tree and cross edges
    pub edges: BTreeSet<Edge>,
    /// Edges closing a cycle, never also in `edges`
    pub back_edges: BTreeSet<Edge>,
}

/// Trace everything that contributed to `atom`.
///
/// Terminates on cyclic graphs; each node is expanded once.
pub fn trace(adjacency: &Adjacency, atom: &str) -> Result<Trace, NotFoundError> {
    let root = atom.trim();
    if !adjacency.contains(root) {
        return Err(NotFoundError {
            atom: root.to_string(),
        });
    }

    let mut result = Trace {
        root: root.to_string(),
        ..Trace::default()
    };
    let mut colors: HashMap<&str, Color> = HashMap::new();
    // Frames of (node, next incoming index)
    let mut stack: Vec<(&str, usize)> = Vec::new();

    colors.insert(root, Color::InProgress);
    result.nodes.insert(root.to_string());
    stack.push((root, 0));

    while let Some(&(node, next)) = stack.last() {
        let producers = adjacency.incoming(node);
        let Some(producer) = producers.get(next) else {
            colors.insert(node, Color::Done);
            stack.pop();
            continue;
        };
        if let Some(top) = stack.last_mut() {
            top.1 += 1;
        }

        let producer = producer.as_str();
        let edge = (producer.to_string(), node.to_string());
        match colors.get(producer).copied().unwrap_or(Color::Unvisited) {
            Color::Unvisited => {
                result.edges.insert(edge);
                result.nodes.insert(producer.to_string());
                colors.insert(producer, Color::InProgress);
                stack.push((producer, 0));
            }
            Color::InProgress => {
                result.back_edges.insert(edge);
            }
            Color::Done => {
                result.edges.insert(edge);
            }
        }
    }

    debug!(
        "trace of {}: {} nodes, {} edges, {} back edges",
        result.root,
        result.nodes.len(),
        result.edges.len(),
        result.back_edges.len()
    );
    Ok(result)
}

/// How a trace is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    /// Only the traced subgraph is drawn
    #[default]
    Partial,
    /// The whole graph is drawn dimmed, with the trace highlighted
    Full,
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceMode::Partial => f.write_str("partial"),
            TraceMode::Full => f.write_str("full"),
        }
    }
}

impl Trace {
    pub fn all_edges(&self) -> BTreeSet<Edge> {
        self.edges.union(&self.back_edges).cloned().collect()
    }

    /// The traced subgraph alone, keeping bucket grouping and styles.
    /// Back edges are drawn dashed.
    pub fn partial_scene(&self, base: &Scene) -> Scene {
        let mut scene = Scene {
            graph: base.graph.restricted(&self.nodes, &self.all_edges()),
            styles: base.styles.clone(),
            overrides: base.overrides.clone(),
        };
        for edge in &self.back_edges {
            scene.overrides.set_edge(edge, "style", "dashed");
        }
        scene
    }

    /// The whole graph dimmed, with the trace drawn in `color`.
    /// Back edges are drawn dashed as well.
    pub fn full_scene(&self, base: &Scene, color: &str) -> Scene {
        let mut scene = base.clone();
        let buckets: Vec<String> = scene.graph.bucket_names().map(str::to_string).collect();
        for bucket in &buckets {
            scene.styles.set(bucket, Category::Nodes, "color", DIM_COLOR);
            scene.styles.set(bucket, Category::Nodes, "fontcolor", DIM_COLOR);
            scene.styles.set(bucket, Category::Edges, "color", DIM_COLOR);
        }
        for node in &self.nodes {
            scene.overrides.set_node(node, "color", color);
            scene.overrides.set_node(node, "fontcolor", color);
        }
        for edge in &self.edges {
            scene.overrides.set_edge(edge, "color", color);
        }
        for edge in &self.back_edges {
            scene.overrides.set_edge(edge, "color", color);
            scene.overrides.set_edge(edge, "style", "dashed");
        }
        scene
    }

    /// Plain-text listing used by the command line.
    pub fn summary(&self) -> String {
        let mut out = format!("trace of {}\n", self.root);
        out.push_str(&format!("nodes ({}):\n", self.nodes.len()));
        for node in &self.nodes {
            out.push_str(&format!("  {}\n", node));
        }
        out.push_str(&format!("edges ({}):\n", self.edges.len()));
        for (from, to) in &self.edges {
            out.push_str(&format!("  {} -> {}\n", from, to));
        }
        if !self.back_edges.is_empty() {
            out.push_str(&format!("back edges ({}):\n", self.back_edges.len()));
            for (from, to) in &self.back_edges {
                out.push_str(&format!("  {} -> {}\n", from, to));
            }
        }
        out
    }
}
