//! DOT emission for provenance scenes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, ProvenanceGraph, AUX_BUCKET};
use crate::style::{Attributes, Category, StyleSheet, ROOT_SUBGRAPH};

/// Attributes attached to individual nodes and edges.
///
/// These win over the bucket defaults of the element's subgraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStyles {
    pub nodes: BTreeMap<String, Attributes>,
    pub edges: BTreeMap<Edge, Attributes>,
}

impl ElementStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_node(&mut self, node: &str, key: &str, value: &str) {
        self.nodes
            .entry(node.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn set_edge(&mut self, edge: &Edge, key: &str, value: &str) {
        self.edges
            .entry(edge.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn node(&self, node: &str) -> Option<&Attributes> {
        self.nodes.get(node)
    }

    pub fn edge(&self, edge: &Edge) -> Option<&Attributes> {
        self.edges.get(edge)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Everything needed to draw one picture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub graph: ProvenanceGraph,
    pub styles: StyleSheet,
    pub overrides: ElementStyles,
}

impl Scene {
    pub fn new(graph: ProvenanceGraph, styles: StyleSheet) -> Self {
        Scene {
            graph,
            styles,
            overrides: ElementStyles::new(),
        }
    }
}

/// Quote a DOT identifier.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn attr_list(attrs: &Attributes) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{}={}", k, quote(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_defaults(dot: &mut String, indent: &str, styles: &StyleSheet, subgraph: &str) {
    for (category, keyword) in [
        (Category::Graph, "graph"),
        (Category::Nodes, "node"),
        (Category::Edges, "edge"),
    ] {
        if let Some(attrs) = styles.attributes(subgraph, category) {
            if !attrs.is_empty() {
                dot.push_str(&format!("{}{} [{}];\n", indent, keyword, attr_list(attrs)));
            }
        }
    }
}

fn push_element(dot: &mut String, indent: &str, element: &str, attrs: Option<&Attributes>) {
    match attrs {
        Some(a) if !a.is_empty() => {
            dot.push_str(&format!("{}{} [{}];\n", indent, element, attr_list(a)))
        }
        _ => dot.push_str(&format!("{}{};\n", indent, element)),
    }
}

/// Bucket names in drawing order: the auxiliary bucket first.
fn drawing_order<'g>(graph: &'g ProvenanceGraph, removed: &BTreeSet<String>) -> Vec<&'g str> {
    let mut order: Vec<&str> = Vec::new();
    if graph.contains_bucket(AUX_BUCKET) {
        order.push(AUX_BUCKET);
    }
    order.extend(graph.bucket_names().filter(|name| *name != AUX_BUCKET));
    order.retain(|name| !removed.contains(*name));
    order
}

/// Emit the scene as a DOT digraph.
///
/// Buckets named in `removed` are left out along with every edge touching
/// one of their nodes. All nodes are declared before any edge so each node
/// picks up the defaults of its own bucket.
pub fn to_dot(scene: &Scene, removed: &BTreeSet<String>) -> String {
    let graph = &scene.graph;
    let order = drawing_order(graph, removed);

    let mut dropped: BTreeSet<&str> = BTreeSet::new();
    for name in removed {
        if let Some(sub) = graph.bucket(name) {
            dropped.extend(sub.nodes.iter().map(String::as_str));
        }
    }

    let mut dot = String::from("digraph gddb {\n");
    push_defaults(&mut dot, "  ", &scene.styles, ROOT_SUBGRAPH);

    for name in &order {
        let Some(sub) = graph.bucket(name) else {
            continue;
        };
        dot.push_str(&format!("  subgraph {} {{\n", quote(name)));
        push_defaults(&mut dot, "    ", &scene.styles, name);
        for node in &sub.nodes {
            if dropped.contains(node.as_str()) {
                continue;
            }
            push_element(&mut dot, "    ", &quote(node), scene.overrides.node(node));
        }
        dot.push_str("  }\n");
    }

    for name in &order {
        let Some(sub) = graph.bucket(name) else {
            continue;
        };
        if sub.edges.is_empty() {
            continue;
        }
        dot.push_str(&format!("  subgraph {} {{\n", quote(name)));
        push_defaults(&mut dot, "    ", &scene.styles, name);
        for edge in &sub.edges {
            let (from, to) = edge;
            if dropped.contains(from.as_str()) || dropped.contains(to.as_str()) {
                continue;
            }
            let element = format!("{} -> {}", quote(from), quote(to));
            push_element(&mut dot, "    ", &element, scene.overrides.edge(edge));
        }
        dot.push_str("  }\n");
    }

    dot.push_str("}\n");
    dot
}
