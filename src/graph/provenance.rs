//! Provenance structures: the bucketed render graph and the adjacency lists.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

/// Bucket collecting every auxiliary firing atom.
pub const AUX_BUCKET: &str = "aux";
/// Bucket of negated ground literals such as `not q(1)`.
pub const NEGATION_BUCKET: &str = "negation";
/// Bucket of edges from observed `q(...)` atoms into the reified `{q}` node.
pub const NEGATION_IN_BUCKET: &str = "negation_in";
/// Bucket of reified `{q}` nodes and their edges to negated literals.
pub const NEGATION_OUT_BUCKET: &str = "negation_out";

/// A directed justification edge `(from, to)` between ground atom strings.
pub type Edge = (String, String);

/// The reified node standing for "no derivation of `predicate` applies".
pub fn reified_negation(predicate: &str) -> String {
    format!("{{{}}}", predicate)
}

/// Nodes and edges of one predicate bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<Edge>,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Ground atoms and justification edges grouped by predicate for rendering.
///
/// Insertion is idempotent: the same atom or edge collapses to one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceGraph {
    buckets: BTreeMap<String, Subgraph>,
}

impl ProvenanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a bucket exists, even if it stays empty.
    pub fn ensure_bucket(&mut self, bucket: &str) -> &mut Subgraph {
        self.buckets.entry(bucket.to_string()).or_default()
    }

    /// Returns true if the node was not present before.
    pub fn add_node(&mut self, bucket: &str, node: &str) -> bool {
        self.ensure_bucket(bucket).nodes.insert(node.to_string())
    }

    /// Returns true if the edge was not present before.
    pub fn add_edge(&mut self, bucket: &str, from: &str, to: &str) -> bool {
        self.ensure_bucket(bucket)
            .edges
            .insert((from.to_string(), to.to_string()))
    }

    pub fn bucket(&self, name: &str) -> Option<&Subgraph> {
        self.buckets.get(name)
    }

    pub fn contains_bucket(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&str, &Subgraph)> {
        self.buckets.iter().map(|(name, sub)| (name.as_str(), sub))
    }

    pub fn node_count(&self) -> usize {
        self.buckets.values().map(|s| s.nodes.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.buckets.values().map(|s| s.edges.len()).sum()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.buckets.values().any(|s| s.nodes.contains(node))
    }

    /// Restrict every bucket to the given nodes and edges, keeping bucket names.
    pub fn restricted(&self, nodes: &BTreeSet<String>, edges: &BTreeSet<Edge>) -> Self {
        let buckets = self
            .buckets
            .iter()
            .map(|(name, sub)| {
                let restricted = Subgraph {
                    nodes: sub.nodes.intersection(nodes).cloned().collect(),
                    edges: sub.edges.intersection(edges).cloned().collect(),
                };
                (name.clone(), restricted)
            })
            .filter(|(_, sub)| !sub.is_empty())
            .collect();
        ProvenanceGraph { buckets }
    }
}

/// Incoming and outgoing neighbours of one ground atom, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    /// Producers: atoms this one was justified by
    pub incoming: Vec<String>,
    /// Consumers: atoms this one helps justify
    pub outgoing: Vec<String>,
}

/// Append-only adjacency lists keyed by ground atom string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adjacency {
    entries: BTreeMap<String, AdjacencyEntry>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the producer-to-consumer edge `from -> to`.
    pub fn link(&mut self, from: &str, to: &str) {
        self.entries
            .entry(to.to_string())
            .or_default()
            .incoming
            .push(from.to_string());
        self.entries
            .entry(from.to_string())
            .or_default()
            .outgoing
            .push(to.to_string());
    }

    pub fn get(&self, atom: &str) -> Option<&AdjacencyEntry> {
        self.entries.get(atom)
    }

    pub fn contains(&self, atom: &str) -> bool {
        self.entries.contains_key(atom)
    }

    pub fn incoming(&self, atom: &str) -> &[String] {
        self.entries
            .get(atom)
            .map(|e| e.incoming.as_slice())
            .unwrap_or(&[])
    }

    pub fn outgoing(&self, atom: &str) -> &[String] {
        self.entries
            .get(atom)
            .map(|e| e.outgoing.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Both computed structures, persisted together between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub graph: ProvenanceGraph,
    pub adjacency: Adjacency,
}

impl Provenance {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    pub fn read_from<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_is_idempotent() {
        let mut g = ProvenanceGraph::new();
        assert!(g.add_node("anc", "anc(1,2)"));
        assert!(!g.add_node("anc", "anc(1,2)"));
        assert!(g.add_edge("anc", "aux_anc_0(1,2)", "anc(1,2)"));
        assert!(!g.add_edge("anc", "aux_anc_0(1,2)", "anc(1,2)"));
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_adjacency_link_records_both_directions() {
        let mut adj = Adjacency::new();
        adj.link("par(1,2)", "aux_anc_1(1,2)");
        adj.link("aux_anc_1(1,2)", "anc(1,2)");
        assert_eq!(adj.incoming("anc(1,2)"), ["aux_anc_1(1,2)".to_string()]);
        assert_eq!(adj.outgoing("par(1,2)"), ["aux_anc_1(1,2)".to_string()]);
        assert_eq!(adj.incoming("aux_anc_1(1,2)"), ["par(1,2)".to_string()]);
        assert!(adj.incoming("missing").is_empty());
        assert_eq!(adj.len(), 3);
    }

    #[test]
    fn test_restricted_keeps_bucket_grouping() {
        let mut g = ProvenanceGraph::new();
        g.add_node("anc", "anc(1,2)");
        g.add_node("anc", "anc(2,3)");
        g.add_node("aux", "aux_anc_1(1,2)");
        g.add_edge("anc", "aux_anc_1(1,2)", "anc(1,2)");

        let nodes: BTreeSet<String> = ["anc(1,2)", "aux_anc_1(1,2)"].iter().map(|s| s.to_string()).collect();
        let edges: BTreeSet<Edge> = [("aux_anc_1(1,2)".to_string(), "anc(1,2)".to_string())].into_iter().collect();
        let sub = g.restricted(&nodes, &edges);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.bucket("anc").unwrap().edges.len(), 1);
        assert!(!sub.bucket("anc").unwrap().nodes.contains("anc(2,3)"));
    }

    #[test]
    fn test_provenance_json_round_trip() {
        let mut prov = Provenance::default();
        prov.graph.add_node("p", "p(1)");
        prov.graph.add_edge("p", "aux_p_0(1)", "p(1)");
        prov.adjacency.link("aux_p_0(1)", "p(1)");
        let back = Provenance::from_json(&prov.to_json().unwrap()).unwrap();
        assert_eq!(back, prov);
    }
}
