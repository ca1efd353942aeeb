//! Provenance graph builder: replays auxiliary firings into a dependency graph.

mod builder;
mod provenance;

pub use builder::{build, scan_firings, Firing, GraphBuilder, IndexMismatchError};
pub use provenance::{
    reified_negation, Adjacency, AdjacencyEntry, Edge, Provenance, ProvenanceGraph,
    Subgraph, AUX_BUCKET, NEGATION_BUCKET, NEGATION_IN_BUCKET, NEGATION_OUT_BUCKET,
};
