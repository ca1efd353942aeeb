//! Replays evaluator output into provenance structures.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use log::{debug, info};
use regex::Regex;
use thiserror::Error;

use super::provenance::{
    reified_negation, Adjacency, Provenance, ProvenanceGraph, AUX_BUCKET, NEGATION_BUCKET,
    NEGATION_IN_BUCKET, NEGATION_OUT_BUCKET,
};
use crate::compile::{ground_atom, RuleIndex};
use crate::syntax::split_negation;

/// The evaluator output and the rule index disagree.
///
/// Always fatal for a build: the index is stale or belongs to another program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexMismatchError {
    #[error("firing of {aux} has no entry in the rule index")]
    UnknownAuxiliary { aux: String },
    #[error("firing of {aux} has {arity} arguments but its recipe reads position {position}")]
    Arity {
        aux: String,
        arity: usize,
        position: usize,
    },
    #[error("rule index entry for {aux} has no head recipe")]
    EmptyRecipe { aux: String },
}

/// One ground auxiliary tuple found in evaluator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing<'t> {
    pub aux: &'t str,
    pub args: Vec<&'t str>,
    /// Written without parentheses.
    pub bare: bool,
}

impl Firing<'_> {
    pub fn atom(&self) -> String {
        ground_atom(self.aux, &self.args)
    }
}

fn firing_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(aux_\w+)(?:\(([^()]*)\))?").expect("valid regex"))
}

/// Find every auxiliary firing in raw evaluator output, in output order.
///
/// Anything that is not an `aux_...` tuple is ignored. A bare `aux_...`
/// name is reported with `bare` set; it may be a 0-ary firing or just a
/// constant that happens to share the prefix.
pub fn scan_firings(text: &str) -> impl Iterator<Item = Firing<'_>> {
    firing_pattern().captures_iter(text).filter_map(|caps| {
        let aux = caps.get(1)?.as_str();
        let inner = caps.get(2);
        let args = match inner {
            Some(m) if !m.as_str().trim().is_empty() => {
                m.as_str().split(',').map(str::trim).collect()
            }
            _ => Vec::new(),
        };
        Some(Firing {
            aux,
            args,
            bare: inner.is_none(),
        })
    })
}

/// Incrementally builds the provenance graph and adjacency lists.
pub struct GraphBuilder<'i> {
    index: &'i RuleIndex,
    graph: ProvenanceGraph,
    adjacency: Adjacency,
    negated: BTreeSet<String>,
    firings: usize,
}

impl<'i> GraphBuilder<'i> {
    pub fn new(index: &'i RuleIndex) -> Self {
        let mut graph = ProvenanceGraph::new();
        graph.ensure_bucket(AUX_BUCKET);
        GraphBuilder {
            index,
            graph,
            adjacency: Adjacency::new(),
            negated: BTreeSet::new(),
            firings: 0,
        }
    }

    /// Number of firings replayed so far, duplicates included.
    pub fn firings(&self) -> usize {
        self.firings
    }

    /// Replay every firing found in `text`.
    ///
    /// A bare name only counts as a firing when the index knows it as a 0-ary
    /// auxiliary predicate; otherwise it is a constant and is skipped.
    pub fn insert_text(&mut self, text: &str) -> Result<usize, IndexMismatchError> {
        let mut count = 0;
        for firing in scan_firings(text) {
            if firing.bare && !self.is_nullary(firing.aux) {
                debug!("skipping bare name {}", firing.aux);
                continue;
            }
            self.insert_firing(firing.aux, &firing.args)?;
            count += 1;
        }
        Ok(count)
    }

    fn is_nullary(&self, aux: &str) -> bool {
        self.index
            .get(aux)
            .is_some_and(|recipe| recipe.iter().all(|step| step.max_position().is_none()))
    }

    /// Replay one ground firing `aux(args...)`.
    ///
    /// The firing is fully decoded before anything is inserted, so a mismatch
    /// leaves the builder untouched. The aux node's `outgoing` list records the
    /// head atom it produces rather than the aux node itself.
    pub fn insert_firing(&mut self, aux: &str, args: &[&str]) -> Result<(), IndexMismatchError> {
        let index = self.index;
        let recipe = index
            .get(aux)
            .ok_or_else(|| IndexMismatchError::UnknownAuxiliary {
                aux: aux.to_string(),
            })?;
        if recipe.is_empty() {
            return Err(IndexMismatchError::EmptyRecipe {
                aux: aux.to_string(),
            });
        }

        let mut decoded = Vec::with_capacity(recipe.len());
        for step in recipe {
            let atom = step.ground(args).ok_or_else(|| IndexMismatchError::Arity {
                aux: aux.to_string(),
                arity: args.len(),
                position: step.max_position().unwrap_or(0),
            })?;
            decoded.push((step.predicate.as_str(), atom));
        }

        let aux_atom = ground_atom(aux, args);
        self.graph.add_node(AUX_BUCKET, &aux_atom);

        // Aux -> head
        let (head_predicate, head_atom) = &decoded[0];
        self.graph.add_node(head_predicate, head_atom);
        self.link(head_predicate, &aux_atom, head_atom);

        // Body -> aux
        for (predicate, body_atom) in &decoded[1..] {
            let (bare, negated) = split_negation(predicate);
            if negated {
                let reified = reified_negation(bare);
                self.graph.add_node(NEGATION_BUCKET, body_atom);
                self.link(NEGATION_BUCKET, body_atom, &aux_atom);
                self.graph.add_node(NEGATION_OUT_BUCKET, &reified);
                self.link(NEGATION_OUT_BUCKET, &reified, body_atom);
                self.negated.insert(bare.to_string());
            } else {
                self.graph.add_node(predicate, body_atom);
                self.link(predicate, body_atom, &aux_atom);
            }
        }

        self.firings += 1;
        Ok(())
    }

    /// Add the edge to the graph, and to the adjacency lists if it is new.
    fn link(&mut self, bucket: &str, from: &str, to: &str) {
        if self.graph.add_edge(bucket, from, to) {
            self.adjacency.link(from, to);
        }
    }

    /// Run the negation pass and hand over the finished structures.
    ///
    /// Every observed ground atom of a negated predicate `q` gets an edge into
    /// the reified `{q}` node. Observed means the atom is already a graph node,
    /// i.e. it appeared in some decoded firing; a `q` fact that only shows up
    /// in the raw output and feeds no rule stays unlinked.
    pub fn finish(mut self) -> Provenance {
        let negated = std::mem::take(&mut self.negated);
        for bare in &negated {
            let reified = reified_negation(bare);
            let atoms: Vec<String> = self
                .graph
                .bucket(bare)
                .map(|sub| sub.nodes.iter().cloned().collect())
                .unwrap_or_default();
            debug!(
                "negation pass: {} observed atoms feed {}",
                atoms.len(),
                reified
            );
            self.graph.ensure_bucket(NEGATION_IN_BUCKET);
            for atom in atoms {
                self.link(NEGATION_IN_BUCKET, &atom, &reified);
            }
        }

        info!(
            "replayed {} firings into {} nodes and {} edges",
            self.firings,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        Provenance {
            graph: self.graph,
            adjacency: self.adjacency,
        }
    }
}

/// Build the provenance structures from a rule index and raw evaluator output.
pub fn build(index: &RuleIndex, evaluator_output: &str) -> Result<Provenance, IndexMismatchError> {
    let mut builder = GraphBuilder::new(index);
    builder.insert_text(evaluator_output)?;
    Ok(builder.finish())
}
