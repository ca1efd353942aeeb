//! The rule index: how to decode each auxiliary predicate's firings.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

/// One decoding step: which auxiliary arguments, in which order, rebuild an
/// atom of `predicate`.
///
/// `predicate` keeps the `not ` marker for negated body literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomRecipe {
    pub predicate: String,
    pub positions: Vec<usize>,
}

impl AtomRecipe {
    pub fn new(predicate: impl Into<String>, positions: Vec<usize>) -> Self {
        AtomRecipe {
            predicate: predicate.into(),
            positions,
        }
    }

    /// Substitute firing arguments into this recipe, giving a ground atom
    /// string such as `anc(1,3)`.
    ///
    /// Returns `None` if a position is out of range for `args`.
    pub fn ground(&self, args: &[&str]) -> Option<String> {
        let mut values = Vec::with_capacity(self.positions.len());
        for &pos in &self.positions {
            values.push(*args.get(pos)?);
        }
        Some(ground_atom(&self.predicate, &values))
    }

    /// Largest position referenced, if any.
    pub fn max_position(&self) -> Option<usize> {
        self.positions.iter().copied().max()
    }
}

/// Render `predicate(v1,...,vn)`, or a bare `predicate` when nullary.
pub fn ground_atom(predicate: &str, values: &[&str]) -> String {
    if values.is_empty() {
        predicate.to_string()
    } else {
        format!("{}({})", predicate, values.join(","))
    }
}

/// Mapping from auxiliary predicate name to its decoding recipe.
///
/// Entry 0 of every recipe decodes the rule head; entries 1..n decode the
/// body literals in source order. The index is the artifact handed from the
/// compile phase to the graph-building phase, so it serializes to JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleIndex {
    entries: BTreeMap<String, Vec<AtomRecipe>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the recipe of one auxiliary predicate.
    ///
    /// Returns the previous recipe if the name was already present.
    pub fn insert(
        &mut self,
        aux_predicate: impl Into<String>,
        recipe: Vec<AtomRecipe>,
    ) -> Option<Vec<AtomRecipe>> {
        self.entries.insert(aux_predicate.into(), recipe)
    }

    pub fn get(&self, aux_predicate: &str) -> Option<&[AtomRecipe]> {
        self.entries.get(aux_predicate).map(Vec::as_slice)
    }

    pub fn contains(&self, aux_predicate: &str) -> bool {
        self.entries.contains_key(aux_predicate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

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
