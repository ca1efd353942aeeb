//! Style sheets: rendering attributes per subgraph and category.
//!
//! One directive per line:
//!
//! ```text
//! root.graph:bgcolor=#336699,ranksep=2
//! aux.nodes:shape=point
//! anc.edges:color=blue
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{AUX_BUCKET, NEGATION_BUCKET};

/// Subgraph name addressing the top-level graph.
pub const ROOT_SUBGRAPH: &str = "root";

/// Attribute name to value.
pub type Attributes = BTreeMap<String, String>;

/// Which defaults of a subgraph an attribute applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Graph,
    Nodes,
    Edges,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Graph, Category::Nodes, Category::Edges];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Graph => "graph",
            Category::Nodes => "nodes",
            Category::Edges => "edges",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown style category '{0}' (expected graph, nodes or edges)")]
pub struct UnknownCategoryError(pub String);

impl FromStr for Category {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graph" => Ok(Category::Graph),
            "nodes" | "node" => Ok(Category::Nodes),
            "edges" | "edge" => Ok(Category::Edges),
            _ => Err(UnknownCategoryError(s.to_string())),
        }
    }
}

/// Attributes of one subgraph, split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphStyle {
    pub graph: Attributes,
    pub nodes: Attributes,
    pub edges: Attributes,
}

impl SubgraphStyle {
    pub fn get(&self, category: Category) -> &Attributes {
        match category {
            Category::Graph => &self.graph,
            Category::Nodes => &self.nodes,
            Category::Edges => &self.edges,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Attributes {
        match category {
            Category::Graph => &mut self.graph,
            Category::Nodes => &mut self.nodes,
            Category::Edges => &mut self.edges,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty() && self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// A malformed style-sheet line. Reading skips it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("style sheet line {line}: {reason}: '{text}'")]
pub struct StyleParseError {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Subgraph name to category to attribute to value.
///
/// Lookups never create entries; an unknown subgraph simply has no style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheet {
    subgraphs: BTreeMap<String, SubgraphStyle>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Styles used when the user supplies no sheet.
    pub fn default_sheet() -> Self {
        let mut sheet = StyleSheet::new();
        sheet.set(AUX_BUCKET, Category::Nodes, "shape", "point");
        sheet.set(NEGATION_BUCKET, Category::Edges, "style", "dashed");
        sheet
    }

    pub fn set(
        &mut self,
        subgraph: &str,
        category: Category,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.subgraphs
            .entry(subgraph.to_string())
            .or_default()
            .get_mut(category)
            .insert(key.into(), value.into());
    }

    pub fn get(&self, subgraph: &str) -> Option<&SubgraphStyle> {
        self.subgraphs.get(subgraph)
    }

    pub fn attributes(&self, subgraph: &str, category: Category) -> Option<&Attributes> {
        self.subgraphs.get(subgraph).map(|s| s.get(category))
    }

    pub fn value(&self, subgraph: &str, category: Category, key: &str) -> Option<&str> {
        self.attributes(subgraph, category)?
            .get(key)
            .map(String::as_str)
    }

    /// Detach a subgraph's style, leaving it unstyled.
    pub fn take(&mut self, subgraph: &str) -> Option<SubgraphStyle> {
        self.subgraphs.remove(subgraph)
    }

    /// Replace a subgraph's style wholesale.
    pub fn put(&mut self, subgraph: &str, style: SubgraphStyle) {
        if style.is_empty() {
            self.subgraphs.remove(subgraph);
        } else {
            self.subgraphs.insert(subgraph.to_string(), style);
        }
    }

    /// Layer `other` over this sheet; its values win.
    pub fn merge(&mut self, other: &StyleSheet) {
        for (name, style) in &other.subgraphs {
            for category in Category::ALL {
                for (key, value) in style.get(category) {
                    self.set(name, category, key.clone(), value.clone());
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.subgraphs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.subgraphs.values().all(SubgraphStyle::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubgraphStyle)> {
        self.subgraphs.iter().map(|(name, style)| (name.as_str(), style))
    }

    /// Read a style sheet, skipping (and returning) every malformed line.
    ///
    /// Blank lines and `%` comment lines are ignored silently.
    pub fn parse(text: &str) -> (StyleSheet, Vec<StyleParseError>) {
        let mut sheet = StyleSheet::new();
        let mut errors = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            match parse_directive(raw, i + 1) {
                Ok(Some(directive)) => {
                    for (key, value) in directive.attributes {
                        sheet.set(&directive.subgraph, directive.category, key, value);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("{}", e);
                    errors.push(e);
                }
            }
        }
        (sheet, errors)
    }
}

/// One parsed `<subgraph>.<category>:<key>=<value>,...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDirective {
    pub subgraph: String,
    pub category: Category,
    pub attributes: Vec<(String, String)>,
}

/// Parse one line; `Ok(None)` for blank and comment lines.
pub fn parse_directive(raw: &str, line: usize) -> Result<Option<StyleDirective>, StyleParseError> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('%') {
        return Ok(None);
    }
    let fail = |reason: &str| StyleParseError {
        line,
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let (target, assignments) = text.split_once(':').ok_or_else(|| fail("missing ':'"))?;
    let (subgraph, category) = target
        .trim()
        .split_once('.')
        .ok_or_else(|| fail("missing '.' between subgraph and category"))?;
    let subgraph = subgraph.trim();
    if subgraph.is_empty() {
        return Err(fail("empty subgraph name"));
    }
    let category: Category = category
        .trim()
        .parse()
        .map_err(|e: UnknownCategoryError| fail(&e.to_string()))?;

    let mut attributes = Vec::new();
    for pair in assignments.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| fail("expected key=value"))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(fail("bad attribute name"));
        }
        if value.is_empty() {
            return Err(fail("empty attribute value"));
        }
        attributes.push((key.to_string(), value.to_string()));
    }

    Ok(Some(StyleDirective {
        subgraph: subgraph.to_string(),
        category,
        attributes,
    }))
}
