//! Rules: a head atom derived from a conjunction of body literals.

use std::fmt;

use super::literal::{Atom, Literal};

/// Prefix shared by every auxiliary predicate.
pub const AUX_PREFIX: &str = "aux_";

/// A Datalog rule `head :- body.`
///
/// `index` is assigned by the compilation context, one counter per compiled
/// program, so that auxiliary predicate names never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub head: Atom,
    pub body: Vec<Literal>,
    pub index: usize,
}

impl Rule {
    pub fn new(head: Atom, body: Vec<Literal>, index: usize) -> Self {
        Rule { head, body, index }
    }

    /// Name of the auxiliary predicate reifying firings of this rule.
    pub fn aux_predicate(&self) -> String {
        aux_predicate_name(&self.head.predicate, self.index)
    }
}

/// `aux_<head>_<index>`
pub fn aux_predicate_name(head_predicate: &str, index: usize) -> String {
    format!("{}{}_{}", AUX_PREFIX, head_predicate, index)
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.head)?;
        for (i, lit) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ".")
    }
}
