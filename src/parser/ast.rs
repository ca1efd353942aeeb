//! AST types for Datalog source programs.

use std::fmt;

use crate::syntax::{Atom, Rule};

/// A statement in a Datalog source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A rule `head :- body.`, already carrying its program-wide index
    Rule(Rule),
    /// A fact `p(a,b).`, passed through to the rewritten program unchanged
    Fact(Atom),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Rule(rule) => write!(f, "{}", rule),
            Statement::Fact(atom) => write!(f, "{}.", atom),
        }
    }
}
