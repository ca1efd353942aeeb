//! Syntax types for Datalog terms, atoms, literals and rules.

mod literal;
mod rule;
mod term;

pub use literal::{split_negation, Atom, Literal, NEGATION_MARKER};
pub use rule::{aux_predicate_name, Rule, AUX_PREFIX};
pub use term::{Term, ANON_PREFIX};
