//! Atoms and signed body literals.

use std::fmt;

use super::term::Term;

/// Marker carried by negated literals in rewritten rule text and rule-index recipes.
pub const NEGATION_MARKER: &str = "not ";

/// An atom (predicate application).
///
/// Term order is fixed at creation; two atoms with the same predicate and the
/// same positional terms are equal.
///
/// Examples:
/// - `anc(X,Y)` - binary predicate
/// - `edge(a,ANON0)` - anonymous placeholder after renaming
/// - `halt` - 0-ary predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub predicate: String,
    pub terms: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Atom {
            predicate: predicate.into(),
            terms,
        }
    }

    /// Create a 0-ary atom.
    pub fn prop(predicate: impl Into<String>) -> Self {
        Atom::new(predicate, vec![])
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if !self.terms.is_empty() {
            write!(f, "(")?;
            for (i, term) in self.terms.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", term)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// A body literal is a possibly negated atom.
///
/// - Positive literal: `parent(X,Y)`
/// - Negative literal: `not parent(X,Y)` (negation as failure)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    /// True if positive, false if negated
    pub positive: bool,
    /// The underlying atom
    pub atom: Atom,
}

impl Literal {
    pub fn positive(atom: Atom) -> Self {
        Literal {
            positive: true,
            atom,
        }
    }

    pub fn negative(atom: Atom) -> Self {
        Literal {
            positive: false,
            atom,
        }
    }

    /// Shorthand for a positive literal.
    pub fn pos(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Literal::positive(Atom::new(predicate, terms))
    }

    /// Shorthand for a negative literal.
    pub fn neg(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Literal::negative(Atom::new(predicate, terms))
    }

    /// Predicate name as recorded in a rule-index recipe: negated literals
    /// keep the `not ` marker so replay can divert them to the negation classes.
    pub fn marked_predicate(&self) -> String {
        if self.positive {
            self.atom.predicate.clone()
        } else {
            format!("{}{}", NEGATION_MARKER, self.atom.predicate)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            write!(f, "{}", NEGATION_MARKER)?;
        }
        write!(f, "{}", self.atom)
    }
}

/// Strip the negation marker from a recipe predicate.
///
/// Returns the bare predicate and whether the marker was present.
pub fn split_negation(predicate: &str) -> (&str, bool) {
    match predicate.strip_prefix(NEGATION_MARKER) {
        Some(bare) => (bare.trim_start(), true),
        None => (predicate, false),
    }
}
