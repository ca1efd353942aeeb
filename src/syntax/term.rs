//! Datalog terms: variables and constants.

use std::fmt;

/// Prefix of the synthetic variables that replace anonymous `_` placeholders.
pub const ANON_PREFIX: &str = "ANON";

/// A positional argument of an atom.
///
/// Datalog naming conventions decide the kind:
/// - Variables: `X`, `Person`, `_Tmp` (uppercase or underscore first)
/// - Constants: `socrates`, `42`, `"a string"`
///
/// Anonymous placeholders (`_`) never reach this type: the compilation context
/// replaces every occurrence with a fresh `ANON<k>` variable while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Var(String),
    Const(String),
}

impl Term {
    /// Create a variable term.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    /// Create a constant term.
    pub fn constant(name: impl Into<String>) -> Self {
        Term::Const(name.into())
    }

    /// Classify a raw token as a variable or constant.
    ///
    /// Does not handle the anonymous placeholder; see
    /// [`CompileContext::term`](crate::compile::CompileContext::term).
    pub fn classify(text: &str) -> Self {
        match text.chars().next() {
            Some(c) if c.is_ascii_uppercase() || c == '_' => Term::Var(text.to_string()),
            _ => Term::Const(text.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Term::Var(name) | Term::Const(name) => name,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// True for the synthetic variables introduced for `_`.
    pub fn is_anonymous(&self) -> bool {
        match self {
            Term::Var(name) => name
                .strip_prefix(ANON_PREFIX)
                .is_some_and(|k| !k.is_empty() && k.chars().all(|c| c.is_ascii_digit())),
            Term::Const(_) => false,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
