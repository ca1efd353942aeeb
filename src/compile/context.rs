//! Compilation context: the counters shared by one compilation unit.

use crate::syntax::{Atom, Literal, Rule, Term, ANON_PREFIX};

/// State threaded through parsing and compilation of one program.
///
/// Both counters are monotonic for the lifetime of the context: every `_`
/// gets a fresh `ANON<k>` and every rule a fresh index, even across several
/// source files compiled into the same program.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    anon_counter: usize,
    rule_counter: usize,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh synthetic variable standing in for one `_` occurrence.
    pub fn fresh_anon(&mut self) -> Term {
        let term = Term::var(format!("{}{}", ANON_PREFIX, self.anon_counter));
        self.anon_counter += 1;
        term
    }

    /// Turn a raw argument token into a term, renaming anonymous placeholders.
    pub fn term(&mut self, text: &str) -> Term {
        if text == "_" {
            self.fresh_anon()
        } else {
            Term::classify(text)
        }
    }

    /// Build a rule, assigning it the next rule index.
    pub fn rule(&mut self, head: Atom, body: Vec<Literal>) -> Rule {
        let index = self.rule_counter;
        self.rule_counter += 1;
        Rule::new(head, body, index)
    }

    /// Number of anonymous variables handed out so far.
    pub fn anon_count(&self) -> usize {
        self.anon_counter
    }

    /// Number of rules indexed so far.
    pub fn rule_count(&self) -> usize {
        self.rule_counter
    }
}
