//! Rule rewriting: every rule is split through an auxiliary predicate.
//!
//! `anc(X,Z) :- anc(X,Y), anc(Y,Z).` with index 0 becomes
//!
//! ```text
//! anc(X,Z) :- aux_anc_0(X,Z,Y).
//! aux_anc_0(X,Z,Y) :- anc(X,Y), anc(Y,Z).
//! ```
//!
//! and the rule index records `aux_anc_0 -> [anc[0,1], anc[0,2], anc[2,1]]`,
//! enough to turn any ground `aux_anc_0(...)` back into the head and body
//! atoms it justifies.

use std::collections::HashMap;

use log::{debug, info};

use super::context::CompileContext;
use super::rule_index::{AtomRecipe, RuleIndex};
use crate::parser::{parse_program, ParseErrors, Statement};
use crate::syntax::{aux_predicate_name, Atom, Literal, Rule, Term};

/// The rewritten form of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub aux_predicate: String,
    /// The auxiliary atom over every distinct term of the rule
    pub aux_atom: Atom,
    /// Head recipe followed by one recipe per body literal
    pub recipe: Vec<AtomRecipe>,
    /// `head :- aux.` and `aux :- body.` on two lines
    pub text: String,
}

impl CompiledRule {
    /// The auxiliary atom as written in the rewritten program.
    pub fn aux_decl(&self) -> String {
        self.aux_atom.to_string()
    }
}

/// Rewrite one rule through its auxiliary predicate.
///
/// Terms get auxiliary positions in first-seen order, scanning the head and
/// then each body literal left to right, so output is reproducible.
pub fn compile_rule(head: &Atom, body: &[Literal], index: usize) -> CompiledRule {
    let aux_predicate = aux_predicate_name(&head.predicate, index);

    let mut all_terms: Vec<Term> = Vec::new();
    let mut positions: HashMap<Term, usize> = HashMap::new();
    let atoms = std::iter::once(head).chain(body.iter().map(|lit| &lit.atom));
    for atom in atoms {
        for term in &atom.terms {
            if !positions.contains_key(term) {
                positions.insert(term.clone(), all_terms.len());
                all_terms.push(term.clone());
            }
        }
    }

    let encode = |atom: &Atom| -> Vec<usize> {
        atom.terms.iter().map(|t| positions[t]).collect()
    };

    let mut recipe = Vec::with_capacity(body.len() + 1);
    recipe.push(AtomRecipe::new(head.predicate.clone(), encode(head)));
    for lit in body {
        recipe.push(AtomRecipe::new(lit.marked_predicate(), encode(&lit.atom)));
    }

    let aux_atom = Atom::new(aux_predicate.clone(), all_terms);
    let body_text = body
        .iter()
        .map(|lit| lit.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let text = format!(
        "{} :- {}.\n{} :- {}.",
        head, aux_atom, aux_atom, body_text
    );

    CompiledRule {
        aux_predicate,
        aux_atom,
        recipe,
        text,
    }
}

impl Rule {
    pub fn compile(&self) -> CompiledRule {
        compile_rule(&self.head, &self.body, self.index)
    }
}

/// A rewritten program ready for the external evaluator, plus its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledProgram {
    pub text: String,
    pub index: RuleIndex,
    pub rules: usize,
    pub facts: usize,
}

/// Compiles one or more sources into a single program.
///
/// All sources share one [`CompileContext`], so anonymous variables and
/// auxiliary predicate names stay unique across files.
#[derive(Debug, Default)]
pub struct Compiler {
    ctx: CompileContext,
    program: CompiledProgram,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &CompileContext {
        &self.ctx
    }

    /// Parse and rewrite one source text.
    ///
    /// A source with any malformed statement contributes nothing; every error
    /// found in it is returned.
    pub fn add_source(&mut self, source: &str) -> Result<(), ParseErrors> {
        let statements = parse_program(source, &mut self.ctx)?;
        for stmt in statements {
            self.add_statement(stmt);
        }
        Ok(())
    }

    pub fn add_statement(&mut self, stmt: Statement) {
        match stmt {
            Statement::Fact(atom) => {
                self.program.text.push_str(&format!("{}.\n", atom));
                self.program.facts += 1;
            }
            Statement::Rule(rule) => {
                let compiled = rule.compile();
                debug!(
                    "compiled rule {} as {} ({} terms)",
                    rule.index,
                    compiled.aux_predicate,
                    compiled.aux_atom.arity()
                );
                self.program.text.push_str(&compiled.text);
                self.program.text.push('\n');
                self.program
                    .index
                    .insert(compiled.aux_predicate, compiled.recipe);
                self.program.rules += 1;
            }
        }
    }

    pub fn finish(self) -> CompiledProgram {
        info!(
            "compiled {} rules and {} facts",
            self.program.rules, self.program.facts
        );
        self.program
    }
}

/// Compile a single source text.
pub fn compile_program(source: &str) -> Result<CompiledProgram, ParseErrors> {
    let mut compiler = Compiler::new();
    compiler.add_source(source)?;
    Ok(compiler.finish())
}
