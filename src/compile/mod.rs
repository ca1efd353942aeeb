//! Rule compiler: rewrites rules through auxiliary "firing" predicates.

mod compiler;
mod context;
mod rule_index;

pub use compiler::{compile_program, compile_rule, CompiledProgram, CompiledRule, Compiler};
pub use context::CompileContext;
pub use rule_index::{ground_atom, AtomRecipe, RuleIndex};
