//! Interactive debugging shell.

#[allow(clippy::module_inception)]
mod repl;

pub use repl::{Repl, ReplError, Reply};
