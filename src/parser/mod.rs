//! Parser for Datalog rule syntax.

mod ast;
mod lexer;
mod parser;

pub use ast::Statement;
pub use lexer::{LexError, Lexer, Token};
pub use parser::{parse_program, parse_statement_str, ParseError, ParseErrors};
