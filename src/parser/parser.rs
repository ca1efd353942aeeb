//! Recursive-descent parser for Datalog rules and facts.
//!
//! Grammar:
//!
//! ```text
//! program   := statement*
//! statement := atom ( ':-' literal ( ',' literal )* )? '.'
//! literal   := 'not'? atom
//! atom      := IDENT ( '(' ( term ( ',' term )* )? ')' )?
//! term      := IDENT | STRING
//! ```

use std::fmt;

use thiserror::Error;

use super::ast::Statement;
use super::lexer::{LexError, Lexer, Token};
use crate::compile::CompileContext;
use crate::syntax::{Atom, Literal, Term, ANON_PREFIX, AUX_PREFIX};

/// Parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
            column,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// Every error found in one source text, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn errors(&self) -> &[ParseError] {
        &self.0
    }

    /// Prefix every message with a file name.
    pub fn in_file(&self, file: &str) -> String {
        self.0
            .iter()
            .map(|e| format!("{}:{}", file, e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// Parser state.
struct Parser<'a, 'c> {
    lexer: Lexer<'a>,
    ctx: &'c mut CompileContext,
    current: Token,
    line: usize,
    column: usize,
}

impl<'a, 'c> Parser<'a, 'c> {
    fn new(input: &'a str, ctx: &'c mut CompileContext) -> Self {
        // `current` is filled by the first `advance`.
        Parser {
            lexer: Lexer::new(input),
            ctx,
            current: Token::Eof,
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token();
        self.line = self.lexer.token_line();
        self.column = self.lexer.token_column();
        let next = match next {
            Ok(tok) => tok,
            Err(e) => {
                // Leave a harmless token behind so recovery can continue.
                self.current = Token::Comma;
                return Err(e.into());
            }
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current == expected {
            self.advance()?;
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                self.current.describe()
            )))
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError::new(message, self.line, self.column)
    }

    /// Skip past the next '.', or to end of input.
    fn recover(&mut self, errors: &mut Vec<ParseError>) {
        loop {
            match self.current {
                Token::Eof => return,
                Token::Period => {
                    if let Err(e) = self.advance() {
                        errors.push(e);
                        continue;
                    }
                    return;
                }
                _ => {
                    if let Err(e) = self.advance() {
                        errors.push(e);
                    }
                }
            }
        }
    }
}

/// Parse a whole program, collecting every malformed statement.
///
/// Anonymous variables and rule indices are drawn from `ctx`, so parsing
/// several files with the same context yields one consistent program.
pub fn parse_program(
    source: &str,
    ctx: &mut CompileContext,
) -> Result<Vec<Statement>, ParseErrors> {
    let mut errors = Vec::new();
    let mut parser = Parser::new(source, ctx);
    if let Err(e) = parser.advance() {
        errors.push(e);
        parser.recover(&mut errors);
    }

    let statements = parse_statements(&mut parser, &mut errors);
    if errors.is_empty() {
        Ok(statements)
    } else {
        Err(ParseErrors(errors))
    }
}

fn parse_statements(parser: &mut Parser, errors: &mut Vec<ParseError>) -> Vec<Statement> {
    let mut statements = Vec::new();
    while parser.current != Token::Eof {
        match parse_statement(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(e) => {
                errors.push(e);
                parser.recover(errors);
            }
        }
    }
    statements
}

/// Parse a single rule or fact, e.g. for the interactive shell.
pub fn parse_statement_str(
    source: &str,
    ctx: &mut CompileContext,
) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(source, ctx);
    parser.advance()?;
    let stmt = parse_statement(&mut parser)?;
    if parser.current != Token::Eof {
        return Err(parser.error(format!(
            "unexpected {} after statement",
            parser.current.describe()
        )));
    }
    Ok(stmt)
}

fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let head = parse_atom(parser)?;

    match parser.current {
        Token::Period => {
            parser.advance()?;
            Ok(Statement::Fact(head))
        }
        Token::ColonDash => {
            parser.advance()?;
            let body = parse_body(parser)?;
            if !matches!(parser.current, Token::Period) {
                return Err(parser.error(format!(
                    "expected ',' or '.' after body literal, found {}",
                    parser.current.describe()
                )));
            }
            parser.advance()?;
            Ok(Statement::Rule(parser.ctx.rule(head, body)))
        }
        _ => Err(parser.error(format!(
            "expected ':-' or '.' after {}, found {}",
            head,
            parser.current.describe()
        ))),
    }
}

fn parse_body(parser: &mut Parser) -> Result<Vec<Literal>, ParseError> {
    let mut literals = vec![parse_literal(parser)?];
    while matches!(parser.current, Token::Comma) {
        parser.advance()?;
        literals.push(parse_literal(parser)?);
    }
    Ok(literals)
}

fn parse_literal(parser: &mut Parser) -> Result<Literal, ParseError> {
    // Check for negation
    let positive = if matches!(parser.current, Token::Not) {
        parser.advance()?;
        false
    } else {
        true
    };

    let atom = parse_atom(parser)?;
    if positive {
        Ok(Literal::positive(atom))
    } else {
        Ok(Literal::negative(atom))
    }
}

/// `pred`, `pred()` or `pred(t1, ..., tn)`. Each `_` gets a fresh name from the
/// shared context.
fn parse_atom(parser: &mut Parser) -> Result<Atom, ParseError> {
    let predicate = match &parser.current {
        Token::Identifier(name) => name.clone(),
        other => {
            return Err(parser.error(format!("expected predicate name, found {}", other.describe())))
        }
    };
    if !predicate.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(parser.error(format!(
            "predicate '{}' must start with a lowercase letter",
            predicate
        )));
    }
    if predicate.starts_with(AUX_PREFIX) {
        return Err(parser.error(format!(
            "predicate '{}' uses the reserved prefix '{}'",
            predicate, AUX_PREFIX
        )));
    }
    parser.advance()?;

    if !matches!(parser.current, Token::LParen) {
        return Ok(Atom::prop(predicate));
    }
    parser.advance()?;

    let mut terms = Vec::new();
    if !matches!(parser.current, Token::RParen) {
        terms.push(parse_term(parser)?);
        while matches!(parser.current, Token::Comma) {
            parser.advance()?;
            terms.push(parse_term(parser)?);
        }
    }
    parser.expect(Token::RParen)?;
    Ok(Atom::new(predicate, terms))
}

fn parse_term(parser: &mut Parser) -> Result<Term, ParseError> {
    match &parser.current {
        Token::Identifier(name) => {
            let name = name.clone();
            if Term::classify(&name).is_anonymous() {
                return Err(parser.error(format!(
                    "variable '{}' uses the reserved prefix '{}'",
                    name, ANON_PREFIX
                )));
            }
            parser.advance()?;
            Ok(parser.ctx.term(&name))
        }
        Token::StringLit(s) => {
            let s = s.clone();
            parser.advance()?;
            Ok(Term::constant(s))
        }
        other => Err(parser.error(format!("expected term, found {}", other.describe()))),
    }
}
