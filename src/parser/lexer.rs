//! Lexer for Datalog rule syntax.

/// Token types for Datalog syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Names: predicates, variables, constants, numbers
    Identifier(String),

    // Quoted constant, kept with its quotes
    StringLit(String),

    // Reserved word
    Not, // not

    // Delimiters
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Period,    // .
    ColonDash, // :-

    // End of input
    Eof,
}

impl Token {
    /// Human-readable form used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::StringLit(s) => format!("string {}", s),
            Token::Not => "'not'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Period => "'.'".to_string(),
            Token::ColonDash => "':-'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Lexer state.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    /// Location of the first character of the most recent token
    token_line: usize,
    token_column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Line of the most recently returned token.
    pub fn token_line(&self) -> usize {
        self.token_line
    }

    /// Column of the most recently returned token.
    pub fn token_column(&self) -> usize {
        self.token_column
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();
        self.token_line = self.line;
        self.token_column = self.column;

        let remaining = &self.input[self.position..];
        let ch = match remaining.chars().next() {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        match ch {
            '(' => {
                self.advance(1);
                return Ok(Token::LParen);
            }
            ')' => {
                self.advance(1);
                return Ok(Token::RParen);
            }
            ',' => {
                self.advance(1);
                return Ok(Token::Comma);
            }
            '.' => {
                self.advance(1);
                return Ok(Token::Period);
            }
            ':' if remaining.starts_with(":-") => {
                self.advance(2);
                return Ok(Token::ColonDash);
            }
            '"' => {
                return self.lex_string();
            }
            _ => {}
        }

        if ch.is_ascii_alphanumeric() || ch == '_' {
            let name = self.lex_identifier();
            if name == "not" {
                return Ok(Token::Not);
            }
            return Ok(Token::Identifier(name));
        }

        // Consume the offending character so a caller can resume after the error.
        self.advance(ch.len_utf8());
        Err(LexError {
            message: format!("illegal character '{}'", ch),
            line: self.token_line,
            column: self.token_column,
        })
    }

    /// Peek at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token, LexError> {
        let saved = (
            self.position,
            self.line,
            self.column,
            self.token_line,
            self.token_column,
        );

        let token = self.next_token();

        self.position = saved.0;
        self.line = saved.1;
        self.column = saved.2;
        self.token_line = saved.3;
        self.token_column = saved.4;

        token
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self, bytes: usize) {
        let consumed = &self.input[self.position..self.position + bytes];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += bytes;
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance(ch.len_utf8());
            } else if ch == '%' {
                // Skip to end of line
                while let Some(c) = self.current_char() {
                    self.advance(c.len_utf8());
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn lex_identifier(&mut self) -> String {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.position].to_string()
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        // Skip opening quote
        self.advance(1);

        while let Some(ch) = self.current_char() {
            if ch == '"' {
                self.advance(1);
                return Ok(Token::StringLit(self.input[start..self.position].to_string()));
            } else if ch == '\n' {
                break;
            } else {
                self.advance(ch.len_utf8());
            }
        }

        Err(LexError {
            message: "unterminated string literal".to_string(),
            line: self.token_line,
            column: self.token_column,
        })
    }
}

/// Lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
