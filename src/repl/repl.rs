//! REPL implementation.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::session::{Session, SessionError};
use crate::style::{parse_directive, StyleParseError};
use crate::trace::TraceMode;

const PROMPT: &str = "gddb> ";

const HELP: &str = "\
commands:
  set <subgraph> <graph|nodes|edges> <attr> <value>
  set <subgraph>.<category>:<attr>=<value>[,...]
  auto                          toggle redraw after every change
  show <pred>... / hide <pred>...
  add <pred>... / remove <pred>...
  clear                         drop all styles
  layout [dot|neato|twopi|circo|fdp|sfdp]
  format [pdf|png|gif|jpeg|ps]
  ls -s|-subgraphs / ls -a|-attributes
  draw [format]
  trace [-f|-full] <atom> [color]
  untrace
  help
  quit";

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Style(#[from] StyleParseError),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
}

/// Split a ground atom off the front of `text`, dropping whitespace outside
/// quotes so `anc(1, 3)` and `anc(1,3)` name the same node.
fn take_atom(text: &str) -> (String, &str) {
    let text = text.trim_start();
    let mut atom = String::new();
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        if quoted {
            atom.push(c);
            if c == '"' {
                quoted = false;
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() => {
                if depth == 0 && !text[i..].trim_start().starts_with('(') {
                    return (atom, &text[i..]);
                }
                continue;
            }
            _ => {}
        }
        atom.push(c);
    }
    (atom, "")
}

/// What the loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Interactive command shell over a [`Session`].
pub struct Repl {
    session: Session,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Repl { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Process a line of input.
    pub fn process_line(&mut self, line: &str) -> Result<Reply, ReplError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = tokens.split_first() else {
            return Ok(Reply::Output(String::new()));
        };

        let output = match command {
            "quit" | "exit" => return Ok(Reply::Quit),
            "trace" => {
                let rest = line.trim_start()[command.len()..].trim();
                let output = self.trace(rest)?;
                self.redraw(output)?
            }
            "help" | "?" => HELP.to_string(),
            "auto" => {
                if self.session.toggle_auto() {
                    "auto-redraw on".to_string()
                } else {
                    "auto-redraw off".to_string()
                }
            }
            "ls" => self.list(args)?,
            "draw" => {
                let path = match args {
                    [] => self.session.draw()?,
                    [format] => self.session.draw_as(format)?,
                    _ => return Err(ReplError::Usage("draw [format]")),
                };
                format!("wrote {}", path.display())
            }
            _ => {
                let output = self.change(command, args)?;
                self.redraw(output)?
            }
        };
        Ok(Reply::Output(output))
    }

    /// Append a redraw to `output` when auto-redraw is on.
    fn redraw(&mut self, mut output: String) -> Result<String, ReplError> {
        if self.session.auto() {
            let path = self.session.draw()?;
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&format!("wrote {}", path.display()));
        }
        Ok(output)
    }

    /// `trace [-f|-full] <atom> [color]`, where the atom may contain spaces.
    fn trace(&mut self, rest: &str) -> Result<String, ReplError> {
        const USAGE: &str = "trace [-f|-full] <atom> [color]";
        let (mode, rest) = match rest.split_once(char::is_whitespace) {
            Some(("-f" | "-full", tail)) => (TraceMode::Full, tail),
            _ if rest == "-f" || rest == "-full" => return Err(ReplError::Usage(USAGE)),
            _ => (TraceMode::Partial, rest),
        };
        let (atom, tail) = take_atom(rest);
        let words: Vec<&str> = tail.split_whitespace().collect();
        let color = match words[..] {
            [] => None,
            [color] => Some(color),
            _ => return Err(ReplError::Usage(USAGE)),
        };
        if atom.is_empty() {
            return Err(ReplError::Usage(USAGE));
        }
        let active = self.session.trace(&atom, mode, color)?;
        Ok(format!(
            "{} trace of {}: {} nodes, {} edges, {} back edges",
            active.mode,
            active.trace.root,
            active.trace.nodes.len(),
            active.trace.edges.len(),
            active.trace.back_edges.len()
        ))
    }

    /// Commands that change what is drawn.
    fn change(&mut self, command: &str, args: &[&str]) -> Result<String, ReplError> {
        let session = &mut self.session;
        match command {
            "set" => match args {
                [directive] => {
                    let parsed = parse_directive(directive, 1)?
                        .ok_or(ReplError::Usage("set <subgraph>.<category>:<attr>=<value>"))?;
                    for (key, value) in &parsed.attributes {
                        session.set_style(&parsed.subgraph, parsed.category.as_str(), key, value)?;
                    }
                    Ok(String::new())
                }
                [subgraph, category, key, value] => {
                    session.set_style(subgraph, category, key, value)?;
                    Ok(String::new())
                }
                _ => Err(ReplError::Usage("set <subgraph> <graph|nodes|edges> <attr> <value>")),
            },
            "show" | "hide" | "add" | "remove" => {
                if args.is_empty() {
                    return Err(ReplError::Usage("show|hide|add|remove <pred>..."));
                }
                for name in args {
                    match command {
                        "show" => session.show(name)?,
                        "hide" => session.hide(name)?,
                        "add" => session.add(name)?,
                        _ => session.remove(name)?,
                    }
                }
                Ok(String::new())
            }
            "clear" => {
                session.clear_styles();
                Ok(String::new())
            }
            "layout" => match args {
                [] => Ok(format!("layout: {}", session.config().layout)),
                [layout] => Ok(format!("layout: {}", session.set_layout(layout)?)),
                _ => Err(ReplError::Usage("layout <engine>")),
            },
            "format" => match args {
                [] => Ok(format!("format: {}", session.config().format)),
                [format] => Ok(format!("format: {}", session.set_format(format)?)),
                _ => Err(ReplError::Usage("format <fmt>")),
            },
            "untrace" => {
                if session.untrace() {
                    Ok(String::new())
                } else {
                    Ok("no active trace".to_string())
                }
            }
            other => Err(ReplError::UnknownCommand(other.to_string())),
        }
    }

    fn list(&self, args: &[&str]) -> Result<String, ReplError> {
        match args {
            [] | ["-s"] | ["-subgraphs"] => {
                let lines: Vec<String> = self
                    .session
                    .subgraphs()
                    .into_iter()
                    .map(|name| {
                        let mut line = name.to_string();
                        if self.session.is_hidden(name) {
                            line.push_str(" (hidden)");
                        }
                        if self.session.removed().contains(name) {
                            line.push_str(" (removed)");
                        }
                        line
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
            ["-a"] | ["-attributes"] => {
                let mut lines = Vec::new();
                for (name, style) in self.session.styles().iter() {
                    for category in crate::style::Category::ALL {
                        let attrs = style.get(category);
                        if attrs.is_empty() {
                            continue;
                        }
                        let pairs: Vec<String> =
                            attrs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                        lines.push(format!("{}.{}:{}", name, category, pairs.join(",")));
                    }
                }
                Ok(lines.join("\n"))
            }
            _ => Err(ReplError::Usage("ls -s|-subgraphs|-a|-attributes")),
        }
    }

    /// Run over arbitrary input until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write!(output, "{}", PROMPT)?;
        output.flush()?;
        for line in input.lines() {
            let line = line?;
            match self.process_line(&line) {
                Ok(Reply::Quit) => return Ok(()),
                Ok(Reply::Output(text)) => {
                    if !text.is_empty() {
                        writeln!(output, "{}", text)?;
                    }
                }
                Err(e) => writeln!(output, "error: {}", e)?,
            }
            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }

    /// Run the REPL on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }
}
