//! Trace-script parsing
//!
//! A trace script is the program the binary executes: one heap operation
//! per line, `#` comments and blank lines ignored.
//!
//! ```text
//! # grab one page, carve it up, put it back
//! init 4096
//! p = alloc 20
//! q = alloc 100
//! dump
//! free p
//! free q
//! dump
//! ```
//!
//! `free <name> !` releases the pointer but keeps the name bound, which is
//! how a script demonstrates double-free rejection:
//!
//! ```text
//! free p !
//! free p !        # rejected, logged, execution continues
//! ```
//!
//! Parsing is strict and up-front: any malformed line aborts with a
//! [`ParseError`] before anything executes. Runtime failures (double free,
//! out of memory) are a session concern, not a parse concern.

pub mod session;

pub use session::{LogLine, Pointer, Session, Snapshot};

use std::fmt;

/// One heap operation from a trace script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `init <bytes>` — create the heap. Valid once per session.
    Init { size: usize },
    /// `<name> = alloc <bytes>` — allocate and bind the payload address.
    Alloc { name: String, size: usize },
    /// `free <name>` — release the bound pointer. With `keep_binding`
    /// (`free <name> !`) the name stays bound afterwards.
    Free { name: String, keep_binding: bool },
    /// `dump` — append the block table to the session log.
    Dump,
}

/// A parsed command together with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub command: Command,
    pub line: usize,
}

/// A malformed trace-script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a whole script into steps.
pub fn parse_script(source: &str) -> Result<Vec<Step>, ParseError> {
    let mut steps = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;

        // Strip trailing comments, then surrounding whitespace
        let text = match raw_line.split_once('#') {
            Some((before, _)) => before,
            None => raw_line,
        }
        .trim();

        if text.is_empty() {
            continue;
        }

        let command = parse_line(text).map_err(|message| ParseError { message, line })?;
        steps.push(Step { command, line });
    }

    Ok(steps)
}

fn parse_line(text: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    match tokens.as_slice() {
        ["init", size] => Ok(Command::Init {
            size: parse_size(size)?,
        }),
        ["dump"] => Ok(Command::Dump),
        ["free", name] => Ok(Command::Free {
            name: parse_name(name)?,
            keep_binding: false,
        }),
        ["free", name, "!"] => Ok(Command::Free {
            name: parse_name(name)?,
            keep_binding: true,
        }),
        [name, "=", "alloc", size] => Ok(Command::Alloc {
            name: parse_name(name)?,
            size: parse_size(size)?,
        }),
        _ => Err(format!("unrecognized command: '{}'", text)),
    }
}

fn parse_size(token: &str) -> Result<usize, String> {
    token
        .parse::<usize>()
        .map_err(|_| format!("invalid size: '{}' (expected a non-negative integer)", token))
}

fn parse_name(token: &str) -> Result<String, String> {
    let mut chars = token.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if starts_ok && rest_ok {
        Ok(token.to_string())
    } else {
        Err(format!("invalid pointer name: '{}'", token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let source = r#"
            # a comment
            init 4096
            p = alloc 20
            free p
            free p !
            dump
        "#;

        let steps = parse_script(source).expect("parse failed");
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].command, Command::Init { size: 4096 });
        assert_eq!(
            steps[1].command,
            Command::Alloc {
                name: "p".to_string(),
                size: 20
            }
        );
        assert_eq!(
            steps[2].command,
            Command::Free {
                name: "p".to_string(),
                keep_binding: false
            }
        );
        assert_eq!(
            steps[3].command,
            Command::Free {
                name: "p".to_string(),
                keep_binding: true
            }
        );
        assert_eq!(steps[4].command, Command::Dump);
        // Line numbers point at the source, not the step index
        assert_eq!(steps[0].line, 3);
    }

    #[test]
    fn test_trailing_comments_are_stripped() {
        let steps = parse_script("init 4096   # one page").expect("parse failed");
        assert_eq!(steps[0].command, Command::Init { size: 4096 });
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(parse_script("allocate 20").is_err());
        assert!(parse_script("p = alloc").is_err());
        assert!(parse_script("init -5").is_err());
        assert!(parse_script("free 123").is_err());

        let err = parse_script("init 4096\nbogus").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
