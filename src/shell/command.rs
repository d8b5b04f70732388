//! Shell command parsing
//!
//! Turns one input line into a [`Command`].

use std::fmt;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { key: String },
    Put { key: String, value: String },
    Del { key: String },
    Clear,
    Stats,
    Save { path: String },
    Load { path: String },
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str, argument: &'static str },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::Unknown(word) => write!(f, "unknown command '{}' (try HELP)", word),
            Self::MissingArgument { command, argument } => {
                write!(f, "{} requires a {}", command, argument)
            }
        }
    }
}

impl Command {
    /// Parses a line. The command word is case-insensitive; a `PUT` value is
    /// the rest of the line after the key, inner whitespace preserved.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (word, rest) = split_word(line);
        if word.is_empty() {
            return Err(ParseError::Empty);
        }

        match word.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get {
                key: required(rest, "GET", "key")?,
            }),
            "PUT" | "SET" => {
                let (key, value) = split_word(rest);
                if key.is_empty() {
                    return Err(ParseError::MissingArgument {
                        command: "PUT",
                        argument: "key",
                    });
                }
                Ok(Self::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "DEL" | "DELETE" => Ok(Self::Del {
                key: required(rest, "DEL", "key")?,
            }),
            "CLEAR" => Ok(Self::Clear),
            "STATS" => Ok(Self::Stats),
            "SAVE" => Ok(Self::Save {
                path: required(rest, "SAVE", "path")?,
            }),
            "LOAD" => Ok(Self::Load {
                path: required(rest, "LOAD", "path")?,
            }),
            "HELP" | "?" => Ok(Self::Help),
            "QUIT" | "EXIT" => Ok(Self::Quit),
            _ => Err(ParseError::Unknown(word.to_string())),
        }
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

fn required(rest: &str, command: &'static str, argument: &'static str) -> Result<String, ParseError> {
    let (word, _) = split_word(rest);
    if word.is_empty() {
        Err(ParseError::MissingArgument { command, argument })
    } else {
        Ok(word.to_string())
    }
}
