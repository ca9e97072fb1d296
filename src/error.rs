//! Error types for parsing and summarizing
//!
//! Bad access and bad content are different variants so callers can route
//! them differently. Rendering an already-parsed tree never fails.

use memchr::memchr_iter;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be opened or read
    #[error("Error reading {origin}: {source}")]
    Source {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// The source was read but is not well-formed markup
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A summary was requested from a handle that holds no parsed tree
    #[error("No data parsed. Call parse() first.")]
    NotParsed,
}

impl Error {
    pub(crate) fn source_io(origin: impl Into<String>, source: std::io::Error) -> Self {
        Error::Source {
            origin: origin.into(),
            source,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Error::Source { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

/// Well-formedness failure with the location it was detected at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}: line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the decoded source
    pub position: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, input: &[u8], position: usize) -> Self {
        let position = position.min(input.len());
        let before = &input[..position];
        let line_start = memchr::memrchr(b'\n', before).map_or(0, |i| i + 1);
        // Count characters, not bytes: skip UTF-8 continuation bytes
        let column = before[line_start..]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count();

        ParseError {
            message: message.into(),
            position,
            line: memchr_iter(b'\n', before).count() + 1,
            column: column + 1,
        }
    }
}
