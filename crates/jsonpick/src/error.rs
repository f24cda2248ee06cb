use std::{fmt, io};

use bstr::BString;
use thiserror::Error;

use crate::source::Position;

/// An extraction failure with the stream position it happened at.
#[derive(Error, Debug)]
#[error("{kind} at {position} in document {document}")]
pub struct ExtractError {
    pub(crate) kind: ErrorKind,
    pub(crate) position: Position,
    pub(crate) document: usize,
    pub(crate) raw: Option<BString>,
}

impl ExtractError {
    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where in the stream the failure was detected.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// 0-based index of the document being read.
    #[must_use]
    pub fn document(&self) -> usize {
        self.document
    }

    /// Bytes consumed from the failing document, when raw input retention is
    /// enabled.
    #[must_use]
    pub fn raw(&self) -> Option<&BString> {
        self.raw.as_ref()
    }
}

/// The failure categories of the extractor.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// Input ended inside a value.
    #[error("unexpected end of input")]
    EndOfStream,
    /// A closing bracket did not match the innermost open one.
    #[error("mismatched '{close}' closing '{open}'")]
    MalformedStructure {
        /// The innermost open bracket, or `{` if none was open.
        open: Bracket,
        /// The closing byte that was found.
        close: char,
    },
    /// A required `{`, `[`, `:` or `,` was missing.
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken {
        /// What the grammar required here.
        expected: &'static str,
        /// The byte found instead.
        found: char,
    },
    /// Bytes that are not a string, boolean, null or number.
    #[error("malformed literal {0:?}")]
    MalformedLiteral(BString),
    /// A `t`, `f` or `n` that does not spell `true`, `false` or `null`.
    #[error("unknown literal {0:?}")]
    UnknownLiteral(BString),
    /// A path segment used against an array is not a non-negative integer.
    #[error("invalid array index {0:?}")]
    InvalidIndex(String),
    /// A fixed-width peek asked for more than the source window holds.
    #[error("lookahead of {requested} bytes exceeds the {capacity} byte window")]
    LookaheadExceeded {
        /// Bytes asked for.
        requested: usize,
        /// Size of the window.
        capacity: usize,
    },
    /// The underlying reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ErrorKind {
    pub(crate) fn unexpected(expected: &'static str, found: u8) -> Self {
        Self::UnexpectedToken {
            expected,
            found: char::from(found),
        }
    }
}

/// An open container on the skipper's depth stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bracket {
    /// `{`
    #[default]
    Object,
    /// `[`
    Array,
}

impl Bracket {
    pub(crate) fn opened_by(byte: u8) -> Option<Self> {
        match byte {
            b'{' => Some(Self::Object),
            b'[' => Some(Self::Array),
            _ => None,
        }
    }

    pub(crate) fn closed_by(byte: u8) -> Option<Self> {
        match byte {
            b'}' => Some(Self::Object),
            b']' => Some(Self::Array),
            _ => None,
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Object => "{",
            Self::Array => "[",
        })
    }
}
