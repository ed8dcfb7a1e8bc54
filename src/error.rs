//! Error types shared by the matrix engine, the network and persistence.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers that only need to branch
/// on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DimensionMismatch,
    ParseError,
    MalformedLiteral,
    OutOfBounds,
    Io,
    Serialize,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two operands of a binary operation have incompatible shapes.
    #[error("dimension mismatch in {op}: left is {}x{}, right is {}x{}", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A serialized document is missing fields or has inconsistent contents.
    #[error("parse error: {0}")]
    Parse(String),

    /// A nested literal is empty or has rows of differing lengths.
    #[error("malformed matrix literal: {0}")]
    MalformedLiteral(String),

    /// Checked element access outside the matrix shape.
    #[error("index ({x}, {y}) out of bounds for {rows}x{cols} matrix")]
    OutOfBounds {
        x: usize,
        y: usize,
        rows: usize,
        cols: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Rendering a document failed.
    #[error("failed to render document: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Error::Parse(_) => ErrorKind::ParseError,
            Error::MalformedLiteral(_) => ErrorKind::MalformedLiteral,
            Error::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            Error::Io(_) => ErrorKind::Io,
            Error::Serialize(_) => ErrorKind::Serialize,
        }
    }

    pub(crate) fn mismatch(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Error {
        Error::DimensionMismatch { op, left, right }
    }
}
