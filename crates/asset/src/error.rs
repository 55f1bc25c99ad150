//! Errors produced while loading meshes.

use std::{io, path::PathBuf};

use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Debug, Error)]
pub enum MeshError {
    /// The source could not be opened. The target mesh was not touched.
    #[error("cannot open mesh source {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed after the source was opened (I/O error, invalid UTF-8).
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("malformed OBJ on line {line}: {kind}")]
    Malformed { line: usize, kind: MalformedKind },

    #[error("too many unique vertices (limit is {})", u32::MAX)]
    TooManyVertices,
}

impl MeshError {
    /// 1-based line number the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Read { line, .. } | Self::Malformed { line, .. } => Some(*line),
            Self::SourceUnavailable { .. } | Self::TooManyVertices => None,
        }
    }
}

/// What exactly was wrong with a malformed line.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MalformedKind {
    #[error("'{keyword}' expects {expected} fields, found {found}")]
    FieldCount {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid number '{token}'")]
    InvalidNumber { token: String },

    #[error("face must have exactly 3 corners, found {found}")]
    CornerCount { found: usize },

    #[error("malformed face corner '{token}'")]
    InvalidCorner { token: String },

    #[error("invalid {attribute} index '{token}' (indices are 1-based and positive)")]
    InvalidIndex {
        attribute: &'static str,
        token: String,
    },

    #[error("{attribute} index {index} out of range ({len} declared so far)")]
    IndexOutOfRange {
        attribute: &'static str,
        index: usize,
        len: usize,
    },
}
