//! Typed parse errors for the OBJ/MTL readers.
//!
//! Missing files are not errors here: the file entry points log and return
//! an empty result. Everything below aborts the parse call that hit it.

use std::io;

use thiserror::Error;

use crate::lines::LineError;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("I/O error while reading OBJ line {line}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("OBJ line {line}: invalid {what} '{token}'")]
    InvalidFloat {
        line: usize,
        what: &'static str,
        token: String,
    },

    #[error("OBJ line {line}: missing {what}")]
    MissingComponent { line: usize, what: &'static str },

    #[error("OBJ line {line}: invalid {what} index '{token}'")]
    InvalidIndex {
        line: usize,
        what: &'static str,
        token: String,
    },

    #[error("OBJ line {line}: relative (negative) {what} index '{token}' is not supported")]
    NegativeIndex {
        line: usize,
        what: &'static str,
        token: String,
    },

    #[error("OBJ line {line}: malformed face vertex '{token}'")]
    InvalidFaceVertex { line: usize, token: String },

    #[error("OBJ line {line}: directive '{directive}' requires a value")]
    MissingValue {
        line: usize,
        directive: &'static str,
    },

    #[error("OBJ line {line}: too many vertices (more than {max})", max = u32::MAX)]
    TooManyVertices { line: usize },

    #[error("OBJ line {line}: content is not valid UTF-8")]
    InvalidUtf8 { line: usize },
}

#[derive(Debug, Error)]
pub enum MtlError {
    #[error("I/O error while reading MTL line {line}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("MTL line {line}: invalid value '{token}' for '{directive}'")]
    InvalidFloat {
        line: usize,
        directive: String,
        token: String,
    },

    #[error("MTL line {line}: invalid integer '{token}' for '{directive}'")]
    InvalidInt {
        line: usize,
        directive: String,
        token: String,
    },

    #[error("MTL line {line}: directive '{directive}' requires a value")]
    MissingValue { line: usize, directive: String },

    #[error("MTL line {line}: content is not valid UTF-8")]
    InvalidUtf8 { line: usize },
}

impl From<LineError> for ObjError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::Io { line, source } => Self::Io { line, source },
            LineError::Utf8 { line } => Self::InvalidUtf8 { line },
        }
    }
}

impl From<LineError> for MtlError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::Io { line, source } => Self::Io { line, source },
            LineError::Utf8 { line } => Self::InvalidUtf8 { line },
        }
    }
}

/// Failure of the full load pipeline (geometry + material library).
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to parse OBJ '{path}'")]
    Obj {
        path: String,
        #[source]
        source: ObjError,
    },

    #[error("failed to parse material library '{path}'")]
    Mtl {
        path: String,
        #[source]
        source: MtlError,
    },
}

pub type ObjResult<T> = Result<T, ObjError>;
pub type MtlResult<T> = Result<T, MtlError>;
