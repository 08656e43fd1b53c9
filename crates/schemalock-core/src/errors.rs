//! Error types for schemalock-core.
//!
//! There are exactly three fatal kinds:
//! - `Parse`: the tokenizer/parser rejected a source file
//! - `MalformedInput`: a parsed tree violates a precondition the core relies on
//! - `DuplicateIdentity`: a snapshot is self-inconsistent (duplicate path/id)
//!
//! Rule warnings are not errors; they are collected in `report::Report`.

use thiserror::Error;

/// Result alias used across the core crate.
pub type SchemalockResult<T> = Result<T, SchemalockError>;

/// Core error kinds.
#[derive(Debug, Error)]
pub enum SchemalockError {
    /// A parsed tree violates a precondition (missing id, duplicate path).
    #[error("{filepath}: malformed input: {reason}")]
    MalformedInput { filepath: String, reason: String },

    /// A uniqueness invariant was violated while indexing a snapshot.
    #[error("{scope}: duplicate identity: {detail}")]
    DuplicateIdentity { scope: String, detail: String },

    /// The tokenizer/parser rejected a source file.
    #[error("{filepath}:{line}:{column}: {message}")]
    Parse {
        filepath: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// Lock document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemalockError {
    pub fn malformed_input(filepath: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            filepath: filepath.into(),
            reason: reason.into(),
        }
    }

    pub fn duplicate_identity(scope: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            scope: scope.into(),
            detail: detail.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Wrap a parse error with the file it came from.
    pub fn from_parse(filepath: impl Into<String>, err: crate::parse::ParseError) -> Self {
        Self::Parse {
            filepath: filepath.into(),
            line: err.line,
            column: err.column,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_names_file() {
        let e = SchemalockError::malformed_input("a.proto", "field lacks an id");
        assert_eq!(e.to_string(), "a.proto: malformed input: field lacks an id");
    }

    #[test]
    fn duplicate_identity_names_scope() {
        let e = SchemalockError::duplicate_identity("test.Channel", "field id 2 declared twice");
        assert!(e.to_string().contains("test.Channel"));
        assert!(e.to_string().contains("duplicate identity"));
    }
}
