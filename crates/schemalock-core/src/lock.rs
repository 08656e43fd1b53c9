//! Lock document persistence.
//!
//! A lock is the canonical corpus itself, serialized as a single JSON
//! document keyed `definitions`. The document is pretty-printed so lock
//! diffs review like source, and it round-trips exactly: loading a lock and
//! re-normalizing equivalent source produce structurally identical corpora.

use std::fs;
use std::path::Path;

use crate::errors::{SchemalockError, SchemalockResult};
use crate::model::Corpus;

/// Conventional lock file name.
pub const LOCK_FILE_NAME: &str = "schema.lock";

/// Encode a corpus as the lock document.
pub fn to_json_string(corpus: &Corpus) -> SchemalockResult<String> {
    serde_json::to_string_pretty(corpus)
        .map_err(|e| SchemalockError::serialization(format!("failed to encode lock: {e}")))
}

/// Decode a lock document.
pub fn from_json_str(raw: &str) -> SchemalockResult<Corpus> {
    serde_json::from_str(raw)
        .map_err(|e| SchemalockError::serialization(format!("failed to decode lock: {e}")))
}

/// Read and decode a lock file.
pub fn read_from(path: &Path) -> SchemalockResult<Corpus> {
    let raw = fs::read_to_string(path)?;
    from_json_str(&raw)
}

/// Encode and write a lock file. A trailing newline keeps the file
/// friendly to line-oriented tooling.
pub fn write_to(path: &Path, corpus: &Corpus) -> SchemalockResult<()> {
    let mut doc = to_json_string(corpus)?;
    doc.push('\n');
    fs::write(path, doc)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;
    use crate::parse;

    fn corpus(src: &str) -> Corpus {
        let file = parse::parse(src).unwrap();
        normalize::normalize_corpus(&[("test.proto".to_string(), file)]).unwrap()
    }

    #[test]
    fn document_is_keyed_definitions() {
        let c = corpus(r#"syntax = "proto3"; package p; message M { int64 id = 1; }"#);
        let doc = to_json_string(&c).unwrap();
        let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
        assert!(v.get("definitions").is_some());
        assert_eq!(v["definitions"][0]["filepath"], "test.proto");
    }

    #[test]
    fn encoding_is_deterministic() {
        let c = corpus(r#"syntax = "proto3"; message M { int64 id = 1; string name = 2; }"#);
        assert_eq!(to_json_string(&c).unwrap(), to_json_string(&c).unwrap());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SchemalockError::Serialization(_)));
    }
}
