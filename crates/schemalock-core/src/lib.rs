//! schemalock-core
//!
//! Core primitives for schemalock:
//! - Canonical corpus model with a flattened, origin-tagged field space
//! - proto2/proto3 parser producing a plain parse tree
//! - Normalizer lowering parse trees into the canonical model
//! - Path-keyed index and baseline/updated diff pairing
//! - The eight-rule compatibility catalogue
//! - Stable-ordered report aggregation and lock persistence
//!
//! The crate does no network I/O and holds no global state beyond the debug
//! toggle; an analysis is a pure function of its two snapshots.

pub mod diff;
pub mod errors;
pub mod index;
pub mod lock;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod report;
pub mod rules;

pub use crate::errors::{SchemalockError, SchemalockResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::lock::{self, LOCK_FILE_NAME};
    pub use crate::model::{
        Corpus, Definition, Field, FieldOrigin, IdRange, IdRanges, Label, Message, Rpc, Service,
        TypeToken, Warning,
    };
    pub use crate::normalize::{normalize, normalize_corpus};
    pub use crate::parse::parse;
    pub use crate::report::Report;
    pub use crate::rules::{run_all, set_debug};
    pub use crate::{SchemalockError, SchemalockResult};
}
