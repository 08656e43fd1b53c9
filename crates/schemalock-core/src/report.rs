//! Aggregation of rule warnings into one stable report.
//!
//! Ordering is explicit and total: (filepath, enclosing path, rule id,
//! offending id-or-name, text). Two identical warnings collapse into one;
//! distinct warnings about the same subject (say, a missing id reservation
//! and a missing name reservation) both survive.

use serde::Serialize;

use crate::model::Warning;

/// The aggregate outcome of an analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub warnings: Vec<Warning>,
}

impl Report {
    /// Sort and collapse warnings from any number of rules.
    pub fn aggregate(mut warnings: Vec<Warning>) -> Self {
        warnings.sort();
        warnings.dedup();
        Self { warnings }
    }

    pub fn ok(&self) -> bool {
        self.warnings.is_empty()
    }
}
