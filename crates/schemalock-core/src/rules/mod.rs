//! The compatibility rule catalogue.
//!
//! Every rule is a pure predicate over a paired baseline/updated view: it
//! reads the diff, emits warnings, and holds no state. Rules are independent
//! of one another; evaluation order never changes the outcome because the
//! aggregator imposes the final ordering.
//!
//! The catalogue is fixed:
//! - R1 NoUsingReservedFields
//! - R2 NoRemovingReservedFields
//! - R3 NoChangingFieldIDs
//! - R4 NoChangingFieldTypes
//! - R5 NoChangingFieldNames
//! - R6 NoRemovingFieldsWithoutReserve
//! - R7 NoRemovingRPCs
//! - R8 NoChangingRPCSignature

use std::sync::atomic::{AtomicBool, Ordering};

use crate::diff::CorpusDiff;
use crate::errors::SchemalockResult;
use crate::index::CorpusIndex;
use crate::model::{Corpus, Warning};
use crate::report::Report;

mod fields;
mod reserved;
mod rpcs;

/// One catalogue entry.
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    check: fn(&CorpusDiff<'_>) -> Vec<Warning>,
}

const NO_USING_RESERVED_FIELDS: Rule = Rule {
    id: "R1",
    name: "NoUsingReservedFields",
    check: reserved::check_using,
};

const NO_REMOVING_RESERVED_FIELDS: Rule = Rule {
    id: "R2",
    name: "NoRemovingReservedFields",
    check: reserved::check_removing,
};

const NO_CHANGING_FIELD_IDS: Rule = Rule {
    id: "R3",
    name: "NoChangingFieldIDs",
    check: fields::check_changing_ids,
};

const NO_CHANGING_FIELD_TYPES: Rule = Rule {
    id: "R4",
    name: "NoChangingFieldTypes",
    check: fields::check_changing_types,
};

const NO_CHANGING_FIELD_NAMES: Rule = Rule {
    id: "R5",
    name: "NoChangingFieldNames",
    check: fields::check_changing_names,
};

const NO_REMOVING_FIELDS_WITHOUT_RESERVE: Rule = Rule {
    id: "R6",
    name: "NoRemovingFieldsWithoutReserve",
    check: fields::check_removing_without_reserve,
};

const NO_REMOVING_RPCS: Rule = Rule {
    id: "R7",
    name: "NoRemovingRPCs",
    check: rpcs::check_removing,
};

const NO_CHANGING_RPC_SIGNATURE: Rule = Rule {
    id: "R8",
    name: "NoChangingRPCSignature",
    check: rpcs::check_changing_signature,
};

/// The full catalogue in id order.
pub const CATALOGUE: &[Rule] = &[
    NO_USING_RESERVED_FIELDS,
    NO_REMOVING_RESERVED_FIELDS,
    NO_CHANGING_FIELD_IDS,
    NO_CHANGING_FIELD_TYPES,
    NO_CHANGING_FIELD_NAMES,
    NO_REMOVING_FIELDS_WITHOUT_RESERVE,
    NO_REMOVING_RPCS,
    NO_CHANGING_RPC_SIGNATURE,
];

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Process-wide toggle for verbose rule diagnostics on stderr.
///
/// Embedders that want scoped control should prefer wiring their own flag
/// around `run_all`; this shim exists for CLI parity.
pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

pub fn debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Run the whole catalogue and aggregate into one stable report.
pub fn run_all(baseline: &Corpus, updated: &Corpus) -> SchemalockResult<Report> {
    let bi = CorpusIndex::build(baseline)?;
    let ui = CorpusIndex::build(updated)?;
    let diff = CorpusDiff::build(&bi, &ui);

    let mut warnings = Vec::new();
    for rule in CATALOGUE {
        warnings.extend(run_rule(rule, &diff));
    }
    Ok(Report::aggregate(warnings))
}

fn run_rule(rule: &Rule, diff: &CorpusDiff<'_>) -> Vec<Warning> {
    if debug_enabled() {
        eprintln!("[schemalock] running {} ({})", rule.id, rule.name);
    }
    let warnings = (rule.check)(diff);
    if debug_enabled() {
        for w in &warnings {
            eprintln!("[schemalock] {}: {} {}: {}", rule.id, w.filepath, w.path, w.text);
        }
        eprintln!("[schemalock] {} produced {} warning(s)", rule.id, warnings.len());
    }
    warnings
}

fn run_single(
    rule: &Rule,
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    let bi = CorpusIndex::build(baseline)?;
    let ui = CorpusIndex::build(updated)?;
    let diff = CorpusDiff::build(&bi, &ui);

    let report = Report::aggregate(run_rule(rule, &diff));
    let ok = report.ok();
    Ok((report.warnings, ok))
}

/// R1: updated fields must not reuse ids or names reserved by the baseline
/// message, nor ids or names the updated message itself reserves.
pub fn no_using_reserved_fields(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_USING_RESERVED_FIELDS, baseline, updated)
}

/// R2: every individually reserved id and name in the baseline must remain
/// reserved in the updated message.
pub fn no_removing_reserved_fields(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_REMOVING_RESERVED_FIELDS, baseline, updated)
}

/// R3: a field keeping its name must keep its id.
pub fn no_changing_field_ids(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_CHANGING_FIELD_IDS, baseline, updated)
}

/// R4: a field keeping its id must keep its type token and label; map key
/// and value types are checked separately.
pub fn no_changing_field_types(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_CHANGING_FIELD_TYPES, baseline, updated)
}

/// R5: renaming a field id is allowed only when the old name is reserved in
/// the updated message.
pub fn no_changing_field_names(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_CHANGING_FIELD_NAMES, baseline, updated)
}

/// R6: removing a field requires reserving both its id and its name.
pub fn no_removing_fields_without_reserve(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_REMOVING_FIELDS_WITHOUT_RESERVE, baseline, updated)
}

/// R7: every baseline rpc must survive in its service; a removed service
/// counts as removing each of its rpcs.
pub fn no_removing_rpcs(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_REMOVING_RPCS, baseline, updated)
}

/// R8: an rpc keeping its name must keep request/response types and both
/// streaming flags.
pub fn no_changing_rpc_signature(
    baseline: &Corpus,
    updated: &Corpus,
) -> SchemalockResult<(Vec<Warning>, bool)> {
    run_single(&NO_CHANGING_RPC_SIGNATURE, baseline, updated)
}

pub(crate) fn warn(
    filepath: &str,
    path: &str,
    rule_id: &str,
    subject: impl Into<String>,
    text: String,
) -> Warning {
    Warning {
        filepath: filepath.to_string(),
        path: path.to_string(),
        rule_id: rule_id.to_string(),
        subject: subject.into(),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ids_are_unique_and_ordered() {
        let ids: Vec<&str> = CATALOGUE.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn empty_corpora_are_compatible() {
        let empty = Corpus::default();
        let report = run_all(&empty, &empty).unwrap();
        assert!(report.ok());
        assert!(report.warnings.is_empty());
    }
}
