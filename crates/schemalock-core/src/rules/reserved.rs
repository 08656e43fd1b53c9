//! R1 and R2: reservation rules.

use std::collections::BTreeSet;

use super::warn;
use crate::diff::CorpusDiff;
use crate::model::Warning;

/// R1: no updated field may occupy a reserved id or name.
///
/// Reservations are scoped to the message path; `A.I` and `B.I` never see
/// each other's reservations. The baseline's reservations bind the paired
/// updated message, and a message's own reservations bind its own fields in
/// the same snapshot.
pub(super) fn check_using(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.messages {
        let Some(upd) = pair.updated else { continue };

        let mut flagged_ids: BTreeSet<u32> = BTreeSet::new();
        let mut flagged_names: BTreeSet<&str> = BTreeSet::new();

        if let Some(base) = pair.baseline {
            for field in &upd.message.fields {
                if base.message.reserved_ids.contains(field.id) {
                    flagged_ids.insert(field.id);
                    warnings.push(warn(
                        pair.filepath,
                        pair.path,
                        "R1",
                        field.id.to_string(),
                        format!(
                            "field \"{}\" uses id {}, which is reserved in the baseline",
                            field.name, field.id
                        ),
                    ));
                }
                if base.reserved_names.contains(field.name.as_str()) {
                    flagged_names.insert(field.name.as_str());
                    warnings.push(warn(
                        pair.filepath,
                        pair.path,
                        "R1",
                        field.name.as_str(),
                        format!(
                            "field \"{}\" uses a name that is reserved in the baseline",
                            field.name
                        ),
                    ));
                }
            }
        }

        // reusing what the same snapshot reserves is an error as well
        for field in &upd.message.fields {
            if upd.message.reserved_ids.contains(field.id) && !flagged_ids.contains(&field.id) {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R1",
                    field.id.to_string(),
                    format!(
                        "field \"{}\" uses id {}, which this snapshot reserves",
                        field.name, field.id
                    ),
                ));
            }
            if upd.reserved_names.contains(field.name.as_str())
                && !flagged_names.contains(field.name.as_str())
            {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R1",
                    field.name.as_str(),
                    format!(
                        "field \"{}\" uses a name this snapshot reserves",
                        field.name
                    ),
                ));
            }
        }
    }

    warnings
}

/// R2: a reservation, once made, stays. Reported per individual id so a
/// shrunk range names exactly the ids that lost coverage.
pub(super) fn check_removing(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.messages {
        let Some((base, upd)) = pair.matched() else { continue };

        for range in base
            .message
            .reserved_ids
            .difference(&upd.message.reserved_ids)
        {
            for id in range.lo..=range.hi {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R2",
                    id.to_string(),
                    format!("reserved id {id} is no longer reserved"),
                ));
            }
        }

        for name in &base.message.reserved_names {
            if !upd.reserved_names.contains(name.as_str()) {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R2",
                    name.as_str(),
                    format!("reserved name \"{name}\" is no longer reserved"),
                ));
            }
        }
    }

    warnings
}
