//! R3 through R6: field identity rules.
//!
//! R3 pairs by name (may the id change?); R4, R5 and R6 pair by id, the
//! stable wire identity.

use super::warn;
use crate::diff::CorpusDiff;
use crate::model::{FieldOrigin, Warning};

/// R3: same name, same id.
pub(super) fn check_changing_ids(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.messages {
        let Some((base, upd)) = pair.matched() else { continue };

        for (name, bf) in &base.field_by_name {
            let Some(uf) = upd.field_by_name.get(*name) else {
                continue;
            };
            if bf.id != uf.id {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R3",
                    *name,
                    format!(
                        "field \"{name}\" changed id from {} to {}",
                        bf.id, uf.id
                    ),
                ));
            }
        }
    }

    warnings
}

/// R4: same id, same type token and label. Map entries compare key and value
/// types separately so a changed key and a changed value each get a warning.
pub(super) fn check_changing_types(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.messages {
        let Some((base, upd)) = pair.matched() else { continue };

        for (id, bf) in &base.field_by_id {
            let Some(uf) = upd.field_by_id.get(id) else {
                continue;
            };

            match (&bf.origin, &uf.origin) {
                (
                    FieldOrigin::MapEntry {
                        key_type: bk,
                        value_type: bv,
                    },
                    FieldOrigin::MapEntry {
                        key_type: uk,
                        value_type: uv,
                    },
                ) => {
                    if bk != uk {
                        warnings.push(warn(
                            pair.filepath,
                            pair.path,
                            "R4",
                            id.to_string(),
                            format!(
                                "map field \"{}\" changed key type from \"{bk}\" to \"{uk}\"",
                                uf.name
                            ),
                        ));
                    }
                    if bv != uv {
                        warnings.push(warn(
                            pair.filepath,
                            pair.path,
                            "R4",
                            id.to_string(),
                            format!(
                                "map field \"{}\" changed value type from \"{bv}\" to \"{uv}\"",
                                uf.name
                            ),
                        ));
                    }
                }
                _ => {
                    if bf.type_token != uf.type_token {
                        warnings.push(warn(
                            pair.filepath,
                            pair.path,
                            "R4",
                            id.to_string(),
                            format!(
                                "field \"{}\" changed type from \"{}\" to \"{}\"",
                                uf.name, bf.type_token, uf.type_token
                            ),
                        ));
                    } else if bf.label != uf.label {
                        warnings.push(warn(
                            pair.filepath,
                            pair.path,
                            "R4",
                            id.to_string(),
                            format!(
                                "field \"{}\" changed label from {} to {}",
                                uf.name,
                                bf.label.as_str(),
                                uf.label.as_str()
                            ),
                        ));
                    }
                }
            }
        }
    }

    warnings
}

/// R5: same id, same name, unless the old name is reserved in the updated
/// message, which is the sanctioned way to rename.
pub(super) fn check_changing_names(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.messages {
        let Some((base, upd)) = pair.matched() else { continue };

        for (id, bf) in &base.field_by_id {
            let Some(uf) = upd.field_by_id.get(id) else {
                continue;
            };
            if bf.name != uf.name && !upd.reserved_names.contains(bf.name.as_str()) {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R5",
                    id.to_string(),
                    format!(
                        "field id {id} changed name from \"{}\" to \"{}\" without reserving \"{}\"",
                        bf.name, uf.name, bf.name
                    ),
                ));
            }
        }
    }

    warnings
}

/// R6: a removed field must leave both its id and its name reserved; each
/// missing reservation is its own warning.
pub(super) fn check_removing_without_reserve(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.messages {
        let Some((base, upd)) = pair.matched() else { continue };

        for (id, bf) in &base.field_by_id {
            if upd.field_by_id.contains_key(id) {
                continue;
            }
            if !upd.message.reserved_ids.contains(*id) {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R6",
                    id.to_string(),
                    format!("removed field \"{}\" without reserving id {id}", bf.name),
                ));
            }
            if !upd.reserved_names.contains(bf.name.as_str()) {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R6",
                    id.to_string(),
                    format!(
                        "removed field \"{}\" without reserving name \"{}\"",
                        bf.name, bf.name
                    ),
                ));
            }
        }
    }

    warnings
}
