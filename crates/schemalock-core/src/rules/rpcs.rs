//! R7 and R8: service rules.

use super::warn;
use crate::diff::CorpusDiff;
use crate::model::Warning;

/// R7: no baseline rpc may disappear. A removed service reports each of its
/// rpcs individually.
pub(super) fn check_removing(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.services {
        let Some(base) = pair.baseline else { continue };

        for name in base.rpc_by_name.keys() {
            let survives = pair
                .updated
                .is_some_and(|u| u.rpc_by_name.contains_key(*name));
            if !survives {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R7",
                    *name,
                    format!("rpc \"{name}\" was removed"),
                ));
            }
        }
    }

    warnings
}

/// R8: an rpc's request type, response type, and both streaming flags are
/// frozen; each changed aspect is its own warning.
pub(super) fn check_changing_signature(diff: &CorpusDiff<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for pair in &diff.services {
        let Some((base, upd)) = pair.matched() else { continue };

        for (name, brpc) in &base.rpc_by_name {
            let Some(urpc) = upd.rpc_by_name.get(*name) else {
                continue;
            };

            if brpc.request != urpc.request {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R8",
                    *name,
                    format!(
                        "rpc \"{name}\" changed request type from \"{}\" to \"{}\"",
                        brpc.request, urpc.request
                    ),
                ));
            }
            if brpc.response != urpc.response {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R8",
                    *name,
                    format!(
                        "rpc \"{name}\" changed response type from \"{}\" to \"{}\"",
                        brpc.response, urpc.response
                    ),
                ));
            }
            if brpc.streams_request != urpc.streams_request {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R8",
                    *name,
                    format!(
                        "rpc \"{name}\" changed request streaming from {} to {}",
                        brpc.streams_request, urpc.streams_request
                    ),
                ));
            }
            if brpc.streams_response != urpc.streams_response {
                warnings.push(warn(
                    pair.filepath,
                    pair.path,
                    "R8",
                    *name,
                    format!(
                        "rpc \"{name}\" changed response streaming from {} to {}",
                        brpc.streams_response, urpc.streams_response
                    ),
                ));
            }
        }
    }

    warnings
}
