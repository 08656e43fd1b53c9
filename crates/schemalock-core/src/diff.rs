//! Pairing of entities across a baseline and an updated snapshot.
//!
//! Pairing identity is the stable one: fully-qualified paths for messages
//! and services. Field and rpc pairing stays inside the rules (ids and names
//! carry different semantics per rule), driven by the indexed lookup tables
//! each pair exposes.

use crate::index::{CorpusIndex, IndexedMessage, IndexedService};

/// A baseline/updated message pair. One side absent means added or removed.
#[derive(Debug)]
pub struct MessagePair<'a> {
    pub path: &'a str,
    /// Updated side's file when present, baseline's otherwise.
    pub filepath: &'a str,
    pub baseline: Option<&'a IndexedMessage<'a>>,
    pub updated: Option<&'a IndexedMessage<'a>>,
}

impl<'a> MessagePair<'a> {
    /// Both sides, when the message exists in both snapshots.
    pub fn matched(&self) -> Option<(&'a IndexedMessage<'a>, &'a IndexedMessage<'a>)> {
        Some((self.baseline?, self.updated?))
    }
}

/// A baseline/updated service pair.
#[derive(Debug)]
pub struct ServicePair<'a> {
    pub path: &'a str,
    pub filepath: &'a str,
    pub baseline: Option<&'a IndexedService<'a>>,
    pub updated: Option<&'a IndexedService<'a>>,
}

impl<'a> ServicePair<'a> {
    pub fn matched(&self) -> Option<(&'a IndexedService<'a>, &'a IndexedService<'a>)> {
        Some((self.baseline?, self.updated?))
    }
}

/// All pairs for one analysis, in ascending path order.
#[derive(Debug)]
pub struct CorpusDiff<'a> {
    pub messages: Vec<MessagePair<'a>>,
    pub services: Vec<ServicePair<'a>>,
}

impl<'a> CorpusDiff<'a> {
    pub fn build(baseline: &'a CorpusIndex<'a>, updated: &'a CorpusIndex<'a>) -> Self {
        let mut message_paths: Vec<&'a str> = baseline.message_paths().collect();
        message_paths.extend(updated.message_paths());
        message_paths.sort_unstable();
        message_paths.dedup();

        let messages = message_paths
            .into_iter()
            .map(|path| {
                let b = baseline.message(path);
                let u = updated.message(path);
                MessagePair {
                    path,
                    filepath: u.or(b).map(|m| m.filepath).unwrap_or_default(),
                    baseline: b,
                    updated: u,
                }
            })
            .collect();

        let mut service_paths: Vec<&'a str> = baseline.service_paths().collect();
        service_paths.extend(updated.service_paths());
        service_paths.sort_unstable();
        service_paths.dedup();

        let services = service_paths
            .into_iter()
            .map(|path| {
                let b = baseline.service(path);
                let u = updated.service(path);
                ServicePair {
                    path,
                    filepath: u.or(b).map(|s| s.filepath).unwrap_or_default(),
                    baseline: b,
                    updated: u,
                }
            })
            .collect();

        Self { messages, services }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Corpus;
    use crate::normalize;
    use crate::parse;

    fn corpus(src: &str) -> Corpus {
        let file = parse::parse(src).unwrap();
        normalize::normalize_corpus(&[("test.proto".to_string(), file)]).unwrap()
    }

    #[test]
    fn pairs_cover_union_of_paths() {
        let cur = corpus("package p; message A { int32 a = 1; } message B { int32 b = 1; }");
        let upd = corpus("package p; message B { int32 b = 1; } message C { int32 c = 1; }");
        let ci = CorpusIndex::build(&cur).unwrap();
        let ui = CorpusIndex::build(&upd).unwrap();
        let diff = CorpusDiff::build(&ci, &ui);

        let summary: Vec<(&str, bool, bool)> = diff
            .messages
            .iter()
            .map(|p| (p.path, p.baseline.is_some(), p.updated.is_some()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("p.A", true, false),
                ("p.B", true, true),
                ("p.C", false, true),
            ]
        );
        assert!(diff.messages[1].matched().is_some());
        assert!(diff.messages[0].matched().is_none());
    }

    #[test]
    fn removed_service_still_pairs() {
        let cur = corpus("package p; service S { rpc Go(A) returns (B); }");
        let upd = corpus("package p; message M { int32 a = 1; }");
        let ci = CorpusIndex::build(&cur).unwrap();
        let ui = CorpusIndex::build(&upd).unwrap();
        let diff = CorpusDiff::build(&ci, &ui);
        assert_eq!(diff.services.len(), 1);
        assert!(diff.services[0].baseline.is_some());
        assert!(diff.services[0].updated.is_none());
    }
}
