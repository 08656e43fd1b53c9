//! Lookup tables over a canonical corpus.
//!
//! The index is derived and disposable: it borrows the corpus, flattens
//! nested messages into a path-keyed table, and gives every rule O(1) (or
//! O(log n) for reserved intervals) lookups. Construction is also where the
//! snapshot's uniqueness invariants are enforced; an inconsistent snapshot
//! fails with `DuplicateIdentity` and no rule ever sees it.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{SchemalockError, SchemalockResult};
use crate::model::{Corpus, Field, Message, Rpc, Service};

/// A message with its lookup tables and enclosing file.
#[derive(Debug)]
pub struct IndexedMessage<'a> {
    pub filepath: &'a str,
    pub message: &'a Message,
    pub field_by_id: BTreeMap<u32, &'a Field>,
    pub field_by_name: BTreeMap<&'a str, &'a Field>,
    pub reserved_names: BTreeSet<&'a str>,
}

impl<'a> IndexedMessage<'a> {
    fn build(filepath: &'a str, message: &'a Message) -> SchemalockResult<Self> {
        let mut field_by_id = BTreeMap::new();
        let mut field_by_name = BTreeMap::new();

        for field in &message.fields {
            if let Some(prev) = field_by_id.insert(field.id, field) {
                return Err(SchemalockError::duplicate_identity(
                    message.path.clone(),
                    format!(
                        "field id {} used by both `{}` and `{}`",
                        field.id, prev.name, field.name
                    ),
                ));
            }
            if field_by_name.insert(field.name.as_str(), field).is_some() {
                return Err(SchemalockError::duplicate_identity(
                    message.path.clone(),
                    format!("field name `{}` declared twice", field.name),
                ));
            }
        }

        Ok(Self {
            filepath,
            message,
            field_by_id,
            field_by_name,
            reserved_names: message.reserved_names.iter().map(|s| s.as_str()).collect(),
        })
    }
}

/// A service with its rpc table and enclosing file.
#[derive(Debug)]
pub struct IndexedService<'a> {
    pub filepath: &'a str,
    pub service: &'a Service,
    pub rpc_by_name: BTreeMap<&'a str, &'a Rpc>,
}

impl<'a> IndexedService<'a> {
    fn build(filepath: &'a str, service: &'a Service) -> SchemalockResult<Self> {
        let mut rpc_by_name = BTreeMap::new();
        for rpc in &service.rpcs {
            if rpc_by_name.insert(rpc.name.as_str(), rpc).is_some() {
                return Err(SchemalockError::duplicate_identity(
                    service.path.clone(),
                    format!("rpc `{}` declared twice", rpc.name),
                ));
            }
        }
        Ok(Self {
            filepath,
            service,
            rpc_by_name,
        })
    }
}

/// Path-keyed tables over one snapshot.
#[derive(Debug)]
pub struct CorpusIndex<'a> {
    messages: BTreeMap<&'a str, IndexedMessage<'a>>,
    services: BTreeMap<&'a str, IndexedService<'a>>,
}

impl<'a> CorpusIndex<'a> {
    pub fn build(corpus: &'a Corpus) -> SchemalockResult<Self> {
        let mut messages = BTreeMap::new();
        let mut services = BTreeMap::new();

        fn walk<'a>(
            filepath: &'a str,
            msg: &'a Message,
            messages: &mut BTreeMap<&'a str, IndexedMessage<'a>>,
        ) -> SchemalockResult<()> {
            let indexed = IndexedMessage::build(filepath, msg)?;
            if messages.insert(msg.path.as_str(), indexed).is_some() {
                return Err(SchemalockError::duplicate_identity(
                    msg.path.clone(),
                    "message path declared twice",
                ));
            }
            for nested in &msg.messages {
                walk(filepath, nested, messages)?;
            }
            Ok(())
        }

        for def in &corpus.definitions {
            for msg in &def.messages {
                walk(&def.filepath, msg, &mut messages)?;
            }
            for svc in &def.services {
                let indexed = IndexedService::build(&def.filepath, svc)?;
                if services.insert(svc.path.as_str(), indexed).is_some() {
                    return Err(SchemalockError::duplicate_identity(
                        svc.path.clone(),
                        "service path declared twice",
                    ));
                }
            }
        }

        Ok(Self { messages, services })
    }

    pub fn message(&self, path: &str) -> Option<&IndexedMessage<'a>> {
        self.messages.get(path)
    }

    pub fn service(&self, path: &str) -> Option<&IndexedService<'a>> {
        self.services.get(path)
    }

    /// All message paths, ascending.
    pub fn message_paths(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.messages.keys().copied()
    }

    /// All service paths, ascending.
    pub fn service_paths(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.services.keys().copied()
    }
}
