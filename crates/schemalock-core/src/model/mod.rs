//! Canonical model of a proto corpus.
//!
//! These types are the single representation every later stage reads from:
//! the normalizer produces them, the index and the rules consume them, and
//! the lock document persists them verbatim through serde.
//!
//! Design notes:
//! - **Position independence:** entities carry fully-qualified dotted paths;
//!   nothing downstream keys on simple names or source positions.
//! - **Flattened field space:** oneof members and map entries are ordinary
//!   `Field`s distinguished only by `origin`, so rules never special-case
//!   them.
//! - **Dumb data:** no validation here. The normalizer validates input, the
//!   index enforces uniqueness, the rules judge compatibility.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest legal proto field id (2^29 - 1), the upper bound of `to max`.
pub const MAX_FIELD_ID: u32 = 536_870_911;

/// A full snapshot of parsed definitions, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub definitions: Vec<Definition>,
}

/// One source file's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Opaque identity used to pair definitions across snapshots.
    pub filepath: String,
    pub syntax: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    /// Preserved for the lock document; no rule reads imports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

/// A message with its flattened field space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    /// `package "." outer1 "." … "." name`; empty package omitted.
    pub path: String,
    /// Direct fields, oneof members, and map entries in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "IdRanges::is_empty")]
    pub reserved_ids: IdRanges,
    /// Sorted and deduplicated by the normalizer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_names: Vec<String>,
}

/// A single field in a message's flattened id space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub id: u32,
    #[serde(rename = "type")]
    pub type_token: TypeToken,
    pub label: Label,
    #[serde(default, skip_serializing_if = "FieldOrigin::is_direct")]
    pub origin: FieldOrigin,
}

/// Field cardinality as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Singular,
    Repeated,
    Optional,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singular => "singular",
            Self::Repeated => "repeated",
            Self::Optional => "optional",
        }
    }
}

/// Which construct a field was lowered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldOrigin {
    #[default]
    Direct,
    /// The oneof name is kept for diagnostics only; it carries no identity.
    OneofMember { oneof: String },
    MapEntry {
        key_type: TypeToken,
        value_type: TypeToken,
    },
}

impl FieldOrigin {
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct)
    }
}

/// A normalized type denotation. Equality is string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeToken(String);

impl TypeToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A service with its rpcs in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    /// `package "." name`; empty package omitted.
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpcs: Vec<Rpc>,
}

/// A single rpc. Identity within a service is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rpc {
    pub name: String,
    pub request: TypeToken,
    pub response: TypeToken,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub streams_request: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub streams_response: bool,
}

/// A closed interval of reserved ids, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub lo: u32,
    pub hi: u32,
}

/// A sorted, non-overlapping set of closed id intervals.
///
/// Coalescing happens once at construction so that membership is a binary
/// search and set difference never reports an id twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdRanges(Vec<IdRange>);

impl IdRanges {
    /// Build from arbitrary (possibly overlapping, unsorted) ranges.
    pub fn from_unsorted(mut ranges: Vec<IdRange>) -> Self {
        ranges.sort_by_key(|r| (r.lo, r.hi));
        let mut coalesced: Vec<IdRange> = Vec::with_capacity(ranges.len());
        for r in ranges {
            match coalesced.last_mut() {
                // adjacent intervals merge too: [3,4] + [5,6] => [3,6]
                Some(prev) if r.lo <= prev.hi.saturating_add(1) => {
                    prev.hi = prev.hi.max(r.hi);
                }
                _ => coalesced.push(r),
            }
        }
        Self(coalesced)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ranges(&self) -> &[IdRange] {
        &self.0
    }

    /// O(log n) membership over the coalesced intervals.
    pub fn contains(&self, id: u32) -> bool {
        self.0
            .binary_search_by(|r| {
                if id < r.lo {
                    std::cmp::Ordering::Greater
                } else if id > r.hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Intervals of `self` not covered by `other`, in ascending order.
    pub fn difference(&self, other: &IdRanges) -> Vec<IdRange> {
        let mut out = Vec::new();
        for r in &self.0 {
            let mut lo = r.lo;
            for o in &other.0 {
                if o.hi < lo {
                    continue;
                }
                if o.lo > r.hi {
                    break;
                }
                if o.lo > lo {
                    out.push(IdRange { lo, hi: o.lo - 1 });
                }
                lo = lo.max(o.hi.saturating_add(1));
                if lo > r.hi {
                    break;
                }
            }
            if lo <= r.hi {
                out.push(IdRange { lo, hi: r.hi });
            }
        }
        out
    }
}

/// A single non-fatal compatibility finding.
///
/// Field order doubles as the aggregator's sort key:
/// (filepath, enclosing path, rule id, offending id-or-name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Warning {
    pub filepath: String,
    /// Enclosing message or service path.
    pub path: String,
    pub rule_id: String,
    /// The offending field id, name, or rpc name.
    pub subject: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_coalesce_overlaps_and_adjacency() {
        let r = IdRanges::from_unsorted(vec![
            IdRange { lo: 8, hi: 11 },
            IdRange { lo: 4, hi: 4 },
            IdRange { lo: 10, hi: 12 },
            IdRange { lo: 5, hi: 5 },
        ]);
        assert_eq!(
            r.ranges(),
            &[IdRange { lo: 4, hi: 5 }, IdRange { lo: 8, hi: 12 }]
        );
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let r = IdRanges::from_unsorted(vec![IdRange { lo: 8, hi: 11 }]);
        assert!(!r.contains(7));
        assert!(r.contains(8));
        assert!(r.contains(11));
        assert!(!r.contains(12));
    }

    #[test]
    fn difference_splits_intervals() {
        let a = IdRanges::from_unsorted(vec![IdRange { lo: 103, hi: 110 }, IdRange { lo: 44, hi: 44 }]);
        let b = IdRanges::from_unsorted(vec![IdRange { lo: 103, hi: 107 }]);
        assert_eq!(
            a.difference(&b),
            vec![IdRange { lo: 44, hi: 44 }, IdRange { lo: 108, hi: 110 }]
        );
    }

    #[test]
    fn difference_with_covering_set_is_empty() {
        let a = IdRanges::from_unsorted(vec![IdRange { lo: 3, hi: 3 }]);
        let b = IdRanges::from_unsorted(vec![IdRange { lo: 1, hi: 10 }]);
        assert!(a.difference(&b).is_empty());
    }

    #[test]
    fn warning_order_matches_aggregator_key() {
        let a = Warning {
            filepath: "a.proto".into(),
            path: "test.Channel".into(),
            rule_id: "R1".into(),
            subject: "4".into(),
            text: "x".into(),
        };
        let mut b = a.clone();
        b.rule_id = "R2".into();
        assert!(a < b);
    }
}
