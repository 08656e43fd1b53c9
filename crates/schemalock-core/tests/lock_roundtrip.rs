//! Lock persistence round-trip: loading a persisted snapshot must reproduce
//! the canonical corpus exactly, for every construct the rules read.

use schemalock_core::lock;
use schemalock_core::model::Corpus;
use schemalock_core::normalize::normalize_corpus;
use schemalock_core::parse::parse;

const RICH_PROTO: &str = r#"syntax = "proto3";
package test;

import "other.proto";

message Channel {
  reserved 44, 103 to 110;
  reserved "legacy_name";
  int64 id = 1;
  repeated string tags = 2;
  map<string, int32> counters = 3;
  oneof source {
    string url = 4;
    bool builtin = 5;
  }

  message Segment {
    int32 index = 1;
    optional string title = 2;
  }
}

service ChannelChanger {
  rpc Next(stream NextRequest) returns (Channel);
  rpc Previous(PreviousRequest) returns (stream Channel);
}
"#;

fn corpus() -> Corpus {
    let file = parse(RICH_PROTO).expect("fixture parses");
    normalize_corpus(&[("testdata/rich.proto".to_string(), file)]).expect("fixture normalizes")
}

#[test]
fn persisted_snapshot_round_trips() {
    let original = corpus();
    let doc = lock::to_json_string(&original).unwrap();
    let loaded = lock::from_json_str(&doc).unwrap();
    assert_eq!(original, loaded);
}

#[test]
fn round_trip_is_stable_under_re_encoding() {
    let original = corpus();
    let doc = lock::to_json_string(&original).unwrap();
    let re_encoded = lock::to_json_string(&lock::from_json_str(&doc).unwrap()).unwrap();
    assert_eq!(doc, re_encoded);
}

#[test]
fn loaded_lock_is_rule_ready() {
    // the lock must preserve everything the rule engine reads: run the
    // catalogue over a loaded snapshot against the freshly normalized one
    let original = corpus();
    let loaded = lock::from_json_str(&lock::to_json_string(&original).unwrap()).unwrap();

    let report = schemalock_core::rules::run_all(&loaded, &original).unwrap();
    assert!(report.ok(), "round-tripped snapshot drifted: {:?}", report.warnings);
}
