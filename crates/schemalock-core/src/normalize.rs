//! Lowering of parse trees into the canonical model.
//!
//! The normalizer is where differently-shaped source constructs converge:
//! - oneof members are promoted to fields tagged `oneof-member`
//! - map declarations become fields tagged `map-entry` with a `map<K,V>` token
//! - nested message scopes become fully-qualified dotted paths
//! - reserved declarations coalesce into a sorted interval set
//!
//! Source ordering of fields and rpcs survives lowering so warning output is
//! deterministic. Fails with `MalformedInput` when a parser-level invariant
//! the core relies on does not hold (zero field id, inverted reserved range,
//! duplicate fully-qualified path).

use std::collections::BTreeSet;

use crate::errors::{SchemalockError, SchemalockResult};
use crate::model::{
    Corpus, Definition, Field, FieldOrigin, IdRange, IdRanges, Label, Message, Rpc, Service,
    TypeToken,
};
use crate::parse::ast;

/// Normalize a set of parsed files, in the given order, into one corpus.
pub fn normalize_corpus(files: &[(String, ast::FileNode)]) -> SchemalockResult<Corpus> {
    let mut corpus = Corpus::default();
    for (filepath, file) in files {
        corpus.definitions.push(normalize(filepath, file)?);
    }
    ensure_unique_paths(&corpus)?;
    Ok(corpus)
}

/// Normalize one parsed file.
pub fn normalize(filepath: &str, file: &ast::FileNode) -> SchemalockResult<Definition> {
    let mut def = Definition {
        filepath: filepath.to_string(),
        syntax: file.syntax.clone(),
        package: file.package.clone(),
        imports: file.imports.clone(),
        messages: Vec::new(),
        services: Vec::new(),
    };

    for m in &file.messages {
        def.messages.push(normalize_message(filepath, &file.package, m)?);
    }
    for s in &file.services {
        def.services.push(normalize_service(&file.package, s));
    }

    Ok(def)
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn normalize_message(
    filepath: &str,
    parent: &str,
    node: &ast::MessageNode,
) -> SchemalockResult<Message> {
    let path = child_path(parent, &node.name);

    let mut fields = Vec::new();
    let mut messages = Vec::new();
    let mut ranges = Vec::new();
    let mut reserved_names = Vec::new();

    for member in &node.members {
        match member {
            ast::MemberNode::Field(f) => {
                fields.push(normalize_field(filepath, &path, f, FieldOrigin::Direct)?);
            }
            ast::MemberNode::Map(m) => {
                require_valid_id(filepath, &path, &m.name, m.id)?;
                fields.push(Field {
                    name: m.name.clone(),
                    id: m.id,
                    type_token: TypeToken::new(format!("map<{},{}>", m.key_type, m.value_type)),
                    label: Label::Singular,
                    origin: FieldOrigin::MapEntry {
                        key_type: TypeToken::new(m.key_type.as_str()),
                        value_type: TypeToken::new(m.value_type.as_str()),
                    },
                });
            }
            ast::MemberNode::Oneof(o) => {
                for f in &o.fields {
                    fields.push(normalize_field(
                        filepath,
                        &path,
                        f,
                        FieldOrigin::OneofMember {
                            oneof: o.name.clone(),
                        },
                    )?);
                }
            }
            ast::MemberNode::Message(m) => {
                messages.push(normalize_message(filepath, &path, m)?);
            }
            ast::MemberNode::ReservedIds(rs) => {
                for &(lo, hi) in rs {
                    if lo == 0 {
                        return Err(SchemalockError::malformed_input(
                            filepath,
                            format!("message {path}: reserved id 0 is not a valid field id"),
                        ));
                    }
                    if hi < lo {
                        return Err(SchemalockError::malformed_input(
                            filepath,
                            format!("message {path}: inverted reserved range {lo} to {hi}"),
                        ));
                    }
                    ranges.push(IdRange { lo, hi });
                }
            }
            ast::MemberNode::ReservedNames(ns) => {
                reserved_names.extend(ns.iter().cloned());
            }
        }
    }

    reserved_names.sort();
    reserved_names.dedup();

    Ok(Message {
        name: node.name.clone(),
        path,
        fields,
        messages,
        reserved_ids: IdRanges::from_unsorted(ranges),
        reserved_names,
    })
}

fn normalize_field(
    filepath: &str,
    msg_path: &str,
    node: &ast::FieldNode,
    origin: FieldOrigin,
) -> SchemalockResult<Field> {
    require_valid_id(filepath, msg_path, &node.name, node.id)?;
    Ok(Field {
        name: node.name.clone(),
        id: node.id,
        type_token: TypeToken::new(node.type_name.as_str()),
        // proto2 `required` shares the singular wire shape
        label: match node.label {
            ast::LabelNode::Repeated => Label::Repeated,
            ast::LabelNode::Optional => Label::Optional,
            ast::LabelNode::None | ast::LabelNode::Required => Label::Singular,
        },
        origin,
    })
}

fn require_valid_id(
    filepath: &str,
    msg_path: &str,
    field_name: &str,
    id: u32,
) -> SchemalockResult<()> {
    if id == 0 {
        return Err(SchemalockError::malformed_input(
            filepath,
            format!("message {msg_path}: field `{field_name}` lacks a valid id"),
        ));
    }
    Ok(())
}

fn normalize_service(package: &str, node: &ast::ServiceNode) -> Service {
    Service {
        name: node.name.clone(),
        path: child_path(package, &node.name),
        rpcs: node
            .rpcs
            .iter()
            .map(|r| Rpc {
                name: r.name.clone(),
                request: TypeToken::new(r.request_type.as_str()),
                response: TypeToken::new(r.response_type.as_str()),
                streams_request: r.streams_request,
                streams_response: r.streams_response,
            })
            .collect(),
    }
}

/// Every message and service path must be unique within a corpus.
fn ensure_unique_paths(corpus: &Corpus) -> SchemalockResult<()> {
    let mut seen = BTreeSet::new();

    fn walk<'a>(
        filepath: &str,
        msg: &'a Message,
        seen: &mut BTreeSet<&'a str>,
    ) -> SchemalockResult<()> {
        if !seen.insert(msg.path.as_str()) {
            return Err(SchemalockError::malformed_input(
                filepath,
                format!("duplicate message path {}", msg.path),
            ));
        }
        for nested in &msg.messages {
            walk(filepath, nested, seen)?;
        }
        Ok(())
    }

    for def in &corpus.definitions {
        for msg in &def.messages {
            walk(&def.filepath, msg, &mut seen)?;
        }
    }

    let mut service_seen = BTreeSet::new();
    for def in &corpus.definitions {
        for svc in &def.services {
            if !service_seen.insert(svc.path.as_str()) {
                return Err(SchemalockError::malformed_input(
                    &def.filepath,
                    format!("duplicate service path {}", svc.path),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn single(src: &str) -> Corpus {
        let file = parse::parse(src).unwrap();
        normalize_corpus(&[("test.proto".to_string(), file)]).unwrap()
    }

    #[test]
    fn paths_are_fully_qualified() {
        let c = single(
            r#"syntax = "proto3";
package pkg;
message Outer {
  message Inner { int32 index = 1; }
  Inner i = 1;
}
"#,
        );
        let outer = &c.definitions[0].messages[0];
        assert_eq!(outer.path, "pkg.Outer");
        assert_eq!(outer.messages[0].path, "pkg.Outer.Inner");
    }

    #[test]
    fn empty_package_omits_leading_dot() {
        let c = single("message M { int32 a = 1; }");
        assert_eq!(c.definitions[0].messages[0].path, "M");
    }

    #[test]
    fn oneof_members_flatten_with_origin() {
        let c = single(
            r#"syntax = "proto3";
message M {
  string first = 1;
  oneof pick { int64 id = 2; bool active = 3; }
}
"#,
        );
        let m = &c.definitions[0].messages[0];
        assert_eq!(m.fields.len(), 3);
        assert_eq!(m.fields[1].label, Label::Singular);
        assert_eq!(
            m.fields[1].origin,
            FieldOrigin::OneofMember {
                oneof: "pick".to_string()
            }
        );
    }

    #[test]
    fn maps_materialize_compound_token() {
        let c = single(r#"syntax = "proto3"; message M { map<string, int32> counts = 3; }"#);
        let f = &c.definitions[0].messages[0].fields[0];
        assert_eq!(f.type_token.as_str(), "map<string,int32>");
        assert_eq!(f.id, 3);
        let FieldOrigin::MapEntry {
            key_type,
            value_type,
        } = &f.origin
        else {
            panic!("expected map entry origin");
        };
        assert_eq!(key_type.as_str(), "string");
        assert_eq!(value_type.as_str(), "int32");
    }

    #[test]
    fn reserved_ranges_coalesce() {
        let c = single("message M { reserved 4; reserved 5, 8 to 11; reserved \"a\", \"a\"; }");
        let m = &c.definitions[0].messages[0];
        assert_eq!(
            m.reserved_ids.ranges(),
            &[IdRange { lo: 4, hi: 5 }, IdRange { lo: 8, hi: 11 }]
        );
        assert_eq!(m.reserved_names, vec!["a".to_string()]);
    }

    #[test]
    fn duplicate_paths_rejected() {
        let a = parse::parse("package p; message M { int32 a = 1; }").unwrap();
        let b = parse::parse("package p; message M { int32 b = 1; }").unwrap();
        let err = normalize_corpus(&[
            ("a.proto".to_string(), a),
            ("b.proto".to_string(), b),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemalockError::MalformedInput { .. }));
        assert!(err.to_string().contains("duplicate message path p.M"));
    }

    #[test]
    fn required_label_normalizes_to_singular() {
        let c = single("syntax = \"proto2\"; message M { required string s = 1; }");
        assert_eq!(c.definitions[0].messages[0].fields[0].label, Label::Singular);
    }
}
