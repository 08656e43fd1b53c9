//! Recursive-descent parser for proto2/proto3 source.
//!
//! The grammar coverage is exactly what the rule engine needs to see:
//! packages, imports, messages (nested), fields with labels and options,
//! maps, oneofs, reservations, services and rpcs with stream markers.
//! Options and enum bodies are consumed and discarded; type names are opaque
//! identifiers and are never resolved.
//!
//! Errors carry line and column. Callers wrap them with the file path via
//! `SchemalockError::from_parse`.

use std::fmt;

pub mod ast;
mod lexer;

use ast::{
    FieldNode, FileNode, LabelNode, MapNode, MemberNode, MessageNode, OneofNode, RpcNode,
    ServiceNode,
};
use lexer::{Spanned, Token};

/// A tokenizer or grammar error at a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse one proto source file into its tree.
pub fn parse(source: &str) -> Result<FileNode, ParseError> {
    let tokens = lexer::tokenize(source)?;
    Parser { tokens, pos: 0 }.parse_file()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn next(&mut self) -> Option<&Spanned> {
        let s = self.tokens.get(self.pos);
        if s.is_some() {
            self.pos += 1;
        }
        s
    }

    fn here(&self) -> (usize, usize) {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(s) => (s.line, s.column),
            None => (1, 1),
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        let (line, column) = self.here();
        ParseError::new(line, column, message)
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(Token::Punct(p)) if *p == c => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(self.err(format!("expected `{c}`, found {}", t.describe()))),
            None => Err(self.err(format!("expected `{c}`, found end of input"))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            Some(t) => Err(self.err(format!("expected {what}, found {}", t.describe()))),
            None => Err(self.err(format!("expected {what}, found end of input"))),
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(Token::Ident(s)) if s == kw => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(self.err(format!("expected `{kw}`, found {}", t.describe()))),
            None => Err(self.err(format!("expected `{kw}`, found end of input"))),
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if s == kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            Some(t) => Err(self.err(format!("expected {what}, found {}", t.describe()))),
            None => Err(self.err(format!("expected {what}, found end of input"))),
        }
    }

    fn expect_field_id(&mut self) -> Result<u32, ParseError> {
        match self.peek() {
            Some(Token::Number(raw)) => {
                let raw = raw.clone();
                let parsed = raw
                    .parse::<u32>()
                    .map_err(|_| self.err(format!("invalid field id `{raw}`")));
                if parsed.is_ok() {
                    self.pos += 1;
                }
                parsed
            }
            Some(t) => Err(self.err(format!("expected field id, found {}", t.describe()))),
            None => Err(self.err("expected field id, found end of input")),
        }
    }

    /// Consume tokens until a top-level `;`, balancing `{}`, `[]`, `()`.
    /// Used for `option` and `extensions` statements.
    fn skip_statement(&mut self) -> Result<(), ParseError> {
        let mut depth = 0i32;
        loop {
            match self.next().map(|s| &s.token) {
                Some(Token::Punct('{' | '[' | '(')) => depth += 1,
                Some(Token::Punct('}' | ']' | ')')) => depth -= 1,
                Some(Token::Punct(';')) if depth == 0 => return Ok(()),
                Some(_) => {}
                None => return Err(self.err("unexpected end of input in skipped statement")),
            }
        }
    }

    /// Consume a balanced `{ ... }` block (the `{` has not been taken yet).
    fn skip_block(&mut self) -> Result<(), ParseError> {
        self.expect_punct('{')?;
        let mut depth = 1i32;
        while depth > 0 {
            match self.next().map(|s| &s.token) {
                Some(Token::Punct('{')) => depth += 1,
                Some(Token::Punct('}')) => depth -= 1,
                Some(_) => {}
                None => return Err(self.err("unexpected end of input in block")),
            }
        }
        Ok(())
    }

    /// Consume optional field options: `[deprecated = true, ...]`.
    fn skip_field_options(&mut self) -> Result<(), ParseError> {
        if !self.eat_punct('[') {
            return Ok(());
        }
        let mut depth = 1i32;
        while depth > 0 {
            match self.next().map(|s| &s.token) {
                Some(Token::Punct('[' | '{')) => depth += 1,
                Some(Token::Punct(']' | '}')) => depth -= 1,
                Some(_) => {}
                None => return Err(self.err("unexpected end of input in field options")),
            }
        }
        Ok(())
    }

    fn parse_file(mut self) -> Result<FileNode, ParseError> {
        let mut file = FileNode {
            syntax: "proto2".to_string(),
            ..FileNode::default()
        };

        while let Some(tok) = self.peek() {
            match tok {
                Token::Punct(';') => {
                    self.pos += 1;
                }
                Token::Ident(kw) => match kw.as_str() {
                    "syntax" => {
                        self.pos += 1;
                        self.expect_punct('=')?;
                        file.syntax = self.expect_str("syntax version string")?;
                        self.expect_punct(';')?;
                    }
                    "package" => {
                        self.pos += 1;
                        file.package = self.expect_ident("package name")?;
                        self.expect_punct(';')?;
                    }
                    "import" => {
                        self.pos += 1;
                        let _ = self.eat_keyword("public") || self.eat_keyword("weak");
                        file.imports.push(self.expect_str("import path")?);
                        self.expect_punct(';')?;
                    }
                    "option" => {
                        self.pos += 1;
                        self.skip_statement()?;
                    }
                    "message" => {
                        self.pos += 1;
                        file.messages.push(self.parse_message()?);
                    }
                    "enum" => {
                        self.pos += 1;
                        let _ = self.expect_ident("enum name")?;
                        self.skip_block()?;
                    }
                    "service" => {
                        self.pos += 1;
                        file.services.push(self.parse_service()?);
                    }
                    "extend" => {
                        self.pos += 1;
                        let _ = self.expect_ident("extended type")?;
                        self.skip_block()?;
                    }
                    other => {
                        return Err(self.err(format!("unexpected `{other}` at file scope")));
                    }
                },
                t => {
                    return Err(self.err(format!("unexpected {} at file scope", t.describe())));
                }
            }
        }

        Ok(file)
    }

    fn parse_message(&mut self) -> Result<MessageNode, ParseError> {
        let name = self.expect_ident("message name")?;
        let mut msg = MessageNode {
            name,
            members: Vec::new(),
        };
        self.expect_punct('{')?;

        loop {
            match self.peek() {
                Some(Token::Punct('}')) => {
                    self.pos += 1;
                    return Ok(msg);
                }
                Some(Token::Punct(';')) => {
                    self.pos += 1;
                }
                Some(Token::Ident(kw)) => {
                    let kw = kw.clone();
                    match kw.as_str() {
                        "message" => {
                            self.pos += 1;
                            let nested = self.parse_message()?;
                            msg.members.push(MemberNode::Message(nested));
                        }
                        "enum" => {
                            self.pos += 1;
                            let _ = self.expect_ident("enum name")?;
                            self.skip_block()?;
                        }
                        "option" => {
                            self.pos += 1;
                            self.skip_statement()?;
                        }
                        "extensions" => {
                            self.pos += 1;
                            self.skip_statement()?;
                        }
                        "extend" => {
                            self.pos += 1;
                            let _ = self.expect_ident("extended type")?;
                            self.skip_block()?;
                        }
                        "reserved" => {
                            self.pos += 1;
                            msg.members.push(self.parse_reserved()?);
                        }
                        "map" => {
                            self.pos += 1;
                            msg.members.push(MemberNode::Map(self.parse_map()?));
                        }
                        "oneof" => {
                            self.pos += 1;
                            msg.members.push(MemberNode::Oneof(self.parse_oneof()?));
                        }
                        "group" => {
                            return Err(self.err("proto2 groups are not supported"));
                        }
                        _ => {
                            let field = self.parse_field(true)?;
                            msg.members.push(MemberNode::Field(field));
                        }
                    }
                }
                Some(t) => {
                    return Err(self.err(format!("unexpected {} in message body", t.describe())));
                }
                None => return Err(self.err("unexpected end of input in message body")),
            }
        }
    }

    /// `[label] type name = id [options];`
    ///
    /// The leading label is only legal outside oneofs.
    fn parse_field(&mut self, allow_label: bool) -> Result<FieldNode, ParseError> {
        let mut label = LabelNode::None;
        let mut type_name = self.expect_ident("field type")?;

        if allow_label {
            label = match type_name.as_str() {
                "repeated" => LabelNode::Repeated,
                "optional" => LabelNode::Optional,
                "required" => LabelNode::Required,
                _ => LabelNode::None,
            };
            if label != LabelNode::None {
                type_name = self.expect_ident("field type")?;
            }
        }

        let name = self.expect_ident("field name")?;
        self.expect_punct('=')?;
        let id = self.expect_field_id()?;
        self.skip_field_options()?;
        self.expect_punct(';')?;

        Ok(FieldNode {
            name,
            id,
            type_name,
            label,
        })
    }

    /// `map < key , value > name = id [options];`
    fn parse_map(&mut self) -> Result<MapNode, ParseError> {
        self.expect_punct('<')?;
        let key_type = self.expect_ident("map key type")?;
        self.expect_punct(',')?;
        let value_type = self.expect_ident("map value type")?;
        self.expect_punct('>')?;
        let name = self.expect_ident("map field name")?;
        self.expect_punct('=')?;
        let id = self.expect_field_id()?;
        self.skip_field_options()?;
        self.expect_punct(';')?;

        Ok(MapNode {
            name,
            id,
            key_type,
            value_type,
        })
    }

    fn parse_oneof(&mut self) -> Result<OneofNode, ParseError> {
        let name = self.expect_ident("oneof name")?;
        let mut oneof = OneofNode {
            name,
            fields: Vec::new(),
        };
        self.expect_punct('{')?;

        loop {
            match self.peek() {
                Some(Token::Punct('}')) => {
                    self.pos += 1;
                    return Ok(oneof);
                }
                Some(Token::Punct(';')) => {
                    self.pos += 1;
                }
                Some(Token::Ident(kw)) if kw == "option" => {
                    self.pos += 1;
                    self.skip_statement()?;
                }
                Some(Token::Ident(_)) => {
                    oneof.fields.push(self.parse_field(false)?);
                }
                Some(t) => {
                    return Err(self.err(format!("unexpected {} in oneof body", t.describe())));
                }
                None => return Err(self.err("unexpected end of input in oneof body")),
            }
        }
    }

    /// `reserved 4, 8 to 11, 100 to max;` or `reserved "foo", "bar";`
    fn parse_reserved(&mut self) -> Result<MemberNode, ParseError> {
        if matches!(self.peek(), Some(Token::Str(_))) {
            let mut names = vec![self.expect_str("reserved name")?];
            while self.eat_punct(',') {
                names.push(self.expect_str("reserved name")?);
            }
            self.expect_punct(';')?;
            return Ok(MemberNode::ReservedNames(names));
        }

        let mut ranges = Vec::new();
        loop {
            let lo = self.expect_field_id()?;
            let hi = if self.eat_keyword("to") {
                if self.eat_keyword("max") {
                    crate::model::MAX_FIELD_ID
                } else {
                    self.expect_field_id()?
                }
            } else {
                lo
            };
            ranges.push((lo, hi));
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(';')?;
        Ok(MemberNode::ReservedIds(ranges))
    }

    fn parse_service(&mut self) -> Result<ServiceNode, ParseError> {
        let name = self.expect_ident("service name")?;
        let mut svc = ServiceNode {
            name,
            rpcs: Vec::new(),
        };
        self.expect_punct('{')?;

        loop {
            match self.peek() {
                Some(Token::Punct('}')) => {
                    self.pos += 1;
                    return Ok(svc);
                }
                Some(Token::Punct(';')) => {
                    self.pos += 1;
                }
                Some(Token::Ident(kw)) if kw == "option" => {
                    self.pos += 1;
                    self.skip_statement()?;
                }
                Some(Token::Ident(kw)) if kw == "rpc" => {
                    self.pos += 1;
                    svc.rpcs.push(self.parse_rpc()?);
                }
                Some(t) => {
                    return Err(self.err(format!("unexpected {} in service body", t.describe())));
                }
                None => return Err(self.err("unexpected end of input in service body")),
            }
        }
    }

    /// `rpc Name (stream? Type) returns (stream? Type) (';' | '{' options '}')`
    fn parse_rpc(&mut self) -> Result<RpcNode, ParseError> {
        let name = self.expect_ident("rpc name")?;

        self.expect_punct('(')?;
        let streams_request = self.eat_keyword("stream");
        let request_type = self.expect_ident("rpc request type")?;
        self.expect_punct(')')?;

        self.expect_keyword("returns")?;

        self.expect_punct('(')?;
        let streams_response = self.eat_keyword("stream");
        let response_type = self.expect_ident("rpc response type")?;
        self.expect_punct(')')?;

        if matches!(self.peek(), Some(Token::Punct('{'))) {
            self.skip_block()?;
        } else {
            self.expect_punct(';')?;
        }

        Ok(RpcNode {
            name,
            request_type,
            response_type,
            streams_request,
            streams_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"syntax = "proto3";
package test;

import "other.proto";

message Channel {
  reserved 4, 8 to 11;
  reserved "foo", "bar";
  int64 id = 1;
  repeated string tags = 2 [deprecated = true];
  map<string, int32> counts = 3;
  oneof picked {
    int64 chosen = 5;
    bool active = 6;
  }
  message Inner {
    int32 index = 1;
  }
}

service ChannelChanger {
  rpc Next(stream NextRequest) returns (Channel);
  rpc Previous(PreviousRequest) returns (stream Channel);
}
"#;

    #[test]
    fn parses_representative_file() {
        let f = parse(SIMPLE).unwrap();
        assert_eq!(f.syntax, "proto3");
        assert_eq!(f.package, "test");
        assert_eq!(f.imports, vec!["other.proto"]);
        assert_eq!(f.messages.len(), 1);

        let channel = &f.messages[0];
        assert_eq!(channel.name, "Channel");
        assert_eq!(channel.members.len(), 7);
        assert!(matches!(&channel.members[0], MemberNode::ReservedIds(r) if r == &vec![(4, 4), (8, 11)]));
        assert!(matches!(&channel.members[1], MemberNode::ReservedNames(n) if n == &vec!["foo".to_string(), "bar".to_string()]));
        assert!(matches!(&channel.members[3], MemberNode::Field(f) if f.label == LabelNode::Repeated));
        assert!(matches!(&channel.members[4], MemberNode::Map(m) if m.key_type == "string" && m.id == 3));
        assert!(matches!(&channel.members[5], MemberNode::Oneof(o) if o.fields.len() == 2));
        assert!(matches!(&channel.members[6], MemberNode::Message(m) if m.name == "Inner"));

        let svc = &f.services[0];
        assert_eq!(svc.name, "ChannelChanger");
        assert_eq!(svc.rpcs.len(), 2);
        assert!(svc.rpcs[0].streams_request);
        assert!(!svc.rpcs[0].streams_response);
        assert!(svc.rpcs[1].streams_response);
    }

    #[test]
    fn missing_syntax_defaults_to_proto2() {
        let f = parse("message M {}").unwrap();
        assert_eq!(f.syntax, "proto2");
    }

    #[test]
    fn reserved_to_max() {
        let f = parse("message M { reserved 100 to max; }").unwrap();
        let MemberNode::ReservedIds(r) = &f.messages[0].members[0] else {
            panic!("expected reserved ids");
        };
        assert_eq!(r, &vec![(100, crate::model::MAX_FIELD_ID)]);
    }

    #[test]
    fn options_and_enums_are_discarded() {
        let f = parse(
            r#"syntax = "proto3";
option java_package = "com.example";
message M {
  option deprecated = true;
  enum Kind { UNKNOWN = 0; KNOWN = 1; }
  string name = 1;
}
"#,
        )
        .unwrap();
        assert_eq!(f.messages[0].members.len(), 1);
    }

    #[test]
    fn rpc_with_options_body() {
        let f = parse(
            "service S { rpc Go(Req) returns (Resp) { option (x.y) = true; } }",
        )
        .unwrap();
        assert_eq!(f.services[0].rpcs.len(), 1);
    }

    #[test]
    fn error_carries_position() {
        let err = parse("message {").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("expected message name"));
    }

    #[test]
    fn field_id_must_be_integral() {
        let err = parse("message M { string s = 1.5; }").unwrap_err();
        assert!(err.message.contains("invalid field id"));
    }
}
