//! Parse tree for proto source files.
//!
//! This is the parser's output and the normalizer's only input. It mirrors
//! source structure (oneofs and maps are still distinct constructs, message
//! members keep declaration order) and performs no validation beyond what the
//! grammar enforces.

/// One parsed source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNode {
    /// `"proto2"` or `"proto3"`; defaults to `"proto2"` when absent, as protoc does.
    pub syntax: String,
    pub package: String,
    pub imports: Vec<String>,
    pub messages: Vec<MessageNode>,
    pub services: Vec<ServiceNode>,
}

/// A message body, members in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageNode {
    pub name: String,
    pub members: Vec<MemberNode>,
}

/// One declaration inside a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberNode {
    Field(FieldNode),
    Map(MapNode),
    Oneof(OneofNode),
    Message(MessageNode),
    ReservedIds(Vec<(u32, u32)>),
    ReservedNames(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub name: String,
    pub id: u32,
    pub type_name: String,
    pub label: LabelNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelNode {
    None,
    Repeated,
    Optional,
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNode {
    pub name: String,
    pub id: u32,
    pub key_type: String,
    pub value_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofNode {
    pub name: String,
    /// Members carry no label; proto forbids one inside a oneof.
    pub fields: Vec<FieldNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNode {
    pub name: String,
    pub rpcs: Vec<RpcNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcNode {
    pub name: String,
    pub request_type: String,
    pub response_type: String,
    pub streams_request: bool,
    pub streams_response: bool,
}
