//! Node types and structures for the host graph.

use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors related to Node building.
#[derive(Debug, Error)]
pub enum NodeBuilderError {
    #[error("Node kind is required")]
    MissingKind,

    #[error("Identifier nodes require a name")]
    MissingIdentifierName,
}

/// Broad family a node kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// Named entities with a source location (`*_decl`)
    Declaration,
    /// Types and type variants
    Type,
    /// Literal constants
    Constant,
    /// Structural nodes that are neither declarations nor types
    Exceptional,
    /// Expressions and statements
    Expression,
    /// Kinds the host reported that this build does not know about
    Other,
}

/// Discriminant tag identifying a node's variant.
///
/// The serialized name of every kind matches the host compiler's tree code
/// name (`function_decl`, `integer_cst`, ...). Unknown names deserialize to
/// [`NodeKind::Unknown`] so that snapshots from newer hosts still load; the
/// node keeps the original name in [`Node::unknown_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Declarations
    ConstDecl,
    FieldDecl,
    FunctionDecl,
    LabelDecl,
    NamespaceDecl,
    ParmDecl,
    ResultDecl,
    TemplateDecl,
    TranslationUnitDecl,
    TypeDecl,
    VarDecl,

    // Types
    ArrayType,
    BooleanType,
    ComplexType,
    EnumeralType,
    FixedPointType,
    FunctionType,
    IntegerType,
    LangType,
    MethodType,
    NullptrType,
    PointerType,
    QualUnionType,
    RealType,
    RecordType,
    ReferenceType,
    UnionType,
    VectorType,
    VoidType,

    // Constants
    ComplexCst,
    FixedCst,
    IntegerCst,
    RealCst,
    StringCst,
    VectorCst,

    // Exceptional nodes
    Block,
    IdentifierNode,
    StatementList,
    TreeList,
    TreeVec,

    // Expressions
    BindExpr,
    CallExpr,
    ModifyExpr,
    ReturnExpr,

    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Get the host tree code name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::ConstDecl => "const_decl",
            NodeKind::FieldDecl => "field_decl",
            NodeKind::FunctionDecl => "function_decl",
            NodeKind::LabelDecl => "label_decl",
            NodeKind::NamespaceDecl => "namespace_decl",
            NodeKind::ParmDecl => "parm_decl",
            NodeKind::ResultDecl => "result_decl",
            NodeKind::TemplateDecl => "template_decl",
            NodeKind::TranslationUnitDecl => "translation_unit_decl",
            NodeKind::TypeDecl => "type_decl",
            NodeKind::VarDecl => "var_decl",
            NodeKind::ArrayType => "array_type",
            NodeKind::BooleanType => "boolean_type",
            NodeKind::ComplexType => "complex_type",
            NodeKind::EnumeralType => "enumeral_type",
            NodeKind::FixedPointType => "fixed_point_type",
            NodeKind::FunctionType => "function_type",
            NodeKind::IntegerType => "integer_type",
            NodeKind::LangType => "lang_type",
            NodeKind::MethodType => "method_type",
            NodeKind::NullptrType => "nullptr_type",
            NodeKind::PointerType => "pointer_type",
            NodeKind::QualUnionType => "qual_union_type",
            NodeKind::RealType => "real_type",
            NodeKind::RecordType => "record_type",
            NodeKind::ReferenceType => "reference_type",
            NodeKind::UnionType => "union_type",
            NodeKind::VectorType => "vector_type",
            NodeKind::VoidType => "void_type",
            NodeKind::ComplexCst => "complex_cst",
            NodeKind::FixedCst => "fixed_cst",
            NodeKind::IntegerCst => "integer_cst",
            NodeKind::RealCst => "real_cst",
            NodeKind::StringCst => "string_cst",
            NodeKind::VectorCst => "vector_cst",
            NodeKind::Block => "block",
            NodeKind::IdentifierNode => "identifier_node",
            NodeKind::StatementList => "statement_list",
            NodeKind::TreeList => "tree_list",
            NodeKind::TreeVec => "tree_vec",
            NodeKind::BindExpr => "bind_expr",
            NodeKind::CallExpr => "call_expr",
            NodeKind::ModifyExpr => "modify_expr",
            NodeKind::ReturnExpr => "return_expr",
            NodeKind::Unknown => "unknown",
        }
    }

    /// Get the family this kind belongs to.
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::ConstDecl
            | NodeKind::FieldDecl
            | NodeKind::FunctionDecl
            | NodeKind::LabelDecl
            | NodeKind::NamespaceDecl
            | NodeKind::ParmDecl
            | NodeKind::ResultDecl
            | NodeKind::TemplateDecl
            | NodeKind::TranslationUnitDecl
            | NodeKind::TypeDecl
            | NodeKind::VarDecl => NodeClass::Declaration,

            NodeKind::ArrayType
            | NodeKind::BooleanType
            | NodeKind::ComplexType
            | NodeKind::EnumeralType
            | NodeKind::FixedPointType
            | NodeKind::FunctionType
            | NodeKind::IntegerType
            | NodeKind::LangType
            | NodeKind::MethodType
            | NodeKind::NullptrType
            | NodeKind::PointerType
            | NodeKind::QualUnionType
            | NodeKind::RealType
            | NodeKind::RecordType
            | NodeKind::ReferenceType
            | NodeKind::UnionType
            | NodeKind::VectorType
            | NodeKind::VoidType => NodeClass::Type,

            NodeKind::ComplexCst
            | NodeKind::FixedCst
            | NodeKind::IntegerCst
            | NodeKind::RealCst
            | NodeKind::StringCst
            | NodeKind::VectorCst => NodeClass::Constant,

            NodeKind::Block
            | NodeKind::IdentifierNode
            | NodeKind::StatementList
            | NodeKind::TreeList
            | NodeKind::TreeVec => NodeClass::Exceptional,

            NodeKind::BindExpr
            | NodeKind::CallExpr
            | NodeKind::ModifyExpr
            | NodeKind::ReturnExpr => NodeClass::Expression,

            NodeKind::Unknown => NodeClass::Other,
        }
    }

    /// True for declaration kinds.
    pub fn is_declaration(&self) -> bool {
        self.class() == NodeClass::Declaration
    }

    /// True for type kinds.
    pub fn is_type(&self) -> bool {
        self.class() == NodeClass::Type
    }
}

impl NodeKind {
    /// Parse a host tree code name; unrecognised names are [`NodeKind::Unknown`].
    pub fn from_name(name: &str) -> NodeKind {
        let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
            name.into_deserializer();
        NodeKind::deserialize(deserializer).unwrap_or(NodeKind::Unknown)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved source position.
///
/// Locations order by file, then line, then column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,

    /// Whether the file is a system header
    #[serde(default)]
    pub system_header: bool,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            system_header: false,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Typed attribute values for node properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<AttributeValue>),
    Null,
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Integer(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Integer(n as i64)
    }
}

impl From<u32> for AttributeValue {
    fn from(n: u32) -> Self {
        AttributeValue::Integer(n as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Float(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(items: Vec<T>) -> Self {
        AttributeValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// One vertex of the host graph.
///
/// Scalar properties live in `attributes`; references to other nodes are
/// links held by the [`HostGraph`](crate::HostGraph).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    /// Variant tag
    pub kind: NodeKind,

    /// Host tree code name for [`NodeKind::Unknown`] nodes
    pub unknown_kind: Option<String>,

    /// Identifier text (identifier nodes) or best-effort display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Host pretty-printed rendering of the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared source location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Whether the host created this node itself (compiler built-ins)
    #[serde(default)]
    pub builtin: bool,

    /// Arbitrary key-value attributes
    /// Common keys by family:
    /// - Declarations: language, artificial, access, qualifiers, visibility
    /// - Types: complete, size, alignment, qualifiers, precision, sign
    /// - Constants: value, overflow
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
}

/// Serialized shape of a [`Node`]; the kind is kept as the raw host name.
#[derive(Serialize, Deserialize)]
struct NodeRecord {
    kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,

    #[serde(default)]
    builtin: bool,

    #[serde(default)]
    attributes: HashMap<String, AttributeValue>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let kind = NodeKind::from_name(&record.kind);
        Node {
            kind,
            unknown_kind: (kind == NodeKind::Unknown).then_some(record.kind),
            name: record.name,
            description: record.description,
            location: record.location,
            builtin: record.builtin,
            attributes: record.attributes,
        }
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        NodeRecord {
            kind: node.kind_name().to_string(),
            name: node.name,
            description: node.description,
            location: node.location,
            builtin: node.builtin,
            attributes: node.attributes,
        }
    }
}

impl Node {
    /// Host tree code name, including names this build does not model.
    pub fn kind_name(&self) -> &str {
        match (&self.kind, &self.unknown_kind) {
            (NodeKind::Unknown, Some(name)) => name,
            _ => self.kind.as_str(),
        }
    }

    /// Look up a raw attribute.
    pub fn attr(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Boolean attribute, absent meaning `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.attr(key).and_then(AttributeValue::as_bool).unwrap_or(false)
    }

    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        self.attr(key).and_then(AttributeValue::as_i64)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(AttributeValue::as_str)
    }

    /// Short human-readable label used in diagnostics.
    pub fn label(&self) -> String {
        let mut label = format!("<{}", self.kind_name());
        if let Some(name) = &self.name {
            label.push_str(&format!(" name={}", name));
        }
        if let Some(location) = &self.location {
            label.push_str(&format!(" loc={}", location));
        }
        label.push('>');
        label
    }
}

/// Builder for constructing Node instances.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    kind: Option<NodeKind>,
    unknown_kind: Option<String>,
    name: Option<String>,
    description: Option<String>,
    location: Option<Location>,
    builtin: bool,
    attributes: HashMap<String, AttributeValue>,
}

impl NodeBuilder {
    /// Create a new NodeBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node kind.
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the kind from a host tree code name.
    ///
    /// Names this build does not model keep their spelling on the node.
    pub fn kind_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = NodeKind::from_name(&name);
        self.kind = Some(kind);
        self.unknown_kind = (kind == NodeKind::Unknown).then_some(name);
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the source location.
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Mark the node as a compiler built-in.
    pub fn builtin(mut self, builtin: bool) -> Self {
        self.builtin = builtin;
        self
    }

    /// Add an attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build the Node.
    pub fn build(self) -> Result<Node, NodeBuilderError> {
        let kind = self.kind.ok_or(NodeBuilderError::MissingKind)?;
        if kind == NodeKind::IdentifierNode && self.name.is_none() {
            return Err(NodeBuilderError::MissingIdentifierName);
        }

        Ok(Node {
            kind,
            unknown_kind: if kind == NodeKind::Unknown {
                self.unknown_kind
            } else {
                None
            },
            name: self.name,
            description: self.description,
            location: self.location,
            builtin: self.builtin,
            attributes: self.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kind_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_kind_names_match_serde() {
            for kind in [
                NodeKind::FunctionDecl,
                NodeKind::EnumeralType,
                NodeKind::IntegerCst,
                NodeKind::IdentifierNode,
                NodeKind::TranslationUnitDecl,
            ] {
                let json = serde_json::to_string(&kind).unwrap();
                assert_eq!(json, format!("\"{}\"", kind.as_str()));
            }
        }

        #[test]
        fn test_unknown_kind_deserializes() {
            let kind: NodeKind = serde_json::from_str("\"omp_clause\"").unwrap();
            assert_eq!(kind, NodeKind::Unknown);
            assert_eq!(kind.class(), NodeClass::Other);
        }

        #[test]
        fn test_from_name() {
            assert_eq!(NodeKind::from_name("record_type"), NodeKind::RecordType);
            assert_eq!(NodeKind::from_name("omp_parallel"), NodeKind::Unknown);
        }

        #[test]
        fn test_classes() {
            assert!(NodeKind::VarDecl.is_declaration());
            assert!(NodeKind::PointerType.is_type());
            assert_eq!(NodeKind::StringCst.class(), NodeClass::Constant);
            assert_eq!(NodeKind::Block.class(), NodeClass::Exceptional);
            assert_eq!(NodeKind::CallExpr.class(), NodeClass::Expression);
        }

        #[test]
        fn test_location_ordering() {
            let a = Location::new("a.c", 3, 9);
            let b = Location::new("a.c", 10, 1);
            let c = Location::new("b.c", 1, 1);
            assert!(a < b);
            assert!(b < c);
        }
    }

    mod node_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_node_builder() {
            let node = NodeBuilder::new()
                .kind(NodeKind::VarDecl)
                .description("int counter")
                .location(Location::new("main.c", 4, 5))
                .attribute("language", "C")
                .attribute("qualifiers", vec!["static"])
                .build()
                .unwrap();

            assert_eq!(node.kind, NodeKind::VarDecl);
            assert_eq!(node.attr_str("language"), Some("C"));
            assert_eq!(
                node.attr("qualifiers"),
                Some(&AttributeValue::List(vec![AttributeValue::String(
                    "static".to_string()
                )]))
            );
            assert!(!node.flag("artificial"));
        }

        #[test]
        fn test_node_builder_missing_kind() {
            let result = NodeBuilder::new().name("x").build();
            assert!(matches!(result, Err(NodeBuilderError::MissingKind)));
        }

        #[test]
        fn test_identifier_requires_name() {
            let result = NodeBuilder::new().kind(NodeKind::IdentifierNode).build();
            assert!(matches!(
                result,
                Err(NodeBuilderError::MissingIdentifierName)
            ));
        }

        #[test]
        fn test_node_serialization_roundtrip() {
            let node = NodeBuilder::new()
                .kind(NodeKind::IntegerCst)
                .description("42")
                .attribute("value", 42i64)
                .attribute("overflow", false)
                .build()
                .unwrap();

            let json = serde_json::to_string(&node).unwrap();
            let deserialized: Node = serde_json::from_str(&json).unwrap();

            assert_eq!(deserialized.kind, NodeKind::IntegerCst);
            assert_eq!(deserialized.attr_i64("value"), Some(42));
            assert_eq!(deserialized.description.as_deref(), Some("42"));
        }

        #[test]
        fn test_unknown_kind_keeps_host_name() {
            let node: Node =
                serde_json::from_str(r#"{"kind": "omp_parallel", "description": "x"}"#).unwrap();
            assert_eq!(node.kind, NodeKind::Unknown);
            assert_eq!(node.kind_name(), "omp_parallel");
            assert_eq!(node.label(), "<omp_parallel>");

            let json = serde_json::to_string(&node).unwrap();
            assert!(json.contains("\"kind\":\"omp_parallel\""));

            let known: Node = serde_json::from_str(r#"{"kind": "var_decl"}"#).unwrap();
            assert_eq!(known.unknown_kind, None);
            assert_eq!(known.kind_name(), "var_decl");
        }

        #[test]
        fn test_builder_kind_name() {
            let node = NodeBuilder::new().kind_name("omp_for").build().unwrap();
            assert_eq!(node.kind, NodeKind::Unknown);
            assert_eq!(node.kind_name(), "omp_for");

            let node = NodeBuilder::new().kind_name("block").build().unwrap();
            assert_eq!(node.kind, NodeKind::Block);
            assert_eq!(node.unknown_kind, None);
        }

        #[test]
        fn test_label() {
            let node = NodeBuilder::new()
                .kind(NodeKind::FunctionDecl)
                .name("main")
                .location(Location::new("main.c", 1, 5))
                .build()
                .unwrap();
            assert_eq!(node.label(), "<function_decl name=main loc=main.c:1:5>");
        }
    }
}
