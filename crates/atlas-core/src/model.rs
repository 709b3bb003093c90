//! Core data structures for the code graph

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of `text`, truncated to the first `len` hex chars.
pub fn short_hash(text: &str, len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..len].to_string()
}

/// Unique, stable identifier for a node. Derivable from
/// `(file_path, kind, name)` alone, so re-extraction of the same entity
/// always lands on the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(file_path: &str, kind: EntityKind, name: &str) -> Self {
        NodeId(short_hash(&format!("{file_path}:{kind}:{name}"), 16))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminates what kind of code entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Function,
    Class,
    Variable,
    Import,
    ModuleCode,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Function => "function",
            EntityKind::Class => "class",
            EntityKind::Variable => "variable",
            EntityKind::Import => "import",
            EntityKind::ModuleCode => "module_code",
        };
        f.write_str(s)
    }
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Calls,
    Imports,
    Inherits,
    UsesType,
    DecoratedBy,
    Uses,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
            EdgeKind::Inherits => "inherits",
            EdgeKind::UsesType => "uses_type",
            EdgeKind::DecoratedBy => "decorated_by",
            EdgeKind::Uses => "uses",
        };
        f.write_str(s)
    }
}

/// Resolver-assigned confidence for an edge target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    None,
}

/// A code entity extracted from source. Immutable value produced by
/// extractors; the bridge turns these into graph nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Scoped dotted path: methods appear as `Class.method`, nested as `A.B.m`.
    pub name: String,
    /// 1-indexed inclusive span.
    pub line_start: u32,
    pub line_end: u32,
    /// SHA-256[..12] over the entity including its body.
    pub signature_hash: String,
    /// Same hash with the bare name replaced by a placeholder; drives rename
    /// detection.
    pub structure_hash: String,
    pub calls: Vec<String>,
    pub uses: Vec<String>,
    pub inherits: Vec<String>,
    /// `(module, name)` pairs; populated only for `kind == Import`.
    pub imports: Vec<(String, String)>,
    pub type_refs: Vec<String>,
    /// Local variable name -> class name, from annotations and constructor
    /// assignments.
    pub type_context: HashMap<String, String>,
    /// Parameter names excluding `self`/`cls`.
    pub params: Vec<String>,
    pub decorators: Vec<String>,
    /// Set when the delta classifies this entity as a rename.
    pub old_name: Option<String>,
    /// Shadow-extraction confidence in [0, 1]; `None` for clean parses.
    pub confidence: Option<f32>,
}

impl Entity {
    pub fn new(
        kind: EntityKind,
        name: impl Into<String>,
        line_start: u32,
        line_end: u32,
        signature_hash: impl Into<String>,
        structure_hash: impl Into<String>,
    ) -> Self {
        Entity {
            kind,
            name: name.into(),
            line_start,
            line_end,
            signature_hash: signature_hash.into(),
            structure_hash: structure_hash.into(),
            calls: Vec::new(),
            uses: Vec::new(),
            inherits: Vec::new(),
            imports: Vec::new(),
            type_refs: Vec::new(),
            type_context: HashMap::new(),
            params: Vec::new(),
            decorators: Vec::new(),
            old_name: None,
            confidence: None,
        }
    }
}

/// A single node in the code graph. Owned by the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: EntityKind,
    pub name: String,
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub signature_hash: String,
    pub calls: Vec<String>,
    pub uses: Vec<String>,
    pub inherits: Vec<String>,
    pub imports: Vec<(String, String)>,
    pub type_refs: Vec<String>,
    pub params: Vec<String>,
    pub decorators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
}

impl GraphNode {
    /// Build a node from an extracted entity; the ID is derived from
    /// `(file, kind, name)`.
    pub fn from_entity(entity: &Entity, file_path: &str) -> Self {
        GraphNode {
            id: NodeId::new(file_path, entity.kind, &entity.name),
            kind: entity.kind,
            name: entity.name.clone(),
            file_path: file_path.to_string(),
            line_start: entity.line_start,
            line_end: entity.line_end,
            signature_hash: entity.signature_hash.clone(),
            calls: entity.calls.clone(),
            uses: entity.uses.clone(),
            inherits: entity.inherits.clone(),
            imports: entity.imports.clone(),
            type_refs: entity.type_refs.clone(),
            params: entity.params.clone(),
            decorators: entity.decorators.clone(),
            renamed_from: None,
        }
    }

    /// Bare name: the last dotted segment of a scoped name.
    pub fn bare_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A directed edge in the code graph. Jointly owned by its source and
/// target; removing either node cascades edge removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub kind: EdgeKind,
    #[serde(default)]
    pub confidence: Confidence,
    /// Import metadata: source module path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Import metadata: the imported symbol name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_name: Option<String>,
    /// True when the edge was expanded from a star import.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub via_star: bool,
}

impl GraphEdge {
    pub fn new(source_id: NodeId, target_id: NodeId, kind: EdgeKind) -> Self {
        GraphEdge {
            source_id,
            target_id,
            kind,
            confidence: Confidence::None,
            module: None,
            imported_name: None,
            via_star: false,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Kind of mutation an operation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    AddNode,
    RemoveNode,
    UpdateNode,
}

/// The node kind an operation applies to, or the informational
/// `propagation` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpNodeType {
    Function,
    Class,
    Variable,
    Import,
    ModuleCode,
    Propagation,
}

impl From<EntityKind> for OpNodeType {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Function => OpNodeType::Function,
            EntityKind::Class => OpNodeType::Class,
            EntityKind::Variable => OpNodeType::Variable,
            EntityKind::Import => OpNodeType::Import,
            EntityKind::ModuleCode => OpNodeType::ModuleCode,
        }
    }
}

/// Properties attached to an emitted operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpProperties {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
    /// Names of cross-file callers that pointed at a removed node; the
    /// surrounding system surfaces these as breaking-change warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub had_callers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<String>,
    /// Propagation marker: which file was re-parsed, in which phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// A graph mutation record emitted by the delta pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphOperation {
    pub op_type: OpType,
    pub node_id: NodeId,
    pub node_type: OpNodeType,
    #[serde(default)]
    pub properties: OpProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<(NodeId, EdgeKind)>,
}

impl GraphOperation {
    pub fn new(op_type: OpType, node_id: NodeId, node_type: OpNodeType) -> Self {
        GraphOperation {
            op_type,
            node_id,
            node_type,
            properties: OpProperties::default(),
            edges: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_deterministic() {
        let a = NodeId::new("src/auth.py", EntityKind::Function, "login");
        let b = NodeId::new("src/auth.py", EntityKind::Function, "login");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);

        let c = NodeId::new("src/auth.py", EntityKind::Function, "logout");
        assert_ne!(a, c);
        let d = NodeId::new("src/auth.py", EntityKind::Class, "login");
        assert_ne!(a, d);
    }

    #[test]
    fn short_hash_truncates() {
        assert_eq!(short_hash("abc", 12).len(), 12);
        assert_eq!(short_hash("abc", 12), short_hash("abc", 16)[..12]);
    }

    #[test]
    fn node_from_entity_copies_metadata() {
        let mut entity = Entity::new(EntityKind::Function, "Svc.run", 3, 9, "sig", "struct");
        entity.calls.push("helper".into());
        entity.decorators.push("staticmethod".into());
        let node = GraphNode::from_entity(&entity, "svc.py");
        assert_eq!(node.id, NodeId::new("svc.py", EntityKind::Function, "Svc.run"));
        assert_eq!(node.calls, vec!["helper"]);
        assert_eq!(node.bare_name(), "run");
    }

    #[test]
    fn edge_serde_skips_empty_metadata() {
        let edge = GraphEdge::new(
            NodeId("a".into()),
            NodeId("b".into()),
            EdgeKind::Calls,
        )
        .with_confidence(Confidence::Medium);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["confidence"], "medium");
        assert!(json.get("module").is_none());
        assert!(json.get("via_star").is_none());

        let back: GraphEdge = serde_json::from_value(json).unwrap();
        assert_eq!(back, edge);
    }

    #[test]
    fn operation_serde_round_trip() {
        let mut op = GraphOperation::new(
            OpType::RemoveNode,
            NodeId("deadbeef".into()),
            OpNodeType::Function,
        );
        op.properties.name = "helper".into();
        op.properties.had_callers = vec!["caller".into()];
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"remove_node\""));
        let back: GraphOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}
