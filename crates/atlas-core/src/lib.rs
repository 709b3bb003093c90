//! Atlas core — graph data model, indexed graph store, reversible
//! operations, and the versioned operation log.

pub mod filters;
pub mod graph;
pub mod model;
pub mod ops;
pub mod versioned;

pub use filters::{
    COMMON_ATTR_METHODS, FRAMEWORK_DEAD_CODE_PREFIXES, KNOWN_EXTERNAL_PACKAGES, PY_BUILTINS,
    STDLIB_MODULES, SUPPORTED_EXTENSIONS, is_test_file,
};
pub use graph::{CodeGraph, Direction};
pub use model::{
    Confidence, EdgeKind, Entity, EntityKind, GraphEdge, GraphNode, GraphOperation, NodeId,
    OpNodeType, OpProperties, OpType, short_hash,
};
pub use ops::{GraphOp, NodeUpdates, OperationBatch};
pub use versioned::{
    Conflict, ConflictKind, ConflictSeverity, LogEntry, Session, SessionManager, SessionOutcome,
    SessionStatus, VersionedLog,
};
