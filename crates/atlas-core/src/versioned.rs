//! Versioned operation log with conflict detection and session management.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::graph::CodeGraph;
use crate::model::{GraphOperation, NodeId, OpType};

/// One recorded operation with its assigned version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub operation: GraphOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// The entity was deleted since the base version.
    Deletion,
    /// The entity was renamed since the base version, or the proposed change
    /// references a name that was renamed away.
    Rename,
    /// The same entity was edited by both sides.
    ConcurrentEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
    pub node_id: NodeId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_op: Option<GraphOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_op: Option<GraphOperation>,
}

#[derive(Default)]
struct LogState {
    version: u64,
    log: VecDeque<LogEntry>,
}

/// Thread-safe operation log. Versions are dense and monotonic; the log
/// retains the most recent `max_log_size` entries. The per-file version
/// vector lives in a concurrent map so readers never contend with the log
/// lock.
pub struct VersionedLog {
    state: Mutex<LogState>,
    version_vector: DashMap<String, u64>,
    max_log_size: usize,
}

impl Default for VersionedLog {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl VersionedLog {
    pub fn new(max_log_size: usize) -> Self {
        VersionedLog {
            state: Mutex::new(LogState::default()),
            version_vector: DashMap::new(),
            max_log_size,
        }
    }

    /// Current version (0 before any operation is recorded).
    pub fn version(&self) -> u64 {
        self.state.lock().map(|s| s.version).unwrap_or(0)
    }

    /// Record an operation, assign it the next version, and stamp the file's
    /// version vector entry.
    pub fn record_operation(&self, op: GraphOperation, file_path: Option<&str>) -> u64 {
        let Ok(mut state) = self.state.lock() else {
            return 0;
        };
        state.version += 1;
        let version = state.version;
        state.log.push_back(LogEntry {
            version,
            timestamp: Utc::now(),
            operation: op,
        });
        while state.log.len() > self.max_log_size {
            state.log.pop_front();
        }
        drop(state);

        if let Some(file) = file_path {
            self.version_vector.insert(file.to_string(), version);
        }
        version
    }

    /// All retained operations with a version greater than `base_version`.
    pub fn get_operations_since(&self, base_version: u64) -> Vec<LogEntry> {
        self.state
            .lock()
            .map(|s| {
                s.log
                    .iter()
                    .filter(|e| e.version > base_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Latest recorded version for a file (0 if never touched).
    pub fn get_file_version(&self, file_path: &str) -> u64 {
        self.version_vector
            .get(file_path)
            .map(|v| *v.value())
            .unwrap_or(0)
    }

    /// Snapshot of the per-file version vector, for persistence.
    pub fn version_vector(&self) -> HashMap<String, u64> {
        self.version_vector
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    /// Restore state from a persisted version and vector.
    pub fn restore(&self, version: u64, vector: HashMap<String, u64>) {
        if let Ok(mut state) = self.state.lock() {
            state.version = version;
        }
        self.version_vector.clear();
        for (k, v) in vector {
            self.version_vector.insert(k, v);
        }
    }

    /// Detect conflicts between operations recorded since `base_version` and
    /// a proposed change list computed against a snapshot at that version.
    pub fn detect_conflicts(
        &self,
        base_version: u64,
        proposed_changes: &[GraphOperation],
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let recent = self.get_operations_since(base_version);
        if recent.is_empty() {
            return conflicts;
        }

        let mut ops_by_node: HashMap<&NodeId, Vec<&GraphOperation>> = HashMap::new();
        for entry in &recent {
            ops_by_node
                .entry(&entry.operation.node_id)
                .or_default()
                .push(&entry.operation);
        }

        for proposed in proposed_changes {
            if let Some(existing_ops) = ops_by_node.get(&proposed.node_id) {
                for existing in existing_ops {
                    if existing.op_type == OpType::RemoveNode {
                        conflicts.push(Conflict {
                            kind: ConflictKind::Deletion,
                            severity: ConflictSeverity::Error,
                            node_id: proposed.node_id.clone(),
                            description: format!(
                                "node {} was deleted since base version",
                                proposed.node_id
                            ),
                            existing_op: Some((*existing).clone()),
                            proposed_op: Some(proposed.clone()),
                        });
                    } else if let Some(renamed_from) = &existing.properties.renamed_from {
                        conflicts.push(Conflict {
                            kind: ConflictKind::Rename,
                            severity: ConflictSeverity::Warning,
                            node_id: proposed.node_id.clone(),
                            description: format!(
                                "node {} was renamed from {renamed_from}",
                                proposed.node_id
                            ),
                            existing_op: Some((*existing).clone()),
                            proposed_op: Some(proposed.clone()),
                        });
                    } else if existing.op_type == OpType::UpdateNode
                        && proposed.op_type == OpType::UpdateNode
                    {
                        conflicts.push(Conflict {
                            kind: ConflictKind::ConcurrentEdit,
                            severity: ConflictSeverity::Warning,
                            node_id: proposed.node_id.clone(),
                            description: format!(
                                "node {} was concurrently edited",
                                proposed.node_id
                            ),
                            existing_op: Some((*existing).clone()),
                            proposed_op: Some(proposed.clone()),
                        });
                    }
                }
            }

            // A proposed op that still calls or uses a name renamed away.
            for entry in &recent {
                if let Some(old_name) = &entry.operation.properties.renamed_from {
                    if proposed.properties.calls.iter().any(|c| c == old_name)
                        || proposed.properties.uses.iter().any(|u| u == old_name)
                    {
                        conflicts.push(Conflict {
                            kind: ConflictKind::Rename,
                            severity: ConflictSeverity::Warning,
                            node_id: proposed.node_id.clone(),
                            description: format!(
                                "proposed change references renamed entity '{old_name}'"
                            ),
                            existing_op: Some(entry.operation.clone()),
                            proposed_op: Some(proposed.clone()),
                        });
                    }
                }
            }
        }

        conflicts
    }

    /// Rewrite proposed operations through a rename map (old name -> new
    /// name) so stale call/use references follow the rename.
    pub fn resolve_rename_conflicts(
        proposed_changes: &[GraphOperation],
        renames: &HashMap<String, String>,
    ) -> Vec<GraphOperation> {
        proposed_changes
            .iter()
            .map(|op| {
                let mut resolved = op.clone();
                for call in resolved.properties.calls.iter_mut() {
                    if let Some(new_name) = renames.get(call) {
                        *call = new_name.clone();
                    }
                }
                for used in resolved.properties.uses.iter_mut() {
                    if let Some(new_name) = renames.get(used) {
                        *used = new_name.clone();
                    }
                }
                resolved
            })
            .collect()
    }

    /// Drop proposed operations that target deleted nodes.
    pub fn resolve_deletion_conflicts(
        proposed_changes: &[GraphOperation],
        deleted_node_ids: &HashSet<NodeId>,
    ) -> Vec<GraphOperation> {
        proposed_changes
            .iter()
            .filter(|op| !deleted_node_ids.contains(&op.node_id))
            .cloned()
            .collect()
    }
}

/// An active session with its captured base state.
pub struct Session {
    pub id: String,
    pub base_version: u64,
    pub snapshot: CodeGraph,
    created_at: Instant,
    completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Clean,
    CleanWithDrift,
    Conflicts,
    UnknownSession,
}

pub struct SessionOutcome {
    pub status: SessionStatus,
    pub drift: u64,
    pub conflicts: Vec<Conflict>,
    pub can_apply: bool,
}

/// Manages concurrent edit sessions against the versioned log. A session
/// captures the version and a graph snapshot at start; completion reports
/// drift and any conflicts with the proposed operations.
pub struct SessionManager {
    log: Arc<VersionedLog>,
    sessions: HashMap<String, Session>,
    max_age: Duration,
    max_active: usize,
    next_id: u64,
}

impl SessionManager {
    pub fn new(log: Arc<VersionedLog>) -> Self {
        Self::with_limits(log, Duration::from_secs(300), 10)
    }

    pub fn with_limits(log: Arc<VersionedLog>, max_age: Duration, max_active: usize) -> Self {
        SessionManager {
            log,
            sessions: HashMap::new(),
            max_age,
            max_active,
            next_id: 0,
        }
    }

    /// Start a session capturing the current version and a deep copy of
    /// the graph.
    pub fn start_session(&mut self, graph: &CodeGraph) -> &Session {
        self.cleanup_stale();
        let id = format!("session_{}", self.next_id);
        self.next_id += 1;
        let session = Session {
            id: id.clone(),
            base_version: self.log.version(),
            snapshot: graph.snapshot(),
            created_at: Instant::now(),
            completed: false,
        };
        self.sessions.entry(id).or_insert(session)
    }

    pub fn get_session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Complete a session: report drift since its base version and detect
    /// conflicts with the proposed operations, if any.
    pub fn complete_session(
        &mut self,
        id: &str,
        proposed_changes: Option<&[GraphOperation]>,
    ) -> SessionOutcome {
        let Some(session) = self.sessions.get_mut(id) else {
            return SessionOutcome {
                status: SessionStatus::UnknownSession,
                drift: 0,
                conflicts: Vec::new(),
                can_apply: false,
            };
        };
        session.completed = true;
        let base_version = session.base_version;
        let drift = self.log.version().saturating_sub(base_version);

        if drift == 0 {
            return SessionOutcome {
                status: SessionStatus::Clean,
                drift: 0,
                conflicts: Vec::new(),
                can_apply: true,
            };
        }

        let Some(proposed) = proposed_changes else {
            return SessionOutcome {
                status: SessionStatus::CleanWithDrift,
                drift,
                conflicts: Vec::new(),
                can_apply: true,
            };
        };

        let conflicts = self.log.detect_conflicts(base_version, proposed);
        if conflicts.is_empty() {
            SessionOutcome {
                status: SessionStatus::CleanWithDrift,
                drift,
                conflicts,
                can_apply: true,
            }
        } else {
            SessionOutcome {
                status: SessionStatus::Conflicts,
                drift,
                conflicts,
                can_apply: false,
            }
        }
    }

    /// Drop expired or completed sessions, then evict oldest until under the
    /// active cap.
    fn cleanup_stale(&mut self) {
        let max_age = self.max_age;
        self.sessions
            .retain(|_, s| !s.completed && s.created_at.elapsed() <= max_age);

        while self.sessions.len() >= self.max_active {
            let oldest = self
                .sessions
                .values()
                .min_by_key(|s| s.created_at)
                .map(|s| s.id.clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphOperation, OpNodeType, OpType};

    fn op(op_type: OpType, id: &str) -> GraphOperation {
        GraphOperation::new(op_type, NodeId(id.to_string()), OpNodeType::Function)
    }

    #[test]
    fn versions_are_dense_and_monotonic() {
        let log = VersionedLog::default();
        assert_eq!(log.version(), 0);
        assert_eq!(log.record_operation(op(OpType::AddNode, "a"), Some("a.py")), 1);
        assert_eq!(log.record_operation(op(OpType::UpdateNode, "a"), Some("a.py")), 2);
        assert_eq!(log.record_operation(op(OpType::AddNode, "b"), Some("b.py")), 3);
        assert_eq!(log.version(), 3);
        assert_eq!(log.get_file_version("a.py"), 2);
        assert_eq!(log.get_file_version("b.py"), 3);
        assert_eq!(log.get_file_version("missing.py"), 0);
        assert_eq!(log.get_operations_since(1).len(), 2);
    }

    #[test]
    fn log_is_capped() {
        let log = VersionedLog::new(3);
        for i in 0..10 {
            log.record_operation(op(OpType::AddNode, &format!("n{i}")), None);
        }
        let entries = log.get_operations_since(0);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].version, 8);
        assert_eq!(log.version(), 10);
    }

    #[test]
    fn deletion_conflict_is_error() {
        let log = VersionedLog::default();
        let base = log.version();
        log.record_operation(op(OpType::RemoveNode, "x"), Some("x.py"));

        let conflicts = log.detect_conflicts(base, &[op(OpType::UpdateNode, "x")]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Deletion);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Error);
    }

    #[test]
    fn rename_and_concurrent_edit_are_warnings() {
        let log = VersionedLog::default();
        let base = log.version();
        let mut renamed = op(OpType::UpdateNode, "x");
        renamed.properties.renamed_from = Some("old_fn".into());
        log.record_operation(renamed, Some("x.py"));
        log.record_operation(op(OpType::UpdateNode, "y"), Some("y.py"));

        let mut proposed_call = op(OpType::UpdateNode, "z");
        proposed_call.properties.calls = vec!["old_fn".into()];

        let conflicts =
            log.detect_conflicts(base, &[op(OpType::UpdateNode, "y"), proposed_call]);
        assert!(conflicts
            .iter()
            .any(|c| c.kind == ConflictKind::ConcurrentEdit));
        assert!(conflicts.iter().any(|c| c.kind == ConflictKind::Rename));
        assert!(conflicts
            .iter()
            .all(|c| c.severity == ConflictSeverity::Warning));
    }

    #[test]
    fn rename_resolution_rewrites_references() {
        let mut proposed = op(OpType::UpdateNode, "z");
        proposed.properties.calls = vec!["old_fn".into(), "keep".into()];
        proposed.properties.uses = vec!["old_fn".into()];
        let renames = HashMap::from([("old_fn".to_string(), "new_fn".to_string())]);

        let resolved = VersionedLog::resolve_rename_conflicts(&[proposed], &renames);
        assert_eq!(resolved[0].properties.calls, vec!["new_fn", "keep"]);
        assert_eq!(resolved[0].properties.uses, vec!["new_fn"]);
    }

    #[test]
    fn session_clean_and_drift() {
        let log = Arc::new(VersionedLog::default());
        let mut sessions = SessionManager::new(Arc::clone(&log));
        let graph = CodeGraph::new();

        let id = sessions.start_session(&graph).id.clone();
        let outcome = sessions.complete_session(&id, None);
        assert_eq!(outcome.status, SessionStatus::Clean);

        let session = sessions.start_session(&graph);
        assert_eq!(session.base_version, 0);
        let id2 = session.id.clone();
        log.record_operation(op(OpType::AddNode, "a"), Some("a.py"));
        let outcome = sessions.complete_session(&id2, None);
        assert_eq!(outcome.status, SessionStatus::CleanWithDrift);
        assert_eq!(outcome.drift, 1);

        let outcome = sessions.complete_session("session_99", None);
        assert_eq!(outcome.status, SessionStatus::UnknownSession);
    }

    #[test]
    fn session_conflict_blocks_apply() {
        let log = Arc::new(VersionedLog::default());
        let mut sessions = SessionManager::new(Arc::clone(&log));
        let graph = CodeGraph::new();

        let id = sessions.start_session(&graph).id.clone();
        log.record_operation(op(OpType::RemoveNode, "x"), Some("x.py"));
        let outcome = sessions.complete_session(&id, Some(&[op(OpType::UpdateNode, "x")]));
        assert_eq!(outcome.status, SessionStatus::Conflicts);
        assert!(!outcome.can_apply);
    }

    #[test]
    fn session_cap_evicts_oldest() {
        let log = Arc::new(VersionedLog::default());
        let mut sessions = SessionManager::with_limits(log, Duration::from_secs(300), 3);
        let graph = CodeGraph::new();

        let first = sessions.start_session(&graph).id.clone();
        for _ in 0..4 {
            sessions.start_session(&graph);
        }
        assert!(sessions.get_session(&first).is_none());
    }
}
