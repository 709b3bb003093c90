//! JSON persistence for bridge state.
//!
//! Format v3 stores only tracked-file names (`file_contents_keys`); v1/v2
//! documents carrying a full `file_contents` map are still accepted and
//! their keys harvested. Documents newer than the supported version are
//! refused with a dedicated error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atlas_core::{GraphEdge, GraphNode, VersionedLog};

use crate::bridge::Bridge;
use crate::resolve::ResolutionStats;

pub const CURRENT_FORMAT_VERSION: u32 = 3;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("state file format v{found} is newer than supported v{supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("malformed state document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct StateDocument {
    format_version: u32,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    file_contents_keys: Vec<String>,
    /// v1/v2 compatibility: full contents were stored inline.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    file_contents: HashMap<String, String>,
    #[serde(default)]
    dependency_index: HashMap<String, Vec<String>>,
    #[serde(default)]
    module_file_index: HashMap<String, String>,
    #[serde(default)]
    module_file_collisions: Vec<String>,
    #[serde(default)]
    resolution_stats: ResolutionStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    graph_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_vector: Option<HashMap<String, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// Serialize a bridge to a JSON value in the current format.
pub fn serialize_bridge(bridge: &Bridge) -> serde_json::Value {
    let document = StateDocument {
        format_version: CURRENT_FORMAT_VERSION,
        nodes: bridge.graph.all_nodes().cloned().collect(),
        edges: bridge.graph.all_edges().cloned().collect(),
        file_contents_keys: bridge.tracked_files().iter().cloned().collect(),
        file_contents: HashMap::new(),
        dependency_index: bridge
            .dependency_index()
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect(),
        module_file_index: bridge.module_file_index().clone(),
        module_file_collisions: bridge.module_file_collisions.iter().cloned().collect(),
        resolution_stats: bridge.resolution_stats(),
        graph_version: bridge.versioned_log().map(|log| log.version()),
        version_vector: bridge.versioned_log().map(|log| log.version_vector()),
        saved_at: Some(Utc::now()),
    };
    serde_json::to_value(&document).unwrap_or_default()
}

/// Rebuild a bridge from a persisted JSON value.
pub fn deserialize_bridge(value: serde_json::Value) -> Result<Bridge, StorageError> {
    let found = value
        .get("format_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(1) as u32;
    if found > CURRENT_FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found,
            supported: CURRENT_FORMAT_VERSION,
        });
    }

    let document: StateDocument = serde_json::from_value(value)?;
    let mut bridge = Bridge::new();

    for node in document.nodes {
        bridge.graph.add_node(node);
    }
    for edge in document.edges {
        bridge.graph.add_edge(edge);
    }

    if !document.file_contents_keys.is_empty() {
        bridge.tracked_files = document.file_contents_keys.into_iter().collect();
    } else if !document.file_contents.is_empty() {
        bridge.tracked_files = document.file_contents.keys().cloned().collect();
    }

    bridge.dependency_index = document
        .dependency_index
        .into_iter()
        .map(|(k, v)| (k, v.into_iter().collect()))
        .collect();
    bridge.module_file_index = document.module_file_index;
    bridge.module_file_collisions = document.module_file_collisions.into_iter().collect();
    bridge.resolution_stats = document.resolution_stats;

    if let Some(graph_version) = document.graph_version {
        let log = Arc::new(VersionedLog::default());
        log.restore(graph_version, document.version_vector.unwrap_or_default());
        bridge.versioned = Some(log);
    }

    Ok(bridge)
}

/// Save bridge state to a file.
pub fn save_state(bridge: &Bridge, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(&serialize_bridge(bridge))?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), "bridge state saved");
    Ok(())
}

/// Load bridge state from a file. Missing files and corrupt documents yield
/// `None` (corrupt files are deleted); only an unsupported newer format
/// version is a hard error.
pub fn load_state(path: &Path) -> anyhow::Result<Option<Bridge>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unreadable state file");
            return Ok(None);
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "corrupt state file, removing");
            let _ = std::fs::remove_file(path);
            return Ok(None);
        }
    };
    match deserialize_bridge(value) {
        Ok(bridge) => Ok(Some(bridge)),
        Err(StorageError::UnsupportedVersion { found, supported }) => {
            Err(StorageError::UnsupportedVersion { found, supported }.into())
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "corrupt state file, removing");
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
    }
}

/// Whether the state file is too old to be useful. Uses mtime instead of
/// parsing the document.
pub fn is_state_stale(path: &Path, max_age: Duration) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return true;
    };
    let Ok(modified) = metadata.modified() else {
        return true;
    };
    modified
        .elapsed()
        .map(|elapsed| elapsed > max_age)
        .unwrap_or(true)
}
