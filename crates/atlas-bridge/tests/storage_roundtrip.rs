//! Persistence: round-trip fidelity, version gating, and legacy formats.

use atlas_bridge::{
    Bridge, CURRENT_FORMAT_VERSION, StorageError, deserialize_bridge, load_state, save_state,
    serialize_bridge,
};
use serde_json::json;

fn populated_bridge() -> Bridge {
    let mut bridge = Bridge::new();
    bridge.process_change("api/auth.py", "", "def login(user):\n    return user\n");
    bridge.process_change(
        "api/views.py",
        "",
        "from auth import login\n\ndef handle(req):\n    return login(req)\n",
    );
    bridge
}

#[test]
fn round_trip_preserves_graph_and_indexes() {
    let bridge = populated_bridge();
    let value = serialize_bridge(&bridge);
    let restored = deserialize_bridge(value).unwrap();

    assert_eq!(restored.graph.compute_hash(), bridge.graph.compute_hash());
    assert_eq!(restored.graph.node_count(), bridge.graph.node_count());
    assert_eq!(restored.graph.edge_count(), bridge.graph.edge_count());
    assert_eq!(restored.module_file_index(), bridge.module_file_index());
    assert_eq!(restored.dependency_index(), bridge.dependency_index());
    assert_eq!(restored.resolution_stats(), bridge.resolution_stats());
    assert_eq!(restored.tracked_files(), bridge.tracked_files());
}

#[test]
fn round_trip_preserves_edge_confidence() {
    let bridge = populated_bridge();
    let restored = deserialize_bridge(serialize_bridge(&bridge)).unwrap();

    let mut original_edges: Vec<String> = bridge
        .graph
        .all_edges()
        .map(|e| format!("{}->{}:{}:{:?}", e.source_id, e.target_id, e.kind, e.confidence))
        .collect();
    let mut restored_edges: Vec<String> = restored
        .graph
        .all_edges()
        .map(|e| format!("{}->{}:{}:{:?}", e.source_id, e.target_id, e.kind, e.confidence))
        .collect();
    original_edges.sort();
    restored_edges.sort();
    assert_eq!(original_edges, restored_edges);
}

#[test]
fn round_trip_preserves_version_state() {
    let mut bridge = Bridge::new();
    bridge.enable_versioning();
    bridge.process_change("a.py", "", "def f():\n    pass\n");
    assert!(bridge.version() > 0);

    let restored = deserialize_bridge(serialize_bridge(&bridge)).unwrap();
    assert_eq!(restored.version(), bridge.version());
    let log = restored.versioned_log().expect("versioning restored");
    assert_eq!(log.get_file_version("a.py"), bridge.version());
}

#[test]
fn newer_format_version_is_refused() {
    let doc = json!({
        "format_version": CURRENT_FORMAT_VERSION + 1,
        "nodes": [],
        "edges": [],
    });
    let err = deserialize_bridge(doc).unwrap_err();
    assert!(matches!(
        err,
        StorageError::UnsupportedVersion { found, supported }
            if found == CURRENT_FORMAT_VERSION + 1 && supported == CURRENT_FORMAT_VERSION
    ));
}

#[test]
fn legacy_file_contents_map_is_harvested() {
    let doc = json!({
        "format_version": 2,
        "nodes": [],
        "edges": [],
        "file_contents": {
            "old/a.py": "def f():\n    pass\n",
            "old/b.py": "def g():\n    pass\n",
        },
    });
    let bridge = deserialize_bridge(doc).unwrap();
    assert!(bridge.tracked_files().contains("old/a.py"));
    assert!(bridge.tracked_files().contains("old/b.py"));
    // Contents themselves are not retained in the new format.
    assert_eq!(bridge.graph.node_count(), 0);
}

#[test]
fn save_and_load_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let bridge = populated_bridge();

    save_state(&bridge, &path).unwrap();
    let restored = load_state(&path).unwrap().expect("state present");
    assert_eq!(restored.graph.compute_hash(), bridge.graph.compute_hash());

    assert!(load_state(&dir.path().join("missing.json")).unwrap().is_none());
}

#[test]
fn corrupt_state_file_is_deleted_and_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(load_state(&path).unwrap().is_none());
    assert!(!path.exists());
}

#[test]
fn unsupported_version_on_disk_fails_hard() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let doc = json!({
        "format_version": CURRENT_FORMAT_VERSION + 7,
        "nodes": [],
        "edges": [],
    });
    std::fs::write(&path, doc.to_string()).unwrap();

    assert!(load_state(&path).is_err());
}
