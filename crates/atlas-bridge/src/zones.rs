//! HOT/WARM/COLD file zones for prioritized updates.
//!
//! Open files sit in HOT, their direct dependencies and recently closed
//! files in WARM, everything else in COLD. HOT is capped; the oldest
//! non-open file is demoted when the cap is exceeded.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use atlas_core::CodeGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Hot,
    Warm,
    Cold,
}

#[derive(Debug, Clone)]
pub struct ZoneCacheConfig {
    pub max_hot_files: usize,
    pub max_warm_files: usize,
}

impl Default for ZoneCacheConfig {
    fn default() -> Self {
        ZoneCacheConfig {
            max_hot_files: 10,
            max_warm_files: 50,
        }
    }
}

#[derive(Debug)]
struct FileState {
    zone: Zone,
    is_open: bool,
    last_access: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneStats {
    pub hot_files: usize,
    pub warm_files: usize,
    pub cold_files: usize,
    pub total_files: usize,
}

/// Zone-based cache state for open/recent/cold files.
#[derive(Default)]
pub struct ZoneCache {
    config: ZoneCacheConfig,
    states: HashMap<String, FileState>,
    hot: HashSet<String>,
    warm: HashSet<String>,
    cold: HashSet<String>,
}

impl ZoneCache {
    pub fn new(config: ZoneCacheConfig) -> Self {
        ZoneCache {
            config,
            states: HashMap::new(),
            hot: HashSet::new(),
            warm: HashSet::new(),
            cold: HashSet::new(),
        }
    }

    fn ensure_state(&mut self, file_path: &str) {
        if !self.states.contains_key(file_path) {
            self.states.insert(
                file_path.to_string(),
                FileState {
                    zone: Zone::Cold,
                    is_open: false,
                    last_access: Instant::now(),
                },
            );
            self.cold.insert(file_path.to_string());
        }
    }

    /// Mark a file open: promote to HOT, pull its COLD dependencies up to
    /// WARM, and evict over the HOT cap.
    pub fn open_file(&mut self, file_path: &str, graph: &CodeGraph) {
        self.ensure_state(file_path);
        if let Some(state) = self.states.get_mut(file_path) {
            state.is_open = true;
            state.last_access = Instant::now();
        }
        self.move_to_zone(file_path, Zone::Hot);

        // Direct dependency targets warm up so the first edit after opening
        // resolves against fresh state.
        let mut dep_files: Vec<String> = Vec::new();
        for node in graph.get_nodes_by_file(file_path) {
            for edge in graph.edges_from(&node.id) {
                if let Some(target) = graph.get_node(&edge.target_id) {
                    if target.file_path != file_path {
                        dep_files.push(target.file_path.clone());
                    }
                }
            }
        }
        for dep in dep_files {
            self.ensure_state(&dep);
            if self.zone_of(&dep) == Zone::Cold {
                self.move_to_zone(&dep, Zone::Warm);
            }
        }

        self.evict_hot_if_needed();
    }

    /// Mark a file closed: demote to WARM, never straight to COLD.
    pub fn close_file(&mut self, file_path: &str) {
        self.ensure_state(file_path);
        if let Some(state) = self.states.get_mut(file_path) {
            state.is_open = false;
        }
        self.move_to_zone(file_path, Zone::Warm);
    }

    /// Record a read or edit without an open.
    pub fn access_file(&mut self, file_path: &str) {
        self.ensure_state(file_path);
        if let Some(state) = self.states.get_mut(file_path) {
            state.last_access = Instant::now();
        }
    }

    pub fn zone_of(&self, file_path: &str) -> Zone {
        self.states
            .get(file_path)
            .map(|s| s.zone)
            .unwrap_or(Zone::Cold)
    }

    /// Update priority: base 100, −50 if open, −30 if accessed within 60 s,
    /// +20 for test paths. Lower runs first.
    pub fn get_update_priority(&mut self, file_path: &str) -> i64 {
        self.ensure_state(file_path);
        let mut priority = 100;
        if let Some(state) = self.states.get(file_path) {
            if state.is_open {
                priority -= 50;
            }
            if state.last_access.elapsed() < Duration::from_secs(60) {
                priority -= 30;
            }
        }
        if file_path.to_lowercase().contains("test") {
            priority += 20;
        }
        priority
    }

    pub fn files_in_zone(&self, zone: Zone) -> &HashSet<String> {
        match zone {
            Zone::Hot => &self.hot,
            Zone::Warm => &self.warm,
            Zone::Cold => &self.cold,
        }
    }

    pub fn stats(&self) -> ZoneStats {
        ZoneStats {
            hot_files: self.hot.len(),
            warm_files: self.warm.len(),
            cold_files: self.cold.len(),
            total_files: self.states.len(),
        }
    }

    fn move_to_zone(&mut self, file_path: &str, zone: Zone) {
        self.hot.remove(file_path);
        self.warm.remove(file_path);
        self.cold.remove(file_path);
        match zone {
            Zone::Hot => self.hot.insert(file_path.to_string()),
            Zone::Warm => self.warm.insert(file_path.to_string()),
            Zone::Cold => self.cold.insert(file_path.to_string()),
        };
        if let Some(state) = self.states.get_mut(file_path) {
            state.zone = zone;
        }
    }

    /// Demote the oldest non-open HOT files until under the cap.
    fn evict_hot_if_needed(&mut self) {
        while self.hot.len() > self.config.max_hot_files {
            let oldest = self
                .hot
                .iter()
                .filter(|fp| self.states.get(*fp).is_some_and(|s| !s.is_open))
                .min_by_key(|fp| self.states.get(*fp).map(|s| s.last_access))
                .cloned();
            match oldest {
                Some(fp) => self.move_to_zone(&fp, Zone::Warm),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{Entity, EntityKind, GraphEdge, GraphNode, EdgeKind};

    fn graph_with_dep() -> CodeGraph {
        let mut graph = CodeGraph::new();
        let caller = GraphNode::from_entity(
            &Entity::new(EntityKind::Function, "caller", 1, 2, "s1", "t1"),
            "a.py",
        );
        let callee = GraphNode::from_entity(
            &Entity::new(EntityKind::Function, "callee", 1, 2, "s2", "t2"),
            "b.py",
        );
        let edge = GraphEdge::new(caller.id.clone(), callee.id.clone(), EdgeKind::Calls);
        graph.add_node(caller);
        graph.add_node(callee);
        graph.add_edge(edge);
        graph
    }

    #[test]
    fn open_promotes_file_and_warms_deps() {
        let graph = graph_with_dep();
        let mut zones = ZoneCache::default();

        zones.open_file("a.py", &graph);
        assert_eq!(zones.zone_of("a.py"), Zone::Hot);
        assert_eq!(zones.zone_of("b.py"), Zone::Warm);
        assert_eq!(zones.zone_of("c.py"), Zone::Cold);
    }

    #[test]
    fn close_demotes_to_warm_not_cold() {
        let graph = graph_with_dep();
        let mut zones = ZoneCache::default();
        zones.open_file("a.py", &graph);
        zones.close_file("a.py");
        assert_eq!(zones.zone_of("a.py"), Zone::Warm);
    }

    #[test]
    fn hot_cap_evicts_oldest_closed() {
        let graph = CodeGraph::new();
        let mut zones = ZoneCache::new(ZoneCacheConfig {
            max_hot_files: 2,
            max_warm_files: 50,
        });
        zones.open_file("a.py", &graph);
        zones.open_file("b.py", &graph);
        zones.close_file("a.py");
        zones.open_file("a.py", &graph);
        // All three open files fit under is_open protection; close one and
        // open a fourth to force eviction.
        zones.close_file("b.py");
        zones.open_file("c.py", &graph);
        assert_eq!(zones.zone_of("b.py"), Zone::Warm);
        assert_eq!(zones.stats().hot_files, 2);
    }

    #[test]
    fn update_priority_weights() {
        let graph = graph_with_dep();
        let mut zones = ZoneCache::default();
        zones.open_file("a.py", &graph);
        // Open and just accessed.
        assert_eq!(zones.get_update_priority("a.py"), 20);
        // Fresh state counts as recently accessed.
        assert_eq!(zones.get_update_priority("other.py"), 70);
        assert_eq!(zones.get_update_priority("tests/x.py"), 90);
    }
}
