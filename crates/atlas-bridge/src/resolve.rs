//! Name resolution: pick the best graph node for an unresolved name seen in
//! a file, with confidence scoring and resolution statistics.
//!
//! Priority ladder:
//! 1. Qualified `receiver.method` via class nodes or the receiver's file
//! 2. Semantic-path (LEGB) resolution for the primary language
//! 3. Exact name from an imported file
//! 4. Exact name cross-file (path-similarity tiebreak, test files penalized)
//! 5. Exact name same-file
//! 6. Suffix `.name` matches, in the same order
//! 7. Inheritance-chain walk for `Class.method` names
//! 8. Indexed suffix fallback for bare names
//! 9. Any node with the name, preferring non-test files

use serde::{Deserialize, Serialize};

use atlas_core::filters::PY_BUILTINS;
use atlas_core::{Confidence, EdgeKind, EntityKind, NodeId, is_test_file};
use atlas_extract::resolve_name;

use crate::bridge::Bridge;

/// Resolver counters, persisted with the graph state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    #[serde(default)]
    pub total_attempted: u64,
    #[serde(default)]
    pub resolved: u64,
    #[serde(default)]
    pub ambiguous: u64,
    #[serde(default)]
    pub to_test_file: u64,
    #[serde(default)]
    pub external_skipped: u64,
}

/// Shared leading path segments between two files; tiebreak only.
pub(crate) fn path_similarity(file_a: &str, file_b: &str) -> usize {
    file_a
        .split('/')
        .zip(file_b.split('/'))
        .take_while(|(a, b)| a == b)
        .count()
}

impl Bridge {
    /// Resolve `name` as seen from `current_file` to a node of the expected
    /// kind, returning the node and the resolver's confidence in it.
    pub(crate) fn find_target_node(
        &mut self,
        name: &str,
        current_file: &str,
        expected: EntityKind,
    ) -> Option<(NodeId, Confidence)> {
        self.resolution_stats.total_attempted += 1;

        if PY_BUILTINS.contains(name) {
            self.resolution_stats.external_skipped += 1;
            return None;
        }

        let caller_is_test = is_test_file(current_file);

        // Qualified name: resolve the receiver first.
        if let Some((receiver, method)) = name.split_once('.') {
            let method_suffix = format!(".{method}");

            // Capitalized receiver naming a known class: search that
            // class's file.
            if receiver.chars().next().is_some_and(|c| c.is_uppercase())
                && !PY_BUILTINS.contains(receiver)
            {
                let class_files: Vec<String> = self
                    .graph
                    .name_index()
                    .get(receiver)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(|id| self.graph.get_node(id))
                            .filter(|n| n.kind == EntityKind::Class)
                            .map(|n| n.file_path.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                for class_file in class_files {
                    let hit = self
                        .graph
                        .get_nodes_by_file(&class_file)
                        .into_iter()
                        .find(|n| {
                            n.kind == expected
                                && (n.name == name
                                    || n.name == method
                                    || n.name.ends_with(&method_suffix))
                        })
                        .map(|n| (n.id.clone(), n.file_path.clone()));
                    if let Some((id, file)) = hit {
                        self.resolution_stats.resolved += 1;
                        if is_test_file(&file) {
                            self.resolution_stats.to_test_file += 1;
                        }
                        return Some((id, Confidence::High));
                    }
                }
            }

            // Receiver as an import or module name: search its file.
            if !PY_BUILTINS.contains(receiver) {
                if let Some(receiver_file) = self.resolve_receiver_to_file(receiver, current_file)
                {
                    let hit = self
                        .graph
                        .get_nodes_by_file(&receiver_file)
                        .into_iter()
                        .find(|n| {
                            n.kind == expected
                                && (n.name == method
                                    || n.name == name
                                    || n.name.ends_with(&method_suffix))
                        })
                        .map(|n| (n.id.clone(), n.file_path.clone()));
                    if let Some((id, file)) = hit {
                        self.resolution_stats.resolved += 1;
                        if is_test_file(&file) {
                            self.resolution_stats.to_test_file += 1;
                        }
                        return Some((id, Confidence::High));
                    }
                }
            }
        }

        // Scope-aware resolution from the caller file's semantic paths.
        if let Some(paths) = self.semantic_paths.get(current_file) {
            if let Some(resolved) = resolve_name(name, &[], paths) {
                let hit = self
                    .graph
                    .query(Some(&resolved.file_path), Some(expected), Some(&resolved.name))
                    .first()
                    .map(|n| n.id.clone());
                if let Some(id) = hit {
                    self.resolution_stats.resolved += 1;
                    return Some((id, Confidence::High));
                }
            }
        }

        let imported_files = self.get_imported_file_paths(current_file);
        let suffix = format!(".{name}");

        let mut exact_imported: Option<NodeId> = None;
        let mut exact_any: Option<NodeId> = None;
        let mut exact_any_score = i64::MIN;
        let mut exact_same: Option<NodeId> = None;
        let mut suffix_imported: Option<NodeId> = None;
        let mut suffix_any: Option<NodeId> = None;
        let mut suffix_any_score = i64::MIN;
        let mut suffix_same: Option<NodeId> = None;
        let mut candidate_count = 0usize;

        for node in self.graph.all_nodes() {
            if node.kind != expected {
                continue;
            }
            let test_penalty = !caller_is_test && is_test_file(&node.file_path);

            if node.name == name {
                candidate_count += 1;
                if node.file_path == current_file {
                    exact_same = Some(node.id.clone());
                } else if imported_files.contains(&node.file_path) {
                    exact_imported = Some(node.id.clone());
                } else {
                    let mut score = path_similarity(current_file, &node.file_path) as i64;
                    if test_penalty {
                        score -= 1000;
                    }
                    if score > exact_any_score {
                        exact_any = Some(node.id.clone());
                        exact_any_score = score;
                    }
                }
            } else if node.name.ends_with(&suffix) {
                candidate_count += 1;
                if node.file_path == current_file {
                    suffix_same = Some(node.id.clone());
                } else if imported_files.contains(&node.file_path) {
                    suffix_imported = Some(node.id.clone());
                } else {
                    let mut score = path_similarity(current_file, &node.file_path) as i64;
                    if test_penalty {
                        score -= 1000;
                    }
                    if score > suffix_any_score {
                        suffix_any = Some(node.id.clone());
                        suffix_any_score = score;
                    }
                }
            }
        }

        if candidate_count > 1 {
            self.resolution_stats.ambiguous += 1;
        }

        let ranked = [
            (exact_imported, Confidence::High),
            (exact_any, Confidence::Medium),
            (exact_same, Confidence::Medium),
            (suffix_imported, Confidence::Medium),
            (suffix_any, Confidence::Low),
            (suffix_same, Confidence::Low),
        ];
        for (candidate, confidence) in ranked {
            let Some(id) = candidate else { continue };
            self.resolution_stats.resolved += 1;
            if self
                .graph
                .get_node(&id)
                .is_some_and(|n| is_test_file(&n.file_path))
            {
                self.resolution_stats.to_test_file += 1;
            }
            return Some((id, confidence));
        }

        // Inheritance chain: "Class.method" may live on an ancestor.
        if name.contains('.') && expected == EntityKind::Function {
            if let Some((id, file)) = self.find_in_parent_classes(name) {
                self.resolution_stats.resolved += 1;
                if is_test_file(&file) {
                    self.resolution_stats.to_test_file += 1;
                }
                return Some((id, Confidence::Low));
            }
        }

        // Indexed suffix fallback for bare names: a call to `process` may
        // mean `Worker.process` somewhere.
        if !name.contains('.') && expected == EntityKind::Function {
            let suffix_target = format!(".{name}");
            let mut candidates: Vec<(NodeId, String)> = Vec::new();
            for (indexed_name, ids) in self.graph.name_index() {
                if !indexed_name.ends_with(&suffix_target) {
                    continue;
                }
                for id in ids {
                    let Some(node) = self.graph.get_node(id) else {
                        continue;
                    };
                    if node.kind != EntityKind::Function {
                        continue;
                    }
                    if !caller_is_test && is_test_file(&node.file_path) {
                        continue;
                    }
                    candidates.push((node.id.clone(), node.file_path.clone()));
                }
            }
            if candidates.len() == 1 {
                let (id, file) = candidates.remove(0);
                self.resolution_stats.resolved += 1;
                if is_test_file(&file) {
                    self.resolution_stats.to_test_file += 1;
                }
                return Some((id, Confidence::Low));
            }
            if !candidates.is_empty() {
                if let Some((id, file)) = candidates
                    .iter()
                    .find(|(_, file)| imported_files.contains(file))
                    .cloned()
                {
                    self.resolution_stats.resolved += 1;
                    if is_test_file(&file) {
                        self.resolution_stats.to_test_file += 1;
                    }
                    return Some((id, Confidence::Low));
                }
                if let Some((id, file)) = candidates
                    .into_iter()
                    .max_by_key(|(_, file)| path_similarity(current_file, file))
                {
                    self.resolution_stats.resolved += 1;
                    if is_test_file(&file) {
                        self.resolution_stats.to_test_file += 1;
                    }
                    return Some((id, Confidence::Low));
                }
            }
        }

        // Last resort: any node with the name and kind, preferring non-test
        // targets when the caller is source.
        if let Some(ids) = self.graph.name_index().get(name) {
            let mut last_resort: Option<NodeId> = None;
            let mut winner: Option<(NodeId, String)> = None;
            for id in ids {
                let Some(node) = self.graph.get_node(id) else {
                    continue;
                };
                if node.kind != expected {
                    continue;
                }
                if !caller_is_test && is_test_file(&node.file_path) {
                    if last_resort.is_none() {
                        last_resort = Some(node.id.clone());
                    }
                } else {
                    winner = Some((node.id.clone(), node.file_path.clone()));
                    break;
                }
            }
            if let Some((id, file)) = winner {
                self.resolution_stats.resolved += 1;
                if is_test_file(&file) {
                    self.resolution_stats.to_test_file += 1;
                }
                return Some((id, Confidence::Low));
            }
            if let Some(id) = last_resort {
                self.resolution_stats.resolved += 1;
                self.resolution_stats.to_test_file += 1;
                return Some((id, Confidence::None));
            }
        }

        None
    }

    /// Walk the inheritance chain (up to 5 levels) looking for
    /// `ParentClass.method` given `ChildClass.method`.
    fn find_in_parent_classes(&self, qualified_name: &str) -> Option<(NodeId, String)> {
        let (class_name, method) = qualified_name.rsplit_once('.')?;

        let class_id = self
            .graph
            .all_nodes()
            .find(|n| n.kind == EntityKind::Class && n.name == class_name)
            .map(|n| n.id.clone())?;

        let mut visited = std::collections::HashSet::from([class_id.clone()]);
        let mut queue = vec![class_id];
        for _ in 0..5 {
            if queue.is_empty() {
                break;
            }
            let mut next_queue = Vec::new();
            for class in &queue {
                let parents: Vec<NodeId> = self
                    .graph
                    .edges_from(class)
                    .filter(|e| e.kind == EdgeKind::Inherits)
                    .map(|e| e.target_id.clone())
                    .collect();
                for parent_id in parents {
                    if !visited.insert(parent_id.clone()) {
                        continue;
                    }
                    let Some(parent) = self.graph.get_node(&parent_id) else {
                        continue;
                    };
                    let target_name = format!("{}.{method}", parent.name);
                    if let Some(hit) = self
                        .graph
                        .all_nodes()
                        .find(|n| n.kind == EntityKind::Function && n.name == target_name)
                    {
                        return Some((hit.id.clone(), hit.file_path.clone()));
                    }
                    next_queue.push(parent_id);
                }
            }
            queue = next_queue;
        }
        None
    }

    /// Map an import receiver name to the file it comes from, via this
    /// file's import nodes or the module-file index.
    pub(crate) fn resolve_receiver_to_file(
        &self,
        receiver: &str,
        current_file: &str,
    ) -> Option<String> {
        for node in self.graph.get_nodes_by_file(current_file) {
            if node.kind != EntityKind::Import || node.name != receiver {
                continue;
            }
            for edge in self.graph.edges_from(&node.id) {
                if edge.kind == EdgeKind::Imports {
                    if let Some(target) = self.graph.get_node(&edge.target_id) {
                        return Some(target.file_path.clone());
                    }
                }
            }
            // No edge yet; try the module index from the import metadata.
            for (module, _name) in &node.imports {
                if !module.is_empty() {
                    if let Some(file) = self.module_file_index.get(module) {
                        return Some(file.clone());
                    }
                }
            }
        }
        self.module_file_index.get(receiver).cloned()
    }

    /// Files this file imports from, derived from its import edges.
    pub(crate) fn get_imported_file_paths(
        &self,
        file_path: &str,
    ) -> std::collections::HashSet<String> {
        let mut result = std::collections::HashSet::new();
        for node in self.graph.get_nodes_by_file(file_path) {
            if node.kind != EntityKind::Import {
                continue;
            }
            for edge in self.graph.edges_from(&node.id) {
                if edge.kind == EdgeKind::Imports {
                    if let Some(target) = self.graph.get_node(&edge.target_id) {
                        result.insert(target.file_path.clone());
                    }
                }
            }
        }
        result
    }

    /// Find the definition node an import refers to. Module-path resolution
    /// first, then cross-file name matching, then re-export chains.
    pub(crate) fn find_import_target(
        &self,
        name: &str,
        current_file: &str,
        module: &str,
    ) -> Option<NodeId> {
        let is_definition = |kind: EntityKind| {
            matches!(
                kind,
                EntityKind::Function | EntityKind::Class | EntityKind::Variable
            )
        };

        if !module.is_empty() {
            if let Some(target_file) = self.module_file_index.get(module) {
                let nodes = self.graph.get_nodes_by_file(target_file);
                if let Some(node) = nodes
                    .iter()
                    .find(|n| n.name == name && is_definition(n.kind))
                {
                    return Some(node.id.clone());
                }
                // Re-export: the target file imports it from elsewhere.
                if let Some(import_node) = nodes
                    .iter()
                    .find(|n| n.name == name && n.kind == EntityKind::Import)
                {
                    if let Some(definition) = self.follow_import_chain(&import_node.id) {
                        return Some(definition);
                    }
                }
            }
        }

        let mut cross_file: Option<NodeId> = None;
        let mut same_file: Option<NodeId> = None;
        for node in self.graph.all_nodes() {
            if node.name != name || !is_definition(node.kind) {
                continue;
            }
            if node.file_path != current_file {
                if cross_file.is_none() {
                    cross_file = Some(node.id.clone());
                }
            } else {
                same_file = Some(node.id.clone());
            }
        }
        if let Some(id) = cross_file.or(same_file) {
            return Some(id);
        }

        for node in self.graph.all_nodes() {
            if node.name == name
                && node.kind == EntityKind::Import
                && node.file_path != current_file
            {
                if let Some(definition) = self.follow_import_chain(&node.id) {
                    return Some(definition);
                }
            }
        }

        None
    }

    /// Follow a chain of import nodes (up to 5 hops) to the definition
    /// being re-exported. A visited set guards against import cycles.
    pub(crate) fn follow_import_chain(&self, start: &NodeId) -> Option<NodeId> {
        let mut visited = std::collections::HashSet::from([start.clone()]);
        let mut current = start.clone();
        for _ in 0..5 {
            let mut found_next = false;
            let edges: Vec<(NodeId, EdgeKind)> = self
                .graph
                .edges_from(&current)
                .map(|e| (e.target_id.clone(), e.kind))
                .collect();
            for (target_id, kind) in edges {
                if kind != EdgeKind::Imports {
                    continue;
                }
                let Some(target) = self.graph.get_node(&target_id) else {
                    continue;
                };
                if matches!(
                    target.kind,
                    EntityKind::Function | EntityKind::Class | EntityKind::Variable
                ) {
                    return Some(target.id.clone());
                }
                if target.kind == EntityKind::Import && !visited.contains(&target_id) {
                    visited.insert(target_id.clone());
                    current = target_id;
                    found_next = true;
                    break;
                }
            }
            if !found_next {
                break;
            }
        }
        None
    }
}
