//! The delta pipeline: turns whole-file change events into graph mutations
//! and a compact operation list.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use atlas_core::filters::{COMMON_ATTR_METHODS, PY_BUILTINS, SUPPORTED_EXTENSIONS};
use atlas_core::{
    CodeGraph, Confidence, EdgeKind, Entity, EntityKind, GraphEdge, GraphNode, GraphOperation,
    NodeId, OpNodeType, OpType, VersionedLog,
};
use atlas_extract::{
    ExtractorRegistry, SemanticPath, default_registry, extract_python, extract_semantic_paths,
    shadow_extract,
};

use crate::propagator::BoundedPropagator;
use crate::resolve::ResolutionStats;
use crate::zones::ZoneCache;

/// Cap on full file contents kept for diffing. Eviction never affects
/// correctness: a missing entry reads as empty old content and the semantic
/// gate compares entity sets, not text.
pub const MAX_FILE_CONTENTS: usize = 500;

fn is_python_path(path: &str) -> bool {
    path.ends_with(".py") || path.ends_with(".pyi")
}

fn positions_overlap(a: &Entity, b: &Entity) -> bool {
    if a.line_start == b.line_start {
        return true;
    }
    a.line_start <= b.line_end && b.line_start <= a.line_end
}

/// Orchestrates incremental graph updates from code changes.
///
/// Pipeline: semantic gate -> delta computation -> removals (first!) ->
/// additions -> modifications -> two-pass edge resolution -> cache updates
/// -> versioning -> bounded propagation -> zone promotion.
pub struct Bridge {
    pub graph: CodeGraph,
    pub(crate) registry: Arc<ExtractorRegistry>,
    pub(crate) file_contents: HashMap<String, String>,
    content_order: VecDeque<String>,
    pub(crate) tracked_files: HashSet<String>,
    pub(crate) dependency_index: HashMap<String, HashSet<String>>,
    pub(crate) module_file_index: HashMap<String, String>,
    pub(crate) module_file_collisions: HashSet<String>,
    pub(crate) resolution_stats: ResolutionStats,
    pub(crate) semantic_paths: HashMap<String, Vec<SemanticPath>>,
    pub(crate) versioned: Option<Arc<VersionedLog>>,
    propagator: Option<BoundedPropagator>,
    zones: Option<ZoneCache>,
    propagating: bool,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("graph", &self.graph)
            .field("tracked_files", &self.tracked_files)
            .field("dependency_index", &self.dependency_index)
            .field("module_file_index", &self.module_file_index)
            .field("module_file_collisions", &self.module_file_collisions)
            .field("resolution_stats", &self.resolution_stats)
            .field("propagating", &self.propagating)
            .finish_non_exhaustive()
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(default_registry()))
    }

    pub fn with_registry(registry: Arc<ExtractorRegistry>) -> Self {
        Bridge {
            graph: CodeGraph::new(),
            registry,
            file_contents: HashMap::new(),
            content_order: VecDeque::new(),
            tracked_files: HashSet::new(),
            dependency_index: HashMap::new(),
            module_file_index: HashMap::new(),
            module_file_collisions: HashSet::new(),
            resolution_stats: ResolutionStats::default(),
            semantic_paths: HashMap::new(),
            versioned: None,
            propagator: None,
            zones: None,
            propagating: false,
        }
    }

    /// Turn on the versioned operation log.
    pub fn enable_versioning(&mut self) -> Arc<VersionedLog> {
        match &self.versioned {
            Some(log) => Arc::clone(log),
            None => {
                let log = Arc::new(VersionedLog::default());
                self.versioned = Some(Arc::clone(&log));
                log
            }
        }
    }

    /// Current graph version (0 when versioning is disabled).
    pub fn version(&self) -> u64 {
        self.versioned.as_ref().map(|v| v.version()).unwrap_or(0)
    }

    pub fn versioned_log(&self) -> Option<&Arc<VersionedLog>> {
        self.versioned.as_ref()
    }

    pub fn attach_propagator(&mut self, propagator: BoundedPropagator) {
        self.propagator = Some(propagator);
    }

    pub fn propagator_mut(&mut self) -> Option<&mut BoundedPropagator> {
        self.propagator.as_mut()
    }

    pub fn attach_zone_cache(&mut self, zones: ZoneCache) {
        self.zones = Some(zones);
    }

    pub fn zone_cache_mut(&mut self) -> Option<&mut ZoneCache> {
        self.zones.as_mut()
    }

    pub fn tracked_files(&self) -> &HashSet<String> {
        &self.tracked_files
    }

    pub fn module_file_index(&self) -> &HashMap<String, String> {
        &self.module_file_index
    }

    pub fn dependency_index(&self) -> &HashMap<String, HashSet<String>> {
        &self.dependency_index
    }

    pub fn resolution_stats(&self) -> ResolutionStats {
        self.resolution_stats
    }

    // ── Extraction ──────────────────────────────────────────────────────

    /// Extract entities with the registered language extractor. For Python,
    /// a shadow fallback recovers entities from broken source (opt-in so
    /// the semantic gate still treats unparsable edits as non-semantic),
    /// and a clean parse refreshes the file's semantic paths.
    pub(crate) fn extract_entities(
        &mut self,
        source: &str,
        file_path: &str,
        shadow_fallback: bool,
    ) -> Vec<Entity> {
        let registry = Arc::clone(&self.registry);
        let result = match registry.get_extractor(file_path) {
            Some(extractor) => extractor.extract(source, file_path),
            None => extract_python(source),
        };

        if result.is_empty()
            && shadow_fallback
            && !source.trim().is_empty()
            && (is_python_path(file_path) || file_path.is_empty())
        {
            return shadow_extract(source);
        }

        if is_python_path(file_path) && !result.is_empty() {
            self.semantic_paths
                .insert(file_path.to_string(), extract_semantic_paths(source, file_path));
        }

        result
    }

    /// Whether two versions differ semantically (not just whitespace or
    /// comments). New content that fails to parse is never a semantic
    /// change: broken code must not create ghost removals.
    pub fn is_semantic_change(&mut self, old: &str, new: &str, file_path: &str) -> bool {
        let old_entities = self.extract_entities(old, file_path, false);
        let new_entities = self.extract_entities(new, file_path, false);

        if !new.trim().is_empty() && new_entities.is_empty() && !old_entities.is_empty() {
            return false;
        }

        let old_sigs: HashSet<(&str, &str)> = old_entities
            .iter()
            .map(|e| (e.name.as_str(), e.signature_hash.as_str()))
            .collect();
        let new_sigs: HashSet<(&str, &str)> = new_entities
            .iter()
            .map(|e| (e.name.as_str(), e.signature_hash.as_str()))
            .collect();
        old_sigs != new_sigs
    }

    /// `(added, removed, modified)` entities between two versions, with
    /// rename detection (same kind + overlapping span + same structure
    /// hash). Renamed entities appear in `modified` with `old_name` set.
    pub fn compute_delta(
        &mut self,
        file_path: &str,
        old_content: &str,
        new_content: &str,
    ) -> (Vec<Entity>, Vec<Entity>, Vec<Entity>) {
        let old_entities = self.extract_entities(old_content, file_path, false);
        let new_entities = self.extract_entities(new_content, file_path, true);

        let old_map: HashMap<String, Entity> = old_entities
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect();
        let mut new_map: HashMap<String, Entity> = new_entities
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect();

        let old_names: HashSet<String> = old_map.keys().cloned().collect();
        let new_names: HashSet<String> = new_map.keys().cloned().collect();

        let mut potentially_removed: HashSet<String> =
            old_names.difference(&new_names).cloned().collect();
        let mut potentially_added: HashSet<String> =
            new_names.difference(&old_names).cloned().collect();

        // Rename detection.
        let mut renamed_names: Vec<String> = Vec::new();
        let mut matched_added: HashSet<String> = HashSet::new();

        for old_name in potentially_removed.clone() {
            let Some(old_entity) = old_map.get(&old_name) else {
                continue;
            };
            let matched = potentially_added.iter().find(|new_name| {
                if matched_added.contains(*new_name) {
                    return false;
                }
                let Some(new_entity) = new_map.get(*new_name) else {
                    return false;
                };
                old_entity.kind == new_entity.kind
                    && positions_overlap(old_entity, new_entity)
                    && old_entity.structure_hash == new_entity.structure_hash
            });
            if let Some(new_name) = matched.cloned() {
                if let Some(entity) = new_map.get_mut(&new_name) {
                    entity.old_name = Some(old_name.clone());
                }
                renamed_names.push(new_name.clone());
                matched_added.insert(new_name);
                potentially_removed.remove(&old_name);
            }
        }
        potentially_added.retain(|n| !matched_added.contains(n));

        let added: Vec<Entity> = potentially_added
            .iter()
            .filter_map(|n| new_map.get(n).cloned())
            .collect();
        let removed: Vec<Entity> = potentially_removed
            .iter()
            .filter_map(|n| old_map.get(n).cloned())
            .collect();

        let mut modified: Vec<Entity> = Vec::new();
        for name in old_names.intersection(&new_names) {
            if let (Some(old), Some(new)) = (old_map.get(name), new_map.get(name)) {
                if old.signature_hash != new.signature_hash {
                    modified.push(new.clone());
                }
            }
        }
        for name in renamed_names {
            if let Some(entity) = new_map.get(&name) {
                modified.push(entity.clone());
            }
        }

        (added, removed, modified)
    }

    // ── Main pipeline ───────────────────────────────────────────────────

    /// Process one whole-file change and return the emitted operations.
    pub fn process_change(
        &mut self,
        file_path: &str,
        old_content: &str,
        new_content: &str,
    ) -> Vec<GraphOperation> {
        // 1. Semantic gate.
        if !self.is_semantic_change(old_content, new_content, file_path) {
            tracing::debug!(file = file_path, "non-semantic change, skipping");
            self.store_file_content(file_path, new_content);
            self.tracked_files.insert(file_path.to_string());
            return Vec::new();
        }

        // 2. Delta.
        let (mut added, removed, modified) =
            self.compute_delta(file_path, old_content, new_content);

        let mut operations: Vec<GraphOperation> = Vec::new();

        // 3. Removals first, capturing cross-file callers for
        // breaking-change warnings.
        for entity in &removed {
            let node_id = NodeId::new(file_path, entity.kind, &entity.name);
            let had_callers: Vec<String> = self
                .graph
                .edges_to(&node_id)
                .filter_map(|e| self.graph.get_node(&e.source_id))
                .filter(|src| src.file_path != file_path)
                .map(|src| src.name.clone())
                .collect();
            self.graph.remove_node(&node_id);

            let mut op = GraphOperation::new(OpType::RemoveNode, node_id, entity.kind.into());
            op.properties.name = entity.name.clone();
            op.properties.had_callers = had_callers;
            operations.push(op);
        }

        // 4. Additions, imports first so call resolution sees them.
        added.sort_by(|a, b| {
            let rank = |e: &Entity| if e.kind == EntityKind::Import { 0 } else { 1 };
            rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
        });
        for entity in &added {
            let node = GraphNode::from_entity(entity, file_path);
            let node_id = node.id.clone();
            self.graph.add_node(node);

            let edges = self.create_first_pass_edges(entity, &node_id, file_path);
            self.reverse_import_sweep(entity, &node_id, file_path);

            let mut op =
                GraphOperation::new(OpType::AddNode, node_id, entity.kind.into());
            op.properties.name = entity.name.clone();
            op.properties.signature_hash = Some(entity.signature_hash.clone());
            op.properties.calls = entity.calls.clone();
            op.properties.uses = entity.uses.clone();
            op.edges = edges;
            operations.push(op);
        }

        // 5. Modifications. Renames rebuild the node so edges re-resolve;
        // body changes update in place and clear stale out-edges.
        for entity in &modified {
            if let Some(old_name) = entity.old_name.clone() {
                let old_node_id = NodeId::new(file_path, entity.kind, &old_name);
                self.graph.remove_node(&old_node_id);

                let mut node = GraphNode::from_entity(entity, file_path);
                node.renamed_from = Some(old_name);
                self.graph.add_node(node);
            } else {
                let node_id = NodeId::new(file_path, entity.kind, &entity.name);
                if let Some(existing) = self.graph.get_node_mut(&node_id) {
                    existing.line_start = entity.line_start;
                    existing.line_end = entity.line_end;
                    existing.signature_hash = entity.signature_hash.clone();
                    existing.calls = entity.calls.clone();
                    existing.uses = entity.uses.clone();
                    existing.inherits = entity.inherits.clone();
                    existing.imports = entity.imports.clone();
                    existing.type_refs = entity.type_refs.clone();
                    existing.params = entity.params.clone();
                    existing.decorators = entity.decorators.clone();

                    let stale: Vec<(NodeId, EdgeKind)> = self
                        .graph
                        .edges_from(&node_id)
                        .filter(|e| {
                            matches!(
                                e.kind,
                                EdgeKind::Calls
                                    | EdgeKind::Inherits
                                    | EdgeKind::UsesType
                                    | EdgeKind::DecoratedBy
                            )
                        })
                        .map(|e| (e.target_id.clone(), e.kind))
                        .collect();
                    for (target, kind) in stale {
                        self.graph.remove_edge(&node_id, &target, kind);
                    }
                } else {
                    self.graph.add_node(GraphNode::from_entity(entity, file_path));
                }
            }

            let node_id = NodeId::new(file_path, entity.kind, &entity.name);
            let mut op =
                GraphOperation::new(OpType::UpdateNode, node_id, entity.kind.into());
            op.properties.name = entity.name.clone();
            op.properties.signature_hash = Some(entity.signature_hash.clone());
            op.properties.renamed_from = entity.old_name.clone();
            op.properties.calls = entity.calls.clone();
            op.properties.uses = entity.uses.clone();
            operations.push(op);
        }

        // 6. Second resolution pass: the first pass may predate sibling
        // additions within the same change.
        for entity in added.iter().chain(modified.iter()) {
            let source_id = NodeId::new(file_path, entity.kind, &entity.name);
            self.resolve_pending_edges(entity, &source_id, file_path);
        }

        // 7. Cache maintenance.
        self.store_file_content(file_path, new_content);
        self.tracked_files.insert(file_path.to_string());
        self.update_dependency_index(file_path);
        self.update_module_file_index(file_path);

        // 8. Versioning.
        if let Some(log) = &self.versioned {
            for op in &operations {
                log.record_operation(op.clone(), Some(file_path));
            }
        }

        // 9. Bounded propagation, guarded against re-entry from the
        // re-parse callback.
        if !self.propagating {
            if let Some(mut propagator) = self.propagator.take() {
                self.propagating = true;
                propagator.record_edit(file_path);
                let affected = propagator.find_affected_files(&self.graph, file_path);
                let result = propagator.run(affected, |fp| {
                    self.re_parse_file(fp);
                });
                for file in &result.sync_processed {
                    let mut op = GraphOperation::new(
                        OpType::UpdateNode,
                        NodeId(String::new()),
                        OpNodeType::Propagation,
                    );
                    op.properties.file = Some(file.clone());
                    op.properties.phase = Some("sync".to_string());
                    operations.push(op);
                }
                self.propagator = Some(propagator);
                self.propagating = false;
            }
        }

        // 10. Zone promotion.
        if let Some(zones) = &mut self.zones {
            zones.open_file(file_path, &self.graph);
        }

        operations
    }

    /// Re-parse a file from disk during propagation.
    fn re_parse_file(&mut self, file_path: &str) -> Vec<GraphOperation> {
        let Ok(content) = std::fs::read_to_string(file_path) else {
            return Vec::new();
        };
        let old_content = self.file_contents.get(file_path).cloned().unwrap_or_default();
        if old_content == content {
            return Vec::new();
        }
        self.process_change(file_path, &old_content, &content)
    }

    // ── Edge creation and resolution ────────────────────────────────────

    fn add_resolved_edge(
        &mut self,
        source_id: &NodeId,
        name: &str,
        file_path: &str,
        kind: EdgeKind,
        expected: &[EntityKind],
    ) -> Option<(NodeId, EdgeKind)> {
        let mut target: Option<(NodeId, Confidence)> = None;
        for entity_kind in expected {
            target = self.find_target_node(name, file_path, *entity_kind);
            if target.is_some() {
                break;
            }
        }
        let (target_id, confidence) = target?;
        if target_id == *source_id || self.graph.has_edge_between(source_id, &target_id, kind) {
            return None;
        }
        self.graph.add_edge(
            GraphEdge::new(source_id.clone(), target_id.clone(), kind)
                .with_confidence(confidence),
        );
        Some((target_id, kind))
    }

    /// First-pass edge creation for a freshly added entity. Returns the
    /// `(target, kind)` pairs recorded on the add operation.
    fn create_first_pass_edges(
        &mut self,
        entity: &Entity,
        source_id: &NodeId,
        file_path: &str,
    ) -> Vec<(NodeId, EdgeKind)> {
        let mut edges = Vec::new();

        for called_name in &entity.calls {
            if let Some(edge) = self.add_resolved_edge(
                source_id,
                called_name,
                file_path,
                EdgeKind::Calls,
                &[EntityKind::Function, EntityKind::Class],
            ) {
                edges.push(edge);
            }
        }

        for base_name in &entity.inherits {
            if let Some(edge) = self.add_resolved_edge(
                source_id,
                base_name,
                file_path,
                EdgeKind::Inherits,
                &[EntityKind::Class],
            ) {
                edges.push(edge);
            }
        }

        if entity.kind == EntityKind::Import {
            for (module, imported_name) in &entity.imports {
                if imported_name == "*" {
                    edges.extend(self.expand_star_import(source_id, file_path, module));
                    continue;
                }
                if let Some(target_id) = self.find_import_target(imported_name, file_path, module)
                {
                    if target_id != *source_id
                        && !self
                            .graph
                            .has_edge_between(source_id, &target_id, EdgeKind::Imports)
                    {
                        let mut edge = GraphEdge::new(
                            source_id.clone(),
                            target_id.clone(),
                            EdgeKind::Imports,
                        )
                        .with_confidence(Confidence::High);
                        edge.module = Some(module.clone());
                        edge.imported_name = Some(imported_name.clone());
                        self.graph.add_edge(edge);
                        edges.push((target_id, EdgeKind::Imports));
                    }
                }
            }
        }

        for type_name in &entity.type_refs {
            if let Some(edge) = self.add_resolved_edge(
                source_id,
                type_name,
                file_path,
                EdgeKind::UsesType,
                &[EntityKind::Class],
            ) {
                edges.push(edge);
            }
        }

        for decorator in &entity.decorators {
            if let Some(edge) = self.add_resolved_edge(
                source_id,
                decorator,
                file_path,
                EdgeKind::DecoratedBy,
                &[EntityKind::Function, EntityKind::Class],
            ) {
                edges.push(edge);
            }
        }

        edges
    }

    /// Second-pass resolution for an added or modified entity.
    fn resolve_pending_edges(&mut self, entity: &Entity, source_id: &NodeId, file_path: &str) {
        for base_name in &entity.inherits {
            self.add_resolved_edge(
                source_id,
                base_name,
                file_path,
                EdgeKind::Inherits,
                &[EntityKind::Class],
            );
        }

        for called_name in &entity.calls {
            self.add_resolved_edge(
                source_id,
                called_name,
                file_path,
                EdgeKind::Calls,
                &[EntityKind::Function, EntityKind::Class],
            );
        }

        if entity.kind == EntityKind::Import {
            for (module, imported_name) in &entity.imports {
                if imported_name == "*" {
                    self.expand_star_import(source_id, file_path, module);
                    continue;
                }
                if let Some(target_id) = self.find_import_target(imported_name, file_path, module)
                {
                    if target_id != *source_id
                        && !self
                            .graph
                            .has_edge_between(source_id, &target_id, EdgeKind::Imports)
                    {
                        let mut edge = GraphEdge::new(
                            source_id.clone(),
                            target_id.clone(),
                            EdgeKind::Imports,
                        )
                        .with_confidence(Confidence::High);
                        edge.module = Some(module.clone());
                        edge.imported_name = Some(imported_name.clone());
                        self.graph.add_edge(edge);
                    }
                }
            }
        }

        // Reverse direction: import nodes elsewhere that name this new
        // definition.
        self.reverse_import_resolution(entity, source_id, file_path);

        for type_name in &entity.type_refs {
            self.add_resolved_edge(
                source_id,
                type_name,
                file_path,
                EdgeKind::UsesType,
                &[EntityKind::Class],
            );
        }

        for decorator in &entity.decorators {
            self.add_resolved_edge(
                source_id,
                decorator,
                file_path,
                EdgeKind::DecoratedBy,
                &[EntityKind::Function, EntityKind::Class],
            );
        }
    }

    fn is_definition_kind(kind: EntityKind) -> bool {
        matches!(
            kind,
            EntityKind::Function | EntityKind::Class | EntityKind::Variable
        )
    }

    /// Link existing import nodes in other files to a new definition.
    fn reverse_import_sweep(&mut self, entity: &Entity, node_id: &NodeId, file_path: &str) {
        if !Self::is_definition_kind(entity.kind) {
            return;
        }
        let import_sources: Vec<NodeId> = self
            .graph
            .all_nodes()
            .filter(|n| {
                n.kind == EntityKind::Import && n.name == entity.name && n.file_path != file_path
            })
            .map(|n| n.id.clone())
            .collect();
        for import_id in import_sources {
            if !self
                .graph
                .has_edge_between(&import_id, node_id, EdgeKind::Imports)
            {
                self.graph
                    .add_edge(GraphEdge::new(import_id, node_id.clone(), EdgeKind::Imports));
            }
        }
    }

    fn reverse_import_resolution(&mut self, entity: &Entity, source_id: &NodeId, file_path: &str) {
        if !Self::is_definition_kind(entity.kind) {
            return;
        }
        let import_sources: Vec<NodeId> = self
            .graph
            .all_nodes()
            .filter(|n| {
                n.kind == EntityKind::Import && n.name == entity.name && n.file_path != file_path
            })
            .map(|n| n.id.clone())
            .collect();
        for import_id in import_sources {
            if !self
                .graph
                .has_edge_between(&import_id, source_id, EdgeKind::Imports)
            {
                self.graph.add_edge(
                    GraphEdge::new(import_id, source_id.clone(), EdgeKind::Imports)
                        .with_confidence(Confidence::High),
                );
            }
        }
    }

    /// Expand `from M import *` into an edge per exported definition.
    fn expand_star_import(
        &mut self,
        source_id: &NodeId,
        _file_path: &str,
        module: &str,
    ) -> Vec<(NodeId, EdgeKind)> {
        let mut edges = Vec::new();
        let Some(target_file) = self.module_file_index.get(module).cloned() else {
            return edges;
        };

        for name in self.get_module_exports(&target_file) {
            let target_id = self
                .graph
                .get_nodes_by_file(&target_file)
                .into_iter()
                .find(|n| n.name == name && Self::is_definition_kind(n.kind))
                .map(|n| n.id.clone());
            let Some(target_id) = target_id else { continue };
            if self
                .graph
                .has_edge_between(source_id, &target_id, EdgeKind::Imports)
            {
                continue;
            }
            let mut edge = GraphEdge::new(source_id.clone(), target_id.clone(), EdgeKind::Imports)
                .with_confidence(Confidence::Medium);
            edge.module = Some(module.to_string());
            edge.imported_name = Some(name);
            edge.via_star = true;
            self.graph.add_edge(edge);
            edges.push((target_id, EdgeKind::Imports));
        }
        edges
    }

    // ── Cache maintenance ───────────────────────────────────────────────

    fn store_file_content(&mut self, file_path: &str, content: &str) {
        if !self.file_contents.contains_key(file_path) {
            self.content_order.push_back(file_path.to_string());
        }
        self.file_contents
            .insert(file_path.to_string(), content.to_string());
        while self.file_contents.len() > MAX_FILE_CONTENTS {
            let Some(oldest) = self.content_order.pop_front() else {
                break;
            };
            self.file_contents.remove(&oldest);
        }
    }

    /// Reverse map: callee name -> files whose entities call it.
    fn update_dependency_index(&mut self, file_path: &str) {
        let called: Vec<String> = self
            .graph
            .get_nodes_by_file(file_path)
            .iter()
            .flat_map(|n| n.calls.iter().cloned())
            .filter(|c| !PY_BUILTINS.contains(c.as_str()) && !COMMON_ATTR_METHODS.contains(c.as_str()))
            .collect();
        for name in called {
            self.dependency_index
                .entry(name)
                .or_default()
                .insert(file_path.to_string());
        }
    }

    /// Register every dotted suffix of the file's module path. First file
    /// wins; later writers only land in the collision set.
    fn update_module_file_index(&mut self, file_path: &str) {
        let mut module_path = file_path.replace(['/', '\\'], ".");
        for ext in SUPPORTED_EXTENSIONS {
            if let Some(stripped) = module_path.strip_suffix(ext) {
                module_path = stripped.to_string();
                break;
            }
        }
        let module_path = module_path.trim_start_matches('.');
        if module_path.is_empty() {
            return;
        }
        let parts: Vec<&str> = module_path.split('.').collect();
        for i in 0..parts.len() {
            let suffix = parts[i..].join(".");
            match self.module_file_index.get(&suffix) {
                None => {
                    self.module_file_index.insert(suffix, file_path.to_string());
                }
                Some(existing) if existing != file_path => {
                    self.module_file_collisions.insert(suffix);
                }
                Some(_) => {}
            }
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Files affected by a change to `changed_entity_name` in
    /// `changed_file`: dependency-index consumers, incoming-edge sources,
    /// and their transitive callers up to `max_depth`.
    pub fn get_affected_files(
        &self,
        changed_file: &str,
        changed_entity_name: &str,
        max_depth: usize,
    ) -> Vec<String> {
        let mut affected: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();

        // Phase 1: direct dependency index lookup.
        if let Some(direct) = self.dependency_index.get(changed_entity_name) {
            for file in direct {
                if file != changed_file {
                    affected.insert(file.clone());
                    queue.push_back((file.clone(), 1));
                }
            }
        }

        // Phase 2: cross-file edges pointing into the changed file.
        for node in self.graph.get_nodes_by_file(changed_file) {
            for edge in self.graph.edges_to(&node.id) {
                let Some(source) = self.graph.get_node(&edge.source_id) else {
                    continue;
                };
                if source.file_path != changed_file && !affected.contains(&source.file_path) {
                    affected.insert(source.file_path.clone());
                    queue.push_back((source.file_path.clone(), 1));
                }
            }
        }

        // Phase 3: transitive BFS over incoming call/import/inherit edges.
        let mut visited: HashSet<String> = affected.clone();
        while let Some((current_file, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for node in self.graph.get_nodes_by_file(&current_file) {
                for edge in self.graph.edges_to(&node.id) {
                    if !matches!(
                        edge.kind,
                        EdgeKind::Calls | EdgeKind::Imports | EdgeKind::Inherits
                    ) {
                        continue;
                    }
                    let Some(source) = self.graph.get_node(&edge.source_id) else {
                        continue;
                    };
                    if source.file_path != changed_file && !visited.contains(&source.file_path) {
                        visited.insert(source.file_path.clone());
                        affected.insert(source.file_path.clone());
                        queue.push_back((source.file_path.clone(), depth + 1));
                    }
                }
            }
        }

        affected.into_iter().collect()
    }

    /// Purge every node, edge, cache, and index entry for a file.
    pub fn remove_file(&mut self, file_path: &str) -> Vec<GraphOperation> {
        let mut operations = Vec::new();
        let doomed: Vec<(NodeId, EntityKind, String)> = self
            .graph
            .get_nodes_by_file(file_path)
            .into_iter()
            .map(|n| (n.id.clone(), n.kind, n.name.clone()))
            .collect();
        for (node_id, kind, name) in doomed {
            self.graph.remove_node(&node_id);
            let mut op = GraphOperation::new(OpType::RemoveNode, node_id, kind.into());
            op.properties.name = name;
            operations.push(op);
        }

        self.file_contents.remove(file_path);
        self.content_order.retain(|p| p != file_path);
        self.tracked_files.remove(file_path);
        self.semantic_paths.remove(file_path);

        self.dependency_index.retain(|_, files| {
            files.remove(file_path);
            !files.is_empty()
        });

        let dead_suffixes: Vec<String> = self
            .module_file_index
            .iter()
            .filter(|(_, path)| path.as_str() == file_path)
            .map(|(suffix, _)| suffix.clone())
            .collect();
        for suffix in dead_suffixes {
            self.module_file_index.remove(&suffix);
            self.module_file_collisions.remove(&suffix);
        }

        operations
    }

    /// Module exports: the `__all__` list if defined, else every top-level
    /// definition name.
    pub fn get_module_exports(&self, file_path: &str) -> Vec<String> {
        let nodes = self.graph.get_nodes_by_file(file_path);
        for node in &nodes {
            if node.name == "__all__" && node.kind == EntityKind::Variable {
                return node.uses.clone();
            }
        }
        nodes
            .into_iter()
            .filter(|n| {
                Self::is_definition_kind(n.kind)
                    && !n.name.contains('.')
                    && n.name != "__all__"
            })
            .map(|n| n.name.clone())
            .collect()
    }

    /// Cycles involving the given file after the last change.
    pub fn check_new_cycles(&self, file_path: &str) -> Vec<Vec<String>> {
        self.graph
            .find_cycles(true)
            .into_iter()
            .filter(|cycle| cycle.iter().any(|f| f == file_path))
            .collect()
    }

    /// Dead code limited to the given file.
    pub fn check_new_dead_code(&self, file_path: &str) -> Vec<GraphNode> {
        self.graph
            .find_dead_code(true, true)
            .into_iter()
            .filter(|n| n.file_path == file_path)
            .cloned()
            .collect()
    }

    /// Deep copy of the bridge for conflict detection against later edits.
    /// The extractor registry is shared; the propagator, zone cache, and
    /// versioned log stay with the original.
    pub fn snapshot(&self) -> Bridge {
        Bridge {
            graph: self.graph.snapshot(),
            registry: Arc::clone(&self.registry),
            file_contents: self.file_contents.clone(),
            content_order: self.content_order.clone(),
            tracked_files: self.tracked_files.clone(),
            dependency_index: self.dependency_index.clone(),
            module_file_index: self.module_file_index.clone(),
            module_file_collisions: self.module_file_collisions.clone(),
            resolution_stats: self.resolution_stats,
            semantic_paths: self.semantic_paths.clone(),
            versioned: None,
            propagator: None,
            zones: None,
            propagating: false,
        }
    }
}
