//! Graph store over petgraph::StableDiGraph with content-addressed node IDs
//! and secondary indexes by file, kind, and name.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use petgraph::Direction as PetDirection;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::filters::{FRAMEWORK_DEAD_CODE_PREFIXES, is_test_file};
use crate::model::{EdgeKind, EntityKind, GraphEdge, GraphNode, NodeId, short_hash};

/// Traversal direction relative to the start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

fn remove_from_index<K: Hash + Eq>(
    index: &mut HashMap<K, HashSet<NodeId>>,
    key: &K,
    id: &NodeId,
) {
    if let Some(set) = index.get_mut(key) {
        set.remove(id);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

/// The code graph. Index memberships are an invariant of the store: after
/// every public mutation, each node appears in exactly the file/kind/name
/// buckets matching its fields, and every edge references live nodes.
#[derive(Clone, Default)]
pub struct CodeGraph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    indices: HashMap<NodeId, NodeIndex>,
    by_file: HashMap<String, HashSet<NodeId>>,
    by_kind: HashMap<EntityKind, HashSet<NodeId>>,
    by_name: HashMap<String, HashSet<NodeId>>,
}

impl std::fmt::Debug for CodeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGraph")
            .field("node_count", &self.node_count())
            .field("edge_count", &self.edge_count())
            .finish()
    }
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, updating all indexes. Re-adding an existing ID replaces
    /// the stored node in place and keeps its edges.
    pub fn add_node(&mut self, node: GraphNode) {
        let id = node.id.clone();
        let file = node.file_path.clone();
        let kind = node.kind;
        let name = node.name.clone();

        match self.indices.get(&id).copied() {
            Some(idx) => {
                if let Some(slot) = self.inner.node_weight_mut(idx) {
                    let old = std::mem::replace(slot, node);
                    remove_from_index(&mut self.by_file, &old.file_path, &id);
                    remove_from_index(&mut self.by_kind, &old.kind, &id);
                    remove_from_index(&mut self.by_name, &old.name, &id);
                }
            }
            None => {
                let idx = self.inner.add_node(node);
                self.indices.insert(id.clone(), idx);
            }
        }

        self.by_file.entry(file).or_default().insert(id.clone());
        self.by_kind.entry(kind).or_default().insert(id.clone());
        self.by_name.entry(name).or_default().insert(id);
    }

    /// Remove a node and cascade-remove all incident edges.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<GraphNode> {
        let idx = self.indices.remove(id)?;
        let node = self.inner.remove_node(idx)?;
        remove_from_index(&mut self.by_file, &node.file_path, id);
        remove_from_index(&mut self.by_kind, &node.kind, id);
        remove_from_index(&mut self.by_name, &node.name, id);
        Some(node)
    }

    /// Add a directed edge. Returns false (and adds nothing) when either
    /// endpoint is missing, so the graph never holds dangling edges.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        let Some(&src) = self.indices.get(&edge.source_id) else {
            return false;
        };
        let Some(&tgt) = self.indices.get(&edge.target_id) else {
            return false;
        };
        self.inner.add_edge(src, tgt, edge);
        true
    }

    /// Remove one edge matching `(source, target, kind)`.
    pub fn remove_edge(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        kind: EdgeKind,
    ) -> Option<GraphEdge> {
        let src = *self.indices.get(source)?;
        let tgt = *self.indices.get(target)?;
        let edge_idx = self
            .inner
            .edges_connecting(src, tgt)
            .find(|e| e.weight().kind == kind)
            .map(|e| e.id())?;
        self.inner.remove_edge(edge_idx)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&GraphNode> {
        let idx = *self.indices.get(id)?;
        self.inner.node_weight(idx)
    }

    pub fn get_node_mut(&mut self, id: &NodeId) -> Option<&mut GraphNode> {
        let idx = *self.indices.get(id)?;
        self.inner.node_weight_mut(idx)
    }

    /// Get any one node matching a name.
    pub fn get_node_by_name(&self, name: &str) -> Option<&GraphNode> {
        let ids = self.by_name.get(name)?;
        ids.iter().next().and_then(|id| self.get_node(id))
    }

    pub fn get_nodes_by_file(&self, file_path: &str) -> Vec<&GraphNode> {
        self.by_file
            .get(file_path)
            .map(|ids| ids.iter().filter_map(|id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner.node_weights()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner.edge_weights()
    }

    /// All outgoing edges from a node.
    pub fn edges_from<'g>(&'g self, id: &NodeId) -> impl Iterator<Item = &'g GraphEdge> + use<'g> {
        let idx = self.indices.get(id).copied();
        idx.into_iter().flat_map(move |i| {
            self.inner
                .edges_directed(i, PetDirection::Outgoing)
                .map(|e| e.weight())
        })
    }

    /// All incoming edges to a node.
    pub fn edges_to<'g>(&'g self, id: &NodeId) -> impl Iterator<Item = &'g GraphEdge> + use<'g> {
        let idx = self.indices.get(id).copied();
        idx.into_iter().flat_map(move |i| {
            self.inner
                .edges_directed(i, PetDirection::Incoming)
                .map(|e| e.weight())
        })
    }

    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.edges_from(source)
            .any(|e| e.target_id == *target && e.kind == kind)
    }

    /// Read access to the name index, for suffix scans in the resolver.
    pub fn name_index(&self) -> &HashMap<String, HashSet<NodeId>> {
        &self.by_name
    }

    /// Query nodes by intersecting index sets with AND logic. No filters
    /// returns every node.
    pub fn query(
        &self,
        file_path: Option<&str>,
        kind: Option<EntityKind>,
        name: Option<&str>,
    ) -> Vec<&GraphNode> {
        let mut result_ids: Option<HashSet<&NodeId>> = None;

        fn intersect<'a>(
            ids: HashSet<&'a NodeId>,
            acc: Option<HashSet<&'a NodeId>>,
        ) -> HashSet<&'a NodeId> {
            match acc {
                None => ids,
                Some(acc) => acc.intersection(&ids).copied().collect(),
            }
        }

        if let Some(fp) = file_path {
            let ids = self
                .by_file
                .get(fp)
                .map(|s| s.iter().collect())
                .unwrap_or_default();
            result_ids = Some(intersect(ids, result_ids));
        }
        if let Some(k) = kind {
            let ids = self
                .by_kind
                .get(&k)
                .map(|s| s.iter().collect())
                .unwrap_or_default();
            result_ids = Some(intersect(ids, result_ids));
        }
        if let Some(n) = name {
            let ids = self
                .by_name
                .get(n)
                .map(|s| s.iter().collect())
                .unwrap_or_default();
            result_ids = Some(intersect(ids, result_ids));
        }

        match result_ids {
            None => self.all_nodes().collect(),
            Some(ids) => ids.into_iter().filter_map(|id| self.get_node(id)).collect(),
        }
    }

    /// Query nodes whose name matches a regex pattern; other filters are
    /// AND-combined.
    pub fn query_regex(
        &self,
        name_pattern: &str,
        file_path: Option<&str>,
        kind: Option<EntityKind>,
    ) -> Result<Vec<&GraphNode>, regex::Error> {
        let compiled = regex::Regex::new(name_pattern)?;
        Ok(self
            .query(file_path, kind, None)
            .into_iter()
            .filter(|n| compiled.is_match(&n.name))
            .collect())
    }

    /// BFS traversal from a starting node following specific edge kinds.
    /// Returns `(node, depth)` pairs, excluding the start node.
    pub fn traverse(
        &self,
        start: &NodeId,
        edge_kinds: Option<&[EdgeKind]>,
        direction: Direction,
        max_depth: usize,
    ) -> Vec<(&GraphNode, usize)> {
        let mut visited: HashSet<NodeId> = HashSet::from([start.clone()]);
        let mut result = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(start.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let mut edges: Vec<&GraphEdge> = Vec::new();
            if matches!(direction, Direction::Outgoing | Direction::Both) {
                edges.extend(self.edges_from(&current));
            }
            if matches!(direction, Direction::Incoming | Direction::Both) {
                edges.extend(self.edges_to(&current));
            }
            for edge in edges {
                if let Some(kinds) = edge_kinds {
                    if !kinds.contains(&edge.kind) {
                        continue;
                    }
                }
                let next = if edge.source_id == current {
                    &edge.target_id
                } else {
                    &edge.source_id
                };
                if !visited.contains(next) {
                    visited.insert(next.clone());
                    if let Some(node) = self.get_node(next) {
                        result.push((node, depth + 1));
                        queue.push_back((next.clone(), depth + 1));
                    }
                }
            }
        }

        result
    }

    /// Check if target is reachable from source via directed edges.
    pub fn is_reachable(
        &self,
        source: &NodeId,
        target: &NodeId,
        edge_kinds: Option<&[EdgeKind]>,
        max_depth: usize,
    ) -> bool {
        if source == target {
            return true;
        }
        let mut visited: HashSet<NodeId> = HashSet::from([source.clone()]);
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(source.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.edges_from(&current) {
                if let Some(kinds) = edge_kinds {
                    if !kinds.contains(&edge.kind) {
                        continue;
                    }
                }
                if edge.target_id == *target {
                    return true;
                }
                if !visited.contains(&edge.target_id) {
                    visited.insert(edge.target_id.clone());
                    queue.push_back((edge.target_id.clone(), depth + 1));
                }
            }
        }

        false
    }

    /// Find the shortest path from source to target as a list of node IDs.
    pub fn find_path(
        &self,
        source: &NodeId,
        target: &NodeId,
        edge_kinds: Option<&[EdgeKind]>,
        max_depth: usize,
    ) -> Option<Vec<NodeId>> {
        if source == target {
            return Some(vec![source.clone()]);
        }
        let mut visited: HashSet<NodeId> = HashSet::from([source.clone()]);
        let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(source.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.edges_from(&current) {
                if let Some(kinds) = edge_kinds {
                    if !kinds.contains(&edge.kind) {
                        continue;
                    }
                }
                if visited.contains(&edge.target_id) {
                    continue;
                }
                visited.insert(edge.target_id.clone());
                parent.insert(edge.target_id.clone(), current.clone());
                if edge.target_id == *target {
                    let mut path = vec![target.clone()];
                    let mut cursor = target.clone();
                    while let Some(prev) = parent.get(&cursor) {
                        cursor = prev.clone();
                        path.push(cursor.clone());
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back((edge.target_id.clone(), depth + 1));
            }
        }

        None
    }

    /// Find potentially dead code: nodes with no incoming edges that are not
    /// entry points, dunders, properties, polymorphic overrides, or nested
    /// helpers of live parents.
    pub fn find_dead_code(&self, exclude_tests: bool, exclude_framework: bool) -> Vec<&GraphNode> {
        const ENTRY_NAMES: [&str; 3] = ["main", "__main__", "__module__"];

        let mut dead = Vec::new();
        for node in self.all_nodes() {
            if ENTRY_NAMES.contains(&node.name.as_str()) {
                continue;
            }
            if matches!(
                node.kind,
                EntityKind::Import | EntityKind::ModuleCode | EntityKind::Variable
            ) {
                continue;
            }
            // Dunder methods are called implicitly (constructors, operators).
            let bare = node.bare_name();
            if bare.starts_with("__") && bare.ends_with("__") {
                continue;
            }
            if exclude_tests && is_test_file(&node.file_path) {
                continue;
            }
            if exclude_framework
                && FRAMEWORK_DEAD_CODE_PREFIXES
                    .iter()
                    .any(|p| bare.starts_with(p))
            {
                continue;
            }
            // @property methods are accessed as attributes, not tracked calls.
            if node.decorators.iter().any(|d| d == "property") {
                continue;
            }
            if self.edges_to(&node.id).next().is_some() {
                continue;
            }
            if node.name.contains('.') && self.is_polymorphic_override(node) {
                continue;
            }
            if self.is_nested_in_live_parent(node) {
                continue;
            }
            dead.push(node);
        }
        dead
    }

    /// A method overrides a polymorphically-used parent method when any
    /// ancestor (up to 5 `inherits` levels) defines the same bare method
    /// that is either `@abstractmethod` or has incoming edges.
    fn is_polymorphic_override(&self, node: &GraphNode) -> bool {
        let Some((class_name, method_name)) = node.name.rsplit_once('.') else {
            return false;
        };

        // Find the class node, preferring the method's own file.
        let mut class_node: Option<&GraphNode> = None;
        if let Some(ids) = self.by_name.get(class_name) {
            for id in ids {
                if let Some(n) = self.get_node(id) {
                    if n.kind == EntityKind::Class {
                        if n.file_path == node.file_path {
                            class_node = Some(n);
                            break;
                        }
                        if class_node.is_none() {
                            class_node = Some(n);
                        }
                    }
                }
            }
        }
        let Some(class_node) = class_node else {
            return false;
        };

        let mut visited: HashSet<NodeId> = HashSet::from([class_node.id.clone()]);
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(class_node.id.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= 5 {
                continue;
            }
            for edge in self.edges_from(&current) {
                if edge.kind != EdgeKind::Inherits {
                    continue;
                }
                if visited.contains(&edge.target_id) {
                    continue;
                }
                visited.insert(edge.target_id.clone());
                let Some(parent) = self.get_node(&edge.target_id) else {
                    continue;
                };
                let parent_method = format!("{}.{}", parent.name, method_name);
                if let Some(pm_ids) = self.by_name.get(&parent_method) {
                    for pm_id in pm_ids {
                        let Some(pm) = self.get_node(pm_id) else {
                            continue;
                        };
                        if pm.decorators.iter().any(|d| d == "abstractmethod") {
                            return true;
                        }
                        if self.edges_to(pm_id).next().is_some() {
                            return true;
                        }
                    }
                }
                queue.push_back((edge.target_id.clone(), depth + 1));
            }
        }

        false
    }

    /// Nested helpers (`Class.method.helper`, two or more dots) survive when
    /// the enclosing method is live or itself a polymorphic override.
    fn is_nested_in_live_parent(&self, node: &GraphNode) -> bool {
        if node.name.matches('.').count() < 2 {
            return false;
        }
        let Some((parent_name, _)) = node.name.rsplit_once('.') else {
            return false;
        };
        if let Some(parent_ids) = self.by_name.get(parent_name) {
            for pid in parent_ids {
                let Some(parent) = self.get_node(pid) else {
                    continue;
                };
                if self.edges_to(pid).next().is_some() {
                    return true;
                }
                if parent.name.contains('.') && self.is_polymorphic_override(parent) {
                    return true;
                }
            }
        }
        false
    }

    /// Find circular file-level dependencies.
    ///
    /// Projects every cross-file edge onto `src.file -> tgt.file`, runs an
    /// iterative three-color DFS from each lexicographically smallest
    /// uncolored file, normalizes each cycle by rotating to its minimum
    /// node, deduplicates, and drops strict supersets. Each returned cycle
    /// repeats its head at the tail.
    pub fn find_cycles(&self, exclude_tests: bool) -> Vec<Vec<String>> {
        let mut file_adj: HashMap<String, BTreeSet<String>> = HashMap::new();
        for edge in self.all_edges() {
            let (Some(src), Some(tgt)) = (
                self.get_node(&edge.source_id),
                self.get_node(&edge.target_id),
            ) else {
                continue;
            };
            if src.file_path == tgt.file_path {
                continue;
            }
            if exclude_tests && (is_test_file(&src.file_path) || is_test_file(&tgt.file_path)) {
                continue;
            }
            file_adj
                .entry(src.file_path.clone())
                .or_default()
                .insert(tgt.file_path.clone());
        }

        let mut all_files: BTreeSet<String> = BTreeSet::new();
        for node in self.all_nodes() {
            if exclude_tests && is_test_file(&node.file_path) {
                continue;
            }
            all_files.insert(node.file_path.clone());
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: HashMap<String, Color> = HashMap::new();
        let mut path: Vec<String> = Vec::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        let neighbors_of = |adj: &HashMap<String, BTreeSet<String>>, file: &str| -> Vec<String> {
            adj.get(file)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default()
        };

        for start in &all_files {
            if color.get(start).copied().unwrap_or(Color::White) != Color::White {
                continue;
            }
            color.insert(start.clone(), Color::Gray);
            path.push(start.clone());
            let mut stack: Vec<(String, Vec<String>, usize)> =
                vec![(start.clone(), neighbors_of(&file_adj, start), 0)];

            while !stack.is_empty() {
                let mut push_target: Option<String> = None;
                if let Some((_, neighbors, pos)) = stack.last_mut() {
                    while *pos < neighbors.len() {
                        let neighbor = neighbors[*pos].clone();
                        *pos += 1;
                        match color.get(&neighbor).copied().unwrap_or(Color::White) {
                            Color::Gray => {
                                if let Some(idx) = path.iter().position(|p| p == &neighbor) {
                                    let mut cycle = path[idx..].to_vec();
                                    cycle.push(neighbor.clone());
                                    cycles.push(cycle);
                                }
                            }
                            Color::White => {
                                push_target = Some(neighbor);
                                break;
                            }
                            Color::Black => {}
                        }
                    }
                }
                match push_target {
                    Some(next) => {
                        color.insert(next.clone(), Color::Gray);
                        path.push(next.clone());
                        let nb = neighbors_of(&file_adj, &next);
                        stack.push((next, nb, 0));
                    }
                    None => {
                        if let Some((current, _, _)) = stack.pop() {
                            color.insert(current, Color::Black);
                            path.pop();
                        }
                    }
                }
            }
        }

        // Normalize and deduplicate by canonical rotation.
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut unique: Vec<Vec<String>> = Vec::new();
        for cycle in cycles {
            let mut core: Vec<String> = cycle[..cycle.len().saturating_sub(1)].to_vec();
            if let Some(min_idx) = core
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.cmp(b.1))
                .map(|(i, _)| i)
            {
                core.rotate_left(min_idx);
            }
            if seen.insert(core.clone()) {
                unique.push(core);
            }
        }

        // Drop any cycle whose node set strictly contains another's.
        let node_sets: Vec<HashSet<&String>> =
            unique.iter().map(|c| c.iter().collect()).collect();
        let mut minimal: Vec<Vec<String>> = Vec::new();
        for (i, cycle) in unique.iter().enumerate() {
            let is_superset = node_sets.iter().enumerate().any(|(j, other)| {
                i != j && node_sets[i].len() > other.len() && other.is_subset(&node_sets[i])
            });
            if !is_superset {
                let mut out = cycle.clone();
                if let Some(first) = cycle.first() {
                    out.push(first.clone());
                }
                minimal.push(out);
            }
        }

        minimal
    }

    /// Deterministic hash of the entire graph: sorted `{id}:{kind}:{name}`
    /// node strings followed by sorted `{src}->{tgt}:{kind}` edge strings,
    /// joined with `|`, SHA-256[..16].
    pub fn compute_hash(&self) -> String {
        let mut node_strs: Vec<String> = self
            .all_nodes()
            .map(|n| format!("{}:{}:{}", n.id, n.kind, n.name))
            .collect();
        node_strs.sort();
        let mut edge_strs: Vec<String> = self
            .all_edges()
            .map(|e| format!("{}->{}:{}", e.source_id, e.target_id, e.kind))
            .collect();
        edge_strs.sort();
        node_strs.extend(edge_strs);
        short_hash(&node_strs.join("|"), 16)
    }

    /// Deep copy; the caller may mutate the copy freely.
    pub fn snapshot(&self) -> CodeGraph {
        self.clone()
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Confidence, Entity};

    fn node(file: &str, kind: EntityKind, name: &str) -> GraphNode {
        let entity = Entity::new(kind, name, 1, 2, "sig", "struct");
        GraphNode::from_entity(&entity, file)
    }

    #[test]
    fn add_and_remove_maintain_indexes() {
        let mut graph = CodeGraph::new();
        let n = node("a.py", EntityKind::Function, "run_job");
        let id = n.id.clone();
        graph.add_node(n);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.query(Some("a.py"), None, None).len(), 1);
        assert_eq!(graph.query(None, Some(EntityKind::Function), None).len(), 1);
        assert_eq!(graph.query(None, None, Some("run_job")).len(), 1);

        let removed = graph.remove_node(&id);
        assert!(removed.is_some());
        assert_eq!(graph.node_count(), 0);
        assert!(graph.query(Some("a.py"), None, None).is_empty());
        assert!(graph.name_index().get("run_job").is_none());
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut graph = CodeGraph::new();
        let caller = node("a.py", EntityKind::Function, "caller");
        let callee = node("b.py", EntityKind::Function, "callee");
        let (caller_id, callee_id) = (caller.id.clone(), callee.id.clone());
        graph.add_node(caller);
        graph.add_node(callee);
        assert!(graph.add_edge(
            GraphEdge::new(caller_id.clone(), callee_id.clone(), EdgeKind::Calls)
                .with_confidence(Confidence::Medium)
        ));
        assert_eq!(graph.edge_count(), 1);

        graph.remove_node(&callee_id);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.edges_from(&caller_id).count(), 0);
    }

    #[test]
    fn add_edge_rejects_missing_endpoints() {
        let mut graph = CodeGraph::new();
        let n = node("a.py", EntityKind::Function, "f");
        let id = n.id.clone();
        graph.add_node(n);
        let ghost = NodeId("0000000000000000".into());
        assert!(!graph.add_edge(GraphEdge::new(id.clone(), ghost.clone(), EdgeKind::Calls)));
        assert!(!graph.add_edge(GraphEdge::new(ghost, id, EdgeKind::Calls)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn traverse_excludes_start_and_respects_depth() {
        let mut graph = CodeGraph::new();
        let a = node("a.py", EntityKind::Function, "a");
        let b = node("b.py", EntityKind::Function, "b");
        let c = node("c.py", EntityKind::Function, "c");
        let (ia, ib, ic) = (a.id.clone(), b.id.clone(), c.id.clone());
        graph.add_node(a);
        graph.add_node(b);
        graph.add_node(c);
        graph.add_edge(GraphEdge::new(ia.clone(), ib.clone(), EdgeKind::Calls));
        graph.add_edge(GraphEdge::new(ib.clone(), ic.clone(), EdgeKind::Calls));

        let reached = graph.traverse(&ia, None, Direction::Outgoing, 3);
        let names: Vec<&str> = reached.iter().map(|(n, _)| n.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        let shallow = graph.traverse(&ia, None, Direction::Outgoing, 1);
        assert_eq!(shallow.len(), 1);

        let incoming = graph.traverse(&ic, None, Direction::Incoming, 3);
        assert_eq!(incoming.len(), 2);
    }

    #[test]
    fn find_path_returns_shortest() {
        let mut graph = CodeGraph::new();
        let a = node("a.py", EntityKind::Function, "a");
        let b = node("b.py", EntityKind::Function, "b");
        let c = node("c.py", EntityKind::Function, "c");
        let (ia, ib, ic) = (a.id.clone(), b.id.clone(), c.id.clone());
        graph.add_node(a);
        graph.add_node(b);
        graph.add_node(c);
        graph.add_edge(GraphEdge::new(ia.clone(), ib.clone(), EdgeKind::Calls));
        graph.add_edge(GraphEdge::new(ib.clone(), ic.clone(), EdgeKind::Calls));
        graph.add_edge(GraphEdge::new(ia.clone(), ic.clone(), EdgeKind::Calls));

        let path = graph.find_path(&ia, &ic, None, 10);
        assert_eq!(path, Some(vec![ia.clone(), ic.clone()]));
        assert!(graph.is_reachable(&ia, &ic, None, 10));
        assert!(!graph.is_reachable(&ic, &ia, None, 10));
    }

    #[test]
    fn query_intersection_logic() {
        let mut graph = CodeGraph::new();
        graph.add_node(node("a.py", EntityKind::Function, "shared"));
        graph.add_node(node("b.py", EntityKind::Function, "shared"));
        graph.add_node(node("a.py", EntityKind::Class, "Widget"));

        assert_eq!(graph.query(None, None, None).len(), 3);
        assert_eq!(graph.query(None, None, Some("shared")).len(), 2);
        assert_eq!(
            graph
                .query(Some("a.py"), Some(EntityKind::Function), Some("shared"))
                .len(),
            1
        );
        assert!(graph.query(Some("z.py"), None, Some("shared")).is_empty());
    }

    #[test]
    fn query_regex_filters_names() {
        let mut graph = CodeGraph::new();
        graph.add_node(node("a.py", EntityKind::Function, "get_user"));
        graph.add_node(node("a.py", EntityKind::Function, "get_order"));
        graph.add_node(node("a.py", EntityKind::Function, "delete_user"));

        let hits = graph.query_regex("^get_", None, None).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(graph.query_regex("(", None, None).is_err());
    }

    #[test]
    fn compute_hash_is_order_independent() {
        let mut g1 = CodeGraph::new();
        let mut g2 = CodeGraph::new();
        let a = node("a.py", EntityKind::Function, "a");
        let b = node("b.py", EntityKind::Function, "b");
        let edge = GraphEdge::new(a.id.clone(), b.id.clone(), EdgeKind::Calls);

        g1.add_node(a.clone());
        g1.add_node(b.clone());
        g1.add_edge(edge.clone());

        g2.add_node(b);
        g2.add_node(a);
        g2.add_edge(edge);

        assert_eq!(g1.compute_hash(), g2.compute_hash());
    }

    #[test]
    fn snapshot_is_independent() {
        let mut graph = CodeGraph::new();
        let n = node("a.py", EntityKind::Function, "f");
        let id = n.id.clone();
        graph.add_node(n);

        let snap = graph.snapshot();
        graph.remove_node(&id);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(snap.node_count(), 1);
    }
}
