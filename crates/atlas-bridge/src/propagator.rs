//! Bounded change propagation: prioritized ripple with sync, async, and
//! deferred phases.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use atlas_core::CodeGraph;

/// Priority weights and phase bounds. Lower priority runs first.
#[derive(Debug, Clone)]
pub struct PropagatorConfig {
    pub max_sync_updates: usize,
    pub max_async_updates: usize,
    pub max_depth: usize,
    pub sync_timeout: Duration,
    pub open_file_boost: i64,
    pub recent_edit_boost: i64,
    pub test_file_penalty: i64,
    pub depth_penalty: i64,
    pub generated_penalty: i64,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        PropagatorConfig {
            max_sync_updates: 5,
            max_async_updates: 50,
            max_depth: 3,
            sync_timeout: Duration::from_millis(50),
            open_file_boost: 100,
            recent_edit_boost: 50,
            test_file_penalty: 30,
            depth_penalty: 20,
            generated_penalty: 50,
        }
    }
}

/// A pending file update. Ordered by priority, then path for determinism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub priority: i64,
    pub file_path: String,
    pub depth: usize,
}

impl Ord for PendingUpdate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.file_path.cmp(&other.file_path))
    }
}

impl PartialOrd for PendingUpdate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// What one propagation pass did with each affected file.
#[derive(Debug, Default)]
pub struct PropagationResult {
    pub sync_processed: Vec<String>,
    pub async_queued: Vec<String>,
    pub deferred: Vec<String>,
    pub total_affected: usize,
    pub sync_time: Duration,
}

/// Priority-based change propagation with bounded processing.
///
/// A change ripples to dependent files discovered by BFS over incoming
/// edges. The top items run synchronously (bounded by count and a
/// wall-clock deadline), the next batch lands in the async heap, and the
/// rest are noted but never run automatically.
pub struct BoundedPropagator {
    config: PropagatorConfig,
    async_queue: BinaryHeap<Reverse<PendingUpdate>>,
    open_files: HashSet<String>,
    recent_edits: HashMap<String, Instant>,
}

impl Default for BoundedPropagator {
    fn default() -> Self {
        Self::new(PropagatorConfig::default())
    }
}

impl BoundedPropagator {
    pub fn new(config: PropagatorConfig) -> Self {
        BoundedPropagator {
            config,
            async_queue: BinaryHeap::new(),
            open_files: HashSet::new(),
            recent_edits: HashMap::new(),
        }
    }

    /// Replace the set of currently open files.
    pub fn set_open_files(&mut self, files: HashSet<String>) {
        self.open_files = files;
    }

    /// Stamp a file as just edited.
    pub fn record_edit(&mut self, file_path: &str) {
        self.recent_edits.insert(file_path.to_string(), Instant::now());
    }

    /// Update priority for a file at a ripple depth; lower runs first.
    pub fn compute_priority(&self, file_path: &str, depth: usize) -> i64 {
        let mut priority = depth as i64 * self.config.depth_penalty;

        if self.open_files.contains(file_path) {
            priority -= self.config.open_file_boost;
        }
        if self
            .recent_edits
            .get(file_path)
            .is_some_and(|t| t.elapsed() < Duration::from_secs(300))
        {
            priority -= self.config.recent_edit_boost;
        }

        let lower = file_path.to_lowercase();
        if lower.contains("test") {
            priority += self.config.test_file_penalty;
        }
        if lower.contains("generated") || lower.contains("build") {
            priority += self.config.generated_penalty;
        }

        priority
    }

    /// Files affected by a change, with their minimum discovery depth, via
    /// BFS over incoming edges up to `max_depth`.
    pub fn find_affected_files(&self, graph: &CodeGraph, changed_file: &str) -> Vec<(String, usize)> {
        let mut affected: Vec<(String, usize)> = Vec::new();
        let mut visited: HashSet<String> = HashSet::from([changed_file.to_string()]);
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(changed_file.to_string(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= self.config.max_depth {
                continue;
            }
            for node in graph.get_nodes_by_file(&current) {
                for edge in graph.edges_to(&node.id) {
                    let Some(source) = graph.get_node(&edge.source_id) else {
                        continue;
                    };
                    if !visited.contains(&source.file_path) {
                        visited.insert(source.file_path.clone());
                        affected.push((source.file_path.clone(), depth + 1));
                        queue.push_back((source.file_path.clone(), depth + 1));
                    }
                }
            }
        }

        affected
    }

    /// Discover affected files and run the bounded phases in one call.
    pub fn propagate<F>(
        &mut self,
        graph: &CodeGraph,
        changed_file: &str,
        update_fn: F,
    ) -> PropagationResult
    where
        F: FnMut(&str),
    {
        let affected = self.find_affected_files(graph, changed_file);
        self.run(affected, update_fn)
    }

    /// Run the sync/async/deferred split over a precomputed affected list.
    /// Split out from [`propagate`](Self::propagate) so callers can release
    /// their graph borrow before `update_fn` mutates it.
    pub fn run<F>(&mut self, affected: Vec<(String, usize)>, mut update_fn: F) -> PropagationResult
    where
        F: FnMut(&str),
    {
        let mut result = PropagationResult {
            total_affected: affected.len(),
            ..PropagationResult::default()
        };
        if affected.is_empty() {
            return result;
        }

        let mut prioritized: Vec<PendingUpdate> = affected
            .into_iter()
            .map(|(file_path, depth)| PendingUpdate {
                priority: self.compute_priority(&file_path, depth),
                file_path,
                depth,
            })
            .collect();
        prioritized.sort_by_key(|p| p.priority);

        // Phase 1: sync, bounded by count and deadline (checked between
        // items, not mid-item).
        let sync_start = Instant::now();
        let mut sync_count = 0;
        for item in &prioritized {
            if sync_count >= self.config.max_sync_updates {
                break;
            }
            if sync_start.elapsed() >= self.config.sync_timeout {
                break;
            }
            update_fn(&item.file_path);
            result.sync_processed.push(item.file_path.clone());
            sync_count += 1;
        }
        result.sync_time = sync_start.elapsed();

        // Phase 2: async queue.
        let remaining = &prioritized[sync_count..];
        for item in remaining.iter().take(self.config.max_async_updates) {
            self.async_queue.push(Reverse(item.clone()));
            result.async_queued.push(item.file_path.clone());
        }

        // Phase 3: deferred, noted only.
        for item in remaining.iter().skip(self.config.max_async_updates) {
            result.deferred.push(item.file_path.clone());
        }

        tracing::debug!(
            total = result.total_affected,
            sync = result.sync_processed.len(),
            queued = result.async_queued.len(),
            deferred = result.deferred.len(),
            "propagation pass complete"
        );
        result
    }

    /// Drain up to `max_items` from the async heap in priority order.
    pub fn process_async_queue<F>(&mut self, max_items: usize, mut update_fn: F) -> Vec<String>
    where
        F: FnMut(&str),
    {
        let mut processed = Vec::new();
        for _ in 0..max_items {
            let Some(Reverse(item)) = self.async_queue.pop() else {
                break;
            };
            update_fn(&item.file_path);
            processed.push(item.file_path);
        }
        processed
    }

    pub fn async_queue_size(&self) -> usize {
        self.async_queue.len()
    }

    pub fn clear_async_queue(&mut self) {
        self.async_queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propagator() -> BoundedPropagator {
        BoundedPropagator::default()
    }

    #[test]
    fn priority_formula() {
        let mut p = propagator();
        assert_eq!(p.compute_priority("src/a.py", 2), 40);
        assert_eq!(p.compute_priority("tests/a.py", 1), 50);
        assert_eq!(p.compute_priority("build/gen.py", 0), 50);

        p.set_open_files(HashSet::from(["src/open.py".to_string()]));
        assert_eq!(p.compute_priority("src/open.py", 1), -80);

        p.record_edit("src/recent.py");
        assert_eq!(p.compute_priority("src/recent.py", 1), -30);
    }

    #[test]
    fn run_splits_phases() {
        let mut p = BoundedPropagator::new(PropagatorConfig {
            max_sync_updates: 2,
            max_async_updates: 3,
            ..PropagatorConfig::default()
        });
        let affected: Vec<(String, usize)> =
            (0..8).map(|i| (format!("f{i}.py"), 1)).collect();

        let mut ran: Vec<String> = Vec::new();
        let result = p.run(affected, |fp| ran.push(fp.to_string()));

        assert_eq!(result.total_affected, 8);
        assert_eq!(result.sync_processed.len(), 2);
        assert_eq!(ran, result.sync_processed);
        assert_eq!(result.async_queued.len(), 3);
        assert_eq!(result.deferred.len(), 3);
        assert_eq!(p.async_queue_size(), 3);
    }

    #[test]
    fn sync_phase_prefers_low_priority() {
        let mut p = BoundedPropagator::new(PropagatorConfig {
            max_sync_updates: 1,
            ..PropagatorConfig::default()
        });
        p.set_open_files(HashSet::from(["open.py".to_string()]));
        let affected = vec![
            ("tests/t.py".to_string(), 1),
            ("open.py".to_string(), 2),
            ("other.py".to_string(), 1),
        ];

        let mut ran: Vec<String> = Vec::new();
        p.run(affected, |fp| ran.push(fp.to_string()));
        assert_eq!(ran, vec!["open.py"]);
    }

    #[test]
    fn async_queue_drains_in_priority_order() {
        let mut p = BoundedPropagator::new(PropagatorConfig {
            max_sync_updates: 0,
            ..PropagatorConfig::default()
        });
        let affected = vec![
            ("c.py".to_string(), 3),
            ("a.py".to_string(), 1),
            ("b.py".to_string(), 2),
        ];
        p.run(affected, |_| {});

        let mut drained: Vec<String> = Vec::new();
        let processed = p.process_async_queue(2, |fp| drained.push(fp.to_string()));
        assert_eq!(processed, vec!["a.py", "b.py"]);
        assert_eq!(p.async_queue_size(), 1);

        p.clear_async_queue();
        assert_eq!(p.async_queue_size(), 0);
    }
}
