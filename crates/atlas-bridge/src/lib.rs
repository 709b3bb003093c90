//! Atlas bridge — the incremental delta pipeline over the code graph.
//!
//! Consumes whole-file change events, extracts entities, diffs them
//! against the previous state, mutates the graph, resolves edges in two
//! passes, and ripples bounded updates to dependent files.

pub mod bridge;
pub mod propagator;
pub mod resolve;
pub mod storage;
pub mod zones;

pub use bridge::{Bridge, MAX_FILE_CONTENTS};
pub use propagator::{BoundedPropagator, PendingUpdate, PropagationResult, PropagatorConfig};
pub use resolve::ResolutionStats;
pub use storage::{
    CURRENT_FORMAT_VERSION, StorageError, deserialize_bridge, is_state_stale, load_state,
    save_state, serialize_bridge,
};
pub use zones::{Zone, ZoneCache, ZoneCacheConfig, ZoneStats};
