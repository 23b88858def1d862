//! pcl-registry
//!
//! The pool registry and its counters (spec §3), plus durable JSON snapshot
//! persistence (spec §6). The Lifecycle Controller is the sole mutator;
//! every other crate only reads or proposes mutations through it.

mod registry;
mod snapshot;

pub use registry::{
    DailyCounters, PoolRegistry, RegistryKey, TransitionRejected, CONTENT_HASH_FIFO_CAP,
    PROCESSED_POST_ID_FIFO_CAP,
};
pub use snapshot::{load, save, RegistrySnapshot, SNAPSHOT_SCHEMA_VERSION};
