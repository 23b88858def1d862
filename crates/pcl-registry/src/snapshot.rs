//! Durable JSON snapshot of the registry (spec §3, §6 "Persistence file"),
//! grounded on `mqk-artifacts::init_run_artifacts`'s `fs::write` +
//! `anyhow::Context` style: one plain struct, `serde_json::to_string_pretty`
//! for a stable, human-diffable file, no database.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pcl_schemas::PoolRegistryEntry;

use crate::registry::{DailyCounters, PoolRegistry};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DailyCountersDto {
    comments: u32,
    posts: u32,
}

impl From<&DailyCounters> for DailyCountersDto {
    fn from(c: &DailyCounters) -> Self {
        DailyCountersDto { comments: c.comments, posts: c.posts }
    }
}

impl From<DailyCountersDto> for DailyCounters {
    fn from(d: DailyCountersDto) -> Self {
        DailyCounters { comments: d.comments, posts: d.posts }
    }
}

/// The on-disk shape of the persistence file (spec §6): `pools[]`,
/// `processed_post_ids[]`, `content_hashes[]`, `last_pool_created_cycle`,
/// `cycle_count`, `last_heartbeat`, `daily_counters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub schema_version: u32,
    pub pools: Vec<PoolRegistryEntry>,
    pub processed_post_ids: Vec<String>,
    pub content_hashes: Vec<String>,
    pub last_pool_created_cycle: u64,
    pub cycle_count: u64,
    pub last_heartbeat: Option<i64>,
    pub daily_counters: HashMap<String, DailyCountersDto>,
    pub suspension_expiry_unix: Option<i64>,
}

impl RegistrySnapshot {
    pub fn from_registry(registry: &PoolRegistry) -> Self {
        RegistrySnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            pools: registry.pools_snapshot(),
            processed_post_ids: registry.processed_post_ids_snapshot(),
            content_hashes: registry.content_hashes_snapshot(),
            last_pool_created_cycle: registry.last_pool_created_cycle(),
            cycle_count: registry.cycle_count(),
            last_heartbeat: registry.last_heartbeat_unix(),
            daily_counters: registry
                .daily_counters_snapshot()
                .iter()
                .map(|(k, v)| (k.clone(), v.into()))
                .collect(),
            suspension_expiry_unix: registry.suspension_expiry_unix(),
        }
    }

    pub fn into_registry(self) -> PoolRegistry {
        PoolRegistry::from_parts(
            self.pools,
            self.cycle_count,
            self.last_pool_created_cycle,
            self.last_heartbeat,
            self.daily_counters.into_iter().map(|(k, v)| (k, v.into())).collect(),
            self.content_hashes,
            self.processed_post_ids,
            self.suspension_expiry_unix,
        )
    }
}

/// Load the registry from `path`. A missing file yields a fresh, empty
/// registry — the controller must be able to resume with no local snapshot
/// (spec §4.8 "Cold-start reconciliation").
pub fn load(path: &Path) -> Result<PoolRegistry> {
    if !path.exists() {
        return Ok(PoolRegistry::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("read registry snapshot: {}", path.display()))?;
    let snapshot: RegistrySnapshot =
        serde_json::from_str(&raw).with_context(|| format!("parse registry snapshot: {}", path.display()))?;
    Ok(snapshot.into_registry())
}

/// Persist the registry to `path`, overwriting any existing file.
pub fn save(path: &Path, registry: &PoolRegistry) -> Result<()> {
    let snapshot = RegistrySnapshot::from_registry(registry);
    let json = serde_json::to_string_pretty(&snapshot).context("serialize registry snapshot")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create snapshot dir: {}", parent.display()))?;
        }
    }
    fs::write(path, json).with_context(|| format!("write registry snapshot: {}", path.display()))?;
    Ok(())
}
