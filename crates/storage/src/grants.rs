//! Sharded grant table
//!
//! Grants are partitioned by run: `DashMap<RunId, GrantShard>`, with an
//! `FxHashMap` inside each shard.
//!
//! # Design
//!
//! - Resolution reads only the target run's shard and never blocks other readers
//! - Inserts and removals lock only the target run's shard
//! - A grant row is inserted or removed whole while the shard is locked, so a
//!   reader sees either the complete row or nothing
//! - A secondary `GrantId -> RunId` index locates the shard for revocation
//!
//! Lock order is always shard first, then index.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use warden_core::{EntityRef, GrantId, PermissionGrant, RunId, WardenError, WardenResult};

/// Per-run shard holding that run's grants
#[derive(Debug, Default)]
pub struct GrantShard {
    pub(crate) grants: FxHashMap<GrantId, PermissionGrant>,
}

impl GrantShard {
    /// Number of grants on this run
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Check if the run has no grants
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Grant storage sharded by run
#[derive(Debug, Default)]
pub struct GrantTable {
    shards: DashMap<RunId, GrantShard>,
    index: DashMap<GrantId, RunId>,
    /// Bumped on every insert/remove
    version: AtomicU64,
}

impl GrantTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Total number of grants
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if there are no grants at all
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Insert a grant
    ///
    /// Fails with `Conflict` if the grant id is taken, or if a grant with the
    /// same (run, level, principal) already exists.
    pub fn insert(&self, grant: PermissionGrant) -> WardenResult<()> {
        let mut shard = self.shards.entry(grant.run).or_default();

        if let Some(existing) = shard.grants.values().find(|g| g.same_terms(&grant)) {
            return Err(WardenError::conflict(
                EntityRef::Grant(existing.id),
                format!(
                    "{} already holds level {} on run {}",
                    grant.principal, grant.level, grant.run
                ),
            ));
        }

        match self.index.entry(grant.id) {
            Entry::Occupied(_) => {
                return Err(WardenError::conflict(
                    EntityRef::Grant(grant.id),
                    "grant id already assigned",
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(grant.run);
            }
        }
        shard.grants.insert(grant.id, grant);
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Remove a grant by id
    pub fn remove(&self, id: GrantId) -> WardenResult<PermissionGrant> {
        let run = self
            .index
            .get(&id)
            .map(|entry| *entry.value())
            .ok_or_else(|| WardenError::not_found(EntityRef::Grant(id)))?;

        let removed = self
            .shards
            .get_mut(&run)
            .and_then(|mut shard| shard.grants.remove(&id))
            .ok_or_else(|| WardenError::not_found(EntityRef::Grant(id)))?;

        self.index.remove(&id);
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(removed)
    }

    /// Get a grant by id
    pub fn get(&self, id: GrantId) -> Option<PermissionGrant> {
        let run = *self.index.get(&id)?.value();
        self.shards
            .get(&run)
            .and_then(|shard| shard.grants.get(&id).copied())
    }

    /// All grants on a run, sorted by id
    pub fn on_run(&self, run: RunId) -> Vec<PermissionGrant> {
        self.shards
            .get(&run)
            .map(|shard| {
                let mut grants: Vec<_> = shard.grants.values().copied().collect();
                grants.sort_by_key(|g| g.id);
                grants
            })
            .unwrap_or_default()
    }

    /// Number of grants on a run
    pub fn count_on_run(&self, run: RunId) -> usize {
        self.shards.get(&run).map(|shard| shard.len()).unwrap_or(0)
    }

    /// Every grant in the table, sorted by id
    pub fn all(&self) -> Vec<PermissionGrant> {
        let mut grants: Vec<_> = self
            .shards
            .iter()
            .flat_map(|shard| shard.value().grants.values().copied().collect::<Vec<_>>())
            .collect();
        grants.sort_by_key(|g| g.id);
        grants
    }
}
