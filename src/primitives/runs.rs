//! Run lifecycle management.
//!
//! Runs move forward only: `pending -> running -> succeeded | failed`, and
//! `pending | running -> cancelled`. Every status change is made on behalf
//! of a user holding at least the write threshold on the run. The owner
//! passes every gate.

use crate::error::Result;
use crate::types::{File, FileId, Run, RunId, RunStatus, UserId};
use serde_json::Value;
use std::sync::Arc;
use warden_engine::RunLifecycle;

/// Run operations.
///
/// Access via `db.runs`.
pub struct Runs {
    db: Arc<warden_engine::Database>,
    lifecycle: RunLifecycle,
}

impl Runs {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        let lifecycle = RunLifecycle::new(db.clone());
        Self { db, lifecycle }
    }

    // =========================================================================
    // Provisioning
    // =========================================================================

    /// Create a pending run.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let run = db.runs.create(ada.id, json!({"pipeline": "align"}))?;
    /// assert_eq!(run.status, RunStatus::Pending);
    /// ```
    pub fn create(&self, owner: UserId, config: Value) -> Result<Run> {
        Ok(self.db.create_run(owner, config)?)
    }

    /// Create a run with a specific ID.
    pub fn create_with_id(&self, id: RunId, owner: UserId, config: Value) -> Result<Run> {
        Ok(self.db.create_run_with_id(id, owner, config)?)
    }

    /// Get a run (no access check).
    pub fn get(&self, id: RunId) -> Option<Run> {
        self.db.catalog().run(id)
    }

    /// All run IDs.
    pub fn list(&self) -> Vec<RunId> {
        self.db.catalog().run_ids()
    }

    /// Files attached to a run (no access check).
    pub fn files(&self, id: RunId) -> Vec<FileId> {
        self.db.catalog().files_of_run(id)
    }

    // =========================================================================
    // Gated reads
    // =========================================================================

    /// Read a run on behalf of `actor`.
    pub fn get_as(&self, actor: UserId, id: RunId) -> Result<Run> {
        Ok(self.lifecycle.run_as(actor, id)?)
    }

    /// Files attached to a run, on behalf of `actor`.
    pub fn files_as(&self, actor: UserId, id: RunId) -> Result<Vec<File>> {
        Ok(self.lifecycle.files_of_run_as(actor, id)?)
    }

    /// Every run `actor` resolves to at least `min_value` on.
    pub fn accessible(&self, actor: UserId, min_value: i64) -> Result<Vec<Run>> {
        Ok(self.db.accessible_runs(actor, min_value)?)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Move a run to `next` on behalf of `actor`.
    pub fn transition_as(&self, actor: UserId, id: RunId, next: RunStatus) -> Result<Run> {
        Ok(self.lifecycle.transition(actor, id, next)?)
    }

    /// `pending -> running`
    pub fn start_as(&self, actor: UserId, id: RunId) -> Result<Run> {
        Ok(self.lifecycle.start(actor, id)?)
    }

    /// `running -> succeeded`
    pub fn succeed_as(&self, actor: UserId, id: RunId) -> Result<Run> {
        Ok(self.lifecycle.succeed(actor, id)?)
    }

    /// `running -> failed`
    pub fn fail_as(&self, actor: UserId, id: RunId) -> Result<Run> {
        Ok(self.lifecycle.fail(actor, id)?)
    }

    /// `pending | running -> cancelled`
    pub fn cancel_as(&self, actor: UserId, id: RunId) -> Result<Run> {
        Ok(self.lifecycle.cancel(actor, id)?)
    }
}
