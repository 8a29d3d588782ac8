//! Files and their attachment to runs.

use crate::error::Result;
use crate::types::{File, FileId, RunId, UserId};
use std::sync::Arc;
use warden_engine::RunLifecycle;

/// File operations.
///
/// Access via `db.files`.
pub struct Files {
    db: Arc<warden_engine::Database>,
    lifecycle: RunLifecycle,
}

impl Files {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        let lifecycle = RunLifecycle::new(db.clone());
        Self { db, lifecycle }
    }

    /// Register an uploaded file.
    pub fn create(&self, name: &str, owner: UserId) -> Result<File> {
        Ok(self.db.create_file(name, owner)?)
    }

    /// Register a file with a specific ID.
    pub fn create_with_id(&self, id: FileId, name: &str, owner: UserId) -> Result<File> {
        Ok(self.db.create_file_with_id(id, name, owner)?)
    }

    /// Get a file.
    pub fn get(&self, id: FileId) -> Option<File> {
        self.db.catalog().file(id)
    }

    /// Read a file on behalf of `actor`.
    ///
    /// Gated at the read threshold under the configured file policy.
    pub fn get_as(&self, actor: UserId, id: FileId) -> Result<File> {
        Ok(self.lifecycle.file_as(actor, id)?)
    }

    /// Attach a file to a run (provisioning, no access check).
    pub fn attach(&self, file: FileId, run: RunId) -> Result<()> {
        Ok(self.db.attach_file_to_run(file, run)?)
    }

    /// Attach a file to a run on behalf of `actor`.
    ///
    /// The actor must own the file and hold the write threshold on the run.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let file = db.files.create("reads.fq", ada.id)?;
    /// db.files.attach_as(ada.id, file.id, run.id)?;
    /// ```
    pub fn attach_as(&self, actor: UserId, file: FileId, run: RunId) -> Result<()> {
        Ok(self.lifecycle.attach_file(actor, file, run)?)
    }

    /// Runs a file is attached to.
    pub fn runs(&self, file: FileId) -> Vec<RunId> {
        self.db.catalog().runs_of_file(file)
    }
}
