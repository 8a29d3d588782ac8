//! Access resolution.
//!
//! Answers "what may this user do on this run (or file)?". Owners hold the
//! strongest defined level; otherwise the strongest grant naming the user or
//! one of their groups wins, and no grant means denied.

use crate::error::Result;
use crate::types::{AccessLevel, AccessLevelId, EffectiveAccess, FileAccessPolicy, FileId, Resolution, RunId, UserId};
use std::sync::Arc;

/// Access checks.
///
/// Access via `db.access`.
pub struct Access {
    db: Arc<warden_engine::Database>,
}

impl Access {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        Self { db }
    }

    /// Resolve a user's effective access to a run.
    ///
    /// # Example
    ///
    /// ```ignore
    /// match db.access.resolve(bob.id, run.id)? {
    ///     Resolution::Granted(access) => println!("{}", access.level.description),
    ///     Resolution::Denied => println!("no access"),
    /// }
    /// ```
    pub fn resolve(&self, user: UserId, run: RunId) -> Result<Resolution> {
        Ok(self.db.resolve_access(user, run)?)
    }

    /// Check that a user holds at least `level` on a run.
    pub fn check(&self, user: UserId, run: RunId, level: AccessLevelId) -> Result<bool> {
        Ok(self.db.check_access(user, run, level)?)
    }

    /// Check against a raw level value.
    pub fn check_value(&self, user: UserId, run: RunId, min_value: i64) -> Result<bool> {
        Ok(self.db.check_access_value(user, run, min_value)?)
    }

    /// Effective access of at least `min_value`, or `Error::Denied`.
    pub fn require(&self, user: UserId, run: RunId, min_value: i64) -> Result<EffectiveAccess> {
        Ok(self.db.require_access(user, run, min_value)?)
    }

    /// Resolve a user's effective access to a file.
    pub fn resolve_file(&self, user: UserId, file: FileId) -> Result<Resolution> {
        Ok(self.db.resolve_file_access(user, file)?)
    }

    /// Check that a user holds at least `level` on a file.
    pub fn check_file(&self, user: UserId, file: FileId, level: AccessLevelId) -> Result<bool> {
        Ok(self.db.check_file_access(user, file, level)?)
    }

    /// Check file access against a raw level value.
    pub fn check_file_value(&self, user: UserId, file: FileId, min_value: i64) -> Result<bool> {
        Ok(self.db.check_file_access_value(user, file, min_value)?)
    }

    /// The configured file policy.
    pub fn file_policy(&self) -> FileAccessPolicy {
        self.db.file_policy()
    }

    /// Level required for reads.
    ///
    /// `None` while no level carries the configured name; only owners pass then.
    pub fn read_threshold(&self) -> Option<AccessLevel> {
        self.db.read_threshold()
    }

    /// Level required for transitions and attachments.
    pub fn write_threshold(&self) -> Option<AccessLevel> {
        self.db.write_threshold()
    }

    /// Level required for granting and revoking.
    pub fn admin_threshold(&self) -> Result<Option<AccessLevel>> {
        Ok(self.db.admin_threshold()?)
    }
}
