//! Main database entry point for Warden.
//!
//! This module provides the `Warden` struct, the primary entry point for
//! all authorization operations.

use crate::error::{Error, Result};
use crate::primitives::{Access, Files, Grants, Groups, Levels, Runs, Sessions, Users};
use crate::types::{Clock, EngineConfig, FileAccessPolicy};
use std::path::Path;
use std::sync::Arc;

/// The Warden database.
///
/// This is the main entry point. Create one with [`Warden::open`],
/// [`Warden::ephemeral`] or [`Warden::builder`].
///
/// # Example
///
/// ```ignore
/// use warden::prelude::*;
///
/// let db = Warden::ephemeral(FileAccessPolicy::AnyRun)?;
/// let levels = db.levels.seed_standard()?;
///
/// let ada = db.users.create("Ada", "lab", "cred-ada")?;
/// let bob = db.users.create("Bob", "lab", "cred-bob")?;
/// let run = db.runs.create(ada.id, json!({"pipeline": "align"}))?;
///
/// db.grants.grant(run.id, levels.write.id, Principal::User(bob.id))?;
/// db.runs.start_as(bob.id, run.id)?;
///
/// db.close()?;
/// ```
pub struct Warden {
    /// The underlying engine database
    pub(crate) inner: Arc<warden_engine::Database>,

    /// User provisioning
    pub users: Users,

    /// Groups and membership
    pub groups: Groups,

    /// Files and attachment
    pub files: Files,

    /// Runs and their lifecycle
    pub runs: Runs,

    /// Access level definitions
    pub levels: Levels,

    /// Permission grants
    pub grants: Grants,

    /// Access resolution
    pub access: Access,

    /// Session tokens
    pub sessions: Sessions,
}

impl Warden {
    /// Open a database at the given path.
    ///
    /// Loads the snapshot in `path` if one exists.
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        Self::builder().config(config).path(path).open()
    }

    /// Open a database with configuration read from a TOML file.
    pub fn open_with_config_file(path: impl AsRef<Path>, config_file: impl AsRef<Path>) -> Result<Self> {
        let config = EngineConfig::from_file(config_file).map_err(Error::from)?;
        Self::open(path, config)
    }

    /// Create an ephemeral database with no disk I/O.
    ///
    /// Uses the default thresholds: the levels named `read` and `write`, admin = strongest level.
    ///
    /// # Comparison
    ///
    /// | Method | Disk Files | Survives restart |
    /// |--------|------------|------------------|
    /// | `Warden::ephemeral()` | None | No |
    /// | `Warden::open(path)` | `catalog.json` | Yes, after `flush()` |
    pub fn ephemeral(policy: FileAccessPolicy) -> Result<Self> {
        Self::builder().file_access(policy).open()
    }

    /// Create a builder for database configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let db = Warden::builder()
    ///     .path("./warden-data")
    ///     .file_access(FileAccessPolicy::AllRuns)
    ///     .write_level("editor")
    ///     .open()?;
    /// ```
    pub fn builder() -> WardenBuilder {
        WardenBuilder::new()
    }

    /// Write a snapshot to disk.
    ///
    /// No-op for ephemeral databases.
    pub fn flush(&self) -> Result<()> {
        self.inner.flush().map_err(Into::into)
    }

    /// Flush and drop every session.
    ///
    /// After calling `close()`, the database should not be used.
    pub fn close(&self) -> Result<()> {
        self.inner.shutdown().map_err(Into::into)
    }

    /// Get the data directory, if persistent.
    pub fn path(&self) -> Option<&Path> {
        self.inner.data_dir()
    }

    /// Check if this is an ephemeral (no-disk) database.
    pub fn is_ephemeral(&self) -> bool {
        self.inner.is_ephemeral()
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        self.inner.config()
    }

    /// Get database metrics.
    pub fn metrics(&self) -> DatabaseMetrics {
        let stats = self.inner.stats();
        DatabaseMetrics {
            users: stats.users,
            groups: stats.groups,
            files: stats.files,
            runs: stats.runs,
            access_levels: stats.access_levels,
            grants: stats.grants,
            sessions: self.inner.session_count(),
        }
    }
}

/// Database metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseMetrics {
    /// Users
    pub users: usize,
    /// Groups
    pub groups: usize,
    /// Files
    pub files: usize,
    /// Runs
    pub runs: usize,
    /// Access level definitions
    pub access_levels: usize,
    /// Permission grants
    pub grants: usize,
    /// Session tokens held
    pub sessions: usize,
}

/// Builder for database configuration.
///
/// A file access policy must be chosen; opening without one fails with
/// `Error::InvalidArgument`.
pub struct WardenBuilder {
    config: EngineConfig,
    inner: warden_engine::DatabaseBuilder,
}

impl WardenBuilder {
    /// Create a new builder with default thresholds and no file policy.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            inner: warden_engine::DatabaseBuilder::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the data directory.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.inner = self.inner.path(path.as_ref());
        self
    }

    /// Set the file access policy.
    pub fn file_access(mut self, policy: FileAccessPolicy) -> Self {
        self.config = self.config.file_access(policy);
        self
    }

    /// Set the read threshold by access level description.
    pub fn read_level(mut self, description: impl Into<String>) -> Self {
        self.config = self.config.read_level(description);
        self
    }

    /// Set the write threshold by access level description.
    pub fn write_level(mut self, description: impl Into<String>) -> Self {
        self.config = self.config.write_level(description);
        self
    }

    /// Set the administration threshold by access level description.
    pub fn admin_level(mut self, description: impl Into<String>) -> Self {
        self.config = self.config.admin_level(description);
        self
    }

    /// Set the session lifetime in hours.
    pub fn token_ttl_hours(mut self, hours: u32) -> Self {
        self.config = self.config.token_ttl_hours(hours);
        self
    }

    /// Use a custom clock (tests, replay).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.inner = self.inner.clock(clock);
        self
    }

    /// Open the database.
    pub fn open(self) -> Result<Warden> {
        let db = Arc::new(self.inner.config(self.config).open().map_err(Error::from)?);
        Ok(Warden::from_engine(db))
    }
}

impl Default for WardenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Warden {
    /// Create Warden from an engine Database.
    fn from_engine(db: Arc<warden_engine::Database>) -> Self {
        Self {
            users: Users::new(db.clone()),
            groups: Groups::new(db.clone()),
            files: Files::new(db.clone()),
            runs: Runs::new(db.clone()),
            levels: Levels::new(db.clone()),
            grants: Grants::new(db.clone()),
            access: Access::new(db.clone()),
            sessions: Sessions::new(db.clone()),
            inner: db,
        }
    }
}
