//! Database: the catalog, the resolver and the session table behind one handle
//!
//! ```ignore
//! use warden_engine::{Database, EngineConfig};
//! use warden_security::FileAccessPolicy;
//!
//! // Ephemeral: no disk I/O
//! let db = Database::builder()
//!     .file_access(FileAccessPolicy::AnyRun)
//!     .open()?;
//!
//! // Persistent: loads ./data/catalog.json if present
//! let db = Database::builder()
//!     .config(EngineConfig::from_file("warden.toml")?)
//!     .path("./data")
//!     .open()?;
//! ```
//!
//! Mutations that change what a run grants (grant, revoke) and status
//! transitions on the same run serialize through that run's lock, so an
//! access check and the mutation it guards observe the same grants.

use crate::authn::{Authentication, Authenticator, SessionToken, TokenRegistry};
use crate::config::EngineConfig;
use chrono::Duration;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use warden_core::{
    AccessLevel, AccessLevelId, Clock, EntityRef, File, FileId, GrantId, GrantRow, Group, GroupId,
    PermissionGrant, Principal, Run, RunId, SystemClock, User, UserId, WardenError, WardenResult,
};
use warden_security::{
    maximum_level, AccessOptions, AccessResolver, EffectiveAccess, FileAccessPolicy, Resolution,
};
use warden_storage::{Catalog, CatalogReader, CatalogStats};

/// Level values created by [`Database::seed_standard_levels`]
pub const STANDARD_LEVELS: [(&str, i64); 3] = [("read", 10), ("write", 20), ("admin", 30)];

/// The three conventional levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardLevels {
    /// `read` (10)
    pub read: AccessLevel,
    /// `write` (20)
    pub write: AccessLevel,
    /// `admin` (30)
    pub admin: AccessLevel,
}

/// Builder for [`Database`]
///
/// Without a path the database is ephemeral.
pub struct DatabaseBuilder {
    config: EngineConfig,
    path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
}

impl DatabaseBuilder {
    /// Create a builder with default thresholds and no file policy
    pub fn new() -> Self {
        DatabaseBuilder {
            config: EngineConfig::default(),
            path: None,
            clock: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the file access policy
    pub fn file_access(mut self, policy: FileAccessPolicy) -> Self {
        self.config.file_access = Some(policy);
        self
    }

    /// Set the data directory for snapshots
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a custom clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Open the database
    ///
    /// Fails with `InvalidArgument` if no file access policy was configured.
    pub fn open(self) -> WardenResult<Database> {
        let policy = self.config.validate()?;
        let clock: Arc<dyn Clock> = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        let catalog = match &self.path {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Catalog::load_from(dir)?.unwrap_or_default()
            }
            None => Catalog::new(),
        };

        let ttl = Duration::hours(i64::from(self.config.token_ttl_hours));
        let stats = catalog.stats();
        info!(
            path = ?self.path,
            file_access = policy.as_str(),
            runs = stats.runs,
            grants = stats.grants,
            "opened database"
        );

        Ok(Database {
            catalog,
            resolver: AccessResolver::new(AccessOptions::new(policy)),
            tokens: TokenRegistry::new(ttl, clock.clone()),
            config: self.config,
            clock,
            data_dir: self.path,
        })
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The Warden database
pub struct Database {
    catalog: Catalog,
    resolver: AccessResolver,
    tokens: TokenRegistry,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    data_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("data_dir", &self.data_dir)
            .field("stats", &self.catalog.stats())
            .finish()
    }
}

impl Database {
    /// Create a builder
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Open an in-memory database with default thresholds
    pub fn ephemeral(policy: FileAccessPolicy) -> WardenResult<Self> {
        Self::builder().file_access(policy).open()
    }

    /// Open a database at `path` with the given configuration
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> WardenResult<Self> {
        Self::builder().config(config).path(path).open()
    }

    /// Read-only view of the catalog
    pub fn catalog(&self) -> CatalogReader<'_> {
        self.catalog.reader()
    }

    /// The catalog itself, for mutations made under the run locks
    pub(crate) fn store(&self) -> &Catalog {
        &self.catalog
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The configured file access policy
    pub fn file_policy(&self) -> FileAccessPolicy {
        self.resolver.options().file_policy
    }

    /// The clock used for timestamps
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Entity counts
    pub fn stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    /// Data directory, if persistent
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Check if this database never touches disk
    pub fn is_ephemeral(&self) -> bool {
        self.data_dir.is_none()
    }

    /// Write a snapshot of the catalog to the data directory
    ///
    /// No-op for ephemeral databases.
    pub fn flush(&self) -> WardenResult<()> {
        match &self.data_dir {
            Some(dir) => self.catalog.save_to(dir),
            None => Ok(()),
        }
    }

    /// Flush and drop all session tokens
    pub fn shutdown(&self) -> WardenResult<()> {
        self.flush()?;
        let dropped = self.tokens.clear();
        info!(sessions = dropped, "database shut down");
        Ok(())
    }

    /// Lock serializing grant changes and transitions on `run`
    ///
    /// Fails with `NotFound` for an unknown run.
    pub(crate) fn run_lock(&self, run: RunId) -> WardenResult<Arc<Mutex<()>>> {
        if self.catalog.run(run).is_none() {
            return Err(WardenError::not_found(EntityRef::Run(run)));
        }
        Ok(self.catalog.run_lock(run))
    }

    // =========================================================================
    // Data model
    // =========================================================================

    /// Create a user
    pub fn create_user(&self, name: &str, realm: &str, credential: &str) -> WardenResult<User> {
        self.create_user_with_id(UserId::new(), name, realm, credential)
    }

    /// Create a user with a caller-chosen id
    pub fn create_user_with_id(
        &self,
        id: UserId,
        name: &str,
        realm: &str,
        credential: &str,
    ) -> WardenResult<User> {
        let user = User {
            id,
            name: name.to_string(),
            realm: realm.to_string(),
            credential: credential.to_string(),
        };
        self.catalog.create_user(user.clone())?;
        Ok(user)
    }

    /// Create a group
    pub fn create_group(&self, name: &str, realm: &str) -> WardenResult<Group> {
        self.create_group_with_id(GroupId::new(), name, realm)
    }

    /// Create a group with a caller-chosen id
    pub fn create_group_with_id(&self, id: GroupId, name: &str, realm: &str) -> WardenResult<Group> {
        let group = Group {
            id,
            name: name.to_string(),
            realm: realm.to_string(),
        };
        self.catalog.create_group(group.clone())?;
        Ok(group)
    }

    /// Add a user to a group
    pub fn add_membership(&self, user: UserId, group: GroupId) -> WardenResult<()> {
        self.catalog.add_membership(user, group)
    }

    /// Remove a user from a group
    pub fn remove_membership(&self, user: UserId, group: GroupId) -> WardenResult<()> {
        self.catalog.remove_membership(user, group)
    }

    /// Create a file owned by `owner`
    pub fn create_file(&self, name: &str, owner: UserId) -> WardenResult<File> {
        self.create_file_with_id(FileId::new(), name, owner)
    }

    /// Create a file with a caller-chosen id
    pub fn create_file_with_id(&self, id: FileId, name: &str, owner: UserId) -> WardenResult<File> {
        let file = File {
            id,
            name: name.to_string(),
            owner,
        };
        self.catalog.create_file(file.clone())?;
        Ok(file)
    }

    /// Create a pending run owned by `owner`
    pub fn create_run(&self, owner: UserId, config: serde_json::Value) -> WardenResult<Run> {
        self.create_run_with_id(RunId::new(), owner, config)
    }

    /// Create a run with a caller-chosen id
    pub fn create_run_with_id(
        &self,
        id: RunId,
        owner: UserId,
        config: serde_json::Value,
    ) -> WardenResult<Run> {
        self.catalog.create_run(id, owner, config, self.clock.now())
    }

    /// Attach a file to a run without any access check
    ///
    /// Gated attachment goes through [`RunLifecycle::attach_file`](crate::RunLifecycle::attach_file).
    pub fn attach_file_to_run(&self, file: FileId, run: RunId) -> WardenResult<()> {
        self.catalog.attach_file_to_run(file, run)
    }

    /// Define an access level
    pub fn create_access_level(&self, description: &str, level_value: i64) -> WardenResult<AccessLevel> {
        self.create_access_level_with_id(AccessLevelId::new(), description, level_value)
    }

    /// Define an access level with a caller-chosen id
    pub fn create_access_level_with_id(
        &self,
        id: AccessLevelId,
        description: &str,
        level_value: i64,
    ) -> WardenResult<AccessLevel> {
        let level = AccessLevel::new(id, description, level_value);
        self.catalog.create_access_level(level.clone())?;
        Ok(level)
    }

    /// Ensure `read` (10), `write` (20) and `admin` (30) exist
    ///
    /// Existing levels with the same description and value are reused.
    pub fn seed_standard_levels(&self) -> WardenResult<StandardLevels> {
        let existing = self.catalog.access_levels();
        let seed = |(description, value): (&str, i64)| -> WardenResult<AccessLevel> {
            match existing
                .iter()
                .find(|l| l.description == description && l.level_value == value)
            {
                Some(level) => Ok(level.clone()),
                None => self.create_access_level(description, value),
            }
        };

        let [read, write, admin] = STANDARD_LEVELS;
        let levels = StandardLevels {
            read: seed(read)?,
            write: seed(write)?,
            admin: seed(admin)?,
        };
        debug!("standard access levels in place");
        Ok(levels)
    }

    /// Grant `level` on `run` to `principal`, without any access check
    ///
    /// Gated granting goes through [`RunLifecycle::grant_as`](crate::RunLifecycle::grant_as).
    pub fn grant_permission(
        &self,
        run: RunId,
        level: AccessLevelId,
        principal: Principal,
    ) -> WardenResult<PermissionGrant> {
        self.grant_permission_with_id(GrantId::new(), run, level, principal)
    }

    /// Grant with a caller-chosen id
    pub fn grant_permission_with_id(
        &self,
        id: GrantId,
        run: RunId,
        level: AccessLevelId,
        principal: Principal,
    ) -> WardenResult<PermissionGrant> {
        let grant = PermissionGrant {
            id,
            run,
            level,
            principal,
        };
        let lock = self.run_lock(run)?;
        let _guard = lock.lock();
        self.catalog.grant_permission(grant)?;
        Ok(grant)
    }

    /// Grant from a row with two nullable principal columns
    ///
    /// Fails with `InvalidArgument` unless exactly one column is set.
    pub fn grant_permission_row(&self, row: GrantRow) -> WardenResult<PermissionGrant> {
        let grant = PermissionGrant::try_from(row)?;
        self.grant_permission_with_id(grant.id, grant.run, grant.level, grant.principal)
    }

    /// Revoke a grant, without any access check
    pub fn revoke_permission(&self, id: GrantId) -> WardenResult<PermissionGrant> {
        let grant = self
            .catalog
            .grant(id)
            .ok_or_else(|| WardenError::not_found(EntityRef::Grant(id)))?;
        let lock = self.run_lock(grant.run)?;
        let _guard = lock.lock();
        self.catalog.revoke_permission(id)
    }

    // =========================================================================
    // Access resolution
    // =========================================================================

    /// Resolve `user`'s effective access to `run`
    pub fn resolve_access(&self, user: UserId, run: RunId) -> WardenResult<Resolution> {
        self.resolver.resolve(&self.catalog, user, run)
    }

    /// Check whether `user` holds at least `level` on `run`
    pub fn check_access(&self, user: UserId, run: RunId, level: AccessLevelId) -> WardenResult<bool> {
        self.resolver.check(&self.catalog, user, run, level)
    }

    /// Check whether `user` resolves to at least `min_value` on `run`
    pub fn check_access_value(&self, user: UserId, run: RunId, min_value: i64) -> WardenResult<bool> {
        self.resolver.check_value(&self.catalog, user, run, min_value)
    }

    /// Effective access of at least `min_value`, or a `Denied` error
    pub fn require_access(
        &self,
        user: UserId,
        run: RunId,
        min_value: i64,
    ) -> WardenResult<EffectiveAccess> {
        self.resolver.require(&self.catalog, user, run, min_value)
    }

    /// Resolve `user`'s effective access to `file` under the file policy
    pub fn resolve_file_access(&self, user: UserId, file: FileId) -> WardenResult<Resolution> {
        self.resolver.resolve_file(&self.catalog, user, file)
    }

    /// Check whether `user` holds at least `level` on `file`
    pub fn check_file_access(
        &self,
        user: UserId,
        file: FileId,
        level: AccessLevelId,
    ) -> WardenResult<bool> {
        self.resolver.check_file(&self.catalog, user, file, level)
    }

    /// Check whether `user` resolves to at least `min_value` on `file`
    pub fn check_file_access_value(
        &self,
        user: UserId,
        file: FileId,
        min_value: i64,
    ) -> WardenResult<bool> {
        self.resolver
            .check_file_value(&self.catalog, user, file, min_value)
    }

    /// Every run `user` resolves to at least `min_value` on, sorted by id
    pub fn accessible_runs(&self, user: UserId, min_value: i64) -> WardenResult<Vec<Run>> {
        if self.catalog.user(user).is_none() {
            return Err(WardenError::not_found(EntityRef::User(user)));
        }
        let mut runs = Vec::new();
        for id in self.catalog.run_ids() {
            if self.check_access_value(user, id, min_value)? {
                if let Some(run) = self.catalog.run(id) {
                    runs.push(run);
                }
            }
        }
        Ok(runs)
    }

    /// Level required for reads, `None` while no level carries the configured name
    pub fn read_threshold(&self) -> Option<AccessLevel> {
        self.level_named(&self.config.read_level)
    }

    /// Level required for transitions and attachments
    pub fn write_threshold(&self) -> Option<AccessLevel> {
        self.level_named(&self.config.write_level)
    }

    /// Level required for granting and revoking
    ///
    /// The level named by `admin_level`, else the maximum defined level.
    pub fn admin_threshold(&self) -> WardenResult<Option<AccessLevel>> {
        match &self.config.admin_level {
            Some(name) => Ok(self.level_named(name)),
            None => Ok(Some(maximum_level(&self.catalog)?)),
        }
    }

    /// Weakest level with this description
    fn level_named(&self, description: &str) -> Option<AccessLevel> {
        self.catalog
            .access_levels()
            .into_iter()
            .find(|l| l.description == description)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Exchange a user's credential for a session token
    pub fn issue_token(&self, credential: &str) -> WardenResult<SessionToken> {
        let user = self
            .catalog
            .user_by_credential(credential)
            .ok_or_else(|| WardenError::invalid_argument("unknown credential"))?;
        Ok(self.tokens.issue(user.id))
    }

    /// Drop a session token
    pub fn revoke_token(&self, token: &str) -> bool {
        self.tokens.revoke(token)
    }

    /// Drop expired session tokens
    pub fn purge_expired_tokens(&self) -> usize {
        self.tokens.purge_expired()
    }

    /// Number of live or unpurged session tokens
    pub fn session_count(&self) -> usize {
        self.tokens.len()
    }
}

impl Authenticator for Database {
    fn authenticate(&self, token: &str) -> Authentication {
        self.tokens.authenticate(token)
    }
}
