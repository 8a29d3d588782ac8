//! In-memory catalog
//!
//! Holds every entity of the data model and enforces its invariants on each
//! mutation:
//! - referenced entities must exist (`NotFound`)
//! - ids, credentials, memberships, attachments and grant terms are unique (`Conflict`)
//! - a mutation either applies in full or not at all
//!
//! # Thread Safety
//!
//! Every table is a `DashMap`, so reads are lock-free with respect to each
//! other and writes lock only the shard they touch. Mutations that must
//! observe and change a run atomically (status transitions, gated grants)
//! take the run's lock from [`Catalog::run_lock`]; different runs never
//! contend.
//!
//! Every mutation also holds the catalog barrier shared for its duration.
//! [`Catalog::snapshot`] takes it exclusively, so a snapshot
//! never holds a row without the rows it references.

use crate::grants::GrantTable;
use crate::reader::CatalogReader;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::debug;
use warden_core::{
    AccessLevel, AccessLevelId, AccessView, EntityRef, File, FileId, FileRun, GrantId, GrantRow,
    Group, GroupId, Membership, PermissionGrant, Principal, Run, RunId, RunStatus, User, UserId,
    WardenError, WardenResult,
};

/// The entity store
#[derive(Debug, Default)]
pub struct Catalog {
    users: DashMap<UserId, User>,
    credentials: DashMap<String, UserId>,
    groups: DashMap<GroupId, Group>,
    /// user -> groups
    memberships: DashMap<UserId, FxHashSet<GroupId>>,
    /// group -> users
    members: DashMap<GroupId, FxHashSet<UserId>>,
    files: DashMap<FileId, File>,
    runs: DashMap<RunId, Run>,
    /// file -> runs
    file_runs: DashMap<FileId, FxHashSet<RunId>>,
    /// run -> files
    run_files: DashMap<RunId, FxHashSet<FileId>>,
    levels: DashMap<AccessLevelId, AccessLevel>,
    grants: GrantTable,
    run_locks: DashMap<RunId, Arc<Mutex<()>>>,
    /// Shared by mutations, exclusive for snapshots
    barrier: RwLock<()>,
}

/// Entity counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogStats {
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
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity counts
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            users: self.users.len(),
            groups: self.groups.len(),
            files: self.files.len(),
            runs: self.runs.len(),
            access_levels: self.levels.len(),
            grants: self.grants.len(),
        }
    }

    /// Read-only handle over this catalog
    pub fn reader(&self) -> CatalogReader<'_> {
        CatalogReader::new(self)
    }

    /// Hold off every mutation until the guard drops
    pub(crate) fn quiesce(&self) -> RwLockWriteGuard<'_, ()> {
        self.barrier.write()
    }

    /// Lock serializing mutations of one run
    pub fn run_lock(&self, run: RunId) -> Arc<Mutex<()>> {
        self.run_locks.entry(run).or_default().value().clone()
    }

    // =========================================================================
    // Users and groups
    // =========================================================================

    /// Create a user
    ///
    /// Fails with `Conflict` if the id or the credential is already taken.
    pub fn create_user(&self, user: User) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        let credential = match self.credentials.entry(user.credential.clone()) {
            Entry::Occupied(existing) => {
                return Err(WardenError::conflict(
                    EntityRef::User(*existing.get()),
                    "credential already assigned to another user",
                ))
            }
            Entry::Vacant(slot) => slot,
        };
        match self.users.entry(user.id) {
            Entry::Occupied(_) => {
                return Err(WardenError::conflict(
                    EntityRef::User(user.id),
                    "user id already exists",
                ))
            }
            Entry::Vacant(slot) => {
                credential.insert(user.id);
                debug!(user_id = %user.id, realm = %user.realm, "created user");
                slot.insert(user);
            }
        }
        Ok(())
    }

    /// Get a user
    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    /// Find the user holding a credential
    pub fn user_by_credential(&self, credential: &str) -> Option<User> {
        let id = *self.credentials.get(credential)?.value();
        self.user(id)
    }

    /// Create a group
    pub fn create_group(&self, group: Group) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        match self.groups.entry(group.id) {
            Entry::Occupied(_) => Err(WardenError::conflict(
                EntityRef::Group(group.id),
                "group id already exists",
            )),
            Entry::Vacant(slot) => {
                debug!(group_id = %group.id, name = %group.name, "created group");
                slot.insert(group);
                Ok(())
            }
        }
    }

    /// Get a group
    pub fn group(&self, id: GroupId) -> Option<Group> {
        self.groups.get(&id).map(|g| g.value().clone())
    }

    /// Add a user to a group
    pub fn add_membership(&self, user: UserId, group: GroupId) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        self.require_user(user)?;
        self.require_group(group)?;

        let inserted = self.memberships.entry(user).or_default().insert(group);
        if !inserted {
            return Err(WardenError::conflict(
                EntityRef::Membership { user, group },
                "user is already a member",
            ));
        }
        self.members.entry(group).or_default().insert(user);
        debug!(user_id = %user, group_id = %group, "added membership");
        Ok(())
    }

    /// Remove a user from a group
    pub fn remove_membership(&self, user: UserId, group: GroupId) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        let removed = self
            .memberships
            .get_mut(&user)
            .map(|mut groups| groups.remove(&group))
            .unwrap_or(false);
        if !removed {
            return Err(WardenError::not_found(EntityRef::Membership { user, group }));
        }
        if let Some(mut users) = self.members.get_mut(&group) {
            users.remove(&user);
        }
        debug!(user_id = %user, group_id = %group, "removed membership");
        Ok(())
    }

    /// Groups a user is a direct member of, sorted
    pub fn groups_of(&self, user: UserId) -> Vec<GroupId> {
        let mut groups: Vec<_> = self
            .memberships
            .get(&user)
            .map(|g| g.iter().copied().collect())
            .unwrap_or_default();
        groups.sort();
        groups
    }

    /// Members of a group, sorted
    pub fn members_of(&self, group: GroupId) -> Vec<UserId> {
        let mut users: Vec<_> = self
            .members
            .get(&group)
            .map(|u| u.iter().copied().collect())
            .unwrap_or_default();
        users.sort();
        users
    }

    /// Every membership pair
    pub fn memberships(&self) -> Vec<Membership> {
        let mut all: Vec<_> = self
            .memberships
            .iter()
            .flat_map(|entry| {
                let user = *entry.key();
                entry
                    .value()
                    .iter()
                    .map(|&group| Membership { user, group })
                    .collect::<Vec<_>>()
            })
            .collect();
        all.sort_by_key(|m| (m.user, m.group));
        all
    }

    // =========================================================================
    // Files and runs
    // =========================================================================

    /// Create a file owned by an existing user
    pub fn create_file(&self, file: File) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        self.require_user(file.owner)?;
        match self.files.entry(file.id) {
            Entry::Occupied(_) => Err(WardenError::conflict(
                EntityRef::File(file.id),
                "file id already exists",
            )),
            Entry::Vacant(slot) => {
                debug!(file_id = %file.id, owner = %file.owner, "created file");
                slot.insert(file);
                Ok(())
            }
        }
    }

    /// Get a file
    pub fn file(&self, id: FileId) -> Option<File> {
        self.files.get(&id).map(|f| f.value().clone())
    }

    /// Files owned by a user, sorted by id
    pub fn files_owned_by(&self, owner: UserId) -> Vec<File> {
        let mut files: Vec<_> = self
            .files
            .iter()
            .filter(|f| f.owner == owner)
            .map(|f| f.value().clone())
            .collect();
        files.sort_by_key(|f| f.id);
        files
    }

    /// Create a run owned by an existing user, in `pending` status
    pub fn create_run(
        &self,
        id: RunId,
        owner: UserId,
        config: serde_json::Value,
        now: DateTime<Utc>,
    ) -> WardenResult<Run> {
        let _barrier = self.barrier.read();
        let run = Run::new(id, owner, config, now);
        self.insert_run_row(run.clone())?;
        Ok(run)
    }

    /// Insert a run row as-is (status and timestamps preserved)
    ///
    /// Used when restoring snapshots.
    pub fn insert_run(&self, run: Run) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        self.insert_run_row(run)
    }

    fn insert_run_row(&self, run: Run) -> WardenResult<()> {
        self.require_user(run.owner)?;
        match self.runs.entry(run.id) {
            Entry::Occupied(_) => Err(WardenError::conflict(
                EntityRef::Run(run.id),
                "run id already exists",
            )),
            Entry::Vacant(slot) => {
                debug!(run_id = %run.id, owner = %run.owner, status = %run.status, "created run");
                slot.insert(run);
                Ok(())
            }
        }
    }

    /// Get a run
    pub fn run(&self, id: RunId) -> Option<Run> {
        self.runs.get(&id).map(|r| r.value().clone())
    }

    /// Every run id, sorted
    pub fn run_ids(&self) -> Vec<RunId> {
        let mut ids: Vec<_> = self.runs.iter().map(|r| *r.key()).collect();
        ids.sort();
        ids
    }

    /// Runs owned by a user, sorted by id
    pub fn runs_owned_by(&self, owner: UserId) -> Vec<Run> {
        let mut runs: Vec<_> = self
            .runs
            .iter()
            .filter(|r| r.owner == owner)
            .map(|r| r.value().clone())
            .collect();
        runs.sort_by_key(|r| r.id);
        runs
    }

    /// Change a run's status
    ///
    /// The check and the write happen under the run row's shard lock.
    pub fn transition_run(
        &self,
        id: RunId,
        next: RunStatus,
        now: DateTime<Utc>,
    ) -> WardenResult<Run> {
        let _barrier = self.barrier.read();
        let mut run = self
            .runs
            .get_mut(&id)
            .ok_or_else(|| WardenError::not_found(EntityRef::Run(id)))?;
        let previous = run.transition(next, now)?;
        debug!(run_id = %id, from = %previous, to = %next, "run transitioned");
        Ok(run.value().clone())
    }

    /// Attach a file to a run
    pub fn attach_file_to_run(&self, file: FileId, run: RunId) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        self.require_file(file)?;
        self.require_run(run)?;

        let inserted = self.file_runs.entry(file).or_default().insert(run);
        if !inserted {
            return Err(WardenError::conflict(
                EntityRef::FileRun { file, run },
                "file is already attached to run",
            ));
        }
        self.run_files.entry(run).or_default().insert(file);
        debug!(file_id = %file, run_id = %run, "attached file");
        Ok(())
    }

    /// Runs a file is attached to, sorted
    pub fn runs_of_file(&self, file: FileId) -> Vec<RunId> {
        let mut runs: Vec<_> = self
            .file_runs
            .get(&file)
            .map(|r| r.iter().copied().collect())
            .unwrap_or_default();
        runs.sort();
        runs
    }

    /// Files attached to a run, sorted
    pub fn files_of_run(&self, run: RunId) -> Vec<FileId> {
        let mut files: Vec<_> = self
            .run_files
            .get(&run)
            .map(|f| f.iter().copied().collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Every attachment
    pub fn file_runs(&self) -> Vec<FileRun> {
        let mut all: Vec<_> = self
            .file_runs
            .iter()
            .flat_map(|entry| {
                let file = *entry.key();
                entry
                    .value()
                    .iter()
                    .map(|&run| FileRun { file, run })
                    .collect::<Vec<_>>()
            })
            .collect();
        all.sort_by_key(|fr| (fr.file, fr.run));
        all
    }

    // =========================================================================
    // Access levels and grants
    // =========================================================================

    /// Define an access level
    pub fn create_access_level(&self, level: AccessLevel) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        match self.levels.entry(level.id) {
            Entry::Occupied(_) => Err(WardenError::conflict(
                EntityRef::AccessLevel(level.id),
                "access level id already exists",
            )),
            Entry::Vacant(slot) => {
                debug!(level_id = %level.id, value = level.level_value, "created access level");
                slot.insert(level);
                Ok(())
            }
        }
    }

    /// Get an access level
    pub fn access_level(&self, id: AccessLevelId) -> Option<AccessLevel> {
        self.levels.get(&id).map(|l| l.value().clone())
    }

    /// All access levels, weakest first (ties by id)
    pub fn access_levels(&self) -> Vec<AccessLevel> {
        let mut levels: Vec<_> = self.levels.iter().map(|l| l.value().clone()).collect();
        levels.sort_by_key(|l| (l.level_value, l.id));
        levels
    }

    /// Insert a permission grant
    ///
    /// The run, the level and the principal must exist.
    pub fn grant_permission(&self, grant: PermissionGrant) -> WardenResult<()> {
        let _barrier = self.barrier.read();
        self.require_run(grant.run)?;
        self.require_level(grant.level)?;
        match grant.principal {
            Principal::User(user) => self.require_user(user)?,
            Principal::Group(group) => self.require_group(group)?,
        }
        self.grants.insert(grant)?;
        debug!(
            grant_id = %grant.id,
            run_id = %grant.run,
            principal = %grant.principal,
            "granted permission"
        );
        Ok(())
    }

    /// Insert a grant given in its two-nullable-column form
    pub fn grant_permission_row(&self, row: GrantRow) -> WardenResult<PermissionGrant> {
        let grant = PermissionGrant::try_from(row)?;
        self.grant_permission(grant)?;
        Ok(grant)
    }

    /// Remove a permission grant
    pub fn revoke_permission(&self, id: GrantId) -> WardenResult<PermissionGrant> {
        let _barrier = self.barrier.read();
        let grant = self.grants.remove(id)?;
        debug!(grant_id = %id, run_id = %grant.run, "revoked permission");
        Ok(grant)
    }

    /// Get a grant
    pub fn grant(&self, id: GrantId) -> Option<PermissionGrant> {
        self.grants.get(id)
    }

    /// Grants on a run, sorted by id
    pub fn grants_on(&self, run: RunId) -> Vec<PermissionGrant> {
        self.grants.on_run(run)
    }

    /// Every grant, sorted by id
    pub fn all_grants(&self) -> Vec<PermissionGrant> {
        self.grants.all()
    }

    /// Snapshot-friendly views of whole tables
    pub(crate) fn all_users(&self) -> Vec<User> {
        let mut users: Vec<_> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        users
    }

    pub(crate) fn all_groups(&self) -> Vec<Group> {
        let mut groups: Vec<_> = self.groups.iter().map(|g| g.value().clone()).collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    pub(crate) fn all_files(&self) -> Vec<File> {
        let mut files: Vec<_> = self.files.iter().map(|f| f.value().clone()).collect();
        files.sort_by_key(|f| f.id);
        files
    }

    pub(crate) fn all_runs(&self) -> Vec<Run> {
        let mut runs: Vec<_> = self.runs.iter().map(|r| r.value().clone()).collect();
        runs.sort_by_key(|r| r.id);
        runs
    }

    // =========================================================================
    // Existence checks
    // =========================================================================

    fn require_user(&self, id: UserId) -> WardenResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(WardenError::not_found(EntityRef::User(id)))
        }
    }

    fn require_group(&self, id: GroupId) -> WardenResult<()> {
        if self.groups.contains_key(&id) {
            Ok(())
        } else {
            Err(WardenError::not_found(EntityRef::Group(id)))
        }
    }

    fn require_file(&self, id: FileId) -> WardenResult<()> {
        if self.files.contains_key(&id) {
            Ok(())
        } else {
            Err(WardenError::not_found(EntityRef::File(id)))
        }
    }

    fn require_run(&self, id: RunId) -> WardenResult<()> {
        if self.runs.contains_key(&id) {
            Ok(())
        } else {
            Err(WardenError::not_found(EntityRef::Run(id)))
        }
    }

    fn require_level(&self, id: AccessLevelId) -> WardenResult<()> {
        if self.levels.contains_key(&id) {
            Ok(())
        } else {
            Err(WardenError::not_found(EntityRef::AccessLevel(id)))
        }
    }
}

impl AccessView for Catalog {
    fn user_exists(&self, user: UserId) -> WardenResult<bool> {
        Ok(self.users.contains_key(&user))
    }

    fn run(&self, run: RunId) -> WardenResult<Option<Run>> {
        Ok(Catalog::run(self, run))
    }

    fn groups_of(&self, user: UserId) -> WardenResult<Vec<GroupId>> {
        Ok(Catalog::groups_of(self, user))
    }

    fn grants_on(&self, run: RunId) -> WardenResult<Vec<PermissionGrant>> {
        Ok(Catalog::grants_on(self, run))
    }

    fn access_level(&self, level: AccessLevelId) -> WardenResult<Option<AccessLevel>> {
        Ok(Catalog::access_level(self, level))
    }

    fn access_levels(&self) -> WardenResult<Vec<AccessLevel>> {
        Ok(Catalog::access_levels(self))
    }

    fn file(&self, file: FileId) -> WardenResult<Option<File>> {
        Ok(Catalog::file(self, file))
    }

    fn runs_of_file(&self, file: FileId) -> WardenResult<Vec<RunId>> {
        Ok(Catalog::runs_of_file(self, file))
    }
}
