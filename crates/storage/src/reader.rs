//! Read-only catalog handle
//!
//! [`CatalogReader`] exposes the catalog's lookups and none of its
//! mutations. Writers go through the engine, which takes the run locks.

use crate::catalog::{Catalog, CatalogStats};
use warden_core::{
    AccessLevel, AccessLevelId, AccessView, File, FileId, FileRun, GrantId, Group, GroupId,
    Membership, PermissionGrant, Run, RunId, User, UserId, WardenResult,
};

/// Lookups over a [`Catalog`]
#[derive(Debug, Clone, Copy)]
pub struct CatalogReader<'a> {
    catalog: &'a Catalog,
}

impl<'a> CatalogReader<'a> {
    /// Wrap a catalog
    pub fn new(catalog: &'a Catalog) -> Self {
        CatalogReader { catalog }
    }

    /// Entity counts
    pub fn stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    /// Get a user
    pub fn user(&self, id: UserId) -> Option<User> {
        self.catalog.user(id)
    }

    /// Find the user holding a credential
    pub fn user_by_credential(&self, credential: &str) -> Option<User> {
        self.catalog.user_by_credential(credential)
    }

    /// Get a group
    pub fn group(&self, id: GroupId) -> Option<Group> {
        self.catalog.group(id)
    }

    /// Groups a user is a direct member of, sorted
    pub fn groups_of(&self, user: UserId) -> Vec<GroupId> {
        self.catalog.groups_of(user)
    }

    /// Members of a group, sorted
    pub fn members_of(&self, group: GroupId) -> Vec<UserId> {
        self.catalog.members_of(group)
    }

    /// Every membership pair
    pub fn memberships(&self) -> Vec<Membership> {
        self.catalog.memberships()
    }

    /// Get a file
    pub fn file(&self, id: FileId) -> Option<File> {
        self.catalog.file(id)
    }

    /// Files owned by a user, sorted by id
    pub fn files_owned_by(&self, owner: UserId) -> Vec<File> {
        self.catalog.files_owned_by(owner)
    }

    /// Get a run
    pub fn run(&self, id: RunId) -> Option<Run> {
        self.catalog.run(id)
    }

    /// Every run id, sorted
    pub fn run_ids(&self) -> Vec<RunId> {
        self.catalog.run_ids()
    }

    /// Runs owned by a user, sorted by id
    pub fn runs_owned_by(&self, owner: UserId) -> Vec<Run> {
        self.catalog.runs_owned_by(owner)
    }

    /// Runs a file is attached to, sorted
    pub fn runs_of_file(&self, file: FileId) -> Vec<RunId> {
        self.catalog.runs_of_file(file)
    }

    /// Files attached to a run, sorted
    pub fn files_of_run(&self, run: RunId) -> Vec<FileId> {
        self.catalog.files_of_run(run)
    }

    /// Every attachment
    pub fn file_runs(&self) -> Vec<FileRun> {
        self.catalog.file_runs()
    }

    /// Get an access level
    pub fn access_level(&self, id: AccessLevelId) -> Option<AccessLevel> {
        self.catalog.access_level(id)
    }

    /// All access levels, weakest first (ties by id)
    pub fn access_levels(&self) -> Vec<AccessLevel> {
        self.catalog.access_levels()
    }

    /// Get a grant
    pub fn grant(&self, id: GrantId) -> Option<PermissionGrant> {
        self.catalog.grant(id)
    }

    /// Grants on a run, sorted by id
    pub fn grants_on(&self, run: RunId) -> Vec<PermissionGrant> {
        self.catalog.grants_on(run)
    }

    /// Every grant, sorted by id
    pub fn all_grants(&self) -> Vec<PermissionGrant> {
        self.catalog.all_grants()
    }
}

impl AccessView for CatalogReader<'_> {
    fn user_exists(&self, user: UserId) -> WardenResult<bool> {
        AccessView::user_exists(self.catalog, user)
    }

    fn run(&self, run: RunId) -> WardenResult<Option<Run>> {
        AccessView::run(self.catalog, run)
    }

    fn groups_of(&self, user: UserId) -> WardenResult<Vec<GroupId>> {
        AccessView::groups_of(self.catalog, user)
    }

    fn grants_on(&self, run: RunId) -> WardenResult<Vec<PermissionGrant>> {
        AccessView::grants_on(self.catalog, run)
    }

    fn access_level(&self, level: AccessLevelId) -> WardenResult<Option<AccessLevel>> {
        AccessView::access_level(self.catalog, level)
    }

    fn access_levels(&self) -> WardenResult<Vec<AccessLevel>> {
        AccessView::access_levels(self.catalog)
    }

    fn file(&self, file: FileId) -> WardenResult<Option<File>> {
        AccessView::file(self.catalog, file)
    }

    fn runs_of_file(&self, file: FileId) -> WardenResult<Vec<RunId>> {
        AccessView::runs_of_file(self.catalog, file)
    }
}
