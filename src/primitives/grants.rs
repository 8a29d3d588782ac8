//! Permission grants.
//!
//! A grant gives one principal (a user or a group) at least one access level
//! on one run. The same (run, level, principal) may be granted only once.

use crate::error::Result;
use crate::types::{AccessLevelId, GrantId, GrantRow, PermissionGrant, Principal, RunId, UserId};
use std::sync::Arc;
use warden_engine::RunLifecycle;

/// Grant operations.
///
/// Access via `db.grants`.
pub struct Grants {
    db: Arc<warden_engine::Database>,
    lifecycle: RunLifecycle,
}

impl Grants {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        let lifecycle = RunLifecycle::new(db.clone());
        Self { db, lifecycle }
    }

    /// Grant a level on a run (provisioning, no access check).
    ///
    /// # Example
    ///
    /// ```ignore
    /// db.grants.grant(run.id, levels.write.id, Principal::User(bob.id))?;
    /// db.grants.grant(run.id, levels.read.id, Principal::Group(team.id))?;
    /// ```
    pub fn grant(&self, run: RunId, level: AccessLevelId, principal: Principal) -> Result<PermissionGrant> {
        Ok(self.db.grant_permission(run, level, principal)?)
    }

    /// Grant with a specific ID.
    pub fn grant_with_id(
        &self,
        id: GrantId,
        run: RunId,
        level: AccessLevelId,
        principal: Principal,
    ) -> Result<PermissionGrant> {
        Ok(self.db.grant_permission_with_id(id, run, level, principal)?)
    }

    /// Grant from a row with separate user and group columns.
    ///
    /// Fails with `InvalidArgument` unless exactly one column is set.
    pub fn grant_row(&self, row: GrantRow) -> Result<PermissionGrant> {
        Ok(self.db.grant_permission_row(row)?)
    }

    /// Revoke a grant (provisioning, no access check).
    pub fn revoke(&self, id: GrantId) -> Result<PermissionGrant> {
        Ok(self.db.revoke_permission(id)?)
    }

    /// Grant on behalf of `actor`.
    ///
    /// The actor must own the run or hold the administration threshold, and
    /// may not grant above their own level.
    pub fn grant_as(
        &self,
        actor: UserId,
        run: RunId,
        level: AccessLevelId,
        principal: Principal,
    ) -> Result<PermissionGrant> {
        Ok(self.lifecycle.grant_as(actor, run, level, principal)?)
    }

    /// Revoke on behalf of `actor`.
    pub fn revoke_as(&self, actor: UserId, id: GrantId) -> Result<PermissionGrant> {
        Ok(self.lifecycle.revoke_as(actor, id)?)
    }

    /// Get a grant.
    pub fn get(&self, id: GrantId) -> Option<PermissionGrant> {
        self.db.catalog().grant(id)
    }

    /// Grants on a run (no access check).
    pub fn on_run(&self, run: RunId) -> Vec<PermissionGrant> {
        self.db.catalog().grants_on(run)
    }

    /// Grants on a run, on behalf of `actor`.
    pub fn on_run_as(&self, actor: UserId, run: RunId) -> Result<Vec<PermissionGrant>> {
        Ok(self.lifecycle.grants_on_as(actor, run)?)
    }
}
