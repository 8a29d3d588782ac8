//! Run/file lifecycle manager
//!
//! Every operation here is performed on behalf of an actor and is gated by
//! the actor's resolved access:
//!
//! | Operation | Requirement |
//! |-----------|-------------|
//! | status transition | write threshold on the run |
//! | attach file | owns the file, write threshold on the run |
//! | grant / revoke | run owner, or admin threshold; never above own level |
//! | read run / files / grants | read threshold on the run |
//! | read file | read threshold on the file (file policy) |
//!
//! Thresholds are catalog levels looked up by the configured names on each
//! check, so they follow the level values the catalog actually holds. The
//! owner passes every gate. A threshold naming no defined level admits only
//! the owner.
//!
//! A failed gate is `Forbidden` and leaves state untouched. Gate and
//! mutation run under the run's lock, so a concurrent revoke cannot land
//! between the check and the change it authorizes.

use crate::database::Database;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_core::{
    AccessLevel, AccessLevelId, Action, EntityRef, File, FileId, GrantId, PermissionGrant, Principal, Run,
    RunId, RunStatus, UserId, WardenError, WardenResult,
};
use warden_security::{AccessSource, Resolution};

/// Actor-gated operations on runs and files
#[derive(Debug, Clone)]
pub struct RunLifecycle {
    db: Arc<Database>,
}

impl RunLifecycle {
    /// Create a lifecycle manager over a shared database
    pub fn new(db: Arc<Database>) -> Self {
        RunLifecycle { db }
    }

    /// The shared database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Move `run` to `next` on behalf of `actor`
    ///
    /// `Forbidden` below the write threshold, `InvalidTransition` if the
    /// status machine does not allow the move.
    pub fn transition(&self, actor: UserId, run: RunId, next: RunStatus) -> WardenResult<Run> {
        let lock = self.db.run_lock(run)?;
        let _guard = lock.lock();

        let resolution = self.db.resolve_access(actor, run)?;
        self.gate(
            actor,
            &resolution,
            self.db.write_threshold().as_ref(),
            Action::Transition,
            EntityRef::Run(run),
        )?;

        let now = self.db.clock().now();
        self.db.store().transition_run(run, next, now)
    }

    /// `pending -> running`
    pub fn start(&self, actor: UserId, run: RunId) -> WardenResult<Run> {
        self.transition(actor, run, RunStatus::Running)
    }

    /// `running -> succeeded`
    pub fn succeed(&self, actor: UserId, run: RunId) -> WardenResult<Run> {
        self.transition(actor, run, RunStatus::Succeeded)
    }

    /// `running -> failed`
    pub fn fail(&self, actor: UserId, run: RunId) -> WardenResult<Run> {
        self.transition(actor, run, RunStatus::Failed)
    }

    /// `pending | running -> cancelled`
    pub fn cancel(&self, actor: UserId, run: RunId) -> WardenResult<Run> {
        self.transition(actor, run, RunStatus::Cancelled)
    }

    /// Attach `file` to `run` on behalf of `actor`
    pub fn attach_file(&self, actor: UserId, file: FileId, run: RunId) -> WardenResult<()> {
        let file_row = self
            .db
            .catalog()
            .file(file)
            .ok_or_else(|| WardenError::not_found(EntityRef::File(file)))?;

        let lock = self.db.run_lock(run)?;
        let _guard = lock.lock();

        let resolution = self.db.resolve_access(actor, run)?;
        if file_row.owner != actor {
            warn!(user_id = %actor, file_id = %file, "attach refused: not the file owner");
            return Err(WardenError::forbidden(
                actor,
                Action::AttachFile,
                EntityRef::File(file),
            ));
        }
        self.gate(
            actor,
            &resolution,
            self.db.write_threshold().as_ref(),
            Action::AttachFile,
            EntityRef::Run(run),
        )?;

        self.db.store().attach_file_to_run(file, run)?;
        debug!(user_id = %actor, file_id = %file, run_id = %run, "attached file");
        Ok(())
    }

    /// Grant `level` on `run` to `principal` on behalf of `actor`
    pub fn grant_as(
        &self,
        actor: UserId,
        run: RunId,
        level: AccessLevelId,
        principal: Principal,
    ) -> WardenResult<PermissionGrant> {
        let lock = self.db.run_lock(run)?;
        let _guard = lock.lock();

        let level_row = self
            .db
            .catalog()
            .access_level(level)
            .ok_or_else(|| WardenError::not_found(EntityRef::AccessLevel(level)))?;
        self.authorize_admin(actor, run, Action::Grant, Some(&level_row))?;

        let grant = PermissionGrant {
            id: GrantId::new(),
            run,
            level,
            principal,
        };
        self.db.store().grant_permission(grant)?;
        debug!(user_id = %actor, grant_id = %grant.id, run_id = %run, "granted on behalf of actor");
        Ok(grant)
    }

    /// Revoke a grant on behalf of `actor`
    pub fn revoke_as(&self, actor: UserId, grant: GrantId) -> WardenResult<PermissionGrant> {
        let run = self
            .db
            .catalog()
            .grant(grant)
            .ok_or_else(|| WardenError::not_found(EntityRef::Grant(grant)))?
            .run;

        let lock = self.db.run_lock(run)?;
        let _guard = lock.lock();

        // Re-read under the lock; a concurrent revoke may have won
        let row = self
            .db
            .catalog()
            .grant(grant)
            .ok_or_else(|| WardenError::not_found(EntityRef::Grant(grant)))?;
        // A grant whose level is gone can only be revoked by the owner
        let level = self.db.catalog().access_level(row.level);
        self.authorize_admin(actor, run, Action::Revoke, level.as_ref())?;

        let revoked = self.db.store().revoke_permission(grant)?;
        debug!(user_id = %actor, grant_id = %grant, run_id = %run, "revoked on behalf of actor");
        Ok(revoked)
    }

    /// Read a run on behalf of `actor`
    pub fn run_as(&self, actor: UserId, run: RunId) -> WardenResult<Run> {
        self.require_read(actor, run)?;
        self.db
            .catalog()
            .run(run)
            .ok_or_else(|| WardenError::not_found(EntityRef::Run(run)))
    }

    /// Files attached to a run, on behalf of `actor`
    pub fn files_of_run_as(&self, actor: UserId, run: RunId) -> WardenResult<Vec<File>> {
        self.require_read(actor, run)?;
        let catalog = self.db.catalog();
        Ok(catalog
            .files_of_run(run)
            .into_iter()
            .filter_map(|id| catalog.file(id))
            .collect())
    }

    /// Grants on a run, on behalf of `actor`
    pub fn grants_on_as(&self, actor: UserId, run: RunId) -> WardenResult<Vec<PermissionGrant>> {
        self.require_read(actor, run)?;
        Ok(self.db.catalog().grants_on(run))
    }

    /// Read a file on behalf of `actor`
    pub fn file_as(&self, actor: UserId, file: FileId) -> WardenResult<File> {
        let resolution = self.db.resolve_file_access(actor, file)?;
        self.gate(
            actor,
            &resolution,
            self.db.read_threshold().as_ref(),
            Action::Read,
            EntityRef::File(file),
        )?;
        self.db
            .catalog()
            .file(file)
            .ok_or_else(|| WardenError::not_found(EntityRef::File(file)))
    }

    fn require_read(&self, actor: UserId, run: RunId) -> WardenResult<()> {
        let resolution = self.db.resolve_access(actor, run)?;
        self.gate(
            actor,
            &resolution,
            self.db.read_threshold().as_ref(),
            Action::Read,
            EntityRef::Run(run),
        )
    }

    /// Owner, or admin threshold and not above the actor's own level
    fn authorize_admin(
        &self,
        actor: UserId,
        run: RunId,
        action: Action,
        target: Option<&AccessLevel>,
    ) -> WardenResult<()> {
        let resolution = self.db.resolve_access(actor, run)?;
        self.gate(
            actor,
            &resolution,
            self.db.admin_threshold()?.as_ref(),
            action,
            EntityRef::Run(run),
        )?;
        self.gate(actor, &resolution, target, action, EntityRef::Run(run))
    }

    fn gate(
        &self,
        actor: UserId,
        resolution: &Resolution,
        required: Option<&AccessLevel>,
        action: Action,
        entity: EntityRef,
    ) -> WardenResult<()> {
        if resolution.source() == Some(AccessSource::Owner) {
            return Ok(());
        }
        if let Some(level) = required {
            if resolution.satisfies(level.level_value) {
                return Ok(());
            }
        }
        warn!(
            user_id = %actor,
            action = action.as_str(),
            entity = %entity,
            required = ?required.map(|l| l.level_value),
            held = ?resolution.level_value(),
            "forbidden"
        );
        Err(WardenError::forbidden(actor, action, entity))
    }
}
