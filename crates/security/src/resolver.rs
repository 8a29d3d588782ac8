//! Access resolution
//!
//! ## Algorithm
//!
//! ```text
//! 1. run owner == principal      -> maximum defined level (short-circuit)
//! 2. groups = expand(principal)
//! 3. applicable = grants on run naming principal or any group in groups
//! 4. winner = highest level_value; ties -> lowest GrantId
//! 5. no winner                   -> Denied
//! ```
//!
//! Unknown run or user ids are `NotFound`; every other negative outcome is
//! `Denied`, never an error. Resolution only reads the view and has no side
//! effects, so any number of resolutions may run in parallel.

use crate::membership::{DirectMembership, GroupExpansion};
use crate::resolution::{AccessSource, EffectiveAccess, Resolution};
use crate::{AccessOptions, FileAccessPolicy};
use std::cmp::Ordering;
use tracing::{trace, warn};
use warden_core::{
    AccessLevel, AccessLevelId, AccessView, EntityRef, FileId, GrantId, Principal, RunId, UserId,
    WardenError, WardenResult,
};

/// The access resolution engine
#[derive(Debug, Clone)]
pub struct AccessResolver<E = DirectMembership> {
    options: AccessOptions,
    expansion: E,
}

impl AccessResolver<DirectMembership> {
    /// Create a resolver with one-level group expansion
    pub fn new(options: AccessOptions) -> Self {
        Self::with_expansion(options, DirectMembership)
    }
}

impl<E: GroupExpansion> AccessResolver<E> {
    /// Create a resolver with a custom group expansion step
    pub fn with_expansion(options: AccessOptions, expansion: E) -> Self {
        Self { options, expansion }
    }

    /// Resolver options
    pub fn options(&self) -> &AccessOptions {
        &self.options
    }

    /// Resolve `principal`'s effective access to `run_id`
    pub fn resolve<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        run_id: RunId,
    ) -> WardenResult<Resolution> {
        let run = view
            .run(run_id)?
            .ok_or_else(|| WardenError::not_found(EntityRef::Run(run_id)))?;
        if !view.user_exists(principal)? {
            return Err(WardenError::not_found(EntityRef::User(principal)));
        }

        if run.is_owned_by(principal) {
            trace!(user_id = %principal, run_id = %run_id, "owner short-circuit");
            return Ok(Resolution::Granted(EffectiveAccess {
                level: maximum_level(view)?,
                source: AccessSource::Owner,
            }));
        }

        let groups = self.expansion.expand(view, principal)?;

        let mut best: Option<(AccessLevel, GrantId, AccessSource)> = None;
        for grant in view.grants_on(run_id)? {
            let source = match grant.principal {
                Principal::User(user) if user == principal => {
                    AccessSource::Direct { grant: grant.id }
                }
                Principal::Group(group) if groups.contains(&group) => AccessSource::Group {
                    group,
                    grant: grant.id,
                },
                _ => continue,
            };
            let Some(level) = view.access_level(grant.level)? else {
                warn!(grant_id = %grant.id, level_id = %grant.level, "grant references unknown access level");
                continue;
            };
            let stronger = match &best {
                None => true,
                Some((current, current_id, _)) => {
                    outranks(&level, grant.id, current, *current_id) == Ordering::Greater
                }
            };
            if stronger {
                best = Some((level, grant.id, source));
            }
        }

        let resolution = match best {
            Some((level, _, source)) => Resolution::Granted(EffectiveAccess { level, source }),
            None => Resolution::Denied,
        };
        trace!(
            user_id = %principal,
            run_id = %run_id,
            groups = groups.len(),
            level = ?resolution.level_value(),
            "resolved access"
        );
        Ok(resolution)
    }

    /// Check whether `principal` holds at least `required` on `run_id`
    ///
    /// Fails with `NotFound` if `required` is not a defined level.
    pub fn check<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        run_id: RunId,
        required: AccessLevelId,
    ) -> WardenResult<bool> {
        let required = required_level(view, required)?;
        self.check_value(view, principal, run_id, required.level_value)
    }

    /// Check whether `principal` resolves to at least `min_value` on `run_id`
    pub fn check_value<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        run_id: RunId,
        min_value: i64,
    ) -> WardenResult<bool> {
        Ok(self.resolve(view, principal, run_id)?.satisfies(min_value))
    }

    /// Like [`check_value`](Self::check_value), but returns the effective
    /// access or a `Denied` error
    pub fn require<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        run_id: RunId,
        min_value: i64,
    ) -> WardenResult<EffectiveAccess> {
        match self.resolve(view, principal, run_id)? {
            Resolution::Granted(access) if access.level.level_value >= min_value => Ok(access),
            _ => Err(WardenError::Denied {
                principal,
                run_id,
            }),
        }
    }

    /// Resolve `principal`'s effective access to a file
    ///
    /// The file's owner holds the maximum level. Otherwise, under
    /// [`FileAccessPolicy::AnyRun`] the result is the strongest resolution
    /// across attached runs; under [`FileAccessPolicy::AllRuns`] it is the
    /// weakest, and any denied run (or no attached run at all) denies.
    pub fn resolve_file<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        file_id: FileId,
    ) -> WardenResult<Resolution> {
        let file = view
            .file(file_id)?
            .ok_or_else(|| WardenError::not_found(EntityRef::File(file_id)))?;
        if !view.user_exists(principal)? {
            return Err(WardenError::not_found(EntityRef::User(principal)));
        }
        if file.owner == principal {
            return Ok(Resolution::Granted(EffectiveAccess {
                level: maximum_level(view)?,
                source: AccessSource::Owner,
            }));
        }

        let runs = view.runs_of_file(file_id)?;
        let mut combined: Option<EffectiveAccess> = None;
        for run_id in runs {
            let resolution = match self.resolve(view, principal, run_id) {
                Ok(r) => r,
                // An attachment to a run that vanished grants nothing
                Err(WardenError::NotFound {
                    entity: EntityRef::Run(_),
                }) => Resolution::Denied,
                Err(e) => return Err(e),
            };
            match (self.options.file_policy, resolution) {
                (FileAccessPolicy::AnyRun, Resolution::Denied) => {}
                (FileAccessPolicy::AllRuns, Resolution::Denied) => return Ok(Resolution::Denied),
                (policy, Resolution::Granted(access)) => {
                    let replace = match &combined {
                        None => true,
                        Some(current) => {
                            let cmp = access.level.level_value.cmp(&current.level.level_value);
                            match policy {
                                FileAccessPolicy::AnyRun => cmp == Ordering::Greater,
                                FileAccessPolicy::AllRuns => cmp == Ordering::Less,
                            }
                        }
                    };
                    if replace {
                        combined = Some(access);
                    }
                }
            }
        }

        Ok(combined.map_or(Resolution::Denied, Resolution::Granted))
    }

    /// Check whether `principal` may act on a file at `required`
    pub fn check_file<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        file_id: FileId,
        required: AccessLevelId,
    ) -> WardenResult<bool> {
        let required = required_level(view, required)?;
        self.check_file_value(view, principal, file_id, required.level_value)
    }

    /// Check whether `principal` may act on a file at `min_value`
    pub fn check_file_value<V: AccessView + ?Sized>(
        &self,
        view: &V,
        principal: UserId,
        file_id: FileId,
        min_value: i64,
    ) -> WardenResult<bool> {
        Ok(self
            .resolve_file(view, principal, file_id)?
            .satisfies(min_value))
    }
}

/// The strongest defined level (ties to the lowest id), or the implicit
/// owner level if none are defined
pub fn maximum_level<V: AccessView + ?Sized>(view: &V) -> WardenResult<AccessLevel> {
    Ok(view
        .access_levels()?
        .into_iter()
        .max_by(|a, b| {
            a.level_value
                .cmp(&b.level_value)
                .then_with(|| b.id.cmp(&a.id))
        })
        .unwrap_or_else(AccessLevel::implicit_owner))
}

fn required_level<V: AccessView + ?Sized>(
    view: &V,
    required: AccessLevelId,
) -> WardenResult<AccessLevel> {
    view.access_level(required)?
        .ok_or_else(|| WardenError::not_found(EntityRef::AccessLevel(required)))
}

/// Grant precedence: higher value first, then lower grant id
fn outranks(level: &AccessLevel, id: GrantId, other: &AccessLevel, other_id: GrantId) -> Ordering {
    level
        .level_value
        .cmp(&other.level_value)
        .then_with(|| other_id.cmp(&id))
}
