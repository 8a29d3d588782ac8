//! Group-membership expansion
//!
//! The step that turns a user into the set of groups whose grants apply to
//! them. Kept behind a trait so that nested groups (which would need a
//! cycle-safe transitive closure) can be added without touching the
//! comparison and decision logic in the resolver.

use std::collections::BTreeSet;
use warden_core::{AccessView, GroupId, UserId, WardenResult};

/// Computes the groups a user acts through
pub trait GroupExpansion: Send + Sync {
    /// Groups whose grants apply to `user`
    fn expand<V: AccessView + ?Sized>(&self, view: &V, user: UserId)
        -> WardenResult<BTreeSet<GroupId>>;
}

/// One-level expansion: the user's direct memberships
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectMembership;

impl GroupExpansion for DirectMembership {
    fn expand<V: AccessView + ?Sized>(
        &self,
        view: &V,
        user: UserId,
    ) -> WardenResult<BTreeSet<GroupId>> {
        Ok(view.groups_of(user)?.into_iter().collect())
    }
}
