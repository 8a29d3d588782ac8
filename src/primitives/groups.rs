//! Group provisioning and membership.

use crate::error::Result;
use crate::types::{Group, GroupId, UserId};
use std::sync::Arc;

/// Group operations.
///
/// Access via `db.groups`.
pub struct Groups {
    db: Arc<warden_engine::Database>,
}

impl Groups {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        Self { db }
    }

    /// Create a group.
    pub fn create(&self, name: &str, realm: &str) -> Result<Group> {
        Ok(self.db.create_group(name, realm)?)
    }

    /// Create a group with a specific ID.
    pub fn create_with_id(&self, id: GroupId, name: &str, realm: &str) -> Result<Group> {
        Ok(self.db.create_group_with_id(id, name, realm)?)
    }

    /// Get a group.
    pub fn get(&self, id: GroupId) -> Option<Group> {
        self.db.catalog().group(id)
    }

    /// Add a user to a group.
    ///
    /// Fails with `Conflict` if the user is already a member.
    pub fn add_member(&self, group: GroupId, user: UserId) -> Result<()> {
        Ok(self.db.add_membership(user, group)?)
    }

    /// Remove a user from a group.
    pub fn remove_member(&self, group: GroupId, user: UserId) -> Result<()> {
        Ok(self.db.remove_membership(user, group)?)
    }

    /// Members of a group.
    pub fn members(&self, group: GroupId) -> Vec<UserId> {
        self.db.catalog().members_of(group)
    }
}
