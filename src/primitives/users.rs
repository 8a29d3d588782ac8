//! User provisioning and lookups.

use crate::error::Result;
use crate::types::{File, GroupId, Run, User, UserId};
use std::sync::Arc;

/// User operations.
///
/// Access via `db.users`.
pub struct Users {
    db: Arc<warden_engine::Database>,
}

impl Users {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        Self { db }
    }

    /// Create a user.
    ///
    /// The credential must be unique across users.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let ada = db.users.create("Ada", "lab.example", "cred-ada")?;
    /// ```
    pub fn create(&self, name: &str, realm: &str, credential: &str) -> Result<User> {
        Ok(self.db.create_user(name, realm, credential)?)
    }

    /// Create a user with a specific ID.
    pub fn create_with_id(&self, id: UserId, name: &str, realm: &str, credential: &str) -> Result<User> {
        Ok(self.db.create_user_with_id(id, name, realm, credential)?)
    }

    /// Get a user.
    pub fn get(&self, id: UserId) -> Option<User> {
        self.db.catalog().user(id)
    }

    /// Find the user holding a credential.
    pub fn by_credential(&self, credential: &str) -> Option<User> {
        self.db.catalog().user_by_credential(credential)
    }

    /// Groups the user belongs to.
    pub fn groups(&self, id: UserId) -> Vec<GroupId> {
        self.db.catalog().groups_of(id)
    }

    /// Files the user owns.
    pub fn files(&self, id: UserId) -> Vec<File> {
        self.db.catalog().files_owned_by(id)
    }

    /// Runs the user owns.
    pub fn runs(&self, id: UserId) -> Vec<Run> {
        self.db.catalog().runs_owned_by(id)
    }
}
