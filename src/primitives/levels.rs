//! Access level definitions.

use crate::error::Result;
use crate::types::{AccessLevel, AccessLevelId, StandardLevels};
use std::sync::Arc;

/// Access level operations.
///
/// Access via `db.levels`.
pub struct Levels {
    db: Arc<warden_engine::Database>,
}

impl Levels {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        Self { db }
    }

    /// Define a level. Higher values are more privileged.
    pub fn create(&self, description: &str, level_value: i64) -> Result<AccessLevel> {
        Ok(self.db.create_access_level(description, level_value)?)
    }

    /// Define a level with a specific ID.
    pub fn create_with_id(
        &self,
        id: AccessLevelId,
        description: &str,
        level_value: i64,
    ) -> Result<AccessLevel> {
        Ok(self.db.create_access_level_with_id(id, description, level_value)?)
    }

    /// Ensure `read` (10), `write` (20) and `admin` (30) exist.
    pub fn seed_standard(&self) -> Result<StandardLevels> {
        Ok(self.db.seed_standard_levels()?)
    }

    /// Get a level.
    pub fn get(&self, id: AccessLevelId) -> Option<AccessLevel> {
        self.db.catalog().access_level(id)
    }

    /// All levels, weakest first.
    pub fn list(&self) -> Vec<AccessLevel> {
        self.db.catalog().access_levels()
    }

    /// The strongest defined level, if any.
    pub fn strongest(&self) -> Option<AccessLevel> {
        self.list().into_iter().max_by(|a, b| {
            a.level_value
                .cmp(&b.level_value)
                .then_with(|| b.id.cmp(&a.id))
        })
    }
}
