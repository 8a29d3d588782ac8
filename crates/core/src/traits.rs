//! Seams between the catalog and its consumers
//!
//! - [`AccessView`]: read-only view of the catalog that access resolution runs against
//! - [`Clock`]: source of timestamps for runs and session tokens

use crate::error::WardenResult;
use crate::model::{AccessLevel, File, PermissionGrant};
use crate::run_types::Run;
use crate::types::{AccessLevelId, FileId, GroupId, RunId, UserId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Read-only view over the catalog
///
/// Implementations must return whole rows: a grant is either visible in full
/// or not at all. Reads must not block one another.
pub trait AccessView {
    /// Check if a user exists
    fn user_exists(&self, user: UserId) -> WardenResult<bool>;

    /// Get a run by id
    fn run(&self, run: RunId) -> WardenResult<Option<Run>>;

    /// Groups the user is a direct member of
    fn groups_of(&self, user: UserId) -> WardenResult<Vec<GroupId>>;

    /// All grants on a run
    fn grants_on(&self, run: RunId) -> WardenResult<Vec<PermissionGrant>>;

    /// Get an access level definition by id
    fn access_level(&self, level: AccessLevelId) -> WardenResult<Option<AccessLevel>>;

    /// All access level definitions
    fn access_levels(&self) -> WardenResult<Vec<AccessLevel>>;

    /// Get a file by id
    fn file(&self, file: FileId) -> WardenResult<Option<File>>;

    /// Runs a file is attached to
    fn runs_of_file(&self, file: FileId) -> WardenResult<Vec<RunId>>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and replay
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Set the clock to an absolute time
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
