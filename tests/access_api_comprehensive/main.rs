//! Access API Comprehensive Test Suite
//!
//! Exercises the public `Warden` facade end to end.
//!
//! ## Key Verification Points
//!
//! 1. Owners hold the strongest level; everyone else needs a grant
//! 2. Group grants are inherited; the strongest applicable grant wins
//! 3. Run status changes are gated and move forward only
//! 4. File access follows the configured policy
//! 5. Snapshots survive a reopen
//! 6. Concurrent checks and mutations never observe partial state
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test access_api_comprehensive
//!
//! # Run lifecycle tests only
//! cargo test --test access_api_comprehensive lifecycle::
//! ```

use warden::prelude::*;
use warden::StandardLevels;

pub mod files;
pub mod grants;
pub mod lifecycle;
pub mod resolution;
pub mod scenarios;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a test log subscriber (idempotent)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
        .try_init();
}

/// An ephemeral database with standard levels seeded
pub struct TestDb {
    pub db: Warden,
    pub levels: StandardLevels,
}

/// Create an ephemeral database under the given file policy
pub fn create_db(policy: FileAccessPolicy) -> TestDb {
    init_tracing();
    let db = Warden::ephemeral(policy).expect("failed to open ephemeral database");
    let levels = db.levels.seed_standard().expect("failed to seed levels");
    TestDb { db, levels }
}

/// Create an ephemeral database with the any-run policy
pub fn create_test_db() -> TestDb {
    create_db(FileAccessPolicy::AnyRun)
}

impl TestDb {
    /// Create a user whose credential is derived from the name
    pub fn user(&self, name: &str) -> UserId {
        self.db
            .users
            .create(name, "lab.example", &format!("cred-{}", name))
            .expect("failed to create user")
            .id
    }

    /// Create a group with the given members
    pub fn group(&self, name: &str, members: &[UserId]) -> GroupId {
        let group = self
            .db
            .groups
            .create(name, "lab.example")
            .expect("failed to create group")
            .id;
        for &m in members {
            self.db.groups.add_member(group, m).expect("failed to add member");
        }
        group
    }

    /// Create a pending run
    pub fn run(&self, owner: UserId) -> RunId {
        self.db
            .runs
            .create(owner, json!({"pipeline": "test"}))
            .expect("failed to create run")
            .id
    }

    /// Grant a level to a user
    pub fn grant_user(&self, run: RunId, level: AccessLevelId, user: UserId) -> GrantId {
        self.db
            .grants
            .grant(run, level, Principal::User(user))
            .expect("failed to grant")
            .id
    }

    /// Grant a level to a group
    pub fn grant_group(&self, run: RunId, level: AccessLevelId, group: GroupId) -> GrantId {
        self.db
            .grants
            .grant(run, level, Principal::Group(group))
            .expect("failed to grant")
            .id
    }

    /// Resolved level value, or `None` when denied
    pub fn level_of(&self, user: UserId, run: RunId) -> Option<i64> {
        self.db
            .access
            .resolve(user, run)
            .expect("resolution failed")
            .level_value()
    }
}
