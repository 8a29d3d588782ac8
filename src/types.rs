//! Public types for the Warden API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Identifiers
pub use warden_core::{AccessLevelId, FileId, GrantId, GroupId, RunId, UserId};

// Entities
pub use warden_core::{AccessLevel, File, FileRun, Group, Membership, User};

// Grants
pub use warden_core::{GrantRow, PermissionGrant, Principal};

// Run types
pub use warden_core::{Run, RunStatus};

// Time
pub use warden_core::{Clock, ManualClock, SystemClock};

// Resolution outcomes
pub use warden_security::{AccessSource, EffectiveAccess, FileAccessPolicy, Resolution};

// Engine types
pub use warden_engine::{Authentication, Authenticator, EngineConfig, SessionToken, StandardLevels};
