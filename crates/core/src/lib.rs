//! Core types for Warden
//!
//! This crate defines the data model shared by every other crate:
//! - [`types`]: opaque UUID identifiers for every entity
//! - [`model`]: users, groups, files, access levels, grants
//! - [`run_types`]: runs and their forward-only status machine
//! - [`error`]: the error taxonomy
//! - [`traits`]: the catalog read view and the clock

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod model;
pub mod run_types;
pub mod traits;
pub mod types;

pub use error::{Action, EntityRef, WardenError, WardenResult};
pub use model::{
    AccessLevel, File, FileRun, GrantRow, Group, Membership, PermissionGrant, Principal, User,
};
pub use run_types::{Run, RunStatus};
pub use traits::{AccessView, Clock, ManualClock, SystemClock};
pub use types::{AccessLevelId, FileId, GrantId, GroupId, RunId, UserId};
