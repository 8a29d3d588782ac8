//! Access control for Warden.
//!
//! This crate is the access resolution engine. Given a user and a run it
//! computes the user's effective access level by combining:
//!
//! 1. ownership (owners hold the maximum defined level, no lookup needed)
//! 2. direct user grants on the run
//! 3. grants to any group the user belongs to
//!
//! The strongest applicable grant wins; absence of any grant is a denial.
//! File access is derived from access to the runs the file is attached to,
//! under an explicit [`FileAccessPolicy`].
//!
//! ```ignore
//! use warden_security::{AccessOptions, AccessResolver, FileAccessPolicy};
//!
//! let resolver = AccessResolver::new(AccessOptions::new(FileAccessPolicy::AnyRun));
//! let resolution = resolver.resolve(&catalog, user, run)?;
//! ```

#![warn(missing_docs)]

pub mod membership;
pub mod resolution;
pub mod resolver;

pub use membership::{DirectMembership, GroupExpansion};
pub use resolution::{AccessSource, EffectiveAccess, Resolution};
pub use resolver::{maximum_level, AccessResolver};

use serde::{Deserialize, Serialize};

/// How access to a file follows from access to its runs
///
/// A file's owner always has access to it; the policy decides for everyone
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAccessPolicy {
    /// Access at level L on at least one attached run
    AnyRun,
    /// Access at level L on every attached run; unattached files are denied
    AllRuns,
}

impl FileAccessPolicy {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FileAccessPolicy::AnyRun => "any_run",
            FileAccessPolicy::AllRuns => "all_runs",
        }
    }
}

/// Options for the access resolver.
///
/// The file policy has no default and must be chosen explicitly:
///
/// ```ignore
/// use warden_security::{AccessOptions, FileAccessPolicy};
///
/// let opts = AccessOptions::new(FileAccessPolicy::AllRuns);
/// ```
#[derive(Debug, Clone)]
pub struct AccessOptions {
    /// File access derivation rule
    pub file_policy: FileAccessPolicy,
}

impl AccessOptions {
    /// Create options with the given file policy
    pub fn new(file_policy: FileAccessPolicy) -> Self {
        Self { file_policy }
    }

    /// Replace the file policy
    pub fn file_policy(mut self, policy: FileAccessPolicy) -> Self {
        self.file_policy = policy;
        self
    }
}
