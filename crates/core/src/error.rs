//! Error taxonomy for the catalog and the access engine
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | NotFound | Referenced entity absent |
//! | Conflict | Uniqueness violation on write |
//! | InvalidArgument | Malformed input (e.g. a grant naming both or neither principal) |
//! | InvalidTransition | Illegal run status change |
//! | Forbidden | An action was refused after an access check |
//! | Denied | Resolution found no sufficient grant |
//!
//! `Denied` is the resolution outcome; `Forbidden` is what a gated action
//! reports when that outcome blocks it. Both stay distinct from `NotFound`
//! here so logs can tell them apart; outward-facing messages collapse them.

use crate::run_types::RunStatus;
use crate::types::{AccessLevelId, FileId, GrantId, GroupId, RunId, UserId};
use thiserror::Error;

/// Reference to a catalog entity, for error payloads and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A user
    User(UserId),
    /// A group
    Group(GroupId),
    /// A user's membership in a group
    Membership {
        /// Member
        user: UserId,
        /// Group
        group: GroupId,
    },
    /// A file
    File(FileId),
    /// A run
    Run(RunId),
    /// A file attached to a run
    FileRun {
        /// Attached file
        file: FileId,
        /// Target run
        run: RunId,
    },
    /// An access level definition
    AccessLevel(AccessLevelId),
    /// A permission grant
    Grant(GrantId),
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::User(id) => write!(f, "user {}", id),
            EntityRef::Group(id) => write!(f, "group {}", id),
            EntityRef::Membership { user, group } => {
                write!(f, "membership of user {} in group {}", user, group)
            }
            EntityRef::File(id) => write!(f, "file {}", id),
            EntityRef::Run(id) => write!(f, "run {}", id),
            EntityRef::FileRun { file, run } => write!(f, "file {} on run {}", file, run),
            EntityRef::AccessLevel(id) => write!(f, "access level {}", id),
            EntityRef::Grant(id) => write!(f, "grant {}", id),
        }
    }
}

/// Action a user attempted when refused with `Forbidden`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read run or file data
    Read,
    /// Change a run's status
    Transition,
    /// Attach a file to a run
    AttachFile,
    /// Create a permission grant
    Grant,
    /// Remove a permission grant
    Revoke,
}

impl Action {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Transition => "transition",
            Action::AttachFile => "attach a file to",
            Action::Grant => "grant access on",
            Action::Revoke => "revoke access on",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by catalog mutations, access resolution and gated actions
#[derive(Debug, Error)]
pub enum WardenError {
    /// Referenced entity does not exist
    #[error("not found: {entity}")]
    NotFound {
        /// The missing entity
        entity: EntityRef,
    },

    /// Write would violate a uniqueness invariant
    #[error("conflict on {entity}: {reason}")]
    Conflict {
        /// Entity the write collided with
        entity: EntityRef,
        /// What was duplicated
        reason: String,
    },

    /// Malformed input
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem
        message: String,
    },

    /// Illegal run status change
    #[error("invalid transition for run {run_id}: {from} -> {to}")]
    InvalidTransition {
        /// Run being transitioned
        run_id: RunId,
        /// Current status
        from: RunStatus,
        /// Requested status
        to: RunStatus,
    },

    /// Action refused because the actor lacks access
    #[error("forbidden: user {actor} may not {action} {entity}")]
    Forbidden {
        /// Acting user
        actor: UserId,
        /// What they tried
        action: Action,
        /// Target of the action
        entity: EntityRef,
    },

    /// Resolution found no sufficient grant
    #[error("access denied: user {principal} on run {run_id}")]
    Denied {
        /// Resolved principal
        principal: UserId,
        /// Target run
        run_id: RunId,
    },

    /// Configuration could not be loaded or is incomplete
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Snapshot (de)serialization failed
    #[error("serialization error: {message}")]
    Serialization {
        /// Underlying error message
        message: String,
    },

    /// I/O failure in the persistence layer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing store failure
    #[error("storage error: {message}")]
    Storage {
        /// Underlying error message
        message: String,
    },
}

/// Result type for catalog and engine operations
pub type WardenResult<T> = std::result::Result<T, WardenError>;

impl WardenError {
    /// Entity-not-found error
    pub fn not_found(entity: EntityRef) -> Self {
        WardenError::NotFound { entity }
    }

    /// Uniqueness conflict
    pub fn conflict(entity: EntityRef, reason: impl Into<String>) -> Self {
        WardenError::Conflict {
            entity,
            reason: reason.into(),
        }
    }

    /// Malformed input
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        WardenError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Action refused after an access check
    pub fn forbidden(actor: UserId, action: Action, entity: EntityRef) -> Self {
        WardenError::Forbidden {
            actor,
            action,
            entity,
        }
    }

    /// Configuration problem
    pub fn config(message: impl Into<String>) -> Self {
        WardenError::Config {
            message: message.into(),
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, WardenError::NotFound { .. })
    }

    /// Check if this is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, WardenError::Conflict { .. })
    }

    /// Check if this is an authorization failure (`Forbidden` or `Denied`)
    pub fn is_authorization(&self) -> bool {
        matches!(self, WardenError::Forbidden { .. } | WardenError::Denied { .. })
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(e: serde_json::Error) -> Self {
        WardenError::Serialization {
            message: e.to_string(),
        }
    }
}
