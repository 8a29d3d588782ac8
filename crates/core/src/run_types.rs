//! Run lifecycle types
//!
//! ## Status Transitions
//!
//! ```text
//! pending --> running --> succeeded
//!    |           |
//!    |           +------> failed
//!    |           |
//!    +-----------+------> cancelled
//! ```
//!
//! Runs move forward only. `succeeded`, `failed` and `cancelled` are terminal:
//! every transition out of them is rejected.

use crate::error::{WardenError, WardenResult};
use crate::types::{RunId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, not yet started
    Pending,
    /// Executing
    Running,
    /// Finished normally
    Succeeded,
    /// Finished with an error
    Failed,
    /// Stopped before finishing
    Cancelled,
}

impl RunStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [RunStatus; 5] = [
        RunStatus::Pending,
        RunStatus::Running,
        RunStatus::Succeeded,
        RunStatus::Failed,
        RunStatus::Cancelled,
    ];

    /// Check if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    /// Check whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Pending, Cancelled)
                | (Running, Cancelled)
        )
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WardenError::invalid_argument(format!("unknown run status '{}'", s)))
    }
}

/// A tracked computational job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run ID
    pub id: RunId,
    /// Owning user; holds the maximum access level implicitly
    pub owner: UserId,
    /// Current status
    pub status: RunStatus,
    /// Free-form configuration payload
    pub config: serde_json::Value,
    /// When the run was created
    pub created_at: DateTime<Utc>,
    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl Run {
    /// Create a new run in `pending` status
    pub fn new(id: RunId, owner: UserId, config: serde_json::Value, now: DateTime<Utc>) -> Self {
        Run {
            id,
            owner,
            status: RunStatus::Pending,
            config,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the run to `next`, or fail with `InvalidTransition`
    ///
    /// The run is left untouched on failure.
    pub fn transition(&mut self, next: RunStatus, now: DateTime<Utc>) -> WardenResult<RunStatus> {
        if !self.status.can_transition_to(next) {
            return Err(WardenError::InvalidTransition {
                run_id: self.id,
                from: self.status,
                to: next,
            });
        }
        let previous = self.status;
        self.status = next;
        self.updated_at = now;
        Ok(previous)
    }

    /// Check if the run is owned by `user`
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}
