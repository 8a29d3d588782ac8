//! Catalog entities
//!
//! Plain data: invariants between entities (owners exist, memberships are
//! unique, ...) are enforced by the store, not by these types. The one
//! invariant encoded here by construction is that a grant targets exactly one
//! principal: [`Principal`] is a sum type, and rows carrying two nullable
//! principal columns ([`GrantRow`]) are checked on conversion.

use crate::error::{WardenError, WardenResult};
use crate::types::{AccessLevelId, FileId, GrantId, GroupId, RunId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login realm the user originates from
    pub realm: String,
    /// Opaque credential issued by provisioning; unique across users
    pub credential: String,
}

/// A named set of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID
    pub id: GroupId,
    /// Group name
    pub name: String,
    /// Login realm the group originates from
    pub realm: String,
}

/// A user's membership in a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    /// Member
    pub user: UserId,
    /// Group
    pub group: GroupId,
}

/// An uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// File ID
    pub id: FileId,
    /// File name
    pub name: String,
    /// Owning user
    pub owner: UserId,
}

/// A file attached to a run (as input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRun {
    /// Attached file
    pub file: FileId,
    /// Run it is attached to
    pub run: RunId,
}

/// A point on the privilege scale
///
/// Higher `level_value` means more privileged. Values need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessLevel {
    /// Level ID
    pub id: AccessLevelId,
    /// Human-readable description ("read", "write", ...)
    pub description: String,
    /// Strength of the level; compared numerically
    pub level_value: i64,
}

impl AccessLevel {
    /// Create an access level definition
    pub fn new(id: AccessLevelId, description: impl Into<String>, level_value: i64) -> Self {
        AccessLevel {
            id,
            description: description.into(),
            level_value,
        }
    }

    /// Level held by a run owner when no levels are defined at all
    ///
    /// Uses the nil id and the maximum value so it satisfies any threshold.
    pub fn implicit_owner() -> Self {
        AccessLevel {
            id: AccessLevelId::from_uuid(Uuid::nil()),
            description: "owner".to_string(),
            level_value: i64::MAX,
        }
    }

    /// Check if this level is at least as strong as `other`
    pub fn satisfies(&self, other: &AccessLevel) -> bool {
        self.level_value >= other.level_value
    }
}

/// The subject of a permission grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
    /// A single user
    User(UserId),
    /// Every member of a group
    Group(GroupId),
}

impl Principal {
    /// Build a principal from two nullable columns
    ///
    /// Exactly one of `user`/`group` must be set.
    pub fn from_parts(user: Option<UserId>, group: Option<GroupId>) -> WardenResult<Self> {
        match (user, group) {
            (Some(user), None) => Ok(Principal::User(user)),
            (None, Some(group)) => Ok(Principal::Group(group)),
            (Some(_), Some(_)) => Err(WardenError::invalid_argument(
                "grant must target a user or a group, not both",
            )),
            (None, None) => Err(WardenError::invalid_argument(
                "grant must target either a user or a group",
            )),
        }
    }

    /// Get the user id, if this principal is a user
    pub fn user(&self) -> Option<UserId> {
        match self {
            Principal::User(id) => Some(*id),
            Principal::Group(_) => None,
        }
    }

    /// Get the group id, if this principal is a group
    pub fn group(&self) -> Option<GroupId> {
        match self {
            Principal::Group(id) => Some(*id),
            Principal::User(_) => None,
        }
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::User(id) => write!(f, "user {}", id),
            Principal::Group(id) => write!(f, "group {}", id),
        }
    }
}

/// "This principal has at least this level on this run"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Grant ID
    pub id: GrantId,
    /// Run the grant applies to
    pub run: RunId,
    /// Level granted
    pub level: AccessLevelId,
    /// Who holds it
    pub principal: Principal,
}

impl PermissionGrant {
    /// Check if two grants give the same principal the same level on the same run
    pub fn same_terms(&self, other: &PermissionGrant) -> bool {
        self.run == other.run && self.level == other.level && self.principal == other.principal
    }
}

/// Grant in its flat, two-nullable-column shape
///
/// This is how grants arrive from external persistence or request payloads.
/// Convert with `TryFrom` before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRow {
    /// Grant ID; a fresh one is assigned when absent
    #[serde(default)]
    pub id: Option<GrantId>,
    /// Run the grant applies to
    pub run: RunId,
    /// Level granted
    pub level: AccessLevelId,
    /// Grantee user, if any
    #[serde(default)]
    pub user: Option<UserId>,
    /// Grantee group, if any
    #[serde(default)]
    pub group: Option<GroupId>,
}

impl TryFrom<GrantRow> for PermissionGrant {
    type Error = WardenError;

    fn try_from(row: GrantRow) -> WardenResult<Self> {
        Ok(PermissionGrant {
            id: row.id.unwrap_or_default(),
            run: row.run,
            level: row.level,
            principal: Principal::from_parts(row.user, row.group)?,
        })
    }
}

impl From<PermissionGrant> for GrantRow {
    fn from(grant: PermissionGrant) -> Self {
        GrantRow {
            id: Some(grant.id),
            run: grant.run,
            level: grant.level,
            user: grant.principal.user(),
            group: grant.principal.group(),
        }
    }
}
