//! Core identifier types
//!
//! Every entity in the catalog is addressed by an opaque UUID newtype:
//! - [`UserId`], [`GroupId`]: principals
//! - [`RunId`], [`FileId`]: resources
//! - [`AccessLevelId`], [`GrantId`]: authorization rows
//!
//! Identifiers are assigned once (UUID v4) and never change. Distinct types
//! keep a `GroupId` from ever being passed where a `UserId` is expected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random id using UUID v4
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                $name(uuid)
            }

            /// Create an id from raw bytes
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                $name(Uuid::from_bytes(bytes))
            }

            /// Get raw bytes representation
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map($name)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user
    UserId
);

define_id!(
    /// Unique identifier for a group of users
    GroupId
);

define_id!(
    /// Unique identifier for an uploaded file
    FileId
);

define_id!(
    /// Unique identifier for a run (a tracked computational job)
    ///
    /// RunId shards the grant table and keys the per-run mutation locks.
    RunId
);

define_id!(
    /// Unique identifier for an access level definition
    AccessLevelId
);

define_id!(
    /// Unique identifier for a permission grant row
    ///
    /// Grant ids are totally ordered; resolution uses the lowest id to break
    /// ties between grants of equal strength.
    GrantId
);
