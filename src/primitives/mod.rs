//! Entity handles for the unified API.
//!
//! Each handle groups the operations on one kind of entity. Operations
//! suffixed `_as` act on behalf of a user and are gated by that user's
//! resolved access; the others are provisioning operations with no check.

mod access;
mod files;
mod grants;
mod groups;
mod levels;
mod runs;
mod sessions;
mod users;

pub use access::Access;
pub use files::Files;
pub use grants::Grants;
pub use groups::Groups;
pub use levels::Levels;
pub use runs::Runs;
pub use sessions::Sessions;
pub use users::Users;
