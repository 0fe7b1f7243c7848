//! Well-known role name constants carried in access-token claims.
//!
//! A token's role decides which account table its `sub` refers to.

/// A rider account (`users` table).
pub const ROLE_RIDER: &str = "rider";

/// A driver account (`captains` table).
pub const ROLE_CAPTAIN: &str = "captain";
