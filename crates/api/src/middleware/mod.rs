//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated account from a JWT Bearer token.
//! - [`rbac::RequireRider`] -- Requires the `rider` role.
//! - [`rbac::RequireCaptain`] -- Requires the `captain` role.

pub mod auth;
pub mod rbac;
