//! Request handlers grouped by resource.
//!
//! Handlers stay thin: they extract and validate input, delegate to a
//! repository or to [`crate::rides::RideService`], and wrap the result in
//! one of the [`crate::response`] envelopes. Errors map through
//! [`crate::error::AppError`].

pub mod auth;
pub mod campus;
pub mod captains;
pub mod maps;
pub mod rides;
pub mod users;
