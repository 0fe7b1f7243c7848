//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row, plus the create DTO used for inserts. Structs that carry secrets
//! (password hashes, ride OTPs) are never serialized directly; use the
//! accompanying response or profile type instead.

pub mod campus_location;
pub mod captain;
pub mod ride;
pub mod user;
