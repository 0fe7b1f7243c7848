//! Domain types and pure logic for the HopInn campus ride-pooling backend.
//!
//! Nothing in this crate performs I/O. Persistence lives in `hopinn-db`,
//! the external mapping provider in `hopinn-maps`, and the HTTP / WebSocket
//! surface in `hopinn-api`.

pub mod campus;
pub mod error;
pub mod fare;
pub mod geo;
pub mod otp;
pub mod ride;
pub mod ride_events;
pub mod roles;
pub mod types;
pub mod vehicle;
