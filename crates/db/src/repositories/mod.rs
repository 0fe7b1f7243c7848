//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod campus_location_repo;
pub mod captain_repo;
pub mod ride_repo;
pub mod token_blacklist_repo;
pub mod user_repo;

pub use campus_location_repo::CampusLocationRepo;
pub use captain_repo::CaptainRepo;
pub use ride_repo::RideRepo;
pub use token_blacklist_repo::TokenBlacklistRepo;
pub use user_repo::UserRepo;
