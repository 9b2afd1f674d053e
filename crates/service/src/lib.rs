//! Service layer for the adoption backend.
//! - Listing creation, deletion and adoption on top of `models`.
//! - Directory reads for dogs and users.
//! - Media relay to the object store.
//!
//! Persistence goes through the repository traits in [`repository`], so the
//! same services run against PostgreSQL or the in-memory store.

pub mod errors;
pub mod domain;
pub mod repository;
pub mod repo;
pub mod storage;
pub mod listing_service;
pub mod user_service;
pub mod media;
#[cfg(test)]
pub mod test_support;

pub use listing_service::ListingService;
pub use media::MediaRelay;
pub use user_service::UserService;
