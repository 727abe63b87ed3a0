//! Marketplace service client for hitdesk.
//!
//! A thin wrapper over the labor-marketplace REST API: publishing HITs,
//! extending and expiring them, approving or rejecting worker assignments,
//! and checking the account balance. The shell depends only on the
//! [`MarketplaceClient`] capability trait; [`HttpMarketplaceClient`] is the
//! production implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpMarketplaceClient, MarketplaceClient, MarketplaceConfig};
pub use error::MarketplaceError;
pub use types::{Assignment, Balance, CreatedHit, Environment, Hit, HitRequest};
