//! Tier profile retrieval service
//!
//! The integration point the presentation layer calls: cached-or-fetched
//! profile resolution ([`TierService::resolve_profile`]), bulk invalidation
//! on provider changes ([`TierService::on_provider_changed`]), and the
//! tracked-player registry driving the invalidation refetch sweep.

mod config;
mod service;
mod tracker;

pub use config::Config;
pub use service::TierService;
pub use tracker::TrackedPlayers;
