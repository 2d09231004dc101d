//! Domain model for ranked player tier profiles
//!
//! A [`TierProfile`] holds per-gamemode tier placements for one player,
//! regardless of which ranking provider produced them. Providers normalize
//! their wire formats into this one shape; the cache persists it as JSON.

mod profile;

pub use profile::{tier_label, GamemodeTier, TierProfile, UNRANKED};
