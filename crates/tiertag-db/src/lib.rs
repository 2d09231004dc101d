//! Persistent TTL cache for player tier profiles
//!
//! A single SQLite table keyed by account UUID holds the canonical JSON
//! encoding of each profile plus cache and expiry timestamps. The public
//! surface never raises a storage error: reads degrade to a miss, writes to
//! a no-op, with the failure logged at this boundary.

mod cache;

pub use cache::TierCache;
