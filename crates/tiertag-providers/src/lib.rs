//! Ranking provider clients
//!
//! Each configured provider exposes the same contract: one outbound GET per
//! lookup, normalized into a [`tiertag_model::TierProfile`] or `None`. The
//! providers differ in base endpoint, the identifier form they accept, and
//! their response schema:
//!
//! - **MCTiers** — keyed by account UUID; rankings-by-gamemode JSON object
//! - **SouthTiers** — keyed by display name; single free-text ranking field
//! - **PvPTiers** — keyed by display name; SouthTiers-shaped responses
//!
//! A lookup that arrives in the wrong identifier form is bridged through
//! [`mojang_identity::IdentityResolver`] first and fails soft when the
//! bridge fails.

mod client;
mod error;
mod normalize;
mod provider;

pub use client::TierClient;
pub use error::{ProviderError, Result};
pub use normalize::{from_mctiers, from_south_tiers};
pub use provider::ApiProvider;
