//! Normalization of provider wire formats into the canonical profile
//!
//! Two schema families exist. MCTiers returns a rankings-by-gamemode object;
//! SouthTiers and PvPTiers share an envelope with a single free-text ranking
//! description. Parse failures propagate as [`ProviderError`] and are turned
//! into "absent" at the client boundary.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use tiertag_model::{GamemodeTier, TierProfile};

use crate::error::{ProviderError, Result};

/// The single gamemode slot SouthTiers-shaped responses rank
const SOUTH_TIERS_GAMEMODE: &str = "vanilla";

/// Fixed ranking phrases mapped to tier ordinals, matched as
/// case-insensitive substrings of the free-text ranking description
const RANKING_PHRASES: [(&str, u32); 10] = [
    ("high tier 1", 1),
    ("low tier 1", 2),
    ("high tier 2", 3),
    ("low tier 2", 4),
    ("high tier 3", 5),
    ("low tier 3", 6),
    ("high tier 4", 7),
    ("low tier 4", 8),
    ("high tier 5", 9),
    ("low tier 5", 10),
];

#[derive(Debug, Deserialize)]
struct McTiersProfile {
    uuid: String,
    name: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    points: u32,
    #[serde(default)]
    overall: u32,
    #[serde(default)]
    rankings: BTreeMap<String, McTiersRanking>,
}

/// Every field is required; a ranking entry missing one is a parse failure
#[derive(Debug, Deserialize)]
struct McTiersRanking {
    tier: u32,
    pos: u32,
    peak_tier: u32,
    peak_pos: u32,
    attained: i64,
    retired: bool,
}

#[derive(Debug, Deserialize)]
struct SouthTiersEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<SouthTiersData>,
}

#[derive(Debug, Deserialize)]
struct SouthTiersData {
    jogador: String,
    ranking: String,
}

/// Normalize an MCTiers response body into a [`TierProfile`]
pub fn from_mctiers(body: &str) -> Result<TierProfile> {
    let wire: McTiersProfile = serde_json::from_str(body)?;

    let mut profile = TierProfile::new(Some(wire.uuid), wire.name);
    profile.region = wire.region;
    profile.points = wire.points;
    profile.overall = wire.overall;

    for (gamemode, ranking) in wire.rankings {
        profile.add_gamemode(
            &gamemode,
            GamemodeTier {
                tier: ranking.tier,
                position: ranking.pos,
                peak_tier: ranking.peak_tier,
                peak_position: ranking.peak_pos,
                attained: ranking.attained,
                retired: ranking.retired,
            },
        );
    }

    Ok(profile)
}

/// Normalize a SouthTiers/PvPTiers response body into a [`TierProfile`]
///
/// A `success: false` envelope yields an empty profile with no placements.
pub fn from_south_tiers(body: &str) -> Result<TierProfile> {
    let wire: SouthTiersEnvelope = serde_json::from_str(body)?;

    if !wire.success {
        return Ok(TierProfile::new(None, ""));
    }

    let data = wire
        .data
        .ok_or_else(|| ProviderError::Schema("success response without data".to_string()))?;

    let tier = parse_ranking_text(&data.ranking);
    let mut profile = TierProfile::new(None, data.jogador);
    profile.add_gamemode(
        SOUTH_TIERS_GAMEMODE,
        GamemodeTier {
            tier,
            position: 0,
            peak_tier: tier,
            peak_position: 0,
            attained: Utc::now().timestamp(),
            retired: false,
        },
    );

    Ok(profile)
}

/// Map a free-text ranking description to a tier ordinal; 0 when no phrase matches
fn parse_ranking_text(ranking: &str) -> u32 {
    let lower = ranking.to_lowercase();
    RANKING_PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, tier)| *tier)
        .unwrap_or(0)
}
