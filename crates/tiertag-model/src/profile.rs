use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used wherever a player has no valid tier placement.
pub const UNRANKED: &str = "UNRANKED";

/// Map a tier ordinal (1 = best, 10 = worst) to its display label.
///
/// Ordinals outside `[1, 10]` have no label and are treated as unranked.
pub fn tier_label(tier: u32) -> Option<&'static str> {
    match tier {
        1 => Some("HT1"),
        2 => Some("LT1"),
        3 => Some("HT2"),
        4 => Some("LT2"),
        5 => Some("HT3"),
        6 => Some("LT3"),
        7 => Some("HT4"),
        8 => Some("LT4"),
        9 => Some("HT5"),
        10 => Some("LT5"),
        _ => None,
    }
}

/// One gamemode's tier placement for a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamemodeTier {
    /// Tier ordinal, 1 (best) through 10 (worst); 0 means unranked
    pub tier: u32,
    /// Position within the tier
    pub position: u32,
    /// Best tier ordinal ever attained
    pub peak_tier: u32,
    /// Position within the peak tier
    pub peak_position: u32,
    /// Epoch seconds when the current tier was attained
    pub attained: i64,
    /// Whether the placement is retired
    pub retired: bool,
}

impl GamemodeTier {
    /// Whether this placement carries a valid (rankable) tier ordinal
    pub fn is_ranked(&self) -> bool {
        (1..=10).contains(&self.tier)
    }
}

/// Canonical tier profile for one player, provider-independent
///
/// Gamemode keys are stored lowercased, so lookups are case-insensitive.
/// The `BTreeMap` keeps iteration order stable: when two gamemodes share the
/// best tier, [`TierProfile::best_tier`] resolves the tie to the
/// lexicographically smallest gamemode name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    /// Account UUID, dashed form; absent when the provider only knows names
    #[serde(default)]
    pub uuid: Option<String>,
    pub username: String,
    #[serde(default)]
    pub gamemodes: BTreeMap<String, GamemodeTier>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub overall: u32,
    /// When the profile was written to the cache; set on reconstruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
}

impl TierProfile {
    /// Create an empty profile with no placements
    pub fn new(uuid: Option<String>, username: impl Into<String>) -> Self {
        Self {
            uuid,
            username: username.into(),
            gamemodes: BTreeMap::new(),
            region: None,
            points: 0,
            overall: 0,
            cached_at: None,
        }
    }

    /// Insert a gamemode placement, lowercasing the key
    pub fn add_gamemode(&mut self, gamemode: &str, tier: GamemodeTier) {
        self.gamemodes.insert(gamemode.to_lowercase(), tier);
    }

    /// Label of the best (numerically lowest) valid tier across all
    /// gamemodes, or `UNRANKED` when no gamemode has one.
    pub fn best_tier(&self) -> &'static str {
        self.gamemodes
            .values()
            .filter(|t| t.is_ranked())
            .min_by_key(|t| t.tier)
            .and_then(|t| tier_label(t.tier))
            .unwrap_or(UNRANKED)
    }

    /// Label of the tier for one gamemode (case-insensitive), or `UNRANKED`
    pub fn tier_for_gamemode(&self, gamemode: &str) -> &'static str {
        self.gamemodes
            .get(&gamemode.to_lowercase())
            .filter(|t| t.is_ranked())
            .and_then(|t| tier_label(t.tier))
            .unwrap_or(UNRANKED)
    }

    /// Serialize to the canonical JSON form persisted by the cache
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Reconstruct a profile from its cached JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(tier: u32) -> GamemodeTier {
        GamemodeTier {
            tier,
            position: 3,
            peak_tier: tier,
            peak_position: 1,
            attained: 1_700_000_000,
            retired: false,
        }
    }

    #[test]
    fn test_tier_label_mapping() {
        assert_eq!(tier_label(1), Some("HT1"));
        assert_eq!(tier_label(3), Some("HT2"));
        assert_eq!(tier_label(10), Some("LT5"));
        assert_eq!(tier_label(0), None);
        assert_eq!(tier_label(11), None);
    }

    #[test]
    fn test_best_tier_empty_profile() {
        let profile = TierProfile::new(None, "Steve");
        assert_eq!(profile.best_tier(), UNRANKED);
    }

    #[test]
    fn test_best_tier_picks_lowest_ordinal() {
        let mut profile = TierProfile::new(None, "Steve");
        profile.add_gamemode("vanilla", placement(5));
        profile.add_gamemode("sword", placement(2));
        profile.add_gamemode("axe", placement(9));
        assert_eq!(profile.best_tier(), "LT1");
    }

    #[test]
    fn test_best_tier_ignores_out_of_range_ordinals() {
        let mut profile = TierProfile::new(None, "Steve");
        profile.add_gamemode("vanilla", placement(0));
        profile.add_gamemode("sword", placement(42));
        assert_eq!(profile.best_tier(), UNRANKED);
    }

    #[test]
    fn test_best_tier_tie_breaks_lexicographically() {
        let mut profile = TierProfile::new(None, "Steve");
        profile.add_gamemode("uhc", placement(4));
        profile.add_gamemode("axe", placement(4));
        // Both are LT2; the axe placement wins the iteration order but the
        // label is identical either way.
        assert_eq!(profile.best_tier(), "LT2");
        let best = profile
            .gamemodes
            .iter()
            .filter(|(_, t)| t.is_ranked())
            .min_by_key(|(_, t)| t.tier)
            .map(|(name, _)| name.as_str());
        assert_eq!(best, Some("axe"));
    }

    #[test]
    fn test_tier_for_gamemode_case_insensitive() {
        let mut profile = TierProfile::new(None, "Steve");
        profile.add_gamemode("Vanilla", placement(3));
        assert_eq!(profile.tier_for_gamemode("vanilla"), "HT2");
        assert_eq!(profile.tier_for_gamemode("VANILLA"), "HT2");
        assert_eq!(profile.tier_for_gamemode("sword"), UNRANKED);
    }

    #[test]
    fn test_tier_for_gamemode_unranked_ordinal() {
        let mut profile = TierProfile::new(None, "Steve");
        profile.add_gamemode("vanilla", placement(0));
        assert_eq!(profile.tier_for_gamemode("vanilla"), UNRANKED);
    }

    #[test]
    fn test_json_round_trip() {
        let mut profile = TierProfile::new(
            Some("11111111-1111-1111-1111-111111111111".to_string()),
            "Steve",
        );
        profile.region = Some("EU".to_string());
        profile.points = 120;
        profile.overall = 14;
        profile.add_gamemode("vanilla", placement(3));
        profile.add_gamemode("sword", placement(7));

        let json = profile.to_json().unwrap();
        let back = TierProfile::from_json(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_json_round_trip_empty_profile() {
        let profile = TierProfile::new(None, "Alex");
        let json = profile.to_json().unwrap();
        let back = TierProfile::from_json(&json).unwrap();
        assert_eq!(back, profile);
        assert_eq!(back.best_tier(), UNRANKED);
    }
}
