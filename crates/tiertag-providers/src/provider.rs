use std::fmt;
use std::str::FromStr;

/// The configured ranking provider
///
/// MCTiers is the documented default; an unrecognized configuration value
/// falls back to it with a warning at the config boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiProvider {
    #[default]
    Mctiers,
    SouthTiers,
    PvpTiers,
}

impl ApiProvider {
    /// Configuration/display name for the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mctiers => "mctiers",
            Self::SouthTiers => "south_tiers",
            Self::PvpTiers => "pvptiers",
        }
    }

    /// Whether this provider's endpoint is keyed by account UUID
    /// (as opposed to display name)
    pub fn wants_uuid(&self) -> bool {
        matches!(self, Self::Mctiers)
    }
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiProvider {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mctiers" => Ok(Self::Mctiers),
            "south_tiers" | "southtiers" => Ok(Self::SouthTiers),
            "pvptiers" => Ok(Self::PvpTiers),
            _ => Err(()),
        }
    }
}
