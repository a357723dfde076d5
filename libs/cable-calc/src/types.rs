//! Installation method and phase configuration

use serde::{Deserialize, Serialize};

/// How the cable run is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationMethod {
    /// Clipped direct / in free air
    #[default]
    Air,
    /// Buried in ground
    Ground,
}

impl InstallationMethod {
    pub const ALL: [InstallationMethod; 2] = [Self::Air, Self::Ground];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Ground => "ground",
        }
    }
}

impl std::fmt::Display for InstallationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InstallationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(Self::Air),
            "ground" => Ok(Self::Ground),
            other => Err(format!(
                "Invalid installation method: '{}', expected 'air' or 'ground'",
                other
            )),
        }
    }
}

/// Supply phase configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Single,
    Three,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Self::Single, Self::Three];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Three => "three",
        }
    }

    /// Maximum permissible voltage drop as a percentage of nominal voltage
    pub fn max_drop_percent(&self) -> f64 {
        match self {
            Self::Single => crate::engine::MAX_DROP_PERCENT_SINGLE,
            Self::Three => crate::engine::MAX_DROP_PERCENT_THREE,
        }
    }

    /// Multiplier applied to `length × resistance × current`
    pub fn drop_multiplier(&self) -> f64 {
        match self {
            // out and return conductor
            Self::Single => 2.0,
            Self::Three => 3f64.sqrt(),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(Self::Single),
            "three" | "3" => Ok(Self::Three),
            other => Err(format!(
                "Invalid phase: '{}', expected 'single' or 'three'",
                other
            )),
        }
    }
}
