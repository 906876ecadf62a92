//! Output unit system selection.

use serde::{Deserialize, Serialize};

/// Which unit system query output values are converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Raw source-grid units (typically SI as encoded in GRIB).
    #[default]
    Native,
    /// US customary units (°F, knots, inches).
    English,
    /// Metric display units (°C, m/s, mm).
    Metric,
}

impl UnitSystem {
    /// Parse from string (case-insensitive). Unrecognized input falls back
    /// to native units.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "english" | "us" => Self::English,
            "metric" | "si" => Self::Metric,
            _ => Self::Native,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::English => write!(f, "english"),
            Self::Metric => write!(f, "metric"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(UnitSystem::from_str("english"), UnitSystem::English);
        assert_eq!(UnitSystem::from_str("US"), UnitSystem::English);
        assert_eq!(UnitSystem::from_str("metric"), UnitSystem::Metric);
        assert_eq!(UnitSystem::from_str("anything"), UnitSystem::Native);
    }
}
