//! Forecast element enumeration.
//!
//! Every value a probe query can request is identified by one of these
//! semantic codes. The enumeration doubles as the column axis of the
//! collation index, so the variant order is part of the public contract:
//! collation rows allocate one dense slot per variant via [`Element::index`].

use serde::{Deserialize, Serialize};

/// A forecast element (meteorological variable) known to the probe engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Element {
    /// Maximum temperature over a 12-ish hour daytime period.
    MaxTemp,
    /// Minimum temperature over a 12-ish hour nighttime period.
    MinTemp,
    /// 12-hour probability of precipitation.
    Pop12,
    /// Instantaneous 2-m temperature.
    Temp,
    /// 2-m dew point temperature.
    DewPoint,
    /// 10-m wind direction.
    WindDir,
    /// 10-m wind speed.
    WindSpeed,
    /// 10-m wind gust.
    WindGust,
    /// Total sky cover.
    Sky,
    /// Quantitative precipitation forecast (6-hour accumulation).
    Qpf,
    /// Snow amount (6-hour accumulation).
    SnowAmount,
    /// Weather type string (textual ugly-string element).
    Weather,
    /// Apparent temperature (heat index / wind chill).
    ApparentTemp,
    /// 2-m relative humidity.
    RelativeHumidity,
    /// Significant wave height.
    WaveHeight,
    /// Ice accumulation.
    IceAccum,
}

impl Element {
    /// All variants, in collation-slot order.
    pub const ALL: [Element; 16] = [
        Element::MaxTemp,
        Element::MinTemp,
        Element::Pop12,
        Element::Temp,
        Element::DewPoint,
        Element::WindDir,
        Element::WindSpeed,
        Element::WindGust,
        Element::Sky,
        Element::Qpf,
        Element::SnowAmount,
        Element::Weather,
        Element::ApparentTemp,
        Element::RelativeHumidity,
        Element::WaveHeight,
        Element::IceAccum,
    ];

    /// Number of known elements (dense collation row width).
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index of this element within a collation row.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|e| e == self).unwrap_or(0)
    }

    /// Short NDFD-style name.
    pub fn name(&self) -> &'static str {
        match self {
            Element::MaxTemp => "maxt",
            Element::MinTemp => "mint",
            Element::Pop12 => "pop12",
            Element::Temp => "temp",
            Element::DewPoint => "td",
            Element::WindDir => "wdir",
            Element::WindSpeed => "wspd",
            Element::WindGust => "wgust",
            Element::Sky => "sky",
            Element::Qpf => "qpf",
            Element::SnowAmount => "snow",
            Element::Weather => "wx",
            Element::ApparentTemp => "apt",
            Element::RelativeHumidity => "rhm",
            Element::WaveHeight => "waveh",
            Element::IceAccum => "iceaccum",
        }
    }

    /// Parse a short name (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.iter().copied().find(|e| e.name() == lower)
    }

    /// Whether this element carries textual values (weather type strings)
    /// rather than numeric ones.
    pub fn is_textual(&self) -> bool {
        matches!(self, Element::Weather)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for (i, element) in Element::ALL.iter().enumerate() {
            assert_eq!(element.index(), i);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Element::from_name("temp"), Some(Element::Temp));
        assert_eq!(Element::from_name("TEMP"), Some(Element::Temp));
        assert_eq!(Element::from_name("wx"), Some(Element::Weather));
        assert_eq!(Element::from_name("bogus"), None);
    }

    #[test]
    fn test_only_weather_is_textual() {
        for element in Element::ALL {
            assert_eq!(element.is_textual(), element == Element::Weather);
        }
    }

    #[test]
    fn test_names_are_unique() {
        for a in Element::ALL {
            for b in Element::ALL {
                if a != b {
                    assert_ne!(a.name(), b.name());
                }
            }
        }
    }
}
