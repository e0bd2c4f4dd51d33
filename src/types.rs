//! Shared types and enums used across stac-sentinel.
//! Includes `Collection`, `PropertyMapping`, `OrbitDirection` and `Platform`.
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Supported STAC collections
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "sentinel-s2-l1c")]
    SentinelS2L1c,
    #[serde(rename = "sentinel-s2-l2a")]
    SentinelS2L2a,
    #[serde(rename = "sentinel-s1-rtc")]
    SentinelS1Rtc,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::SentinelS2L1c,
        Collection::SentinelS2L2a,
        Collection::SentinelS1Rtc,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Collection::SentinelS2L1c => "sentinel-s2-l1c",
            Collection::SentinelS2L2a => "sentinel-s2-l2a",
            Collection::SentinelS1Rtc => "sentinel-s1-rtc",
        }
    }

    /// True for the Sentinel-2 tile products (input is a `tileInfo.json`)
    pub fn is_optical(&self) -> bool {
        matches!(self, Collection::SentinelS2L1c | Collection::SentinelS2L2a)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| Error::UnknownCollection(s.to_string()))
    }
}

impl ValueEnum for Collection {
    fn value_variants<'a>() -> &'a [Self] {
        &Collection::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.id()))
    }
}

/// How the optical property mapper treats `dataCoveragePercentage` and
/// `cloudyPixelPercentage`.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PropertyMapping {
    /// Omit the coverage/cloud properties when the source lacks them
    #[default]
    Tolerant,
    /// Fail with a missing-field error when either is absent
    Strict,
}

impl std::fmt::Display for PropertyMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyMapping::Tolerant => write!(f, "Tolerant"),
            PropertyMapping::Strict => write!(f, "Strict"),
        }
    }
}

/// Satellite ground-track direction at acquisition time
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbitDirection {
    Ascending,
    Descending,
}

impl OrbitDirection {
    /// Only the exact lowercase spellings are recognized.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "ascending" => Ok(OrbitDirection::Ascending),
            "descending" => Ok(OrbitDirection::Descending),
            other => Err(Error::UnknownOrbitDirection(other.to_string())),
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            OrbitDirection::Ascending => "ASC",
            OrbitDirection::Descending => "DSC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitDirection::Ascending => "ascending",
            OrbitDirection::Descending => "descending",
        }
    }
}

impl std::fmt::Display for OrbitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sentinel-1 platforms with a known relative-orbit offset
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Platform {
    S1A,
    S1B,
}

impl Platform {
    pub fn parse(code: &str) -> Result<Self, Error> {
        match code {
            "S1A" => Ok(Platform::S1A),
            "S1B" => Ok(Platform::S1B),
            other => Err(Error::UnknownPlatform(other.to_string())),
        }
    }

    /// Absolute orbit at which relative orbit 1 starts for this platform
    pub fn orbit_offset(&self) -> i64 {
        match self {
            Platform::S1A => 73,
            Platform::S1B => 27,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Platform::S1A => "S1A",
            Platform::S1B => "S1B",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_ids_round_trip_through_from_str() {
        for c in Collection::ALL {
            assert_eq!(c.id().parse::<Collection>().unwrap(), c);
        }
        assert!(matches!(
            "sentinel-s2-l3".parse::<Collection>(),
            Err(Error::UnknownCollection(_))
        ));
    }

    #[test]
    fn orbit_direction_is_case_sensitive() {
        assert_eq!(OrbitDirection::parse("ascending").unwrap().abbreviation(), "ASC");
        assert_eq!(OrbitDirection::parse("descending").unwrap().abbreviation(), "DSC");
        for bad in ["Ascending", "DESCENDING", "asc", "decending", ""] {
            assert!(matches!(
                OrbitDirection::parse(bad),
                Err(Error::UnknownOrbitDirection(_))
            ));
        }
    }

    #[test]
    fn unknown_platform_is_rejected() {
        assert_eq!(Platform::parse("S1B").unwrap().orbit_offset(), 27);
        assert!(matches!(Platform::parse("S1C"), Err(Error::UnknownPlatform(_))));
    }

    #[test]
    fn property_mapping_serde_is_lowercase() {
        let s = serde_json::to_string(&PropertyMapping::Strict).unwrap();
        assert_eq!(s, "\"strict\"");
        assert_eq!(PropertyMapping::default(), PropertyMapping::Tolerant);
    }
}
