//! Sentinel-1 RTC tile metadata: GeoTIFF tags of the backscatter raster plus the
//! raster's EPSG code.
//!
//! Tags read:
//! - `MISSION_ID` (`S1A`/`S1B`), `DATE` (`YYYY-MM-DD`), `TILE_ID` (MGRS, e.g. `10SEG`)
//! - `ORBIT_DIRECTION` (`ascending`/`descending`), `ABSOLUTE_ORBIT_NUMBER`
//! - `VALID_PIXEL_PERCENT` (optional)
//! - `SCENE_<n>_METADATA`: JSON with `start_time`, `end_time` and a GeoJSON `footprint`
use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::geometry::areal_geometry;
use crate::core::ident::parse_timestamp;
use crate::error::{Error, Result};
use crate::types::{OrbitDirection, Platform};

pub const MISSION_ID: &str = "MISSION_ID";
pub const DATE: &str = "DATE";
pub const TILE_ID: &str = "TILE_ID";
pub const ORBIT_DIRECTION: &str = "ORBIT_DIRECTION";
pub const ABSOLUTE_ORBIT_NUMBER: &str = "ABSOLUTE_ORBIT_NUMBER";
pub const VALID_PIXEL_PERCENT: &str = "VALID_PIXEL_PERCENT";

/// Raw tag metadata of one RTC tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtcMetadata {
    pub epsg: u32,
    pub tags: BTreeMap<String, String>,
}

/// One acquisition contributing to a tile
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMetadata {
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub footprint: MultiPolygon<f64>,
}

impl RtcMetadata {
    pub fn new(epsg: u32, tags: BTreeMap<String, String>) -> Self {
        RtcMetadata { epsg, tags }
    }

    /// Read a JSON sidecar of the form `{"epsg": 32610, "tags": {...}}`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Reading RTC tag sidecar {:?}", path.as_ref());
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Whether `path` is a JSON document with a `tags` object, the shape of a tag sidecar.
    /// Unreadable or non-JSON files are not sidecars.
    pub fn is_sidecar<P: AsRef<Path>>(path: P) -> bool {
        let Ok(text) = std::fs::read_to_string(path.as_ref()) else {
            return false;
        };
        serde_json::from_str::<Value>(&text)
            .is_ok_and(|doc| doc.get("tags").is_some_and(Value::is_object))
    }

    pub fn tag(&self, key: &str) -> Result<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::missing(key))
    }

    pub fn mission_id(&self) -> Result<&str> {
        self.tag(MISSION_ID)
    }

    pub fn platform(&self) -> Result<Platform> {
        Platform::parse(self.mission_id()?)
    }

    pub fn date(&self) -> Result<&str> {
        self.tag(DATE)
    }

    pub fn tile_id(&self) -> Result<&str> {
        self.tag(TILE_ID)
    }

    pub fn orbit_direction(&self) -> Result<OrbitDirection> {
        OrbitDirection::parse(self.tag(ORBIT_DIRECTION)?)
    }

    /// Absolute orbit number; negative values are rejected
    pub fn absolute_orbit(&self) -> Result<i64> {
        let raw = self.tag(ABSOLUTE_ORBIT_NUMBER)?;
        match raw.trim().parse::<i64>() {
            Ok(orbit) if orbit >= 0 => Ok(orbit),
            _ => Err(Error::invalid(ABSOLUTE_ORBIT_NUMBER, raw)),
        }
    }

    pub fn valid_percent(&self) -> Result<Option<f64>> {
        self.tags
            .get(VALID_PIXEL_PERCENT)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::invalid(VALID_PIXEL_PERCENT, v))
            })
            .transpose()
    }

    /// All `SCENE_<n>_METADATA` blobs, ordered by `n`
    pub fn scenes(&self) -> Result<Vec<SceneMetadata>> {
        let mut indexed: Vec<(usize, &str, &str)> = self
            .tags
            .iter()
            .filter_map(|(k, v)| scene_index(k).map(|i| (i, k.as_str(), v.as_str())))
            .collect();
        if indexed.is_empty() {
            return Err(Error::missing("SCENE_1_METADATA"));
        }
        indexed.sort_by_key(|(i, _, _)| *i);
        indexed
            .into_iter()
            .map(|(index, key, blob)| parse_scene(index, key, blob))
            .collect()
    }
}

fn scene_index(key: &str) -> Option<usize> {
    key.strip_prefix("SCENE_")?
        .strip_suffix("_METADATA")?
        .parse()
        .ok()
}

fn parse_scene(index: usize, key: &str, blob: &str) -> Result<SceneMetadata> {
    let value: Value = serde_json::from_str(blob)
        .map_err(|e| Error::Parse(format!("{}: {}", key, e)))?;
    let time = |name: &str| -> Result<DateTime<Utc>> {
        let raw = value
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::missing(format!("{}.{}", key, name)))?;
        parse_timestamp(raw)
    };
    let start = time("start_time")?;
    let end = time("end_time")?;

    let footprint = match value.get("footprint") {
        Some(Value::String(s)) => serde_json::from_str::<geojson::Geometry>(s)
            .map_err(|e| Error::Parse(format!("{}.footprint: {}", key, e)))?,
        Some(v @ Value::Object(_)) => serde_json::from_value::<geojson::Geometry>(v.clone())
            .map_err(|e| Error::Parse(format!("{}.footprint: {}", key, e)))?,
        Some(other) => return Err(Error::invalid(format!("{}.footprint", key), other)),
        None => return Err(Error::missing(format!("{}.footprint", key))),
    };

    Ok(SceneMetadata {
        index,
        start,
        end,
        footprint: areal_geometry(footprint)?,
    })
}
