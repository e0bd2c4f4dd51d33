//! Reader for Sentinel-2 `tileInfo.json` sidecars.
use std::path::Path;

use chrono::{DateTime, Utc};
use geo::Coord;
use serde_json::Value;
use tracing::debug;

use crate::core::geometry::{GeometryError, parse_epsg};
use crate::core::ident::parse_timestamp;
use crate::error::{Error, Result};
use crate::io::angles::SunAngles;

/// Metadata extracted from a Sentinel-2 tile info document
#[derive(Debug, Clone, PartialEq)]
pub struct TileInfo {
    pub path: String,
    pub timestamp: DateTime<Utc>,
    pub utm_zone: u32,
    pub latitude_band: String,
    pub grid_square: String,
    pub datastrip_id: String,
    pub product_name: String,
    /// CRS name of the tile origin, e.g. `urn:ogc:def:crs:EPSG:8.8.1:32610`
    pub crs_name: String,
    /// Exterior ring of the valid-data geometry in the tile's native CRS
    pub data_ring: Vec<Coord<f64>>,
    pub data_coverage: Option<f64>,
    pub cloud_cover: Option<f64>,
    /// Mean sun angles from the tile-level XML metadata, when available
    pub sun_angles: Option<SunAngles>,
}

impl TileInfo {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Reading tile info from {:?}", path.as_ref());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let timestamp = parse_timestamp(str_field(value, &["timestamp"])?)?;
        let data_ring = ring(field(value, &["tileDataGeometry", "coordinates"])?)?;

        Ok(TileInfo {
            path: str_field(value, &["path"])?.to_string(),
            timestamp,
            utm_zone: utm_zone(field(value, &["utmZone"])?)?,
            latitude_band: str_field(value, &["latitudeBand"])?.to_string(),
            grid_square: str_field(value, &["gridSquare"])?.to_string(),
            datastrip_id: str_field(value, &["datastrip", "id"])?.to_string(),
            product_name: str_field(value, &["productName"])?.to_string(),
            crs_name: str_field(value, &["tileOrigin", "crs", "properties", "name"])?.to_string(),
            data_ring,
            data_coverage: optional_number(value, "dataCoveragePercentage")?,
            cloud_cover: optional_number(value, "cloudyPixelPercentage")?,
            sun_angles: None,
        })
    }

    pub fn with_sun_angles(mut self, angles: Option<SunAngles>) -> Self {
        self.sun_angles = angles;
        self
    }

    /// Sequence number of the acquisition on this tile (last segment of `path`)
    pub fn sequence(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn epsg(&self) -> std::result::Result<u32, GeometryError> {
        parse_epsg(&self.crs_name)
    }

    /// Platform letter (`a`/`b`) taken from the product name, lowercased
    pub fn platform_letter(&self) -> Result<char> {
        self.product_name
            .chars()
            .nth(2)
            .map(|c| c.to_ascii_lowercase())
            .ok_or_else(|| {
                Error::Parse(format!("product name `{}` is too short", self.product_name))
            })
    }
}

fn field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = value;
    for key in path {
        current = current
            .get(*key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::missing(path.join(".")))?;
    }
    Ok(current)
}

fn str_field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str> {
    let v = field(value, path)?;
    v.as_str().ok_or_else(|| Error::invalid(path.join("."), v))
}

/// Numeric value that may be encoded as a JSON number or as text
fn coerce_f64(name: &str, v: &Value) -> Result<f64> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| Error::invalid(name, v)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| Error::invalid(name, s)),
        other => Err(Error::invalid(name, other)),
    }
}

fn optional_number(value: &Value, key: &str) -> Result<Option<f64>> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => coerce_f64(key, v).map(Some),
    }
}

fn utm_zone(v: &Value) -> Result<u32> {
    let zone = coerce_f64("utmZone", v)?;
    if zone.fract() != 0.0 || !(1.0..=60.0).contains(&zone) {
        return Err(Error::invalid("utmZone", v));
    }
    Ok(zone as u32)
}

fn ring(coordinates: &Value) -> Result<Vec<Coord<f64>>> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| Error::invalid("tileDataGeometry.coordinates", coordinates))?;
    let Some(exterior) = rings.first() else {
        return Ok(Vec::new());
    };
    let points = exterior
        .as_array()
        .ok_or_else(|| Error::invalid("tileDataGeometry.coordinates[0]", exterior))?;
    points
        .iter()
        .map(|p| match p.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => Ok(Coord {
                x: coerce_f64("tileDataGeometry.coordinates", x)?,
                y: coerce_f64("tileDataGeometry.coordinates", y)?,
            }),
            _ => Err(Error::invalid("tileDataGeometry.coordinates", p)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "path": "tiles/10/S/EG/2018/12/31/0",
            "timestamp": "2018-12-31T19:01:41.466Z",
            "utmZone": 10,
            "latitudeBand": "S",
            "gridSquare": "EG",
            "datastrip": { "id": "S2B_OPER_MSI_L1C_DS_SGS__20181231T210025_S20181231T190052_N02.07" },
            "tileDataGeometry": {
                "type": "Polygon",
                "coordinates": [[[499980.0, 4200000.0], [609780.0, 4200000.0], [609780.0, 4090200.0], [499980.0, 4200000.0]]]
            },
            "tileOrigin": {
                "type": "Point",
                "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG:8.8.1:32610" } },
                "coordinates": [499980.0, 4200000.0]
            },
            "dataCoveragePercentage": "79.57",
            "productName": "S2B_MSIL1C_20181231T190109_N0207_R013_T10SEG_20181231T210025"
        })
    }

    #[test]
    fn parses_required_and_optional_fields() {
        let info = TileInfo::from_json(&sample()).unwrap();
        assert_eq!(info.utm_zone, 10);
        assert_eq!(info.sequence(), "0");
        assert_eq!(info.epsg().unwrap(), 32610);
        assert_eq!(info.platform_letter().unwrap(), 'b');
        assert_eq!(info.data_ring.len(), 4);
        assert_eq!(info.data_coverage, Some(79.57));
        assert_eq!(info.cloud_cover, None);
    }

    #[test]
    fn missing_required_field_names_its_path() {
        let mut v = sample();
        v["datastrip"].as_object_mut().unwrap().remove("id");
        match TileInfo::from_json(&v) {
            Err(Error::MissingField(f)) => assert_eq!(f, "datastrip.id"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_cloud_cover_is_a_value_error() {
        let mut v = sample();
        v["cloudyPixelPercentage"] = json!("cloudy");
        assert!(matches!(TileInfo::from_json(&v), Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn utm_zone_may_be_text() {
        let mut v = sample();
        v["utmZone"] = json!("10");
        assert_eq!(TileInfo::from_json(&v).unwrap().utm_zone, 10);
        v["utmZone"] = json!(61);
        assert!(TileInfo::from_json(&v).is_err());
    }

    #[test]
    fn empty_coordinates_parse_to_empty_ring() {
        let mut v = sample();
        v["tileDataGeometry"]["coordinates"] = json!([]);
        assert!(TileInfo::from_json(&v).unwrap().data_ring.is_empty());
    }
}
