//! Item properties for the Sentinel-2 tiles and Sentinel-1 RTC tiles.
//!
//! Properties are an insertion-ordered JSON map. Two mappings exist for the optical
//! coverage/cloud fields, see [`PropertyMapping`].
use serde_json::{Map, Value, json};

use crate::core::ident::{acquisition_window, format_datetime, relative_orbit};
use crate::error::{Error, Result};
use crate::io::rtc::{RtcMetadata, SceneMetadata};
use crate::io::tileinfo::TileInfo;
use crate::types::PropertyMapping;

pub type Properties = Map<String, Value>;

/// Properties of a Sentinel-2 tile item
pub fn tile_properties(info: &TileInfo, epsg: u32, mapping: PropertyMapping) -> Result<Properties> {
    let mut props = Properties::new();
    props.insert("datetime".into(), json!(format_datetime(&info.timestamp)));
    props.insert(
        "platform".into(),
        json!(format!("sentinel-2{}", info.platform_letter()?)),
    );
    props.insert("constellation".into(), json!("sentinel-2"));
    props.insert("instruments".into(), json!(["msi"]));
    props.insert("gsd".into(), json!(10));
    props.insert("view:off_nadir".into(), json!(0));
    props.insert("proj:epsg".into(), json!(epsg));
    props.insert("sentinel:utm_zone".into(), json!(info.utm_zone));
    props.insert("sentinel:latitude_band".into(), json!(info.latitude_band));
    props.insert("sentinel:grid_square".into(), json!(info.grid_square));
    props.insert("sentinel:sequence".into(), json!(info.sequence()));
    props.insert("sentinel:product_id".into(), json!(info.product_name));

    let coverage = [
        ("sentinel:data_coverage", "dataCoveragePercentage", info.data_coverage),
        ("eo:cloud_cover", "cloudyPixelPercentage", info.cloud_cover),
    ];
    for (name, source, value) in coverage {
        match (value, mapping) {
            (Some(v), _) => {
                props.insert(name.into(), json!(v));
            }
            (None, PropertyMapping::Tolerant) => {}
            (None, PropertyMapping::Strict) => return Err(Error::missing(source)),
        }
    }

    if let Some(angles) = info.sun_angles {
        props.insert("view:sun_azimuth".into(), json!(angles.azimuth));
        props.insert("view:sun_elevation".into(), json!(angles.elevation()));
    }
    Ok(props)
}

/// Properties of a Sentinel-1 RTC tile item
pub fn rtc_properties(meta: &RtcMetadata, scenes: &[SceneMetadata]) -> Result<Properties> {
    let ranges: Vec<_> = scenes.iter().map(|s| (s.start, s.end)).collect();
    let (start, end) =
        acquisition_window(&ranges).ok_or_else(|| Error::missing("SCENE_1_METADATA"))?;
    let platform = meta.platform()?;
    let absolute_orbit = meta.absolute_orbit()?;
    let direction = meta.orbit_direction()?;
    let mission_letter = platform.code()[2..].to_ascii_lowercase();

    let mut props = Properties::new();
    props.insert("datetime".into(), json!(format_datetime(&start)));
    props.insert("start_datetime".into(), json!(format_datetime(&start)));
    props.insert("end_datetime".into(), json!(format_datetime(&end)));
    props.insert("platform".into(), json!(format!("sentinel-1{}", mission_letter)));
    props.insert("constellation".into(), json!("sentinel-1"));
    props.insert("instruments".into(), json!(["c-sar"]));
    props.insert("gsd".into(), json!(20));
    props.insert("proj:epsg".into(), json!(meta.epsg));
    props.insert("sar:instrument_mode".into(), json!("IW"));
    props.insert("sar:frequency_band".into(), json!("C"));
    props.insert("sar:center_frequency".into(), json!(5.405));
    props.insert("sar:polarizations".into(), json!(["VV", "VH"]));
    props.insert("sar:product_type".into(), json!("RTC"));
    props.insert("sat:orbit_state".into(), json!(direction.as_str()));
    props.insert("sat:absolute_orbit".into(), json!(absolute_orbit));
    props.insert(
        "sat:relative_orbit".into(),
        json!(relative_orbit(absolute_orbit, platform)),
    );
    props.insert("sentinel:mgrs".into(), json!(meta.tile_id()?));
    if let Some(valid) = meta.valid_percent()? {
        props.insert("sentinel:valid_percent".into(), json!(valid));
    }
    Ok(props)
}
