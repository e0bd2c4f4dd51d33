//! Record assembly: the STAC Item shape and the per-product base records.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::assets::bind_assets;
use crate::core::geometry::{Bbox, Footprint, grid_footprint, tile_footprint};
use crate::core::grid::GridIndex;
use crate::core::ident::{TileId, processing_level, rtc_item_id, tile_item_id};
use crate::core::properties::{Properties, rtc_properties, tile_properties};
use crate::error::{Error, Result};
use crate::io::collections::get_collection;
use crate::io::rtc::RtcMetadata;
use crate::io::tileinfo::TileInfo;
use crate::types::{Collection, PropertyMapping};

pub const STAC_VERSION: &str = "1.0.0-beta.2";

const OPTICAL_EXTENSIONS: [&str; 3] = ["eo", "view", "proj"];
const RADAR_EXTENSIONS: [&str; 3] = ["sar", "sat", "proj"];

/// Extensions declared by the items of a collection
pub fn extensions(collection: Collection) -> &'static [&'static str] {
    if collection.is_optical() {
        &OPTICAL_EXTENSIONS
    } else {
        &RADAR_EXTENSIONS
    }
}

/// A STAC Item. Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub item_type: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub bbox: Bbox,
    pub geometry: geojson::Geometry,
    pub properties: Properties,
    pub collection: Collection,
    pub assets: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Value>,
}

impl Item {
    /// Base record without assets
    pub fn new(collection: Collection, id: String, footprint: &Footprint, properties: Properties) -> Self {
        Item {
            item_type: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions: extensions(collection).iter().map(|s| s.to_string()).collect(),
            id,
            bbox: footprint.bbox,
            geometry: footprint.to_geojson(),
            properties,
            collection,
            assets: Map::new(),
            links: Vec::new(),
        }
    }

    /// Attach the collection's assets with hrefs rooted at `base_url`
    pub fn with_assets(mut self, base_url: &str) -> Result<Self> {
        let template = get_collection(self.collection)?;
        self.assets = bind_assets(self.collection, template.item_assets(), base_url)?;
        Ok(self)
    }

    /// Exterior-ring vertices of the item geometry
    pub fn geometry_coords(&self) -> Vec<[f64; 2]> {
        match &self.geometry.value {
            geojson::Value::Polygon(rings) => rings
                .first()
                .map(|ring| ring.iter().filter_map(|p| Some([*p.first()?, *p.get(1)?])).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

/// Base record of a Sentinel-2 tile (L1C or L2A)
pub fn tile_item(collection: Collection, info: &TileInfo, mapping: PropertyMapping) -> Result<Item> {
    if !collection.is_optical() {
        return Err(Error::invalid("collection", collection));
    }
    let epsg = info.epsg()?;
    let footprint = tile_footprint(&info.data_ring, epsg)?;
    let id = tile_item_id(&TileId {
        product_name: &info.product_name,
        utm_zone: info.utm_zone,
        latitude_band: &info.latitude_band,
        grid_square: &info.grid_square,
        date: info.timestamp.date_naive(),
        sequence: info.sequence(),
        level: processing_level(&info.datastrip_id)?,
    })?;
    let properties = tile_properties(info, epsg, mapping)?;
    debug!("Assembled {} item {}", collection, id);
    Ok(Item::new(collection, id, &footprint, properties))
}

/// Base record of a Sentinel-1 RTC tile; the footprint is the overlap of the grid cell
/// with the scenes that cover it.
pub fn rtc_item(meta: &RtcMetadata, grid: &GridIndex) -> Result<Item> {
    let tile_id = meta.tile_id()?;
    let scenes = meta.scenes()?;
    let cell = grid.cell(tile_id)?;
    let footprints: Vec<_> = scenes.iter().map(|s| s.footprint.clone()).collect();
    let footprint = grid_footprint(tile_id, cell, &footprints)?;

    let id = rtc_item_id(meta.mission_id()?, meta.date()?, tile_id, meta.orbit_direction()?);
    let properties = rtc_properties(meta, &scenes)?;
    debug!("Assembled RTC item {} from {} scene(s)", id, scenes.len());
    Ok(Item::new(Collection::SentinelS1Rtc, id, &footprint, properties))
}
