//! Reference tiling grid (Sentinel-2 MGRS tiles) keyed by tile identifier.
//!
//! The grid is a GeoJSON FeatureCollection whose features carry the tile id in the
//! `Name` property. A small sample grid is bundled with the crate; a full grid can be
//! loaded from disk with [`GridIndex::from_path`]. Once built, an index is never mutated.
use std::collections::HashMap;
use std::path::Path;

use geo::Polygon;
use geojson::{FeatureCollection, GeoJson};
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::core::geometry::{GeometryError, areal_geometry};
use crate::error::{Error, Result};

const BUNDLED_GRID: &str = include_str!("../../resources/grid/sentinel2-tiles.geojson");

static DEFAULT_GRID: Lazy<std::result::Result<GridIndex, String>> =
    Lazy::new(|| GridIndex::from_geojson_str(BUNDLED_GRID).map_err(|e| e.to_string()));

/// Immutable lookup from tile id to grid cell polygon (lon/lat)
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    cells: HashMap<String, Polygon<f64>>,
}

impl GridIndex {
    /// The grid bundled with the crate, parsed on first use
    pub fn bundled() -> Result<&'static GridIndex> {
        DEFAULT_GRID
            .as_ref()
            .map_err(|e| Error::Parse(format!("bundled reference grid: {}", e)))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<GridIndex> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let grid = Self::from_geojson_str(&text)?;
        info!(
            "Loaded reference grid with {} tiles from {:?}",
            grid.len(),
            path.as_ref()
        );
        Ok(grid)
    }

    pub fn from_geojson_str(text: &str) -> Result<GridIndex> {
        let geojson: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| Error::Parse(format!("reference grid: {}", e)))?;
        let collection = FeatureCollection::try_from(geojson)
            .map_err(|e| Error::Parse(format!("reference grid: {}", e)))?;

        let mut cells = HashMap::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(name) = feature.property("Name").and_then(|v| v.as_str()) else {
                warn!("Skipping grid feature without a Name property");
                continue;
            };
            let name = name.to_string();
            let Some(geometry) = feature.geometry else {
                warn!("Skipping grid feature {} without geometry", name);
                continue;
            };
            let mut polygons = areal_geometry(geometry)?;
            if polygons.0.is_empty() {
                continue;
            }
            cells.insert(name, polygons.0.swap_remove(0));
        }
        Ok(GridIndex { cells })
    }

    /// Grid cell polygon for a tile id such as `10SEG`
    pub fn cell(&self, tile_id: &str) -> std::result::Result<&Polygon<f64>, GeometryError> {
        self.cells
            .get(tile_id)
            .ok_or_else(|| GeometryError::UnknownTile(tile_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
