use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::io::rtc::RtcMetadata;

/// Errors encountered when reading raster tags through GDAL
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Raster has no EPSG-identified CRS: {0}")]
    MissingEpsg(String),
}

/// Tag metadata and CRS of a GDAL-supported raster
#[derive(Debug, Clone)]
pub struct RasterTags {
    /// Number of raster bands
    pub bands: usize,
    /// EPSG code of the raster CRS, when it has one
    pub epsg: Option<u32>,
    /// Metadata key-value pairs of the default domain
    pub tags: BTreeMap<String, String>,
}

// Helper to extract EPSG code from a WKT1 authority tag or WKT2 id
fn parse_epsg(wkt: &str) -> Option<u32> {
    for key in ["AUTHORITY[\"EPSG\",\"", "ID[\"EPSG\","] {
        if let Some(idx) = wkt.rfind(key) {
            let start = idx + key.len();
            let code: String = wkt[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(code) = code.parse() {
                return Some(code);
            }
        }
    }
    None
}

/// Reader for the tags of a GeoTIFF (or other GDAL raster)
pub struct RasterTagReader {
    pub dataset: Dataset,
    pub metadata: RasterTags,
}

impl RasterTagReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let epsg = match dataset.spatial_ref() {
            Ok(srs) => srs
                .auth_code()
                .ok()
                .and_then(|c| u32::try_from(c).ok())
                .or_else(|| parse_epsg(&dataset.projection())),
            Err(_) => parse_epsg(&dataset.projection()),
        };
        // Collect metadata entries (domain "")
        let mut tags = BTreeMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    tags.insert(key.to_string(), val.to_string());
                }
            }
        }
        debug!(
            "Opened {:?}: {} band(s), EPSG {:?}, {} tag(s)",
            path.as_ref(),
            bands,
            epsg,
            tags.len()
        );
        Ok(RasterTagReader {
            dataset,
            metadata: RasterTags {
                bands,
                epsg,
                tags,
            },
        })
    }

    /// Tag metadata of an RTC backscatter tile
    pub fn rtc_metadata(&self) -> Result<RtcMetadata, GdalError> {
        let epsg = self
            .metadata
            .epsg
            .ok_or_else(|| GdalError::MissingEpsg(self.dataset.projection()))?;
        Ok(RtcMetadata::new(epsg, self.metadata.tags.clone()))
    }
}
