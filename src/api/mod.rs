//! High-level, ergonomic library API: one transform per collection, a collection-generic
//! `transform`, loaders that turn files into raw metadata, and batch helpers for
//! directories. Prefer these entrypoints over the `core` building blocks when
//! integrating stac-sentinel.
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::assets::join_href;
use crate::core::grid::GridIndex;
use crate::core::item::{Item, rtc_item, tile_item};
use crate::core::params::TransformParams;
use crate::error::{Error, Result};
use crate::io::angles::read_sun_angles;
use crate::io::gdal::RasterTagReader;
use crate::io::rtc::RtcMetadata;
use crate::io::tileinfo::TileInfo;
use crate::io::writers::save_item;
use crate::types::{Collection, PropertyMapping};

/// File name of the Sentinel-2 tile info sidecar
pub const TILE_INFO_FILE: &str = "tileInfo.json";
/// File name of the Sentinel-2 tile-level XML metadata
pub const TILE_METADATA_FILE: &str = "metadata.xml";
/// Backscatter raster whose tags describe an RTC tile
pub const RTC_TAGGED_RASTER: &str = "Gamma0_VV.tif";

/// Raw product metadata, one variant per product family
#[derive(Debug, Clone, PartialEq)]
pub enum RawMetadata {
    Tile(TileInfo),
    Rtc(RtcMetadata),
}

impl From<TileInfo> for RawMetadata {
    fn from(info: TileInfo) -> Self {
        RawMetadata::Tile(info)
    }
}

impl From<RtcMetadata> for RawMetadata {
    fn from(meta: RtcMetadata) -> Self {
        RawMetadata::Rtc(meta)
    }
}

/// Sentinel-2 Level-1C item
pub fn sentinel_s2_l1c(info: &TileInfo, base_url: &str, mapping: PropertyMapping) -> Result<Item> {
    tile_item(Collection::SentinelS2L1c, info, mapping)?.with_assets(base_url)
}

/// Sentinel-2 Level-2A item; its thumbnail links to the Level-1C preview
pub fn sentinel_s2_l2a(info: &TileInfo, base_url: &str, mapping: PropertyMapping) -> Result<Item> {
    tile_item(Collection::SentinelS2L2a, info, mapping)?.with_assets(base_url)
}

/// Sentinel-1 RTC item, with its footprint clipped to the tile's cell in `grid`
pub fn sentinel_s1_rtc(meta: &RtcMetadata, base_url: &str, grid: &GridIndex) -> Result<Item> {
    rtc_item(meta, grid)?.with_assets(base_url)
}

/// Load the reference grid named by `params`, or the bundled grid
pub fn load_grid(params: &TransformParams) -> Result<Cow<'static, GridIndex>> {
    match &params.grid_path {
        Some(path) => Ok(Cow::Owned(GridIndex::from_path(path)?)),
        None => Ok(Cow::Borrowed(GridIndex::bundled()?)),
    }
}

/// Transform raw metadata into an item of `collection`
pub fn transform(
    collection: Collection,
    metadata: &RawMetadata,
    base_url: &str,
    params: &TransformParams,
) -> Result<Item> {
    transform_with_grid(collection, metadata, base_url, params, None)
}

fn transform_with_grid(
    collection: Collection,
    metadata: &RawMetadata,
    base_url: &str,
    params: &TransformParams,
    grid: Option<&GridIndex>,
) -> Result<Item> {
    match (collection, metadata) {
        (Collection::SentinelS2L1c, RawMetadata::Tile(info)) => {
            sentinel_s2_l1c(info, base_url, params.mapping)
        }
        (Collection::SentinelS2L2a, RawMetadata::Tile(info)) => {
            sentinel_s2_l2a(info, base_url, params.mapping)
        }
        (Collection::SentinelS1Rtc, RawMetadata::Rtc(meta)) => match grid {
            Some(grid) => sentinel_s1_rtc(meta, base_url, grid),
            None => sentinel_s1_rtc(meta, base_url, &*load_grid(params)?),
        },
        (collection, RawMetadata::Tile(_)) => Err(Error::invalid(
            "metadata",
            format!("Sentinel-2 tile info cannot produce a {} item", collection),
        )),
        (collection, RawMetadata::Rtc(_)) => Err(Error::invalid(
            "metadata",
            format!("RTC tags cannot produce a {} item", collection),
        )),
    }
}

/// Load raw metadata for `collection` from a file.
///
/// Optical inputs are `tileInfo.json` files; a `metadata.xml` in the same directory adds
/// sun angles when `params.sun_angles` is set. Radar inputs are either a tagged GeoTIFF
/// (read through GDAL) or a JSON sidecar holding the same tags.
pub fn load_metadata(collection: Collection, input: &Path, params: &TransformParams) -> Result<RawMetadata> {
    if collection.is_optical() {
        let info = TileInfo::from_path(input)?;
        let angles = if params.sun_angles {
            read_sun_angles(input.with_file_name(TILE_METADATA_FILE))?
        } else {
            None
        };
        return Ok(info.with_sun_angles(angles).into());
    }

    match extension(input).as_deref() {
        Some("json") => Ok(RtcMetadata::from_path(input)?.into()),
        Some("tif" | "tiff") => {
            let reader = RasterTagReader::open(input)?;
            Ok(reader.rtc_metadata()?.into())
        }
        _ => Err(Error::InvalidArgument {
            arg: "input",
            value: input.display().to_string(),
        }),
    }
}

/// Load metadata from `input` and transform it
pub fn transform_path(collection: Collection, input: &Path, params: &TransformParams) -> Result<Item> {
    let metadata = load_metadata(collection, input, params)?;
    transform(collection, &metadata, &params.base_url, params)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Batch processing report
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Whether a file holds item metadata for `collection`: `tileInfo.json` for optical tiles,
/// `Gamma0_VV.tif` or a JSON tag sidecar for RTC tiles.
fn is_metadata_file(collection: Collection, path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if collection.is_optical() {
        name == TILE_INFO_FILE
    } else if name == RTC_TAGGED_RASTER {
        true
    } else {
        extension(path).as_deref() == Some("json") && RtcMetadata::is_sidecar(path)
    }
}

/// Recursively list the metadata files for `collection` under `input_dir`, sorted by path.
///
/// Returns the candidates and the number of other files that were passed over.
pub fn iterate_metadata_files(collection: Collection, input_dir: &Path) -> Result<(Vec<PathBuf>, usize)> {
    let mut files = Vec::new();
    let mut passed_over = 0;
    let mut pending = vec![input_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_metadata_file(collection, &path) {
                files.push(path);
            } else {
                passed_over += 1;
            }
        }
    }
    files.sort();
    Ok((files, passed_over))
}

/// Base URL of one file in a batch: `base_url` joined with the file's directory relative
/// to the batch root.
pub fn batch_base_url(base_url: &str, input_dir: &Path, file: &Path) -> String {
    let relative = file
        .parent()
        .and_then(|p| p.strip_prefix(input_dir).ok())
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();
    if relative.is_empty() {
        base_url.to_string()
    } else {
        join_href(base_url, &relative)
    }
}

/// Transform every metadata file under `input_dir` and save the items into `output_dir`.
/// If `continue_on_error` is true, errors are counted in the report and processing
/// continues; otherwise, the first error is returned.
pub fn transform_directory_to_path(
    collection: Collection,
    input_dir: &Path,
    output_dir: &Path,
    params: &TransformParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;
    let grid = if collection.is_optical() {
        None
    } else {
        Some(load_grid(params)?)
    };

    let (files, skipped) = iterate_metadata_files(collection, input_dir)?;
    let mut report = BatchReport {
        skipped,
        ..BatchReport::default()
    };
    info!(
        "Found {} {} metadata file(s) under {:?}",
        files.len(),
        collection,
        input_dir
    );

    for path in files {
        let base_url = batch_base_url(&params.base_url, input_dir, &path);
        let result = load_metadata(collection, &path, params).and_then(|metadata| {
            let item = transform_with_grid(collection, &metadata, &base_url, params, grid.as_deref())?;
            save_item(&item, output_dir)
        });
        match result {
            Ok(saved) => {
                debug!("{:?} -> {:?}", path, saved);
                report.processed += 1;
            }
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_base_url_appends_relative_directory() {
        let root = Path::new("/data/tiles");
        let file = Path::new("/data/tiles/10/S/EG/2018/12/31/0/tileInfo.json");
        assert_eq!(
            batch_base_url("s3://sentinel-s2-l1c/tiles", root, file),
            "s3://sentinel-s2-l1c/tiles/10/S/EG/2018/12/31/0"
        );
        assert_eq!(
            batch_base_url("", root, Path::new("/data/tiles/tileInfo.json")),
            ""
        );
    }

    #[test]
    fn metadata_files_per_family() {
        let dir = tempfile::tempdir().unwrap();
        let tile = dir.path().join("10/S/EG/0");
        std::fs::create_dir_all(&tile).unwrap();
        for name in [TILE_INFO_FILE, TILE_METADATA_FILE, RTC_TAGGED_RASTER, "Gamma0_VH.tif"] {
            std::fs::write(tile.join(name), b"").unwrap();
        }
        let sidecar = tile.join("S1A_20170101_10SEG_ASC.json");
        std::fs::write(&sidecar, r#"{"epsg": 32610, "tags": {"MISSION_ID": "S1A"}}"#).unwrap();
        std::fs::write(tile.join("S1A_20161231_10SEG_ASC.json"), r#"{"type": "Feature"}"#).unwrap();

        let (optical, skipped) = iterate_metadata_files(Collection::SentinelS2L1c, dir.path()).unwrap();
        assert_eq!(optical, vec![tile.join(TILE_INFO_FILE)]);
        assert_eq!(skipped, 5);

        // JSON without a tags object (tile info, saved items) is passed over
        let (radar, skipped) = iterate_metadata_files(Collection::SentinelS1Rtc, dir.path()).unwrap();
        assert_eq!(radar, vec![tile.join(RTC_TAGGED_RASTER), sidecar]);
        assert_eq!(skipped, 4);
    }

    #[test]
    fn mismatched_metadata_is_a_value_error() {
        let meta = RtcMetadata::new(32610, Default::default());
        let err = transform(
            Collection::SentinelS2L1c,
            &RawMetadata::Rtc(meta),
            "",
            &TransformParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn unsupported_radar_input_is_rejected() {
        let err = load_metadata(
            Collection::SentinelS1Rtc,
            Path::new("/data/tile.png"),
            &TransformParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
