#![doc = r#"
stac-sentinel — Sentinel-1 RTC and Sentinel-2 tile metadata to STAC Items.

This crate turns the metadata that accompanies Sentinel products (the `tileInfo.json`
sidecar of a Sentinel-2 tile, the GeoTIFF tags of a Sentinel-1 RTC tile) into STAC Items:
geometry reprojected to EPSG:4326, convex-hull footprints and bounding boxes, stable item
ids, normalized properties, and asset hrefs rooted at a caller-supplied base URL. It powers
the `stac-sentinel` CLI and can be embedded in your own Rust applications.

Stability
---------
The public library API is experimental in initial releases and may evolve as the crate
stabilizes. Breaking changes can occur.

Requirements
------------
- GDAL development headers and runtime available on your system (reprojection and
  GeoTIFF tag reading).
- Rust 2024 edition toolchain.

Quick start: Sentinel-2 tile info to an item
--------------------------------------------
```rust,no_run
use std::path::Path;
use stac_sentinel::{sentinel_s2_l1c, PropertyMapping, TileInfo};

fn main() -> stac_sentinel::Result<()> {
    let info = TileInfo::from_path(Path::new("/data/tiles/10/S/EG/2018/12/31/0/tileInfo.json"))?;
    let item = sentinel_s2_l1c(
        &info,
        "https://roda.sentinel-hub.com/sentinel-s2-l1c/tiles/10/S/EG/2018/12/31/0",
        PropertyMapping::Tolerant,
    )?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}
```

Collection-generic transform from a file
----------------------------------------
```rust,no_run
use std::path::Path;
use stac_sentinel::{transform_path, Collection, TransformParams};

fn main() -> stac_sentinel::Result<()> {
    let params = TransformParams {
        base_url: "s3://sentinel-s1-rtc-indigo/tiles/RTC/1/IW/10/S/EG/2017/S1A_20170101_10SEG_ASC".into(),
        ..TransformParams::default()
    };
    let item = transform_path(Collection::SentinelS1Rtc, Path::new("/data/Gamma0_VV.tif"), &params)?;
    assert_eq!(item.id, "S1A_20170101_10SEG_ASC");
    Ok(())
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use stac_sentinel::{transform_directory_to_path, Collection, TransformParams};

fn main() -> stac_sentinel::Result<()> {
    let report = transform_directory_to_path(
        Collection::SentinelS2L2a,
        Path::new("/data/sentinel-s2-l2a/tiles"),
        Path::new("/out/items"),
        &TransformParams::default(),
        true, // continue_on_error
    )?;
    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `stac_sentinel::Result<T>`; match on `stac_sentinel::Error` to
handle specific cases, or use [`Error::kind`] for the coarse geometry / parse / key / value
classification.

```rust,no_run
use stac_sentinel::{rtc_item_id, Error, OrbitDirection};

fn main() {
    match OrbitDirection::parse("Ascending") {
        Ok(direction) => println!("{}", rtc_item_id("S1A", "2017-01-01", "10SEG", direction)),
        Err(Error::UnknownOrbitDirection(value)) => eprintln!("unrecognized direction {value}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`core`] — geometry, grid, identifiers, properties, asset binding and item assembly.
- [`types`] — enums such as `Collection`, `PropertyMapping`, `OrbitDirection`, `Platform`.
- [`io`] — tile info, RTC tag and GDAL readers, collection templates, item writers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::item::Item;
pub use core::params::TransformParams;
pub use error::{Error, ErrorKind, Result};
pub use types::{Collection, OrbitDirection, Platform, PropertyMapping};

// Building blocks
pub use core::geometry::{Bbox, Footprint, GeometryError};
pub use core::grid::GridIndex;
pub use core::ident::{relative_orbit, rtc_item_id};

// Readers
pub use io::collections::{CollectionTemplate, get_collection};
pub use io::gdal::{GdalError, RasterTagReader, RasterTags};
pub use io::rtc::{RtcMetadata, SceneMetadata};
pub use io::tileinfo::TileInfo;

// High-level API re-exports
pub use api::{
    BatchReport, RawMetadata, load_grid, load_metadata, sentinel_s1_rtc, sentinel_s2_l1c,
    sentinel_s2_l2a, transform, transform_directory_to_path, transform_path,
};
