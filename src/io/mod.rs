//! I/O layer: readers for Sentinel-2 tile info and tile metadata XML, Sentinel-1 RTC
//! tags (GDAL-backed or JSON sidecar), the bundled collection templates, and `writers`
//! for persisting items.
pub mod angles;
pub mod collections;
pub mod rtc;
pub mod tileinfo;

pub mod gdal;
pub use gdal::{GdalError, RasterTagReader, RasterTags};

pub mod writers;
