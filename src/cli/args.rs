use clap::Parser;
use std::path::PathBuf;

use stac_sentinel::{Collection, PropertyMapping};

#[derive(Parser)]
#[command(name = "stac-sentinel", version, about = "Sentinel metadata to STAC Items")]
pub struct CliArgs {
    /// Collection ID (sentinel-s2-l1c, sentinel-s2-l2a or sentinel-s1-rtc)
    #[arg(value_enum)]
    pub collection: Collection,

    /// Input metadata file: tileInfo.json, or an RTC GeoTIFF / JSON tag sidecar (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory searched recursively for metadata files (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Base URL asset hrefs are joined onto
    #[arg(long)]
    pub base_url: Option<String>,

    /// Save Items as <id>.json files to this folder instead of printing them
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// JSON file with transform parameters; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Handling of absent coverage/cloud fields (tolerant or strict)
    #[arg(long, value_enum)]
    pub mapping: Option<PropertyMapping>,

    /// Reference grid GeoJSON (tile id in property `Name`) for RTC footprints
    #[arg(long)]
    pub grid: Option<PathBuf>,

    /// Do not read metadata.xml for sun angles
    #[arg(long, default_value_t = false)]
    pub no_sun_angles: bool,

    /// Enable logging (RUST_LOG overrides the level)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
