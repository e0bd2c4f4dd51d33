use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::PropertyMapping;

/// Transform parameters suitable for config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    /// Root URL (or directory) asset hrefs are joined onto
    pub base_url: String,
    pub mapping: PropertyMapping,
    /// External reference grid; the bundled sample grid is used when unset
    pub grid_path: Option<PathBuf>,
    /// Read `metadata.xml` beside a tile info file for sun angles
    pub sun_angles: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            mapping: PropertyMapping::Tolerant,
            grid_path: None,
            sun_angles: true,
        }
    }
}

impl TransformParams {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Loading transform parameters from {:?}", path.as_ref());
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
