//! Item persistence.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::item::Item;
use crate::error::Result;

/// Write `item` as pretty JSON to `<dir>/<id>.json`, creating `dir` if needed
pub fn save_item(item: &Item, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", item.id));
    let json = serde_json::to_string_pretty(item)?;
    fs::write(&path, json)?;
    info!("Saved item {} to {:?}", item.id, path);
    Ok(path)
}

/// Read an item back from a JSON file
pub fn load_item(path: &Path) -> Result<Item> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Bbox, Footprint};
    use crate::core::properties::Properties;
    use crate::types::Collection;
    use geo::polygon;

    #[test]
    fn saves_under_item_id() {
        let footprint = Footprint {
            polygon: polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0)],
            bbox: Bbox::from([0.0, 0.0, 2.0, 2.0]),
        };
        let item = Item::new(
            Collection::SentinelS1Rtc,
            "S1A_20170101_10SEG_ASC".into(),
            &footprint,
            Properties::new(),
        );
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("items");
        let path = save_item(&item, &out).unwrap();
        assert_eq!(path, out.join("S1A_20170101_10SEG_ASC.json"));
        assert_eq!(load_item(&path).unwrap(), item);
    }
}
