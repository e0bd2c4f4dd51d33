//! Asset binding: per-collection href layouts applied to a template's `item_assets`.
//!
//! Each collection has one static layout table. [`bind_assets`] rewrites the hrefs listed
//! in the table and then strips the template-only descriptive fields from every asset.
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Collection;

/// Descriptor fields that only make sense at the collection level
pub const STRIPPED_FIELDS: [&str; 4] = ["description", "eo:bands", "gsd", "roles"];

/// Base URL an asset path is joined onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// The base URL passed by the caller
    Own,
    /// The caller's base URL with one collection id textually replaced by another
    Sibling { from: Collection, to: Collection },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPath {
    pub key: &'static str,
    pub base: Base,
    pub path: &'static str,
}

const fn own(key: &'static str, path: &'static str) -> AssetPath {
    AssetPath { key, base: Base::Own, path }
}

const S2_L1C_LAYOUT: &[AssetPath] = &[
    own("thumbnail", "preview.jpg"),
    own("info", "tileInfo.json"),
    own("metadata", "metadata.xml"),
    own("overview", "TCI.jp2"),
    own("B01", "B01.jp2"),
    own("B02", "B02.jp2"),
    own("B03", "B03.jp2"),
    own("B04", "B04.jp2"),
    own("B05", "B05.jp2"),
    own("B06", "B06.jp2"),
    own("B07", "B07.jp2"),
    own("B08", "B08.jp2"),
    own("B8A", "B8A.jp2"),
    own("B09", "B09.jp2"),
    own("B10", "B10.jp2"),
    own("B11", "B11.jp2"),
    own("B12", "B12.jp2"),
];

const S2_L2A_LAYOUT: &[AssetPath] = &[
    AssetPath {
        key: "thumbnail",
        base: Base::Sibling {
            from: Collection::SentinelS2L2a,
            to: Collection::SentinelS2L1c,
        },
        path: "preview.jpg",
    },
    own("info", "tileInfo.json"),
    own("metadata", "metadata.xml"),
    own("overview", "qi/L2A_PVI.jp2"),
    own("visual", "R10m/TCI.jp2"),
    own("B02", "R10m/B02.jp2"),
    own("B03", "R10m/B03.jp2"),
    own("B04", "R10m/B04.jp2"),
    own("B08", "R10m/B08.jp2"),
    own("AOT", "R60m/AOT.jp2"),
    own("WVP", "R10m/WVP.jp2"),
    own("visual_20m", "R20m/TCI.jp2"),
    own("B05", "R20m/B05.jp2"),
    own("B06", "R20m/B06.jp2"),
    own("B07", "R20m/B07.jp2"),
    own("B8A", "R20m/B8A.jp2"),
    own("B11", "R20m/B11.jp2"),
    own("B12", "R20m/B12.jp2"),
    own("SCL", "R20m/SCL.jp2"),
    own("visual_60m", "R60m/TCI.jp2"),
    own("B01", "R60m/B01.jp2"),
    own("B09", "R60m/B09.jp2"),
];

const S1_RTC_LAYOUT: &[AssetPath] = &[
    own("gamma0_vv", "Gamma0_VV.tif"),
    own("gamma0_vh", "Gamma0_VH.tif"),
    own("incidence", "local_incident_angle.tif"),
];

/// The href layout of a collection
pub fn layout(collection: Collection) -> &'static [AssetPath] {
    match collection {
        Collection::SentinelS2L1c => S2_L1C_LAYOUT,
        Collection::SentinelS2L2a => S2_L2A_LAYOUT,
        Collection::SentinelS1Rtc => S1_RTC_LAYOUT,
    }
}

/// Join a relative path onto a base URL or directory.
///
/// An empty base yields the path itself, an absolute path replaces the base, and a base
/// that already ends with `/` is not given a second one.
pub fn join_href(base: &str, path: &str) -> String {
    if base.is_empty() || path.starts_with('/') {
        path.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

fn resolve_base(base: Base, base_url: &str) -> String {
    match base {
        Base::Own => base_url.to_string(),
        Base::Sibling { from, to } => base_url.replace(from.id(), to.id()),
    }
}

/// Rewrite the hrefs of `assets` for `collection` and strip the template-only fields.
///
/// Fails with [`Error::MissingAsset`] when the layout names a key the template lacks.
pub fn bind_assets(
    collection: Collection,
    mut assets: Map<String, Value>,
    base_url: &str,
) -> Result<Map<String, Value>> {
    for entry in layout(collection) {
        let descriptor = assets
            .get_mut(entry.key)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::MissingAsset {
                collection,
                key: entry.key.to_string(),
            })?;
        let href = join_href(&resolve_base(entry.base, base_url), entry.path);
        descriptor.insert("href".into(), Value::String(href));
    }

    for descriptor in assets.values_mut() {
        if let Some(fields) = descriptor.as_object_mut() {
            for field in STRIPPED_FIELDS {
                fields.remove(field);
            }
        }
    }
    debug!("Bound {} asset(s) for {}", assets.len(), collection);
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::collections::get_collection;
    use serde_json::json;

    #[test]
    fn layouts_and_templates_are_in_lockstep() {
        for c in Collection::ALL {
            let assets = get_collection(c).unwrap().item_assets();
            let mut table: Vec<&str> = layout(c).iter().map(|a| a.key).collect();
            let mut template: Vec<&str> = assets.keys().map(String::as_str).collect();
            table.sort_unstable();
            template.sort_unstable();
            assert_eq!(table, template, "layout/template mismatch for {}", c);
        }
    }

    #[test]
    fn join_follows_path_semantics() {
        assert_eq!(join_href("", "B01.jp2"), "B01.jp2");
        assert_eq!(join_href("s3://bucket/tiles", "B01.jp2"), "s3://bucket/tiles/B01.jp2");
        assert_eq!(join_href("s3://bucket/tiles/", "R10m/B02.jp2"), "s3://bucket/tiles/R10m/B02.jp2");
        assert_eq!(join_href("s3://bucket", "/abs/x.tif"), "/abs/x.tif");
    }

    #[test]
    fn l2a_thumbnail_points_at_l1c() {
        let base = "https://roda.sentinel-hub.com/sentinel-s2-l2a/tiles/10/S/EG/2018/12/31/0";
        let template = get_collection(Collection::SentinelS2L2a).unwrap().item_assets();
        let assets = bind_assets(Collection::SentinelS2L2a, template, base).unwrap();
        assert_eq!(
            assets["thumbnail"]["href"],
            "https://roda.sentinel-hub.com/sentinel-s2-l1c/tiles/10/S/EG/2018/12/31/0/preview.jpg"
        );
        assert_eq!(assets["B02"]["href"], format!("{}/R10m/B02.jp2", base));
    }

    #[test]
    fn stripped_fields_are_removed_everywhere() {
        let mut template = get_collection(Collection::SentinelS2L1c).unwrap().item_assets();
        template.insert("extra".into(), json!({"href": "keep.txt", "roles": ["x"], "title": "Extra"}));
        let assets = bind_assets(Collection::SentinelS2L1c, template, "").unwrap();
        for (key, descriptor) in &assets {
            for field in STRIPPED_FIELDS {
                assert!(descriptor.get(field).is_none(), "{} kept {}", key, field);
            }
        }
        assert_eq!(assets["extra"]["href"], "keep.txt");
        assert_eq!(assets["B8A"]["href"], "B8A.jp2");
        assert!(assets["B8A"].get("title").is_some());
    }

    #[test]
    fn missing_template_key_is_reported() {
        let mut template = get_collection(Collection::SentinelS1Rtc).unwrap().item_assets();
        template.remove("gamma0_vh");
        match bind_assets(Collection::SentinelS1Rtc, template, "") {
            Err(Error::MissingAsset { key, .. }) => assert_eq!(key, "gamma0_vh"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
