//! Bundled STAC collection documents, one per supported collection.
//!
//! The documents are embedded at compile time and parsed once; callers always receive a
//! fresh copy of a template's `item_assets`.
use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::Collection;

fn bundled_source(collection: Collection) -> &'static str {
    match collection {
        Collection::SentinelS2L1c => {
            include_str!("../../resources/collections/sentinel-s2-l1c.json")
        }
        Collection::SentinelS2L2a => {
            include_str!("../../resources/collections/sentinel-s2-l2a.json")
        }
        Collection::SentinelS1Rtc => {
            include_str!("../../resources/collections/sentinel-s1-rtc.json")
        }
    }
}

static TEMPLATES: Lazy<HashMap<Collection, std::result::Result<CollectionTemplate, String>>> =
    Lazy::new(|| {
        Collection::ALL
            .into_iter()
            .map(|c| {
                let parsed = CollectionTemplate::from_json_str(c, bundled_source(c))
                    .map_err(|e| e.to_string());
                (c, parsed)
            })
            .collect()
    });

/// A STAC collection document with an `item_assets` table
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionTemplate {
    pub collection: Collection,
    pub document: Value,
}

impl CollectionTemplate {
    pub fn from_json_str(collection: Collection, text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        if !document.get("item_assets").is_some_and(Value::is_object) {
            return Err(Error::missing(format!("{}.item_assets", collection)));
        }
        Ok(CollectionTemplate {
            collection,
            document,
        })
    }

    /// Copy of the asset descriptors keyed by asset name
    pub fn item_assets(&self) -> Map<String, Value> {
        self.document
            .get("item_assets")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}

/// Get the bundled template for a collection
pub fn get_collection(collection: Collection) -> Result<&'static CollectionTemplate> {
    match TEMPLATES.get(&collection) {
        Some(Ok(template)) => Ok(template),
        Some(Err(e)) => Err(Error::Parse(format!("collection {}: {}", collection, e))),
        None => Err(Error::UnknownCollection(collection.to_string())),
    }
}
