//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, JSON, XML, geometry and GDAL errors, and provides semantic
//! variants for missing fields, unknown codes and malformed values.
use thiserror::Error;

use crate::types::Collection;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] crate::core::geometry::GeometryError),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field `{0}` in metadata")]
    MissingField(String),

    #[error("Collection {collection} template has no asset `{key}`")]
    MissingAsset { collection: Collection, key: String },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown platform code: {0}")]
    UnknownPlatform(String),

    #[error("Unknown orbit direction: {0}")]
    UnknownOrbitDirection(String),

    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}

/// Coarse classification of failures
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Bad or missing CRS, empty coordinates, unmatched tile
    Geometry,
    /// Malformed identifier-bearing strings, timestamps, documents
    Parse,
    /// Missing field, missing template asset, unrecognized code
    Key,
    /// Unexpected value for a known field
    Value,
    /// Filesystem, raster access and caller arguments
    Io,
}

impl Error {
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Error::InvalidValue {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Geometry(_) => ErrorKind::Geometry,
            Error::Parse(_) | Error::Json(_) | Error::Xml(_) => ErrorKind::Parse,
            Error::MissingField(_)
            | Error::MissingAsset { .. }
            | Error::UnknownCollection(_)
            | Error::UnknownPlatform(_)
            | Error::UnknownOrbitDirection(_) => ErrorKind::Key,
            Error::InvalidValue { .. } => ErrorKind::Value,
            Error::Io(_) | Error::Gdal(_) | Error::InvalidArgument { .. } => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::GeometryError;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::missing("timestamp").kind(), ErrorKind::Key);
        assert_eq!(Error::UnknownPlatform("S1C".into()).kind(), ErrorKind::Key);
        assert_eq!(Error::invalid("cloudyPixelPercentage", "n/a").kind(), ErrorKind::Value);
        assert_eq!(Error::Parse("datastrip".into()).kind(), ErrorKind::Parse);
        assert_eq!(
            Error::from(GeometryError::EmptyCoordinates).kind(),
            ErrorKind::Geometry
        );
        let unsupported = Error::InvalidArgument {
            arg: "input",
            value: "tile.png".into(),
        };
        assert_eq!(unsupported.kind(), ErrorKind::Io);
        assert_eq!(unsupported.to_string(), "Invalid argument: input=tile.png");
    }

    #[test]
    fn messages_name_the_field() {
        let e = Error::MissingAsset {
            collection: Collection::SentinelS2L2a,
            key: "SCL".into(),
        };
        assert_eq!(e.to_string(), "Collection sentinel-s2-l2a template has no asset `SCL`");
    }
}
