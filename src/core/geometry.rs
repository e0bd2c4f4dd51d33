//! Geometry resolution for items: reprojection of native tile coordinates into
//! EPSG:4326, convex-hull footprints and bounding boxes, plus the grid-cell/scene
//! overlap used for the RTC tiles.
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use geo::{BooleanOps, BoundingRect, ConvexHull, Coord, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// EPSG code of the geographic CRS all item geometries are expressed in
pub const WGS84_EPSG: u32 = 4326;

/// Errors raised while resolving item geometry
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Unresolvable CRS: {0}")]
    UnknownCrs(String),
    #[error("Empty coordinate array")]
    EmptyCoordinates,
    #[error("No reference grid entry for tile {0}")]
    UnknownTile(String),
    #[error("Tile {0} does not overlap any scene footprint")]
    EmptyFootprint(String),
    #[error("Invalid geometry: {0}")]
    Invalid(String),
    #[error("Coordinate transform failed: {0}")]
    Transform(#[from] gdal::errors::GdalError),
}

/// Axis-aligned bounds `[min_lon, min_lat, max_lon, max_lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct Bbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bbox {
    /// Coordinate-wise min/max; `None` for an empty slice
    pub fn from_coords(coords: &[Coord<f64>]) -> Option<Self> {
        let first = coords.first()?;
        let init = Bbox {
            min_lon: first.x,
            min_lat: first.y,
            max_lon: first.x,
            max_lat: first.y,
        };
        Some(coords.iter().skip(1).fold(init, |b, c| Bbox {
            min_lon: b.min_lon.min(c.x),
            min_lat: b.min_lat.min(c.y),
            max_lon: b.max_lon.max(c.x),
            max_lat: b.max_lat.max(c.y),
        }))
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        Bbox {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, c: &Coord<f64>) -> bool {
        c.x >= self.min_lon && c.x <= self.max_lon && c.y >= self.min_lat && c.y <= self.max_lat
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl From<Bbox> for [f64; 4] {
    fn from(b: Bbox) -> Self {
        b.to_array()
    }
}

impl From<[f64; 4]> for Bbox {
    fn from(a: [f64; 4]) -> Self {
        Bbox {
            min_lon: a[0],
            min_lat: a[1],
            max_lon: a[2],
            max_lat: a[3],
        }
    }
}

/// Resolved item geometry: a lon/lat polygon and its bbox
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub polygon: Polygon<f64>,
    pub bbox: Bbox,
}

impl Footprint {
    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.polygon))
    }
}

/// Extract the EPSG code from a CRS name such as `urn:ogc:def:crs:EPSG:8.8.1:32610`
/// or `EPSG:32610` (the last `:`-delimited token).
pub fn parse_epsg(crs_name: &str) -> Result<u32, GeometryError> {
    crs_name
        .rsplit(':')
        .next()
        .and_then(|code| code.trim().parse::<u32>().ok())
        .ok_or_else(|| GeometryError::UnknownCrs(crs_name.to_string()))
}

/// EPSG spatial reference with x = lon/easting, y = lat/northing
fn spatial_ref(epsg: u32) -> Result<SpatialRef, GeometryError> {
    let mut srs = SpatialRef::from_epsg(epsg)
        .map_err(|_| GeometryError::UnknownCrs(format!("EPSG:{}", epsg)))?;
    srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    Ok(srs)
}

/// Reproject coordinates between two EPSG coordinate reference systems
pub fn reproject(
    coords: &[Coord<f64>],
    from_epsg: u32,
    to_epsg: u32,
) -> Result<Vec<Coord<f64>>, GeometryError> {
    if coords.is_empty() {
        return Err(GeometryError::EmptyCoordinates);
    }
    let source = spatial_ref(from_epsg)?;
    let target = spatial_ref(to_epsg)?;
    let transform = CoordTransform::new(&source, &target)?;

    let mut xs: Vec<f64> = coords.iter().map(|c| c.x).collect();
    let mut ys: Vec<f64> = coords.iter().map(|c| c.y).collect();
    let mut zs: [f64; 0] = [];
    transform.transform_coords(&mut xs, &mut ys, &mut zs)?;

    Ok(xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| Coord { x, y })
        .collect())
}

/// Convex hull of a set of lon/lat coordinates
pub fn convex_hull(coords: &[Coord<f64>]) -> Polygon<f64> {
    Polygon::new(LineString::from(coords.to_vec()), vec![]).convex_hull()
}

/// Footprint of a tile whose valid-data ring is given in a native (projected) CRS.
///
/// The bbox spans every reprojected vertex; the geometry is their convex hull.
pub fn tile_footprint(native_ring: &[Coord<f64>], epsg: u32) -> Result<Footprint, GeometryError> {
    let lonlat = reproject(native_ring, epsg, WGS84_EPSG)?;
    let bbox = Bbox::from_coords(&lonlat).ok_or(GeometryError::EmptyCoordinates)?;
    let polygon = convex_hull(&lonlat);
    debug!("Tile footprint from EPSG:{} ring: bbox={:?}", epsg, bbox.to_array());
    Ok(Footprint { polygon, bbox })
}

/// Footprint of a grid tile covered by one or more scenes.
///
/// The geometry is the convex hull of `cell ∩ (∪ scenes)`, while the bbox is taken from
/// the full grid cell.
pub fn grid_footprint(
    tile_id: &str,
    cell: &Polygon<f64>,
    scenes: &[MultiPolygon<f64>],
) -> Result<Footprint, GeometryError> {
    if scenes.is_empty() {
        return Err(GeometryError::EmptyCoordinates);
    }
    let cell_rect = cell
        .bounding_rect()
        .ok_or_else(|| GeometryError::Invalid(format!("grid cell {} has no extent", tile_id)))?;

    let coverage = scenes
        .iter()
        .fold(MultiPolygon::<f64>::new(vec![]), |acc, scene| acc.union(scene));
    let overlap = cell.intersection(&coverage);
    if overlap.0.is_empty() {
        return Err(GeometryError::EmptyFootprint(tile_id.to_string()));
    }

    let polygon = overlap.convex_hull();
    debug!(
        "Grid footprint for {}: {} scene(s), {} overlap part(s)",
        tile_id,
        scenes.len(),
        overlap.0.len()
    );
    Ok(Footprint {
        polygon,
        bbox: Bbox::from_rect(cell_rect),
    })
}

/// Convert a GeoJSON geometry into a multipolygon; only areal geometries are accepted.
pub fn areal_geometry(geometry: geojson::Geometry) -> Result<MultiPolygon<f64>, GeometryError> {
    let geom: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|e: geojson::Error| GeometryError::Invalid(e.to_string()))?;
    match geom {
        geo::Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p])),
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::GeometryCollection(gc) => {
            let polygons: Vec<Polygon<f64>> = gc
                .into_iter()
                .filter_map(|g| match g {
                    geo::Geometry::Polygon(p) => Some(vec![p]),
                    geo::Geometry::MultiPolygon(mp) => Some(mp.0),
                    _ => None,
                })
                .flatten()
                .collect();
            if polygons.is_empty() {
                Err(GeometryError::Invalid("geometry collection without polygons".into()))
            } else {
                Ok(MultiPolygon::new(polygons))
            }
        }
        _ => Err(GeometryError::Invalid("expected Polygon or MultiPolygon".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, CoordsIter, coord, polygon};

    const EPS_DEG: f64 = 1e-6;

    fn tile_ring() -> Vec<Coord<f64>> {
        vec![
            coord! { x: 499980.0, y: 4200000.0 },
            coord! { x: 609780.0, y: 4200000.0 },
            coord! { x: 609780.0, y: 4090200.0 },
            coord! { x: 545326.0, y: 4090200.0 },
            coord! { x: 499980.0, y: 4151118.0 },
            coord! { x: 499980.0, y: 4200000.0 },
        ]
    }

    #[test]
    fn parse_epsg_takes_last_token() {
        assert_eq!(parse_epsg("urn:ogc:def:crs:EPSG:8.8.1:32610").unwrap(), 32610);
        assert_eq!(parse_epsg("EPSG:4326").unwrap(), 4326);
        assert!(matches!(parse_epsg("urn:ogc:def:crs:OGC:CRS84"), Err(GeometryError::UnknownCrs(_))));
    }

    #[test]
    fn reproject_utm_corner_to_lon_lat() {
        let out = reproject(&[coord! { x: 499980.0, y: 4200000.0 }], 32610, WGS84_EPSG).unwrap();
        assert!((out[0].x - -123.000227635).abs() < EPS_DEG);
        assert!((out[0].y - 37.947589572).abs() < EPS_DEG);
    }

    #[test]
    fn reprojection_round_trips() {
        let ring = tile_ring();
        let lonlat = reproject(&ring, 32610, WGS84_EPSG).unwrap();
        let back = reproject(&lonlat, WGS84_EPSG, 32610).unwrap();
        for (a, b) in ring.iter().zip(&back) {
            assert!((a.x - b.x).abs() < 1e-3, "{:?} vs {:?}", a, b);
            assert!((a.y - b.y).abs() < 1e-3, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn reproject_rejects_empty_and_unknown_crs() {
        assert!(matches!(reproject(&[], 32610, WGS84_EPSG), Err(GeometryError::EmptyCoordinates)));
        assert!(matches!(
            reproject(&[coord! { x: 0.0, y: 0.0 }], 999_999, WGS84_EPSG),
            Err(GeometryError::UnknownCrs(_))
        ));
    }

    #[test]
    fn tile_bbox_contains_footprint() {
        let fp = tile_footprint(&tile_ring(), 32610).unwrap();
        for c in fp.polygon.exterior().coords() {
            assert!(fp.bbox.contains(c), "{:?} outside {:?}", c, fp.bbox);
        }
        // the ring is convex, so all five distinct vertices survive the hull
        assert_eq!(fp.polygon.exterior().coords_count(), 6);
    }

    #[test]
    fn grid_footprint_uses_cell_bounds_and_overlap_geometry() {
        let cell = polygon![
            (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0),
        ];
        let west = MultiPolygon::new(vec![polygon![
            (x: -5.0, y: -5.0), (x: 4.0, y: -5.0), (x: 4.0, y: 15.0), (x: -5.0, y: 15.0), (x: -5.0, y: -5.0),
        ]]);
        let middle = MultiPolygon::new(vec![polygon![
            (x: 3.0, y: 2.0), (x: 6.0, y: 2.0), (x: 6.0, y: 8.0), (x: 3.0, y: 8.0), (x: 3.0, y: 2.0),
        ]]);
        let fp = grid_footprint("T1", &cell, &[west, middle]).unwrap();

        assert_eq!(fp.bbox.to_array(), [0.0, 0.0, 10.0, 10.0]);
        // hull of [0,4]x[0,10] ∪ [4,6]x[2,8]
        let expected = 40.0 + 0.5 * (10.0 + 6.0) * 2.0;
        assert!((fp.polygon.unsigned_area() - expected).abs() < 1e-9);
        for c in fp.polygon.exterior().coords() {
            assert!(fp.bbox.contains(c));
        }
    }

    #[test]
    fn grid_footprint_without_overlap_fails() {
        let cell = polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0),
        ];
        let far = MultiPolygon::new(vec![polygon![
            (x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0), (x: 5.0, y: 6.0), (x: 5.0, y: 5.0),
        ]]);
        assert!(matches!(
            grid_footprint("T2", &cell, &[far]),
            Err(GeometryError::EmptyFootprint(_))
        ));
        assert!(matches!(
            grid_footprint("T2", &cell, &[]),
            Err(GeometryError::EmptyCoordinates)
        ));
    }

    #[test]
    fn areal_geometry_accepts_polygons_only() {
        let poly: geojson::Geometry =
            r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#.parse().unwrap();
        assert_eq!(areal_geometry(poly).unwrap().0.len(), 1);

        let point: geojson::Geometry = r#"{"type":"Point","coordinates":[0,0]}"#.parse().unwrap();
        assert!(matches!(areal_geometry(point), Err(GeometryError::Invalid(_))));
    }

    #[test]
    fn bbox_serializes_as_array() {
        let b = Bbox::from([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1.0,2.0,3.0,4.0]");
    }
}
