//! Item identifiers, relative orbits and acquisition times.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{OrbitDirection, Platform};

/// Number of orbits in one Sentinel-1 repeat cycle
pub const ORBITS_PER_CYCLE: i64 = 175;

const ID_SEPARATOR: &str = "_";

/// Processing level (e.g. `L1C`) from a datastrip id such as
/// `S2B_OPER_MSI_L1C_DS_SGS__20181231T210025_S20181231T190052_N02.07`.
pub fn processing_level(datastrip_id: &str) -> Result<&str> {
    datastrip_id.split('_').nth(3).ok_or_else(|| {
        Error::Parse(format!(
            "datastrip id `{}` has fewer than 4 `_`-delimited tokens",
            datastrip_id
        ))
    })
}

/// Components of a Sentinel-2 tile item id
#[derive(Debug, Clone, Copy)]
pub struct TileId<'a> {
    pub product_name: &'a str,
    pub utm_zone: u32,
    pub latitude_band: &'a str,
    pub grid_square: &'a str,
    pub date: NaiveDate,
    pub sequence: &'a str,
    pub level: &'a str,
}

/// `S2B_10SEG_20181231_0_L1C`
pub fn tile_item_id(parts: &TileId<'_>) -> Result<String> {
    let mission = parts.product_name.get(0..3).ok_or_else(|| {
        Error::Parse(format!("product name `{}` is too short", parts.product_name))
    })?;
    let tile = format!("{}{}{}", parts.utm_zone, parts.latitude_band, parts.grid_square);
    let date = parts.date.format("%Y%m%d").to_string();
    let id = [mission, tile.as_str(), date.as_str(), parts.sequence, parts.level].join(ID_SEPARATOR);
    debug!("Derived tile item id {}", id);
    Ok(id)
}

/// `S1A_20170101_10SEG_ASC`
pub fn rtc_item_id(mission_id: &str, date: &str, tile_id: &str, direction: OrbitDirection) -> String {
    let date = date.replace('-', "");
    let id = [mission_id, date.as_str(), tile_id, direction.abbreviation()].join(ID_SEPARATOR);
    debug!("Derived RTC item id {}", id);
    id
}

/// Relative orbit in `[1, 175]` for an absolute orbit number
pub fn relative_orbit(absolute_orbit: i64, platform: Platform) -> u32 {
    // widened so that any i64 minus the offset stays representable
    let shifted = i128::from(absolute_orbit) - i128::from(platform.orbit_offset());
    (shifted.rem_euclid(i128::from(ORBITS_PER_CYCLE)) + 1) as u32
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y%m%dT%H%M%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::Parse(format!("unrecognized timestamp `{}`", s)))
}

/// Item `datetime` representation: whole seconds, `Z` suffix
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Earliest and latest instant across per-scene `(start, end)` ranges
pub fn acquisition_window(
    ranges: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let instants = ranges.iter().flat_map(|(a, b)| [*a, *b]);
    let start = instants.clone().min()?;
    let end = instants.max()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn processing_level_is_fourth_token() {
        let id = "S2B_OPER_MSI_L1C_DS_SGS__20181231T210025_S20181231T190052_N02.07";
        assert_eq!(processing_level(id).unwrap(), "L1C");
        assert!(matches!(processing_level("S2B_OPER_MSI"), Err(Error::Parse(_))));
    }

    #[test]
    fn tile_item_id_joins_fields() {
        let parts = TileId {
            product_name: "S2B_MSIL1C_20181231T190109_N0207_R013_T10SEG_20181231T210025",
            utm_zone: 10,
            latitude_band: "S",
            grid_square: "EG",
            date: NaiveDate::from_ymd_opt(2018, 12, 31).unwrap(),
            sequence: "0",
            level: "L1C",
        };
        assert_eq!(tile_item_id(&parts).unwrap(), "S2B_10SEG_20181231_0_L1C");

        let short = TileId { product_name: "S2", ..parts };
        assert!(matches!(tile_item_id(&short), Err(Error::Parse(_))));
    }

    #[test]
    fn rtc_item_id_abbreviates_direction() {
        assert_eq!(
            rtc_item_id("S1A", "2017-01-01", "10SEG", OrbitDirection::Ascending),
            "S1A_20170101_10SEG_ASC"
        );
        assert_eq!(
            rtc_item_id("S1B", "2019-06-30", "10SEG", OrbitDirection::Descending),
            "S1B_20190630_10SEG_DSC"
        );
    }

    #[test]
    fn relative_orbit_is_periodic_and_bounded() {
        for platform in [Platform::S1A, Platform::S1B] {
            for abs in 0..2_000i64 {
                let rel = relative_orbit(abs, platform);
                assert!((1..=175).contains(&rel), "{} -> {}", abs, rel);
                assert_eq!(rel, relative_orbit(abs + ORBITS_PER_CYCLE, platform));
            }
        }
        assert_eq!(relative_orbit(73, Platform::S1A), 1);
        assert_eq!(relative_orbit(27, Platform::S1B), 1);
        assert_eq!(relative_orbit(14939, Platform::S1A), 167);
        // below the offset the modulo still wraps into range
        assert_eq!(relative_orbit(72, Platform::S1A), 175);
    }

    #[test]
    fn relative_orbit_handles_extreme_absolute_orbits() {
        for platform in [Platform::S1A, Platform::S1B] {
            for abs in [i64::MIN, i64::MIN + 1, -1, i64::MAX] {
                let rel = relative_orbit(abs, platform);
                assert!((1..=175).contains(&rel), "{} -> {}", abs, rel);
            }
        }
        // i64::MIN = 175 * -52704983067741577 + 167, and (167 - 73) + 1 = 95
        assert_eq!(relative_orbit(i64::MIN, Platform::S1A), 95);
    }

    #[test]
    fn timestamps_parse_with_and_without_offset() {
        let expected = Utc.with_ymd_and_hms(2018, 12, 31, 19, 1, 41).unwrap();
        let dt = parse_timestamp("2018-12-31T19:01:41.466Z").unwrap();
        assert_eq!(format_datetime(&dt), "2018-12-31T19:01:41Z");
        assert_eq!(parse_timestamp("2018-12-31T19:01:41").unwrap(), expected);
        assert_eq!(parse_timestamp("2018-12-31 19:01:41.000001").unwrap().timestamp(), expected.timestamp());
        assert!(matches!(parse_timestamp("yesterday"), Err(Error::Parse(_))));
    }

    #[test]
    fn acquisition_window_takes_global_extremes() {
        let t = |h, m| Utc.with_ymd_and_hms(2017, 1, 1, h, m, 0).unwrap();
        let ranges = [(t(14, 2), t(14, 3)), (t(14, 1), t(14, 2))];
        assert_eq!(acquisition_window(&ranges), Some((t(14, 1), t(14, 3))));
        assert_eq!(acquisition_window(&[]), None);
    }
}
