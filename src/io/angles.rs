//! Mean sun angles from Sentinel-2 tile-level XML metadata (`metadata.xml`, MTD_TL).
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Mean solar angles over a tile, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunAngles {
    pub zenith: f64,
    pub azimuth: f64,
}

impl SunAngles {
    pub fn elevation(&self) -> f64 {
        90.0 - self.zenith
    }
}

/// Read sun angles from a tile metadata file if it exists.
///
/// A missing file yields `Ok(None)`; a file without a `Mean_Sun_Angle` block also yields
/// `Ok(None)` and logs a warning.
pub fn read_sun_angles<P: AsRef<Path>>(path: P) -> Result<Option<SunAngles>> {
    let path = path.as_ref();
    if !path.is_file() {
        debug!("No tile metadata at {:?}", path);
        return Ok(None);
    }
    let xml = std::fs::read_to_string(path)?;
    let angles = parse_sun_angles(&xml)?;
    if angles.is_none() {
        warn!("No Mean_Sun_Angle in {:?}", path);
    }
    Ok(angles)
}

pub fn parse_sun_angles(xml: &str) -> Result<Option<SunAngles>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut curr = String::new();
    let mut in_mean_sun_angle = false;
    let mut zenith = None;
    let mut azimuth = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if tag == "Mean_Sun_Angle" {
                    in_mean_sun_angle = true;
                }
                curr = tag;
            }
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"Mean_Sun_Angle" {
                    in_mean_sun_angle = false;
                }
                curr.clear();
            }
            Event::Text(e) if in_mean_sun_angle => {
                let txt = e.unescape()?;
                match curr.as_str() {
                    "ZENITH_ANGLE" => zenith = Some(parse_angle("ZENITH_ANGLE", &txt)?),
                    "AZIMUTH_ANGLE" => azimuth = Some(parse_angle("AZIMUTH_ANGLE", &txt)?),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(match (zenith, azimuth) {
        (Some(zenith), Some(azimuth)) => Some(SunAngles { zenith, azimuth }),
        _ => None,
    })
}

fn parse_angle(tag: &str, txt: &str) -> Result<f64> {
    txt.trim()
        .parse::<f64>()
        .map_err(|_| Error::Parse(format!("{} is not a number: `{}`", tag, txt)))
}
