//! Polyline representation for route geometries.
//!
//! Routing providers ship geometries in the compact encoded polyline format.
//! This module decodes them at the boundary into a sequence of
//! [`Coordinate`]s, which is what the rest of the pipeline works with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal digits kept by OpenRouteService (and Google) encoded polylines.
pub const DEFAULT_PRECISION: u32 = 5;

/// ASCII offset added to every encoded 5-bit chunk.
const CHUNK_OFFSET: u8 = 63;

/// Continuation bit of an encoded chunk.
const CONTINUATION: i64 = 0x20;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether the point is finite and inside the valid lat/lon ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("input ends inside a value at byte {position}")]
    Truncated { position: usize },

    #[error("value starting at byte {position} overflows")]
    Overflow { position: usize },

    #[error("decoded point {index} ({lat}, {lon}) is out of range")]
    OutOfRange { index: usize, lat: f64, lon: f64 },
}

/// A polyline representing a route geometry as decoded coordinates.
///
/// Immutable once built; the pipeline only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<Coordinate> for Polyline {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Decodes an encoded polyline string.
///
/// Points come back in encoding order as `(lat, lon)`. Any input that cannot
/// be parsed to completion is rejected as a whole; a partially decoded
/// geometry is never returned.
pub fn decode(encoded: &str, precision: u32) -> Result<Polyline, DecodeError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut cursor = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut points = Vec::new();

    while cursor < bytes.len() {
        lat = lat
            .checked_add(next_value(bytes, &mut cursor)?)
            .ok_or(DecodeError::Overflow { position: cursor })?;
        lon = lon
            .checked_add(next_value(bytes, &mut cursor)?)
            .ok_or(DecodeError::Overflow { position: cursor })?;

        let point = Coordinate::new(lat as f64 / factor, lon as f64 / factor);
        if !point.is_valid() {
            return Err(DecodeError::OutOfRange {
                index: points.len(),
                lat: point.lat,
                lon: point.lon,
            });
        }
        points.push(point);
    }

    Ok(Polyline::new(points))
}

/// Encodes coordinates into the polyline format understood by [`decode`].
pub fn encode(points: &[Coordinate], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut encoded = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for point in points {
        let lat = (point.lat * factor).round() as i64;
        let lon = (point.lon * factor).round() as i64;
        push_value(&mut encoded, lat - prev_lat);
        push_value(&mut encoded, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    encoded
}

fn next_value(bytes: &[u8], cursor: &mut usize) -> Result<i64, DecodeError> {
    let start = *cursor;
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes
            .get(*cursor)
            .ok_or(DecodeError::Truncated { position: start })?;
        if !(CHUNK_OFFSET..=b'~').contains(&byte) {
            return Err(DecodeError::InvalidCharacter {
                character: byte as char,
                position: *cursor,
            });
        }
        if shift > 60 {
            return Err(DecodeError::Overflow { position: start });
        }

        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *cursor += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    // zig-zag: low bit carries the sign
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn push_value(out: &mut String, value: i64) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= CONTINUATION {
        out.push(((CONTINUATION | (value & 0x1f)) as u8 + CHUNK_OFFSET) as char);
        value >>= 5;
    }
    out.push((value as u8 + CHUNK_OFFSET) as char);
}
