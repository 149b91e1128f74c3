// src/gps/coordinate.rs
//! Degree-minute to decimal-degree conversion

use serde::Serialize;

/// Convert an NMEA `ddmm.mmmm` / `dddmm.mmmm` field to signed decimal degrees.
///
/// The degree prefix is two digits wide for `N`/`S` and three digits wide for
/// `E`/`W`. `S` and `W` yield negative values. Returns `None` for empty
/// input, an unknown direction letter, or a payload that does not split into
/// a numeric degree prefix and numeric minutes.
pub fn to_decimal_degrees(degree_minute: &str, direction: &str) -> Option<f64> {
    if degree_minute.is_empty() || direction.is_empty() {
        return None;
    }

    let (deg_len, negative) = match direction {
        "N" => (2, false),
        "S" => (2, true),
        "E" => (3, false),
        "W" => (3, true),
        _ => return None,
    };

    // `get` rather than slicing: the field may contain arbitrary replacement chars
    let degrees_str = degree_minute.get(..deg_len)?;
    let minutes_str = degree_minute.get(deg_len..)?;

    if !degrees_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let degrees: f64 = degrees_str.parse().ok()?;
    let minutes: f64 = minutes_str.parse().ok()?;
    if !minutes.is_finite() || minutes.is_sign_negative() {
        return None;
    }

    let decimal = degrees + minutes / 60.0;
    Some(if negative { -decimal } else { decimal })
}

/// A validated position in decimal degrees (South and West negative)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from the four raw NMEA position fields.
    ///
    /// Latitude must carry `N`/`S`, longitude `E`/`W`, and the converted values
    /// must fall within [-90, 90] and [-180, 180].
    pub fn from_nmea(lat: &str, lat_dir: &str, lon: &str, lon_dir: &str) -> Option<Self> {
        if !matches!(lat_dir, "N" | "S") || !matches!(lon_dir, "E" | "W") {
            return None;
        }

        let latitude = to_decimal_degrees(lat, lat_dir)?;
        let longitude = to_decimal_degrees(lon, lon_dir)?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }

        Some(Self { latitude, longitude })
    }

    /// Per-axis mean of whichever coordinates are present
    pub fn average(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.midpoint(&b)),
            (Some(single), None) | (None, Some(single)) => Some(single),
            (None, None) => None,
        }
    }

    /// Per-axis mean of two coordinates
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
