// src/gps/nmea.rs
//! NMEA sentence framing and parsing

use super::data::{GgaFix, RmcFix, ValidFix};
use chrono::{NaiveDate, NaiveTime};
use log::trace;
use std::fmt;

/// Minimum number of data fields after the address (through altitude units)
const GGA_MIN_FIELDS: usize = 10;
/// Minimum number of data fields after the address (through date)
const RMC_MIN_FIELDS: usize = 9;

/// A sentence recognised by the framing layer
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    Gga(GgaFix),
    Rmc(RmcFix),
    /// Well-framed sentence of a kind we do not decode
    Unsupported { sentence_type: String },
}

/// Why a line was not accepted as a sentence
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceError {
    MissingStart,
    BadAddress(String),
    /// Suffix after `*` is not two hex digits
    BadChecksum(String),
    /// A second `$` inside the body, usually two sentences run together
    EmbeddedStart,
    FieldCount {
        sentence_type: &'static str,
        expected: usize,
        found: usize,
    },
    BadField {
        name: &'static str,
        value: String,
    },
}

impl fmt::Display for SentenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceError::MissingStart => write!(f, "line does not start with '$'"),
            SentenceError::BadAddress(addr) => write!(f, "bad address field '{}'", addr),
            SentenceError::BadChecksum(sum) => write!(f, "malformed checksum '{}'", sum),
            SentenceError::EmbeddedStart => write!(f, "'$' inside sentence body"),
            SentenceError::FieldCount {
                sentence_type,
                expected,
                found,
            } => write!(
                f,
                "{} needs at least {} fields, found {}",
                sentence_type, expected, found
            ),
            SentenceError::BadField { name, value } => {
                write!(f, "bad {} field '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for SentenceError {}

/// Parse one trimmed line into a message.
///
/// An optional `*hh` checksum suffix must be two hex digits; its value is not
/// checked. A `$` inside the body is rejected. The talker part of the address
/// is not interpreted; only the last three characters select the sentence type.
pub fn parse_sentence(line: &str) -> Result<ParsedMessage, SentenceError> {
    let body = line.strip_prefix('$').ok_or(SentenceError::MissingStart)?;
    let body = match body.split_once('*') {
        Some((body, sum)) => {
            if sum.len() != 2 || !sum.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(SentenceError::BadChecksum(sum.to_string()));
            }
            body
        }
        None => body,
    };
    if body.contains('$') {
        return Err(SentenceError::EmbeddedStart);
    }

    let mut parts = body.split(',');
    let address = parts.next().unwrap_or_default();
    if address.len() != 5 || !address.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(SentenceError::BadAddress(address.to_string()));
    }
    let fields: Vec<&str> = parts.collect();

    match &address[2..] {
        "GGA" => parse_gga(&fields).map(ParsedMessage::Gga),
        "RMC" => parse_rmc(&fields).map(ParsedMessage::Rmc),
        other => Ok(ParsedMessage::Unsupported {
            sentence_type: other.to_string(),
        }),
    }
}

/// Parse GGA (Global Positioning System Fix Data) fields
fn parse_gga(fields: &[&str]) -> Result<GgaFix, SentenceError> {
    if fields.len() < GGA_MIN_FIELDS {
        return Err(SentenceError::FieldCount {
            sentence_type: "GGA",
            expected: GGA_MIN_FIELDS,
            found: fields.len(),
        });
    }

    // An empty quality field means the receiver has no fix
    let fix_quality = match fields[5] {
        "" => 0,
        q => q.parse::<u8>().map_err(|_| SentenceError::BadField {
            name: "fix quality",
            value: q.to_string(),
        })?,
    };

    Ok(GgaFix {
        utc_time: parse_time(fields[0]),
        latitude_raw: fields[1].to_string(),
        latitude_dir: fields[2].to_string(),
        longitude_raw: fields[3].to_string(),
        longitude_dir: fields[4].to_string(),
        fix_quality,
        satellite_count: fields[6].parse().ok(),
        hdop: parse_float(fields[7]),
        altitude: parse_float(fields[8]),
        altitude_units: single_char(fields[9]),
    })
}

/// Parse RMC (Recommended Minimum Course) fields
fn parse_rmc(fields: &[&str]) -> Result<RmcFix, SentenceError> {
    if fields.len() < RMC_MIN_FIELDS {
        return Err(SentenceError::FieldCount {
            sentence_type: "RMC",
            expected: RMC_MIN_FIELDS,
            found: fields.len(),
        });
    }

    Ok(RmcFix {
        utc_time: parse_time(fields[0]),
        status: single_char(fields[1]),
        latitude_raw: fields[2].to_string(),
        latitude_dir: fields[3].to_string(),
        longitude_raw: fields[4].to_string(),
        longitude_dir: fields[5].to_string(),
        speed_knots: parse_float(fields[6]),
        course_degrees: parse_float(fields[7]),
        date: NaiveDate::parse_from_str(fields[8], "%d%m%y").ok(),
    })
}

/// `hhmmss` with optional fractional seconds
fn parse_time(field: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(field, "%H%M%S%.f").ok()
}

fn parse_float(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn single_char(field: &str) -> Option<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Run one raw line through the whole per-line pipeline.
///
/// Decodes lossily, trims, drops non-sentences, parses, and applies the
/// validity gate of the sentence kind. Returns `Some` only for a GGA with a
/// fix or an active RMC whose position converts on both axes.
pub fn evaluate_line(raw: &[u8]) -> Option<ValidFix> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim();
    if !line.starts_with('$') {
        return None;
    }

    let message = match parse_sentence(line) {
        Ok(message) => message,
        Err(e) => {
            trace!("Discarding '{}': {}", line, e);
            return None;
        }
    };

    match message {
        ParsedMessage::Gga(gga) => {
            let coordinate = gga.coordinate()?;
            Some(ValidFix::Gga(gga, coordinate))
        }
        ParsedMessage::Rmc(rmc) => {
            let coordinate = rmc.coordinate()?;
            Some(ValidFix::Rmc(rmc, coordinate))
        }
        ParsedMessage::Unsupported { .. } => None,
    }
}
