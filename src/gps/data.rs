// src/gps/data.rs
//! Fix records produced from GGA and RMC sentences

use super::coordinate::Coordinate;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// GGA (Global Positioning System Fix Data) fields
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GgaFix {
    pub utc_time: Option<NaiveTime>,
    pub latitude_raw: String,
    pub latitude_dir: String,
    pub longitude_raw: String,
    pub longitude_dir: String,
    pub fix_quality: u8,
    pub satellite_count: Option<u8>,
    pub hdop: Option<f64>,
    pub altitude: Option<f64>,
    pub altitude_units: Option<char>,
}

impl GgaFix {
    /// Position of this sentence, if it reports a fix and both axes convert
    pub fn coordinate(&self) -> Option<Coordinate> {
        if self.fix_quality == 0 {
            return None;
        }
        Coordinate::from_nmea(
            &self.latitude_raw,
            &self.latitude_dir,
            &self.longitude_raw,
            &self.longitude_dir,
        )
    }

    /// Get fix type description
    pub fn fix_description(&self) -> String {
        match self.fix_quality {
            0 => "No fix".to_string(),
            1 => "GPS".to_string(),
            2 => "DGPS".to_string(),
            3 => "PPS".to_string(),
            4 => "RTK".to_string(),
            5 => "Float RTK".to_string(),
            6 => "Estimated".to_string(),
            7 => "Manual".to_string(),
            8 => "Simulation".to_string(),
            q => format!("Unknown ({})", q),
        }
    }
}

/// RMC (Recommended Minimum Course) fields
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RmcFix {
    pub utc_time: Option<NaiveTime>,
    pub status: Option<char>,
    pub latitude_raw: String,
    pub latitude_dir: String,
    pub longitude_raw: String,
    pub longitude_dir: String,
    pub speed_knots: Option<f64>,
    pub course_degrees: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl RmcFix {
    /// `A` means active, `V` void
    pub fn is_active(&self) -> bool {
        self.status == Some('A')
    }

    /// Position of this sentence, if it is active and both axes convert
    pub fn coordinate(&self) -> Option<Coordinate> {
        if !self.is_active() {
            return None;
        }
        Coordinate::from_nmea(
            &self.latitude_raw,
            &self.latitude_dir,
            &self.longitude_raw,
            &self.longitude_dir,
        )
    }

    /// Date and time of the fix, when both fields were present
    pub fn utc_timestamp(&self) -> Option<DateTime<Utc>> {
        let date = self.date?;
        let time = self.utc_time?;
        Some(date.and_time(time).and_utc())
    }

    /// Speed over ground converted from knots to km/h
    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed_knots.map(|knots| knots * 1.852)
    }
}

/// A GGA or RMC record that passed its validity gate, with its position
#[derive(Debug, Clone, PartialEq)]
pub enum ValidFix {
    Gga(GgaFix, Coordinate),
    Rmc(RmcFix, Coordinate),
}

impl ValidFix {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            ValidFix::Gga(_, coord) | ValidFix::Rmc(_, coord) => *coord,
        }
    }
}

/// Where the coordinate of a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixSource {
    Gga,
    Rmc,
    Averaged,
}

/// A fix handed to the sink; never modified after emission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixReading {
    pub coordinate: Coordinate,
    pub source: FixSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gga: Option<GgaFix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmc: Option<RmcFix>,
}

impl FixReading {
    /// Combine one GGA and one RMC fix, averaging their coordinates per axis
    pub fn averaged(gga: (GgaFix, Coordinate), rmc: (RmcFix, Coordinate)) -> Self {
        let (gga, gga_coord) = gga;
        let (rmc, rmc_coord) = rmc;
        Self {
            coordinate: gga_coord.midpoint(&rmc_coord),
            source: FixSource::Averaged,
            gga: Some(gga),
            rmc: Some(rmc),
        }
    }
}

impl From<ValidFix> for FixReading {
    fn from(fix: ValidFix) -> Self {
        match fix {
            ValidFix::Gga(gga, coordinate) => Self {
                coordinate,
                source: FixSource::Gga,
                gga: Some(gga),
                rmc: None,
            },
            ValidFix::Rmc(rmc, coordinate) => Self {
                coordinate,
                source: FixSource::Rmc,
                gga: None,
                rmc: Some(rmc),
            },
        }
    }
}
