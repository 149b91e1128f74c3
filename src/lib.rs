// src/lib.rs
//! GPS Fix Library
//!
//! Reads NMEA 0183 GGA and RMC sentences from a serial GPS receiver and turns
//! them into validated decimal-degree fixes.

pub mod config;
pub mod display;
pub mod error;
pub mod gps;
pub mod reader;

// Re-export main types for convenience
pub use display::{FixSink, JsonSink, TerminalSink};
pub use error::{GpsError, Result};
pub use gps::{to_decimal_degrees, Coordinate, FixReading, FixSource, GgaFix, RmcFix, ValidFix};
pub use reader::{FixReader, ReadMode};
