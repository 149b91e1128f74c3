// src/gps/mod.rs
//! NMEA parsing and coordinate handling

pub mod coordinate;
pub mod data;
pub mod nmea;

pub use coordinate::{to_decimal_degrees, Coordinate};
pub use data::{FixReading, FixSource, GgaFix, RmcFix, ValidFix};
pub use nmea::{evaluate_line, parse_sentence, ParsedMessage, SentenceError};
