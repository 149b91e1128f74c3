// src/display/mod.rs
//! Output sinks for fix readings

pub mod json;
pub mod terminal;

use crate::{error::Result, gps::FixReading};

pub use json::JsonSink;
pub use terminal::TerminalSink;

/// Consumer of validated fix readings
pub trait FixSink {
    fn emit(&mut self, reading: &FixReading) -> Result<()>;
}

/// Collects readings in memory
impl FixSink for Vec<FixReading> {
    fn emit(&mut self, reading: &FixReading) -> Result<()> {
        self.push(reading.clone());
        Ok(())
    }
}

impl<S: FixSink + ?Sized> FixSink for Box<S> {
    fn emit(&mut self, reading: &FixReading) -> Result<()> {
        (**self).emit(reading)
    }
}
