// src/display/json.rs
//! JSON lines output

use super::FixSink;
use crate::{error::Result, gps::FixReading};
use std::io::Write;

/// Writes one JSON object per reading
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FixSink for JsonSink<W> {
    fn emit(&mut self, reading: &FixReading) -> Result<()> {
        serde_json::to_writer(&mut self.out, reading)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
