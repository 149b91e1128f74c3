// src/display/terminal.rs
//! Terminal text output

use super::FixSink;
use crate::{
    error::Result,
    gps::{FixReading, FixSource, GgaFix, RmcFix},
};
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::Write;

/// Renders each reading as a few lines of text, optionally coloured
pub struct TerminalSink<W: Write> {
    out: W,
    color: bool,
    precision: usize,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, color: bool, precision: usize) -> Self {
        Self { out, color, precision }
    }

    /// Uncoloured output with three decimals
    pub fn plain(out: W) -> Self {
        Self::new(out, false, 3)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn colored(&mut self, color: Color, text: &str) -> Result<()> {
        if self.color {
            queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)?;
        } else {
            queue!(self.out, Print(text))?;
        }
        Ok(())
    }

    fn render_gga(&mut self, gga: &GgaFix) -> Result<()> {
        self.colored(Color::Magenta, "  GGA: ")?;
        let mut parts = vec![format!("fix {}", gga.fix_description())];
        if let Some(sats) = gga.satellite_count {
            parts.push(format!("{} satellites", sats));
        }
        if let Some(hdop) = gga.hdop {
            parts.push(format!("HDOP {}", hdop));
        }
        if let Some(alt) = gga.altitude {
            let units = gga.altitude_units.map(String::from).unwrap_or_default();
            parts.push(format!("altitude {} {}", alt, units).trim_end().to_string());
        }
        if let Some(time) = gga.utc_time {
            parts.push(format!("at {} UTC", time.format("%H:%M:%S")));
        }
        queue!(self.out, Print(parts.join(", ")), Print("\n"))?;
        Ok(())
    }

    fn render_rmc(&mut self, rmc: &RmcFix) -> Result<()> {
        self.colored(Color::Cyan, "  RMC: ")?;
        let mut parts = Vec::new();
        if let (Some(knots), Some(kmh)) = (rmc.speed_knots, rmc.speed_kmh()) {
            parts.push(format!("speed {} kn ({:.1} km/h)", knots, kmh));
        }
        if let Some(course) = rmc.course_degrees {
            parts.push(format!("course {}°", course));
        }
        match (rmc.utc_timestamp(), rmc.utc_time) {
            (Some(ts), _) => parts.push(format!("at {}", ts.format("%Y-%m-%d %H:%M:%S UTC"))),
            (None, Some(time)) => parts.push(format!("at {} UTC", time.format("%H:%M:%S"))),
            (None, None) => {}
        }
        if parts.is_empty() {
            parts.push("active".to_string());
        }
        queue!(self.out, Print(parts.join(", ")), Print("\n"))?;
        Ok(())
    }
}

impl<W: Write> FixSink for TerminalSink<W> {
    fn emit(&mut self, reading: &FixReading) -> Result<()> {
        let label = match reading.source {
            FixSource::Averaged => "Coordinates: ",
            FixSource::Gga => "GGA Coordinates: ",
            FixSource::Rmc => "RMC Coordinates: ",
        };
        self.colored(Color::Green, label)?;

        let p = self.precision;
        queue!(
            self.out,
            Print(format!(
                "{:.*}, {:.*}\n",
                p,
                reading.coordinate.latitude(),
                p,
                reading.coordinate.longitude()
            ))
        )?;

        if let Some(gga) = &reading.gga {
            self.render_gga(gga)?;
        }
        if let Some(rmc) = &reading.rmc {
            self.render_rmc(rmc)?;
        }

        self.out.flush()?;
        Ok(())
    }
}
