// src/reader.rs
//! Sentence stream reader: turns a line source into fix readings

use crate::{
    display::FixSink,
    error::{GpsError, Result},
    gps::{
        coordinate::Coordinate,
        data::{FixReading, GgaFix, RmcFix, ValidFix},
        nmea,
    },
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    time::timeout,
};
use tokio_serial::{SerialPortBuilderExt, SerialPortInfo, SerialStream};

/// Fix selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Wait for the first valid GGA and RMC fix and report their average
    #[default]
    Batch,
    /// Report every valid fix as soon as it is decoded
    Stream,
}

/// Longest line kept in memory; NMEA sentences are at most 82 bytes
const MAX_LINE_LEN: usize = 1024;

/// Line source backed by a serial port
pub type SerialLineSource = BufReader<SerialStream>;

/// Open a serial GPS receiver as a buffered line source.
///
/// Must be called from within a tokio runtime.
pub fn open_serial(port: &str, baudrate: u32, read_timeout: Duration) -> Result<SerialLineSource> {
    info!("Connecting to GPS on {} at {} baud...", port, baudrate);

    let serial = tokio_serial::new(port, baudrate)
        .timeout(read_timeout)
        .open_native_async()
        .map_err(|e| GpsError::Connection(format!("Failed to open serial port {}: {}", port, e)))?;

    info!("Connected to {}", port);
    Ok(BufReader::new(serial))
}

/// List available serial ports
pub fn list_serial_ports() -> Result<Vec<SerialPortInfo>> {
    Ok(tokio_serial::available_ports()?)
}

/// Batch-mode state: the first valid fix of each kind
#[derive(Debug, Default)]
struct BatchSlots {
    gga: Option<(GgaFix, Coordinate)>,
    rmc: Option<(RmcFix, Coordinate)>,
}

impl BatchSlots {
    /// Fill the matching slot if it is still empty; later fixes of a filled kind are ignored
    fn offer(&mut self, fix: ValidFix) {
        match fix {
            ValidFix::Gga(gga, coord) if self.gga.is_none() => {
                debug!("GGA slot filled: {:.6}, {:.6}", coord.latitude(), coord.longitude());
                self.gga = Some((gga, coord));
            }
            ValidFix::Rmc(rmc, coord) if self.rmc.is_none() => {
                debug!("RMC slot filled: {:.6}, {:.6}", coord.latitude(), coord.longitude());
                self.rmc = Some((rmc, coord));
            }
            _ => {}
        }
    }

    fn is_complete(&self) -> bool {
        self.gga.is_some() && self.rmc.is_some()
    }

    fn into_reading(self) -> Option<FixReading> {
        match (self.gga, self.rmc) {
            (Some(gga), Some(rmc)) => Some(FixReading::averaged(gga, rmc)),
            _ => None,
        }
    }
}

/// Reads NMEA lines from an already-open source and selects fixes.
///
/// The reader owns whatever handle it is given; pass `&mut source` to keep
/// the transport alive beyond the reader.
pub struct FixReader<R> {
    source: R,
    read_timeout: Duration,
    running: Arc<AtomicBool>,
    line: Vec<u8>,
    /// Inside an overlong line, skipping to its newline
    discarding: bool,
}

impl<R: AsyncBufRead + Unpin> FixReader<R> {
    pub fn new(source: R, read_timeout: Duration) -> Self {
        Self::new_with_shared(source, read_timeout, Arc::new(AtomicBool::new(true)))
    }

    /// Create a reader whose running flag is shared with the caller
    pub fn new_with_shared(source: R, read_timeout: Duration, running: Arc<AtomicBool>) -> Self {
        Self {
            source,
            read_timeout,
            running,
            line: Vec::with_capacity(128),
            discarding: false,
        }
    }

    /// Handle that stops the reader when cleared
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Stop reading after the current read attempt
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Fill `self.line` with the next raw line.
    ///
    /// Returns `false` at end of source or once stopped. A read that times out
    /// keeps its partial bytes and is polled again. A line longer than
    /// `MAX_LINE_LEN` is dropped up to its newline.
    async fn fill_line(&mut self) -> Result<bool> {
        loop {
            if !self.is_running() {
                return Ok(false);
            }

            let available = match timeout(self.read_timeout, self.source.fill_buf()).await {
                Err(_) => continue,
                Ok(Ok(buf)) => buf,
                Ok(Err(e)) => return Err(GpsError::Io(e)),
            };
            if available.is_empty() {
                // EOF, possibly after an unterminated final line
                return Ok(!self.line.is_empty());
            }

            let (chunk, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => (&available[..=end], true),
                None => (available, false),
            };
            let used = chunk.len();

            if !self.discarding {
                if self.line.len() + used > MAX_LINE_LEN {
                    warn!("Dropping line longer than {} bytes", MAX_LINE_LEN);
                    self.line.clear();
                    self.discarding = true;
                } else {
                    self.line.extend_from_slice(chunk);
                }
            }
            self.source.consume(used);

            if complete {
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                return Ok(true);
            }
        }
    }

    /// Next valid GGA or RMC fix, or `None` when the source ends
    pub async fn next_fix(&mut self) -> Result<Option<ValidFix>> {
        loop {
            self.line.clear();
            if !self.fill_line().await? {
                return Ok(None);
            }
            if let Some(fix) = nmea::evaluate_line(&self.line) {
                return Ok(Some(fix));
            }
        }
    }

    /// Wait for one valid GGA and one valid RMC fix and average them.
    ///
    /// Returns `None` if the source ends, the reader is stopped, or `max_wait`
    /// elapses before both fixes were seen.
    pub async fn read_batch(&mut self, max_wait: Option<Duration>) -> Result<Option<FixReading>> {
        let mut slots = BatchSlots::default();

        let collect = async {
            while !slots.is_complete() {
                match self.next_fix().await? {
                    Some(fix) => slots.offer(fix),
                    None => break,
                }
            }
            Ok::<(), GpsError>(())
        };

        match max_wait {
            Some(limit) => match timeout(limit, collect).await {
                Ok(result) => result?,
                Err(_) => warn!("No GGA and RMC fix pair within {:?}", limit),
            },
            None => collect.await?,
        }

        Ok(slots.into_reading())
    }

    /// Emit every valid fix to `sink` until the source ends or the reader is stopped.
    ///
    /// Returns the number of readings emitted.
    pub async fn run_stream<S: FixSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let mut emitted = 0;
        while let Some(fix) = self.next_fix().await? {
            sink.emit(&FixReading::from(fix))?;
            emitted += 1;
        }
        Ok(emitted)
    }

    /// Run the given selection policy against `sink`
    pub async fn run<S: FixSink + ?Sized>(
        &mut self,
        mode: ReadMode,
        max_wait: Option<Duration>,
        sink: &mut S,
    ) -> Result<usize> {
        match mode {
            ReadMode::Batch => {
                let reading = self.read_batch(max_wait).await?.ok_or(GpsError::IncompleteBatch)?;
                sink.emit(&reading)?;
                Ok(1)
            }
            ReadMode::Stream => self.run_stream(sink).await,
        }
    }
}
