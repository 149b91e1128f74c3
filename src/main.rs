// src/main.rs
//! gps-fix - read a position fix from a serial NMEA GPS receiver

use clap::Parser;
use crossterm::tty::IsTty;
use gps_fix::{
    config::{OutputFormat, ReaderConfig},
    reader::{self, FixReader, ReadMode},
    FixSink, GpsError, JsonSink, TerminalSink,
};
use log::info;
use std::{io, path::PathBuf, process::ExitCode, sync::atomic::Ordering};

#[derive(Debug, Parser)]
#[command(name = "gps-fix", version, about = "Read GGA/RMC fixes from a serial GPS receiver")]
struct Cli {
    /// Serial port of the receiver
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Batch waits for one GGA and one RMC fix and averages them; stream prints every fix
    #[arg(short, long, value_enum)]
    mode: Option<ReadMode>,

    /// Per-read timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Give up batch mode after this many seconds
    #[arg(long)]
    max_wait: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Decimal places for text output
    #[arg(long, default_value_t = 3)]
    precision: usize,

    /// JSON config file; flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    fn resolve_config(&self) -> gps_fix::Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::load_from_path(path)?,
            None => ReaderConfig::default(),
        };

        if self.port.is_some() || self.baud.is_some() {
            let port = self.port.clone().unwrap_or_else(|| config.serial_port.clone());
            let baud = self.baud.unwrap_or(config.serial_baudrate);
            config.update_serial(port, baud);
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.read_timeout_ms = timeout_ms;
        }
        if self.max_wait.is_some() {
            config.max_wait_secs = self.max_wait;
        }
        if let Some(output) = self.output {
            config.output = output;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.list_ports {
        let ports = reader::list_serial_ports()?;
        if ports.is_empty() {
            println!("No serial ports found.");
        } else {
            println!("Available serial ports:");
            for port in ports {
                println!("  {} - {:?}", port.port_name, port.port_type);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.resolve_config()?;
    info!("Running at {} baud", config.serial_baudrate);

    let source = reader::open_serial(&config.serial_port, config.serial_baudrate, config.read_timeout())?;
    let mut reader = FixReader::new(source, config.read_timeout());

    let running = reader.running_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            running.store(false, Ordering::Relaxed);
        }
    });

    let mut sink: Box<dyn FixSink> = match config.output {
        OutputFormat::Text => {
            let color = io::stdout().is_tty();
            Box::new(TerminalSink::new(io::stdout(), color, cli.precision))
        }
        OutputFormat::Json => Box::new(JsonSink::new(io::stdout())),
    };

    match reader.run(config.mode, config.max_wait(), &mut sink).await {
        Ok(emitted) => {
            info!("Reported {} fix(es)", emitted);
            Ok(ExitCode::SUCCESS)
        }
        Err(GpsError::IncompleteBatch) => {
            println!("No valid GPS coordinates received");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["gps-fix", "-p", "/dev/ttyUSB0", "-b", "4800", "-m", "stream"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.serial_port, "/dev/ttyUSB0");
        assert_eq!(config.serial_baudrate, 4800);
        assert_eq!(config.mode, ReadMode::Stream);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("gps-fix-cli-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"serial_port":"/dev/ttyAMA0","mode":"stream","max_wait_secs":5}"#).unwrap();

        let cli = Cli::parse_from([
            "gps-fix",
            "--config",
            path.to_str().unwrap(),
            "--mode",
            "batch",
        ]);
        let config = cli.resolve_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.serial_port, "/dev/ttyAMA0");
        assert_eq!(config.mode, ReadMode::Batch);
        assert_eq!(config.max_wait_secs, Some(5));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cli = Cli::parse_from(["gps-fix", "--timeout-ms", "0"]);
        assert!(cli.resolve_config().is_err());
    }
}
