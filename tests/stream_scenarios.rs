//! End-to-end reader scenarios over in-memory NMEA streams

use approx::assert_relative_eq;
use gps_fix::{
    display::{FixSink, JsonSink, TerminalSink},
    FixReader, FixReading, FixSource, ReadMode,
};
use std::time::Duration;

/// A short capture from a receiver acquiring a fix, with line noise
const CAPTURE: &[u8] = b"\
$GPGSV,3,1,12,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75\r\n\
$GPGGA,092750.000,5321.6802,N,00630.3372,W,0,00,,,M,,M,,*76\r\n\
$GPRMC,092750.000,V,5321.6802,N,00630.3372,W,,,231110,,*3C\r\n\
\xff\xfe$GPGGA,092751.000,5321.6802,N\r\n\
$GPGGA,092751.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76\r\n\
$GPGSA,A,3,10,07,05,02,29,04,08,13,,,,,1.72,1.03,1.38*0A\r\n\
$GPRMC,092751.000,A,5321.6802,N,00630.3372,W,0.02,31.66,231110,,,A*43\r\n\
$GPGGA,092752.000,5321.6803,N,00630.3373,W,1,8,1.03,61.8,M,55.2,M,,*76\r\n";

fn reader(input: &'static [u8]) -> FixReader<&'static [u8]> {
    FixReader::new(input, Duration::from_secs(1))
}

#[tokio::test]
async fn batch_mode_waits_for_valid_pair() {
    let reading = reader(CAPTURE).read_batch(None).await.unwrap().unwrap();

    assert_eq!(reading.source, FixSource::Averaged);
    assert_relative_eq!(reading.coordinate.latitude(), 53.0 + 21.6802 / 60.0, epsilon = 1e-9);
    assert_relative_eq!(reading.coordinate.longitude(), -(6.0 + 30.3372 / 60.0), epsilon = 1e-9);

    let gga = reading.gga.unwrap();
    assert_eq!(gga.fix_quality, 1);
    assert_eq!(gga.satellite_count, Some(8));
    assert_eq!(gga.altitude, Some(61.7));

    let rmc = reading.rmc.unwrap();
    assert_eq!(rmc.speed_knots, Some(0.02));
    assert_eq!(
        rmc.utc_timestamp().unwrap().to_rfc3339(),
        "2010-11-23T09:27:51+00:00"
    );
}

#[tokio::test]
async fn stream_mode_emits_fixes_in_order() {
    let mut readings: Vec<FixReading> = Vec::new();
    let emitted = reader(CAPTURE)
        .run(ReadMode::Stream, None, &mut readings)
        .await
        .unwrap();

    assert_eq!(emitted, 3);
    let sources: Vec<FixSource> = readings.iter().map(|r| r.source).collect();
    assert_eq!(sources, vec![FixSource::Gga, FixSource::Rmc, FixSource::Gga]);
    assert!(readings.iter().all(|r| r.coordinate.latitude() > 53.0));
    assert!(readings.iter().all(|r| r.coordinate.longitude() < -6.0));
}

#[tokio::test]
async fn stream_mode_skips_malformed_line() {
    const INPUT: &[u8] = b"\
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\n\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\n\
$GPGGA,12351\n\
$GPGGA,123520,4807.040,N,01131.002,E,1,08,0.9,545.5,M,46.9,M,,*47\n";

    let mut readings: Vec<FixReading> = Vec::new();
    let emitted = reader(INPUT).run_stream(&mut readings).await.unwrap();

    assert_eq!(emitted, 3);
    assert_eq!(readings[0].source, FixSource::Gga);
    assert_eq!(readings[1].source, FixSource::Rmc);
    assert_eq!(readings[2].source, FixSource::Gga);
    assert_eq!(readings[2].gga.as_ref().unwrap().latitude_raw, "4807.040");
}

#[tokio::test]
async fn batch_mode_with_only_gga_reports_nothing() {
    const INPUT: &[u8] = b"\
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\n\
$GPRMC,123519,V,4807.038,N,01131.000,E,,,230394,,*6A\n";

    let mut readings: Vec<FixReading> = Vec::new();
    let result = reader(INPUT).run(ReadMode::Batch, None, &mut readings).await;

    assert!(matches!(result, Err(gps_fix::GpsError::IncompleteBatch)));
    assert!(readings.is_empty());
}

#[tokio::test]
async fn sinks_render_batch_result() {
    let reading = reader(CAPTURE).read_batch(None).await.unwrap().unwrap();

    let mut text = TerminalSink::plain(Vec::new());
    text.emit(&reading).unwrap();
    let text = String::from_utf8(text.into_inner()).unwrap();
    assert!(text.starts_with("Coordinates: 53.361, -6.506\n"));

    let mut json = JsonSink::new(Vec::new());
    json.emit(&reading).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json.into_inner()).unwrap();
    assert_eq!(value["source"], "averaged");
    assert_eq!(value["rmc"]["status"], "A");
}
