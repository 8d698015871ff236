//! Integration tests for the satellite source.
//!
//! These tests drive the public API end to end:
//! - recorded NMEA → SatelliteSource → sink events
//! - one-shot requests while stopped and while running
//! - gpsd master → SourceDriver → event channel
//!
//! Run with: `cargo test --test source_integration`

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Notify};

use satview::config::SatviewConfig;
use satview::gpsd::GpsdMaster;
use satview::satellite::{Constellation, SatelliteRecord};
use satview::source::{
    ReplayFactory, ReplayFeed, SatelliteEvent, SatelliteSource, SourceDriver, SourceErrorCode,
};

// ============================================================================
// Fixtures
// ============================================================================

const GSV_1: &str = "$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75";
const GSV_2: &str = "$GPGSV,2,2,08,15,52,050,40,18,11,181,34,22,65,095,47,25,33,140,43*7C";
const GSA: &str = "$GPGSA,A,3,01,02,12,14,,,,,,,,,2.5,1.3,2.1*31";
const GSA_ALL: &str = "$GPGSA,A,3,01,02,12,14,15,18,22,25,,,,,2.5,1.3,2.1*3B";
const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

/// Group where PRN 01 appears twice; the second part wins.
const GSV_DUP_1: &str = "$GPGSV,2,1,05,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*78";
const GSV_DUP_2: &str = "$GPGSV,2,2,05,01,55,090,48*48";

type RecordingSource = SatelliteSource<ReplayFactory, Vec<SatelliteEvent>>;

fn create_source() -> (RecordingSource, ReplayFeed) {
    let factory = ReplayFactory::new();
    let feed = factory.feed();
    (SatelliteSource::new(factory, Vec::new()), feed)
}

fn prns(records: &[SatelliteRecord]) -> Vec<u16> {
    records.iter().map(|r| r.prn).collect()
}

fn session(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("{l}\r\n")).collect()
}

// ============================================================================
// Continuous updates
// ============================================================================

#[test]
fn test_recorded_session_publishes_view_and_use() {
    let (mut source, feed) = create_source();
    source.start_updates();

    feed.push_text(&session(&[RMC, GSV_1, "garbage", GSV_2, GSA]));
    source.handle_lines_ready();

    let events = source.sink();
    assert_eq!(events.len(), 2, "events: {:?}", events);

    match &events[0] {
        SatelliteEvent::SatellitesInView(records) => {
            assert_eq!(prns(records), vec![1, 2, 12, 14, 15, 18, 22, 25]);
            let first = records[0];
            assert_eq!(first.constellation, Constellation::Gps);
            assert_eq!(first.elevation, 40);
            assert_eq!(first.azimuth, 83);
            assert_eq!(first.signal_strength, 46);
        }
        other => panic!("expected view, got {:?}", other),
    }
    match &events[1] {
        SatelliteEvent::SatellitesInUse(records) => assert_eq!(prns(records), vec![1, 2, 12, 14]),
        other => panic!("expected in-use, got {:?}", other),
    }

    let stats = source.stats();
    assert_eq!(stats.lines_read, 5);
    assert_eq!(stats.lines_rejected, 1);
    assert_eq!(stats.views_published, 1);
    assert_eq!(stats.in_use_resolved, 1);
}

#[test]
fn test_repeated_prn_last_write_wins() {
    let (mut source, feed) = create_source();
    source.start_updates();

    feed.push_text(&session(&[GSV_DUP_1, GSV_DUP_2]));
    source.handle_lines_ready();

    let view = source.satellites_in_view().expect("view published");
    assert_eq!(view.len(), 4);
    let prn1 = view.get(1).expect("PRN 1 present");
    assert_eq!(prn1.elevation, 55);
    assert_eq!(prn1.azimuth, 90);
    assert_eq!(prn1.signal_strength, 48);
}

#[test]
fn test_in_use_resolves_against_latest_view() {
    let (mut source, feed) = create_source();
    source.start_updates();

    // Only four satellites in view: the eight-slot GSA cannot resolve
    feed.push_text(&session(&[GSV_DUP_1, GSV_DUP_2, GSA_ALL]));
    source.handle_lines_ready();
    assert_eq!(source.stats().in_use_resolved, 0);

    feed.push_text(&session(&[GSV_1, GSV_2, GSA_ALL]));
    source.handle_lines_ready();
    assert_eq!(source.stats().in_use_resolved, 1);

    match source.sink().last() {
        Some(SatelliteEvent::SatellitesInUse(records)) => assert_eq!(records.len(), 8),
        other => panic!("expected in-use, got {:?}", other),
    }
}

#[test]
fn test_tampered_line_changes_nothing() {
    let (mut source, feed) = create_source();
    source.start_updates();

    let tampered = GSV_1.replace(",46,", ",47,");
    feed.push_line(tampered);
    feed.push_line(GSV_2);
    source.handle_lines_ready();

    // Part 2 alone completes a partial group
    let view = source.satellites_in_view().expect("partial view");
    assert!(!view.contains(1));
    assert_eq!(source.stats().lines_rejected, 1);
}

#[test]
fn test_unavailable_device_reports_access_error() {
    let (mut source, feed) = create_source();
    feed.set_available(false);

    source.request_update(Duration::from_secs(6));

    assert_eq!(source.last_error(), SourceErrorCode::AccessError);
    assert!(!source.is_running());
    assert_eq!(
        source.sink().first(),
        Some(&SatelliteEvent::Error(SourceErrorCode::AccessError))
    );

    // The request still expires normally
    source.handle_deadline();
    assert_eq!(source.sink().last(), Some(&SatelliteEvent::RequestTimeout));
}

// ============================================================================
// One-shot requests
// ============================================================================

#[test]
fn test_request_below_minimum_does_not_touch_device() {
    let (mut source, feed) = create_source();

    source.request_update(Duration::from_millis(3000));

    assert_eq!(source.sink().as_slice(), &[SatelliteEvent::RequestTimeout]);
    assert_eq!(feed.stats().created, 0);
}

#[test]
fn test_request_while_stopped_emits_single_view() {
    let (mut source, feed) = create_source();

    source.request_update(Duration::from_millis(6000));
    feed.push_text(&session(&[GSV_1, GSV_2, GSV_1, GSV_2, GSA, GSV_1]));
    source.handle_lines_ready();

    let views = source
        .sink()
        .iter()
        .filter(|e| matches!(e, SatelliteEvent::SatellitesInView(_)))
        .count();
    assert_eq!(views, 1);
    assert!(!source.is_running());
    assert_eq!(feed.stats().live_devices(), 0);
    assert_eq!(feed.pending(), 1);
}

#[test]
fn test_request_uses_configured_minimum_interval() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("config.ini");
    std::fs::write(&path, "[request]\nminimum_interval_ms = 1000\n").unwrap();
    let config = SatviewConfig::load_from(&path).unwrap();

    let factory = ReplayFactory::new();
    let feed = factory.feed();
    let mut source = SatelliteSource::with_minimum_interval(
        factory,
        Vec::new(),
        config.request.minimum_interval,
    );

    source.request_update(Duration::from_millis(3000));

    assert!(source.is_request_pending());
    assert!(source.is_running());
    assert_eq!(feed.stats().created, 1);
}

// ============================================================================
// gpsd end to end
// ============================================================================

#[tokio::test]
async fn test_gpsd_request_through_driver() {
    let (mut client, server) = tokio::io::duplex(4096);
    let readable = Arc::new(Notify::new());
    let master = GpsdMaster::from_reader(server, Arc::clone(&readable));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let source = SatelliteSource::new(master, tx);
    let (driver, handle) = SourceDriver::new(source, readable);
    let task = driver.start();

    handle.request_update(Duration::from_secs(6)).unwrap();

    // gpsd repeats the cycle every epoch; stream until the request answers
    let cycle = session(&[RMC, GSV_1, GSV_2, GSA]);
    let writer = tokio::spawn(async move {
        loop {
            if client.write_all(cycle.as_bytes()).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("view event");
    match first {
        Some(SatelliteEvent::SatellitesInView(records)) => assert_eq!(records.len(), 8),
        other => panic!("expected view, got {:?}", other),
    }

    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("in-use event");
    match second {
        Some(SatelliteEvent::SatellitesInUse(records)) => {
            assert_eq!(prns(&records), vec![1, 2, 12, 14])
        }
        other => panic!("expected in-use, got {:?}", other),
    }

    handle.shutdown().unwrap();
    let source = task.await.unwrap();
    writer.abort();

    assert!(!source.is_running());
    assert!(!source.is_request_pending());
}
