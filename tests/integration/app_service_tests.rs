//! Integration tests for the AppService startup, toggle and publish paths.
//!
//! These run on the host (x86_64) against the recording mocks and verify
//! the exact LCD screens, MQTT topics and payloads the node produces.

use crate::mock_hw::{FakeClock, LcdCall, MockHardware, MockNetwork, RecordingSink};

use geofence_node::adapters::rng::HardwareRng;
use geofence_node::app::events::AppEvent;
use geofence_node::app::service::{AppService, PublishOutcome};
use geofence_node::config::SystemConfig;
use geofence_node::location::{self, GeofenceMode};

type App = AppService<HardwareRng, FakeClock>;

pub fn make_app(config: SystemConfig) -> (App, MockHardware, MockNetwork, RecordingSink, FakeClock) {
    let clock = FakeClock::default();
    let app = AppService::new(config, HardwareRng::seeded(7), clock.clone()).unwrap();
    (
        app,
        MockHardware::new(),
        MockNetwork::new(clock.clone()),
        RecordingSink::new(),
        clock,
    )
}

fn started() -> (App, MockHardware, MockNetwork, RecordingSink, FakeClock) {
    let (mut app, mut hw, mut net, mut sink, clock) = make_app(SystemConfig::default());
    app.start(&mut hw, &mut net, &mut sink).unwrap();
    hw.lcd.clear();
    sink.events.clear();
    (app, hw, net, sink, clock)
}

fn inside_box(lat: f64, lon: f64) -> bool {
    (location::INSIDE_LAT_MIN..=location::INSIDE_LAT_MAX).contains(&lat)
        && (location::INSIDE_LON_MIN..=location::INSIDE_LON_MAX).contains(&lon)
}

fn outside_box(lat: f64, lon: f64) -> bool {
    (lat - location::OUTSIDE_CENTER_LAT).abs() <= location::OUTSIDE_JITTER_DEG + 1e-9
        && (lon - location::OUTSIDE_CENTER_LON).abs() <= location::OUTSIDE_JITTER_DEG + 1e-9
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_shows_boot_then_ready_and_connects() {
    let (mut app, mut hw, mut net, mut sink, _clock) = make_app(SystemConfig::default());
    assert!(app.start(&mut hw, &mut net, &mut sink).is_ok());

    let boot = hw
        .lcd
        .iter()
        .position(|c| *c == LcdCall::Line(0, "Initializing...".into()))
        .expect("boot screen");
    let ready = hw
        .lcd
        .iter()
        .position(|c| *c == LcdCall::Line(0, "Device Ready".into()))
        .expect("ready screen");
    assert!(boot < ready);
    assert_eq!(hw.rows[1], "Mode: INSIDE");

    assert!(net.wifi_up && net.broker_up);
    assert_eq!(net.wifi_attempts, 1);

    let p = app.position();
    assert!(p.valid && p.inside_geofence);
    assert!(inside_box(p.latitude, p.longitude));

    let started = sink.events.iter().find_map(|e| match e {
        AppEvent::Started { sensors_topic, geo_topic, mode, .. } => {
            Some((sensors_topic.to_string(), geo_topic.to_string(), *mode))
        }
        _ => None,
    });
    assert_eq!(
        started,
        Some((
            "ESP32-DEV-001/sensors".to_string(),
            "ESP32-DEV-001/geosensors".to_string(),
            GeofenceMode::Inside
        ))
    );
}

#[test]
fn start_outside_when_configured() {
    let cfg = SystemConfig {
        start_inside_geofence: false,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut net, mut sink, _clock) = make_app(cfg);
    app.start(&mut hw, &mut net, &mut sink).unwrap();
    assert_eq!(app.mode(), GeofenceMode::Outside);
    assert_eq!(hw.rows[1], "Mode: OUTSIDE");
    let p = app.position();
    assert!(outside_box(p.latitude, p.longitude));
}

#[test]
fn offline_start_still_generates_position() {
    let cfg = SystemConfig {
        reconnect_max_attempts: 2,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut net, mut sink, _clock) = make_app(cfg);
    net.wifi_failures = u32::MAX;

    assert!(app.start(&mut hw, &mut net, &mut sink).is_err());
    assert_eq!(net.wifi_attempts, 2);
    assert!(app.position().valid);
    assert!(app.is_started());
    assert_eq!(hw.rows[0], "Device Ready");
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = SystemConfig {
        device_id: String::new(),
        ..SystemConfig::default()
    };
    assert!(AppService::new(cfg, HardwareRng::seeded(1), FakeClock::default()).is_err());
}

// ── Publish cycle ────────────────────────────────────────────

#[test]
fn publish_cycle_sends_sensors_then_geo_and_refreshes_lcd() {
    let (mut app, mut hw, mut net, mut sink, _clock) = started();

    let outcome = app.publish_cycle(&mut hw, &mut net, &mut sink);
    assert_eq!(outcome, PublishOutcome { sensors: true, geo: true });
    assert_eq!(hw.reads, 1);

    assert_eq!(net.published.len(), 2);
    assert_eq!(net.published[0].topic, "ESP32-DEV-001/sensors");
    assert_eq!(
        net.published[0].payload,
        r#"{"sensors":[{"type":"thermal","value":"23.5 celsius"},{"type":"humidity","value":"60.2 percent"},{"type":"light","value":"42 percent"},{"type":"potentiometer","value":"77 percent"}]}"#
    );

    assert_eq!(net.published[1].topic, "ESP32-DEV-001/geosensors");
    let geo: serde_json::Value = serde_json::from_str(&net.published[1].payload).unwrap();
    let p = app.position();
    assert_eq!(geo["type"], "location");
    assert_eq!(geo["status"], "inside_geofence");
    assert!((geo["latitude"].as_f64().unwrap() - p.latitude).abs() < 1e-9);
    assert!((geo["longitude"].as_f64().unwrap() - p.longitude).abs() < 1e-9);

    assert_eq!(hw.clears(), 1);
    assert_eq!(hw.rows[0], format!("GPS: {:.4}", p.latitude));
    assert_eq!(hw.rows[1], format!("IN: {:.4}", p.longitude));
    assert_eq!(app.last_reading(), hw.reading);
}

#[test]
fn failed_climate_read_publishes_zero_and_reports() {
    let (mut app, mut hw, mut net, mut sink, _clock) = started();
    hw.fail_climate();

    app.publish_cycle(&mut hw, &mut net, &mut sink);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::ClimateReadFailed)), 1);
    assert!(net.published[0].payload.contains(r#""0.0 celsius""#));
    assert!(net.published[0].payload.contains(r#"{"type":"humidity","value":"0.0 percent"}"#));
    assert!(!app.last_reading().climate_valid);
}

#[test]
fn rejected_publishes_are_reported_not_retried() {
    let (mut app, mut hw, mut net, mut sink, _clock) = started();
    net.reject_publishes = true;

    let outcome = app.publish_cycle(&mut hw, &mut net, &mut sink);
    assert_eq!(outcome, PublishOutcome::default());
    assert!(net.published.is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PublishFailed { .. })), 2);
    // Display still refreshes.
    assert!(hw.rows[0].starts_with("GPS: "));
}

// ── Geofence toggle ──────────────────────────────────────────

#[test]
fn toggle_flips_mode_and_regenerates_position() {
    let (mut app, mut hw, _net, mut sink, _clock) = started();

    app.toggle_geofence(&mut hw, &mut sink);

    assert_eq!(app.mode(), GeofenceMode::Outside);
    let p = app.position();
    assert!(p.valid && !p.inside_geofence);
    assert!(outside_box(p.latitude, p.longitude));

    assert_eq!(hw.lcd, vec![LcdCall::Clear, LcdCall::Line(1, "Mode: OUTSIDE".into())]);
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::GeofenceToggled(GeofenceMode::Outside), AppEvent::PositionGenerated(_)]
    ));

    app.toggle_geofence(&mut hw, &mut sink);
    assert_eq!(app.mode(), GeofenceMode::Inside);
    let p = app.position();
    assert!(inside_box(p.latitude, p.longitude));
}

#[test]
fn geo_status_follows_toggle() {
    let (mut app, mut hw, mut net, mut sink, _clock) = started();
    app.toggle_geofence(&mut hw, &mut sink);
    app.publish_cycle(&mut hw, &mut net, &mut sink);

    let geo = &net.on_topic("ESP32-DEV-001/geosensors")[0].payload;
    assert!(geo.ends_with(r#""status":"outside_geofence"}"#));
    assert!(hw.rows[1].starts_with("OUT: "));
}
