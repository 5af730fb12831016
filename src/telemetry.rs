//! Telemetry message building and publishing.
//!
//! Two messages go out every publish cycle:
//!
//! `<id>/sensors`
//! ```json
//! {"sensors":[{"type":"thermal","value":"23.5 celsius"},
//!             {"type":"humidity","value":"60.2 percent"},
//!             {"type":"light","value":"42 percent"},
//!             {"type":"potentiometer","value":"77 percent"}]}
//! ```
//!
//! `<id>/geosensors`
//! ```json
//! {"type":"location","latitude":39.5,"longitude":-107.7,"status":"inside_geofence"}
//! ```
//!
//! Publishing is best-effort: a failure is reported through the event sink
//! and the message is dropped.

use core::fmt::Write;

use serde::Serialize;

use crate::app::context::{GeoPosition, SensorReading};
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PublishPort};
use crate::error::CommsError;
use crate::identity::TopicString;

/// Longest value string is `"-3276.8 celsius"`.
type ValueString = heapless::String<24>;

// ───────────────────────────────────────────────────────────────
// Wire types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SensorEntry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: ValueString,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorsMessage {
    pub sensors: heapless::Vec<SensorEntry, 4>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub status: &'static str,
}

fn entry(kind: &'static str, args: core::fmt::Arguments<'_>) -> SensorEntry {
    let mut value = ValueString::new();
    let _ = value.write_fmt(args);
    SensorEntry { kind, value }
}

impl SensorsMessage {
    /// Build the four labelled readings in wire order.
    pub fn from_reading(r: &SensorReading) -> Self {
        let mut sensors = heapless::Vec::new();
        let entries = [
            entry("thermal", format_args!("{:.1} celsius", r.temperature_c)),
            entry("humidity", format_args!("{:.1} percent", r.humidity_pct)),
            entry("light", format_args!("{} percent", r.light_pct)),
            entry("potentiometer", format_args!("{} percent", r.pot_pct)),
        ];
        for e in entries {
            // Capacity is exactly four.
            let _ = sensors.push(e);
        }
        Self { sensors }
    }
}

impl GeoMessage {
    pub fn from_position(p: &GeoPosition) -> Self {
        Self {
            kind: "location",
            latitude: p.latitude,
            longitude: p.longitude,
            status: p.mode().status(),
        }
    }
}

pub fn encode_sensors(r: &SensorReading) -> Result<String, CommsError> {
    serde_json::to_string(&SensorsMessage::from_reading(r)).map_err(|_| CommsError::Serialize)
}

pub fn encode_geo(p: &GeoPosition) -> Result<String, CommsError> {
    serde_json::to_string(&GeoMessage::from_position(p)).map_err(|_| CommsError::Serialize)
}

fn topic_string(topic: &str) -> TopicString {
    let mut t = TopicString::new();
    let _ = t.push_str(topic);
    t
}

// ───────────────────────────────────────────────────────────────
// Publishing
// ───────────────────────────────────────────────────────────────

/// Publish the sensors message.  Returns whether the client accepted it.
pub fn publish_sensor_data(
    net: &mut impl PublishPort,
    topic: &str,
    reading: &SensorReading,
    sink: &mut impl EventSink,
) -> bool {
    let outcome = encode_sensors(reading).and_then(|json| net.publish(topic, json.as_bytes()));
    match outcome {
        Ok(()) => {
            sink.emit(&AppEvent::SensorsPublished {
                topic: topic_string(topic),
                reading: *reading,
            });
            true
        }
        Err(error) => {
            sink.emit(&AppEvent::PublishFailed {
                topic: topic_string(topic),
                error,
            });
            false
        }
    }
}

/// Publish the location message.  An invalid position is skipped without
/// touching the client.
pub fn publish_geo_data(
    net: &mut impl PublishPort,
    topic: &str,
    position: &GeoPosition,
    sink: &mut impl EventSink,
) -> bool {
    if !position.valid {
        sink.emit(&AppEvent::GeoSkipped);
        return false;
    }

    let outcome = encode_geo(position).and_then(|json| net.publish(topic, json.as_bytes()));
    match outcome {
        Ok(()) => {
            sink.emit(&AppEvent::GeoPublished {
                topic: topic_string(topic),
                position: *position,
            });
            true
        }
        Err(error) => {
            sink.emit(&AppEvent::PublishFailed {
                topic: topic_string(topic),
                error,
            });
            false
        }
    }
}
