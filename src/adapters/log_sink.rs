//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART in production, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                device_id,
                sensors_topic,
                geo_topic,
                mode,
            } => {
                info!(
                    "START | device={} | sensors={} | geo={} | mode={}",
                    device_id,
                    sensors_topic,
                    geo_topic,
                    mode.label()
                );
            }
            AppEvent::PositionGenerated(p) => {
                info!(
                    "GEO   | lat={:.6} lon={:.6} | {}",
                    p.latitude,
                    p.longitude,
                    p.mode().status()
                );
            }
            AppEvent::GeofenceToggled(mode) => {
                info!("GEO   | mode -> {}", mode.label());
            }
            AppEvent::ClimateReadFailed => {
                warn!("SENS  | DHT22 read failed, publishing 0.0");
            }
            AppEvent::SensorsPublished { topic, reading } => {
                info!(
                    "PUB   | {} | T={:.1}\u{00b0}C H={:.1}% light={}% pot={}%",
                    topic,
                    reading.temperature_c,
                    reading.humidity_pct,
                    reading.light_pct,
                    reading.pot_pct
                );
            }
            AppEvent::GeoPublished { topic, position } => {
                info!(
                    "PUB   | {} | lat={:.6} lon={:.6}",
                    topic, position.latitude, position.longitude
                );
            }
            AppEvent::PublishFailed { topic, error } => {
                warn!("PUB   | {} failed: {}", topic, error);
            }
            AppEvent::GeoSkipped => {
                warn!("PUB   | no valid position, location skipped");
            }
            AppEvent::LinkUp => {
                info!("LINK  | up");
            }
            AppEvent::LinkDown => {
                warn!("LINK  | down");
            }
            AppEvent::RetryScheduled {
                stage,
                attempt,
                delay_ms,
                error,
            } => {
                warn!(
                    "LINK  | {} attempt {} failed ({}), retry in {} ms",
                    stage, attempt, error, delay_ms
                );
            }
            AppEvent::ReconnectFailed(e) => {
                warn!("LINK  | {}", e);
            }
        }
    }
}
