//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and the link manager emit
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them (serial log, test
//! recorder, ...).

use crate::app::context::{GeoPosition, SensorReading};
use crate::error::CommsError;
use crate::identity::TopicString;
use crate::link::{ConnectError, LinkStage};
use crate::location::GeofenceMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service finished startup (carries the initial simulator mode).
    Started {
        device_id: TopicString,
        sensors_topic: TopicString,
        geo_topic: TopicString,
        mode: GeofenceMode,
    },

    /// A new simulated fix was generated.
    PositionGenerated(GeoPosition),

    /// The geofence timer flipped the simulator mode.
    GeofenceToggled(GeofenceMode),

    /// The climate sensor failed and its values were zeroed.
    ClimateReadFailed,

    /// Sensors message accepted by the client.
    SensorsPublished {
        topic: TopicString,
        reading: SensorReading,
    },

    /// Location message accepted by the client.
    GeoPublished {
        topic: TopicString,
        position: GeoPosition,
    },

    /// A publish was rejected; the message is dropped.
    PublishFailed {
        topic: TopicString,
        error: CommsError,
    },

    /// No valid position yet, location publish skipped.
    GeoSkipped,

    /// Both WiFi and broker session are up.
    LinkUp,

    /// The link was found down at the top of an iteration.
    LinkDown,

    /// A connect attempt failed; the next one follows after `delay_ms`.
    RetryScheduled {
        stage: LinkStage,
        attempt: u32,
        delay_ms: u64,
        error: CommsError,
    },

    /// A bounded reconnect gave up.
    ReconnectFailed(ConnectError),
}
