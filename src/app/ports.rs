//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, LCD, WiFi/MQTT, clock, RNG, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every path can be driven from host tests.

use crate::app::context::SensorReading;
use crate::error::{CommsError, DisplayError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Read every sensor and return a normalised reading.  Never fails:
    /// climate read failures surface as `climate_valid = false`.
    fn read_all(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character LCD)
// ───────────────────────────────────────────────────────────────

/// Two-line character display.
pub trait DisplayPort {
    /// Blank both lines and home the cursor.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write `text` starting at column 0 of `row` (0 or 1).
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi + broker session)
// ───────────────────────────────────────────────────────────────

/// Link maintenance.  Each `connect_*` call is a **single** attempt; retry
/// policy lives in [`ConnectionManager`](crate::link::ConnectionManager).
pub trait ConnectivityPort {
    fn wifi_connected(&self) -> bool;
    fn connect_wifi(&mut self) -> Result<(), CommsError>;
    fn broker_connected(&self) -> bool;
    fn connect_broker(&mut self) -> Result<(), CommsError>;

    /// Drain pending client I/O (keep-alives, acks).  Called every loop
    /// iteration.
    fn service(&mut self);

    fn is_connected(&self) -> bool {
        self.wifi_connected() && self.broker_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Best-effort, fire-and-forget publish (QoS 0, not retained).
pub trait PublishPort {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock with a blocking sleep.
///
/// Implementations are cheap handles (`Clone + 'static`) so a copy can be
/// moved into the reconnect backoff sleeper.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Random port
// ───────────────────────────────────────────────────────────────

/// Source of raw 32-bit random words for the location simulator.
pub trait RandomPort {
    fn next_u32(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when an interval elapses.
pub trait SchedulerDelegate {
    /// * `label`: the human-readable label of the timer that fired.
    /// * `kind`: which periodic job is due.
    fn on_timer_fired(&mut self, label: &str, kind: TimerKind);
}

/// Discriminant passed to [`SchedulerDelegate::on_timer_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Flip the simulated geofence mode and regenerate the position.
    GeofenceToggle,
    /// Read sensors, publish both messages, refresh the display.
    TelemetryPublish,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
