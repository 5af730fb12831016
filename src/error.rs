//! Error types for the geofence node firmware, one enum per subsystem.
//!
//! All variants are `Copy` so they can be carried inside
//! [`AppEvent`](crate::app::events::AppEvent)s without allocation.  The
//! binary boundary wraps them in `anyhow`.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The DHT22 did not drive the expected level within its time window.
    Timeout,
    /// The 40-bit DHT22 frame failed its checksum.
    Checksum,
    /// ADC read returned an error.
    AdcReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "bus timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiDisconnected,
    BrokerConnectFailed,
    BrokerDisconnected,
    PublishFailed,
    /// Payload or topic does not fit the client buffer.
    PayloadTooLarge,
    Serialize,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiDisconnected => write!(f, "WiFi disconnected"),
            Self::BrokerConnectFailed => write!(f, "MQTT connect failed"),
            Self::BrokerDisconnected => write!(f, "MQTT disconnected"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::PayloadTooLarge => write!(f, "payload exceeds client buffer"),
            Self::Serialize => write!(f, "JSON serialisation failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The I2C backpack NAKed or the bus faulted.
    Bus,
    /// Row index outside the panel.
    InvalidRow,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::InvalidRow => write!(f, "row out of range"),
        }
    }
}
