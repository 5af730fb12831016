//! Device state owned by the main loop.
//!
//! `DeviceContext` replaces the loose process-wide globals a sketch would
//! keep (latest reading, position, geofence mode).  The
//! [`AppService`](super::service::AppService) is its single writer; the
//! publisher and display only ever see shared borrows of it.

use crate::config::SystemConfig;
use crate::identity::DeviceIdentity;
use crate::location::GeofenceMode;

// ---------------------------------------------------------------------------
// Sensor reading (written by the sensor hub once per publish cycle)
// ---------------------------------------------------------------------------

/// A point-in-time reading of every local sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReading {
    /// DHT22 temperature (°C).  0.0 when the read failed.
    pub temperature_c: f32,
    /// DHT22 relative humidity (%).  0.0 when the read failed.
    pub humidity_pct: f32,
    /// Photoresistor, scaled 0–100.
    pub light_pct: u8,
    /// Potentiometer, scaled 0–100.
    pub pot_pct: u8,
    /// False when the climate values above are the 0.0 fallback rather
    /// than a measurement.
    pub climate_valid: bool,
}

// ---------------------------------------------------------------------------
// Geo position (written only by the location simulator)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub inside_geofence: bool,
    /// Set once a position has been generated; never cleared.
    pub valid: bool,
}

impl GeoPosition {
    /// Placeholder held before the first fix is generated.
    pub const INVALID: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
        inside_geofence: false,
        valid: false,
    };

    pub fn mode(&self) -> GeofenceMode {
        GeofenceMode::from_inside(self.inside_geofence)
    }
}

impl Default for GeoPosition {
    fn default() -> Self {
        Self::INVALID
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

pub struct DeviceContext {
    pub config: SystemConfig,
    pub identity: DeviceIdentity,
    pub reading: SensorReading,
    pub position: GeoPosition,
}

impl DeviceContext {
    pub fn new(config: SystemConfig) -> Self {
        let identity = DeviceIdentity::new(&config.device_id);
        Self {
            config,
            identity,
            reading: SensorReading::default(),
            position: GeoPosition::INVALID,
        }
    }
}
