//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces one [`SensorReading`]
//! per publish cycle.

pub mod analog;
pub mod dht22;

use log::warn;

use crate::app::context::SensorReading;
use crate::error::SensorError;
use analog::AnalogInput;
use dht22::{ClimateReading, Dht22};

/// Aggregates all sensor drivers and produces a unified reading.
pub struct SensorHub {
    pub climate: Dht22,
    pub light: AnalogInput,
    pub pot: AnalogInput,
}

impl SensorHub {
    /// Construct a new hub.  Drivers are built in main where pin
    /// ownership is established.
    pub fn new(climate: Dht22, light: AnalogInput, pot: AnalogInput) -> Self {
        Self { climate, light, pot }
    }

    /// Read every sensor.
    ///
    /// A failed climate read is published as 0.0 with
    /// `climate_valid = false`; a failed analog read as 0.  Nothing here
    /// aborts the cycle.
    pub fn read_all(&mut self) -> SensorReading {
        let climate = self.climate.read();
        let light = self.light.read_percent().unwrap_or_else(|e| {
            warn!("Sensors: light read failed ({})", e);
            0
        });
        let pot = self.pot.read_percent().unwrap_or_else(|e| {
            warn!("Sensors: potentiometer read failed ({})", e);
            0
        });
        assemble(climate, light, pot)
    }
}

/// Combine driver outputs into a reading, coercing failures and NaN.
pub fn assemble(
    climate: Result<ClimateReading, SensorError>,
    light_pct: u8,
    pot_pct: u8,
) -> SensorReading {
    let climate = match climate {
        Ok(c) if c.temperature_c.is_nan() || c.humidity_pct.is_nan() => {
            warn!("Sensors: DHT22 returned NaN");
            None
        }
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Sensors: DHT22 read failed ({})", e);
            None
        }
    };

    match climate {
        Some(c) => SensorReading {
            temperature_c: c.temperature_c,
            humidity_pct: c.humidity_pct,
            light_pct,
            pot_pct,
            climate_valid: true,
        },
        None => SensorReading {
            temperature_c: 0.0,
            humidity_pct: 0.0,
            light_pct,
            pot_pct,
            climate_valid: false,
        },
    }
}
