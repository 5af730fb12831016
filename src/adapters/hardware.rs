//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the LCD driver, exposing them through
//! [`SensorPort`] and [`DisplayPort`].  On non-espidf targets the sensor
//! drivers fall back to their simulation stubs and the LCD runs against
//! whatever `I2c` implementation is passed in.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::context::SensorReading;
use crate::app::ports::{DisplayPort, SensorPort};
use crate::drivers::lcd::Lcd1602;
use crate::error::DisplayError;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all local hardware behind port traits.
pub struct HardwareAdapter<I2C, D> {
    sensor_hub: SensorHub,
    lcd: Lcd1602<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> HardwareAdapter<I2C, D> {
    pub fn new(sensor_hub: SensorHub, lcd: Lcd1602<I2C, D>) -> Self {
        Self { sensor_hub, lcd }
    }

    /// Bring the panel up.  The caller decides whether a dead display is
    /// fatal (it is not in `main`).
    pub fn init_display(&mut self) -> Result<(), DisplayError> {
        self.lcd.init()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c, D: DelayNs> SensorPort for HardwareAdapter<I2C, D> {
    fn read_all(&mut self) -> SensorReading {
        self.sensor_hub.read_all()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<I2C: I2c, D: DelayNs> DisplayPort for HardwareAdapter<I2C, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lcd.clear()
    }

    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        self.lcd.write_line(row, text)
    }
}
