//! DHT22 (AM2302) temperature / humidity sensor.
//!
//! Single-wire protocol: the host pulls the line low for >1 ms, releases
//! it, the sensor answers with an 80 us low / 80 us high preamble and then
//! clocks out 40 bits.  Each bit is a ~50 us low followed by a high pulse
//! whose width carries the value (~26 us = 0, ~70 us = 1).
//!
//! Frame layout (big-endian):
//!
//! | bytes | content                                   |
//! |-------|-------------------------------------------|
//! | 0..2  | relative humidity x10                     |
//! | 2..4  | temperature x10, bit 15 = sign            |
//! | 4     | checksum, low byte of the sum of bytes 0-3 |
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the data line with busy-wait timing.
//! On host/test: returns a frame injected through [`sim_set_frame`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::SensorError;

pub const FRAME_LEN: usize = 5;

/// Decoded climate values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Validate the checksum and decode a raw 40-bit frame.
pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    Ok(ClimateReading {
        temperature_c: temperature,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}

// ── Host simulation ───────────────────────────────────────────

/// 23.5 C / 60.2 % with a valid checksum.
#[cfg(not(target_os = "espidf"))]
const SIM_DEFAULT_FRAME: u64 = 0x02_5A_00_EB_47;

#[cfg(not(target_os = "espidf"))]
static SIM_FRAME: AtomicU64 = AtomicU64::new(SIM_DEFAULT_FRAME);
#[cfg(not(target_os = "espidf"))]
static SIM_TIMEOUT: AtomicBool = AtomicBool::new(false);

/// Inject the next frame the simulated sensor will return.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_frame(frame: [u8; FRAME_LEN]) {
    let mut packed = [0u8; 8];
    packed[3..].copy_from_slice(&frame);
    SIM_FRAME.store(u64::from_be_bytes(packed), Ordering::Relaxed);
}

/// Make the simulated sensor stop answering.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_timeout(timeout: bool) {
    SIM_TIMEOUT.store(timeout, Ordering::Relaxed);
}

// ── Sensor ────────────────────────────────────────────────────

pub struct Dht22 {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl Dht22 {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let frame = self.read_frame()?;
        decode_frame(&frame)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        if SIM_TIMEOUT.load(Ordering::Relaxed) {
            return Err(SensorError::Timeout);
        }
        let packed = SIM_FRAME.load(Ordering::Relaxed).to_be_bytes();
        let mut frame = [0u8; FRAME_LEN];
        frame.copy_from_slice(&packed[3..]);
        Ok(frame)
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        use esp_idf_svc::sys::{ets_delay_us, gpio_set_level};

        let mut frame = [0u8; FRAME_LEN];

        // SAFETY: the line was configured as open-drain in hw_init and is
        // only touched from the main loop.
        unsafe {
            gpio_set_level(self.gpio, 0);
            ets_delay_us(3_000);
            gpio_set_level(self.gpio, 1);
            ets_delay_us(25);
        }

        // Preamble: 80 us low, 80 us high.
        self.wait_while(false, 85)?;
        self.wait_while(true, 85)?;

        for bit in 0..40 {
            self.wait_while(false, 56)?;
            let high_us = self.wait_while(true, 75)?;
            if high_us > 40 {
                frame[bit / 8] |= 1 << (7 - (bit % 8));
            }
        }

        Ok(frame)
    }

    /// Busy-wait while the line is at `level`; returns the time spent.
    #[cfg(target_os = "espidf")]
    fn wait_while(&self, level: bool, max_us: u32) -> Result<u32, SensorError> {
        use esp_idf_svc::sys::{ets_delay_us, gpio_get_level};

        let level = i32::from(level);
        let mut elapsed = 0u32;
        // SAFETY: read-only access to a configured input.
        while unsafe { gpio_get_level(self.gpio) } == level {
            elapsed += 1;
            if elapsed > max_us {
                return Err(SensorError::Timeout);
            }
            unsafe { ets_delay_us(1) };
        }
        Ok(elapsed)
    }
}
