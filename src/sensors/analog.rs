//! Photoresistor and potentiometer on ADC1.
//!
//! Both are plain voltage dividers read as 12-bit samples and mapped
//! linearly onto 0-100.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins::{self, ADC_MAX_RAW};

static SIM_LIGHT_ADC: AtomicU16 = AtomicU16::new(2048);
static SIM_POT_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light_adc(raw: u16) {
    SIM_LIGHT_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pot_adc(raw: u16) {
    SIM_POT_ADC.store(raw, Ordering::Relaxed);
}

/// Map a raw sample onto 0-100, truncating.  Values above full scale
/// saturate at 100.
pub fn adc_to_percent(raw: u16) -> u8 {
    let raw = u32::from(raw.min(ADC_MAX_RAW));
    (raw * 100 / u32::from(ADC_MAX_RAW)) as u8
}

/// One ADC1 channel scaled to percent.
pub struct AnalogInput {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
    #[cfg_attr(target_os = "espidf", allow(dead_code))]
    sim: &'static AtomicU16,
}

impl AnalogInput {
    pub fn photoresistor() -> Self {
        Self {
            channel: pins::PHOTORESISTOR_ADC_CHANNEL,
            sim: &SIM_LIGHT_ADC,
        }
    }

    pub fn potentiometer() -> Self {
        Self {
            channel: pins::POTENTIOMETER_ADC_CHANNEL,
            sim: &SIM_POT_ADC,
        }
    }

    pub fn read_percent(&self) -> Result<u8, SensorError> {
        self.read_raw().map(adc_to_percent)
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel).ok_or(SensorError::AdcReadFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self) -> Result<u16, SensorError> {
        Ok(self.sim.load(Ordering::Relaxed))
    }
}
