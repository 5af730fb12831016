//! GPIO / peripheral pin assignments for the ESP32 DevKit sensor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Climate sensor (DHT22, single-wire)
// ---------------------------------------------------------------------------

/// Open-drain data line with 10 kΩ pull-up.
pub const DHT22_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Analog inputs (ADC1, 12-bit, 12 dB attenuation)
// ---------------------------------------------------------------------------

/// Photoresistor voltage divider.
pub const PHOTORESISTOR_GPIO: i32 = 32;
pub const PHOTORESISTOR_ADC_CHANNEL: u32 = adc1_channel(PHOTORESISTOR_GPIO);

/// Potentiometer wiper (input-only pin).
pub const POTENTIOMETER_GPIO: i32 = 34;
pub const POTENTIOMETER_ADC_CHANNEL: u32 = adc1_channel(POTENTIOMETER_GPIO);

/// ADC1 channel wired to `gpio` on the ESP32.  Fails the build for a pin
/// that is not on ADC1.
pub const fn adc1_channel(gpio: i32) -> u32 {
    match gpio {
        36 => 0,
        37 => 1,
        38 => 2,
        39 => 3,
        32 => 4,
        33 => 5,
        34 => 6,
        35 => 7,
        _ => panic!("GPIO is not an ADC1 pin"),
    }
}

/// Full-scale raw value of the 12-bit ADC.
pub const ADC_MAX_RAW: u16 = 4095;

// ---------------------------------------------------------------------------
// I²C bus (LCD1602 via PCF8574 backpack)
// ---------------------------------------------------------------------------

/// `main` takes these as typed `gpio21`/`gpio22` peripherals and asserts
/// they still match at compile time.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;
/// 7-bit address of the PCF8574 backpack (A0..A2 open).
pub const LCD_I2C_ADDR: u8 = 0x27;
