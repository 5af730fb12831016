//! SensorHub and HardwareAdapter against the host sensor simulations.
//!
//! The DHT22 and ADC sims are process-wide statics, so every test here
//! holds `SIM_LOCK` and starts from a known state.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

use geofence_node::adapters::hardware::HardwareAdapter;
use geofence_node::app::ports::{DisplayPort, SensorPort};
use geofence_node::drivers::lcd::Lcd1602;
use geofence_node::error::DisplayError;
use geofence_node::pins;
use geofence_node::sensors::SensorHub;
use geofence_node::sensors::analog::{self, AnalogInput};
use geofence_node::sensors::dht22::{self, Dht22, FRAME_LEN};

static SIM_LOCK: Mutex<()> = Mutex::new(());

fn sims() -> MutexGuard<'static, ()> {
    let guard = SIM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    dht22::sim_set_timeout(false);
    dht22::sim_set_frame(with_checksum([0x02, 0x5A, 0x00, 0xEB]));
    analog::sim_set_light_adc(2048);
    analog::sim_set_pot_adc(0);
    guard
}

fn with_checksum(b: [u8; 4]) -> [u8; FRAME_LEN] {
    let sum = b.iter().fold(0u8, |a, x| a.wrapping_add(*x));
    [b[0], b[1], b[2], b[3], sum]
}

fn hub() -> SensorHub {
    SensorHub::new(
        Dht22::new(pins::DHT22_GPIO),
        AnalogInput::photoresistor(),
        AnalogInput::potentiometer(),
    )
}

// ── SensorHub ─────────────────────────────────────────────────

#[test]
fn good_frame_and_adc_extremes_pass_through() {
    let _sims = sims();
    // 50.0 %, -10.1 C
    dht22::sim_set_frame(with_checksum([0x01, 0xF4, 0x80, 0x65]));
    analog::sim_set_light_adc(4095);
    analog::sim_set_pot_adc(2047);

    let r = hub().read_all();
    assert!(r.climate_valid);
    assert!((r.temperature_c + 10.1).abs() < 1e-4);
    assert!((r.humidity_pct - 50.0).abs() < 1e-4);
    assert_eq!(r.light_pct, 100);
    assert_eq!(r.pot_pct, 49);
}

#[test]
fn dht_timeout_reads_as_zero_and_invalid() {
    let _sims = sims();
    dht22::sim_set_timeout(true);
    analog::sim_set_pot_adc(4095);

    let r = hub().read_all();
    assert!(!r.climate_valid);
    assert_eq!(r.temperature_c, 0.0);
    assert_eq!(r.humidity_pct, 0.0);
    // Analog channels are unaffected.
    assert_eq!(r.light_pct, 50);
    assert_eq!(r.pot_pct, 100);
}

#[test]
fn bad_checksum_reads_as_zero_and_invalid() {
    let _sims = sims();
    let mut frame = with_checksum([0x02, 0x5A, 0x00, 0xEB]);
    frame[4] = frame[4].wrapping_add(1);
    dht22::sim_set_frame(frame);

    let r = hub().read_all();
    assert!(!r.climate_valid);
    assert_eq!(r.temperature_c, 0.0);
    assert_eq!(r.humidity_pct, 0.0);
}

#[test]
fn recovers_on_the_next_good_frame() {
    let _sims = sims();
    let mut hub = hub();
    dht22::sim_set_timeout(true);
    assert!(!hub.read_all().climate_valid);

    dht22::sim_set_timeout(false);
    let r = hub.read_all();
    assert!(r.climate_valid);
    assert!((r.temperature_c - 23.5).abs() < 1e-4);
    assert!((r.humidity_pct - 60.2).abs() < 1e-4);
}

// ── HardwareAdapter ───────────────────────────────────────────

/// I2C bus that records every byte written, shared with the test.
#[derive(Clone, Default)]
struct SharedBus(Rc<RefCell<Vec<(u8, u8)>>>);

impl ErrorType for SharedBus {
    type Error = ErrorKind;
}

impl I2c for SharedBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Write(bytes) = op {
                self.0.borrow_mut().extend(bytes.iter().map(|b| (address, *b)));
            }
        }
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[test]
fn hardware_adapter_serves_sensor_and_display_ports() {
    let _sims = sims();
    analog::sim_set_light_adc(0);
    analog::sim_set_pot_adc(4095);

    let bus = SharedBus::default();
    let lcd = Lcd1602::new(bus.clone(), NoDelay, pins::LCD_I2C_ADDR);
    let mut hw = HardwareAdapter::new(hub(), lcd);

    hw.init_display().unwrap();
    assert!(!bus.0.borrow().is_empty());

    let r = SensorPort::read_all(&mut hw);
    assert!(r.climate_valid);
    assert_eq!((r.light_pct, r.pot_pct), (0, 100));

    bus.0.borrow_mut().clear();
    DisplayPort::clear(&mut hw).unwrap();
    DisplayPort::write_line(&mut hw, 1, "IN: -107.7000").unwrap();
    assert!(bus.0.borrow().iter().all(|&(addr, _)| addr == pins::LCD_I2C_ADDR));
    assert_eq!(
        DisplayPort::write_line(&mut hw, 2, "x"),
        Err(DisplayError::InvalidRow)
    );
}
