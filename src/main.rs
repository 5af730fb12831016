//! Geofence node firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      NetworkAdapter       LogEventSink        │
//! │  (Sensor + Display)   (Connectivity +      (EventSink)         │
//! │   DHT22 · ADC · LCD    Publish: WiFi+MQTT)                     │
//! │  Esp32TimeAdapter     HardwareRng                              │
//! │  (Clock)              (Random)                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Scheduler · ConnectionManager · LocationSimulator     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use geofence_node::adapters::hardware::HardwareAdapter;
use geofence_node::adapters::log_sink::LogEventSink;
use geofence_node::adapters::mqtt::{MqttSession, MqttSettings};
use geofence_node::adapters::network::NetworkAdapter;
use geofence_node::adapters::rng::HardwareRng;
use geofence_node::adapters::time::Esp32TimeAdapter;
use geofence_node::adapters::wifi::WifiStation;
use geofence_node::app::ports::ClockPort;
use geofence_node::app::service::AppService;
use geofence_node::config::SystemConfig;
use geofence_node::drivers::hw_init;
use geofence_node::drivers::lcd::Lcd1602;
use geofence_node::pins;
use geofence_node::sensors::SensorHub;
use geofence_node::sensors::analog::AnalogInput;
use geofence_node::sensors::dht22::Dht22;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Geofence node v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    const _: () = assert!(pins::I2C_SDA_GPIO == 21 && pins::I2C_SCL_GPIO == 22);
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz()),
    )?;
    let lcd = Lcd1602::new(i2c, Delay::new_default(), pins::LCD_I2C_ADDR);

    let sensors = SensorHub::new(
        Dht22::new(pins::DHT22_GPIO),
        AnalogInput::photoresistor(),
        AnalogInput::potentiometer(),
    );
    let mut hw = HardwareAdapter::new(sensors, lcd);
    if let Err(e) = hw.init_display() {
        warn!("LCD init failed ({}), continuing without display", e);
    }

    // ── 4. Network ────────────────────────────────────────────
    let wifi = WifiStation::new(
        peripherals.modem,
        sysloop,
        nvs,
        &config.wifi_ssid,
        &config.wifi_password,
    )
    .map_err(|e| anyhow!("WiFi init: {}", e))?;
    let mqtt = MqttSession::new(MqttSettings::from_config(&config));
    let mut net = NetworkAdapter::new(wifi, mqtt);

    // ── 5. Application service ────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let loop_delay_ms = u64::from(config.loop_delay_ms);

    let mut service = AppService::new(config, HardwareRng::new(), clock)?;
    if let Err(e) = service.start(&mut hw, &mut net, &mut sink) {
        warn!("Starting offline ({}), the loop keeps retrying", e);
    }

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        service.run_once(&mut hw, &mut net, &mut sink);
        clock.sleep_ms(loop_delay_ms);
    }
}
