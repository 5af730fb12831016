//! Mock adapters for integration tests.
//!
//! Records every display write and publish so tests can assert on the
//! full history without touching real GPIO, I2C or sockets.  The clock
//! is virtual: sleeping advances it instantly.

use std::cell::Cell;
use std::rc::Rc;

use geofence_node::app::context::SensorReading;
use geofence_node::app::events::AppEvent;
use geofence_node::app::ports::{
    ClockPort, ConnectivityPort, DisplayPort, EventSink, PublishPort, SensorPort,
};
use geofence_node::error::{CommsError, DisplayError};

// ── FakeClock ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl FakeClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LcdCall {
    Clear,
    Line(u8, String),
}

pub struct MockHardware {
    pub reading: SensorReading,
    pub reads: u32,
    pub lcd: Vec<LcdCall>,
    pub rows: [String; 2],
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            reading: SensorReading {
                temperature_c: 23.45,
                humidity_pct: 60.2,
                light_pct: 42,
                pot_pct: 77,
                climate_valid: true,
            },
            reads: 0,
            lcd: Vec::new(),
            rows: Default::default(),
        }
    }

    /// Simulate a DHT22 that stopped answering.
    pub fn fail_climate(&mut self) {
        self.reading.temperature_c = 0.0;
        self.reading.humidity_pct = 0.0;
        self.reading.climate_valid = false;
    }

    pub fn clears(&self) -> usize {
        self.lcd.iter().filter(|c| **c == LcdCall::Clear).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorReading {
        self.reads += 1;
        self.reading
    }
}

impl DisplayPort for MockHardware {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lcd.push(LcdCall::Clear);
        self.rows = Default::default();
        Ok(())
    }

    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        let slot = self
            .rows
            .get_mut(usize::from(row))
            .ok_or(DisplayError::InvalidRow)?;
        *slot = text.to_string();
        self.lcd.push(LcdCall::Line(row, text.to_string()));
        Ok(())
    }
}

// ── MockNetwork ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub at_ms: u64,
}

pub struct MockNetwork {
    clock: FakeClock,
    pub wifi_up: bool,
    pub broker_up: bool,
    /// Remaining forced failures per stage.  `u32::MAX` = unreachable.
    pub wifi_failures: u32,
    pub broker_failures: u32,
    pub wifi_attempts: u32,
    pub broker_attempts: u32,
    pub reject_publishes: bool,
    pub serviced: u32,
    pub published: Vec<Published>,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            wifi_up: false,
            broker_up: false,
            wifi_failures: 0,
            broker_failures: 0,
            wifi_attempts: 0,
            broker_attempts: 0,
            reject_publishes: false,
            serviced: 0,
            published: Vec::new(),
        }
    }

    /// Drop both the association and the session.
    pub fn drop_link(&mut self) {
        self.wifi_up = false;
        self.broker_up = false;
    }

    pub fn on_topic(&self, topic: &str) -> Vec<&Published> {
        self.published.iter().filter(|p| p.topic == topic).collect()
    }
}

impl ConnectivityPort for MockNetwork {
    fn wifi_connected(&self) -> bool {
        self.wifi_up
    }

    fn connect_wifi(&mut self) -> Result<(), CommsError> {
        self.wifi_attempts += 1;
        if self.wifi_failures > 0 {
            if self.wifi_failures != u32::MAX {
                self.wifi_failures -= 1;
            }
            return Err(CommsError::WifiConnectFailed);
        }
        self.wifi_up = true;
        Ok(())
    }

    fn broker_connected(&self) -> bool {
        self.wifi_up && self.broker_up
    }

    fn connect_broker(&mut self) -> Result<(), CommsError> {
        self.broker_attempts += 1;
        if self.broker_failures > 0 {
            if self.broker_failures != u32::MAX {
                self.broker_failures -= 1;
            }
            return Err(CommsError::BrokerConnectFailed);
        }
        self.broker_up = true;
        Ok(())
    }

    fn service(&mut self) {
        self.serviced += 1;
    }
}

impl PublishPort for MockNetwork {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.broker_connected() {
            return Err(CommsError::BrokerDisconnected);
        }
        if self.reject_publishes {
            return Err(CommsError::PublishFailed);
        }
        self.published.push(Published {
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            at_ms: self.clock.now_ms(),
        });
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
