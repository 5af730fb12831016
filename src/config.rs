//! System configuration parameters
//!
//! All tunable parameters for the geofence node.  Defaults reproduce the
//! bench setup (Wokwi guest WiFi, public EMQX broker).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::identity::MAX_TOPIC_LEN;

/// Longest suffix appended to the device id when building topics.
const LONGEST_TOPIC_SUFFIX: &str = "/geosensors";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Device identifier; MQTT client id and topic prefix
    pub device_id: String,

    // --- WiFi ---
    pub wifi_ssid: String,
    /// Empty for open networks
    pub wifi_password: String,

    // --- MQTT ---
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: String,
    pub mqtt_password: String,
    /// Client in/out buffer size (bytes); must hold a full sensors message
    pub mqtt_buffer_size: usize,

    // --- Timing ---
    /// Sensing + publish cadence (milliseconds)
    pub publish_interval_ms: u32,
    /// Geofence mode toggle cadence (milliseconds)
    pub geofence_toggle_interval_ms: u32,
    /// Sleep at the end of every loop iteration (milliseconds)
    pub loop_delay_ms: u32,

    // --- Reconnect policy ---
    /// First backoff delay after a failed attempt (milliseconds)
    pub reconnect_initial_delay_ms: u32,
    /// Backoff ceiling (milliseconds)
    pub reconnect_max_delay_ms: u32,
    /// Attempt budget per stage (WiFi, broker)
    pub reconnect_max_attempts: u32,
    /// Wall-clock budget for a whole reconnect (milliseconds); backoff
    /// sleeps are cut short at this limit
    pub reconnect_timeout_ms: u32,

    // --- Simulation ---
    /// Initial location simulator mode
    pub start_inside_geofence: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device_id: "ESP32-DEV-001".into(),

            wifi_ssid: "Wokwi-GUEST".into(),
            wifi_password: String::new(),

            mqtt_host: "broker.emqx.io".into(),
            mqtt_port: 1883,
            mqtt_username: "mqttuser".into(),
            mqtt_password: "12345678".into(),
            mqtt_buffer_size: 1024,

            publish_interval_ms: 10_000,          // 0.1 Hz
            geofence_toggle_interval_ms: 120_000, // every 2 min
            loop_delay_ms: 100,

            reconnect_initial_delay_ms: 1_000,
            reconnect_max_delay_ms: 30_000,
            reconnect_max_attempts: 8,
            reconnect_timeout_ms: 120_000,

            start_inside_geofence: true,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::ValidationFailed("device_id is empty"));
        }
        if self.device_id.len() + LONGEST_TOPIC_SUFFIX.len() > MAX_TOPIC_LEN {
            return Err(ConfigError::ValidationFailed("device_id too long for topic"));
        }
        if self.mqtt_host.is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt_host is empty"));
        }
        if self.mqtt_port == 0 {
            return Err(ConfigError::ValidationFailed("mqtt_port is 0"));
        }
        if self.mqtt_buffer_size < 256 {
            return Err(ConfigError::ValidationFailed("mqtt_buffer_size below 256"));
        }
        if self.publish_interval_ms == 0 || self.geofence_toggle_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("timer interval is 0"));
        }
        if self.loop_delay_ms >= self.publish_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "loop_delay_ms must be below publish_interval_ms",
            ));
        }
        if self.reconnect_initial_delay_ms > self.reconnect_max_delay_ms {
            return Err(ConfigError::ValidationFailed(
                "reconnect_initial_delay_ms above reconnect_max_delay_ms",
            ));
        }
        if self.reconnect_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed("reconnect_max_attempts is 0"));
        }
        Ok(())
    }

    /// `mqtt://host:port` URL for the client.
    pub fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.mqtt_host, self.mqtt_port)
    }
}
