//! MQTT broker session adapter.
//!
//! Publishes at QoS 0 (at most once), never retained.  The device never
//! subscribes.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with a callback that
//!   mirrors CONNECTED / DISCONNECTED into an atomic flag.  A connect
//!   attempt creates a fresh client and waits a bounded time for CONNACK.
//! - **all other targets**: in-memory session recording every publish.

use log::{info, warn};

use crate::error::CommsError;

/// Broker endpoint and credentials for one session.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub url: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub buffer_size: usize,
}

impl MqttSettings {
    pub fn from_config(config: &crate::config::SystemConfig) -> Self {
        Self {
            url: config.broker_url(),
            client_id: config.device_id.clone(),
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            buffer_size: config.mqtt_buffer_size,
        }
    }

    /// Reject payloads that would not fit the client buffer.
    pub fn check_fits(&self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        // Fixed header, topic length prefix, topic, payload.
        if topic.len() + payload.len() + 5 > self.buffer_size {
            return Err(CommsError::PayloadTooLarge);
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

    use super::*;

    /// How long one attempt waits for the broker to acknowledge.
    const CONNACK_WAIT_MS: u32 = 5_000;
    const CONNACK_POLL_MS: u32 = 50;

    pub struct MqttSession {
        settings: MqttSettings,
        client: Option<EspMqttClient<'static>>,
        connected: Arc<AtomicBool>,
    }

    impl MqttSession {
        pub fn new(settings: MqttSettings) -> Self {
            Self {
                settings,
                client: None,
                connected: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn settings(&self) -> &MqttSettings {
            &self.settings
        }

        pub fn connect(&mut self) -> Result<(), CommsError> {
            // A stale client would keep reconnecting on its own.
            self.client = None;
            self.connected.store(false, Ordering::Release);

            let conf = MqttClientConfiguration {
                client_id: Some(&self.settings.client_id),
                username: Some(&self.settings.username),
                password: Some(&self.settings.password),
                buffer_size: self.settings.buffer_size,
                out_buffer_size: self.settings.buffer_size,
                ..Default::default()
            };

            let flag = self.connected.clone();
            let client = EspMqttClient::new_cb(&self.settings.url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => flag.store(true, Ordering::Release),
                    EventPayload::Disconnected => flag.store(false, Ordering::Release),
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT: client init failed ({})", e);
                CommsError::BrokerConnectFailed
            })?;
            self.client = Some(client);

            info!("MQTT: connecting to {}", self.settings.url);
            let mut waited = 0;
            while !self.connected.load(Ordering::Acquire) {
                if waited >= CONNACK_WAIT_MS {
                    warn!("MQTT: no CONNACK within {} ms", CONNACK_WAIT_MS);
                    self.client = None;
                    return Err(CommsError::BrokerConnectFailed);
                }
                FreeRtos::delay_ms(CONNACK_POLL_MS);
                waited += CONNACK_POLL_MS;
            }
            info!("MQTT: connected as '{}'", self.settings.client_id);
            Ok(())
        }

        pub fn is_connected(&self) -> bool {
            self.client.is_some() && self.connected.load(Ordering::Acquire)
        }

        /// The ESP-IDF client runs its own task; nothing to pump here.
        pub fn service(&mut self) {}

        pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
            self.settings.check_fits(topic, payload)?;
            if !self.is_connected() {
                return Err(CommsError::BrokerDisconnected);
            }
            let client = self.client.as_mut().ok_or(CommsError::BrokerDisconnected)?;
            client
                .publish(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|_| CommsError::PublishFailed)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use super::*;

    pub struct MqttSession {
        settings: MqttSettings,
        connected: bool,
        connect_failures_left: u32,
        fail_publishes: bool,
        published: Vec<(String, Vec<u8>)>,
        serviced: u32,
    }

    impl MqttSession {
        pub fn new(settings: MqttSettings) -> Self {
            Self {
                settings,
                connected: false,
                connect_failures_left: 0,
                fail_publishes: false,
                published: Vec::new(),
                serviced: 0,
            }
        }

        pub fn settings(&self) -> &MqttSettings {
            &self.settings
        }

        pub fn connect(&mut self) -> Result<(), CommsError> {
            if self.connect_failures_left > 0 {
                self.connect_failures_left -= 1;
                warn!("MQTT(sim): {} refused the session", self.settings.url);
                return Err(CommsError::BrokerConnectFailed);
            }
            self.connected = true;
            info!("MQTT(sim): connected to {} as '{}'", self.settings.url, self.settings.client_id);
            Ok(())
        }

        pub fn is_connected(&self) -> bool {
            self.connected
        }

        pub fn service(&mut self) {
            self.serviced = self.serviced.saturating_add(1);
        }

        pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
            self.settings.check_fits(topic, payload)?;
            if !self.connected {
                return Err(CommsError::BrokerDisconnected);
            }
            if self.fail_publishes {
                return Err(CommsError::PublishFailed);
            }
            self.published.push((topic.to_string(), payload.to_vec()));
            Ok(())
        }

        pub fn sim_fail_connects(&mut self, n: u32) {
            self.connect_failures_left = n;
        }

        pub fn sim_fail_publishes(&mut self, fail: bool) {
            self.fail_publishes = fail;
        }

        pub fn sim_drop(&mut self) {
            self.connected = false;
        }

        pub fn sim_published(&self) -> &[(String, Vec<u8>)] {
            &self.published
        }

        pub fn sim_serviced(&self) -> u32 {
            self.serviced
        }
    }
}

pub use platform::MqttSession;
