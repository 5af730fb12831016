//! Network adapter: WiFi station + MQTT session behind
//! [`ConnectivityPort`] and [`PublishPort`].
//!
//! The broker session only counts as up while WiFi is; a lost
//! association makes both stages reconnect.

use crate::adapters::mqtt::MqttSession;
use crate::adapters::wifi::WifiStation;
use crate::app::ports::{ConnectivityPort, PublishPort};
use crate::error::CommsError;

pub struct NetworkAdapter {
    wifi: WifiStation,
    mqtt: MqttSession,
}

impl NetworkAdapter {
    pub fn new(wifi: WifiStation, mqtt: MqttSession) -> Self {
        Self { wifi, mqtt }
    }
}

impl ConnectivityPort for NetworkAdapter {
    fn wifi_connected(&self) -> bool {
        self.wifi.is_connected()
    }

    fn connect_wifi(&mut self) -> Result<(), CommsError> {
        self.wifi.connect()
    }

    fn broker_connected(&self) -> bool {
        self.wifi.is_connected() && self.mqtt.is_connected()
    }

    fn connect_broker(&mut self) -> Result<(), CommsError> {
        if !self.wifi.is_connected() {
            return Err(CommsError::WifiDisconnected);
        }
        self.mqtt.connect()
    }

    fn service(&mut self) {
        self.mqtt.service();
    }
}

impl PublishPort for NetworkAdapter {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.wifi.is_connected() {
            return Err(CommsError::WifiDisconnected);
        }
        self.mqtt.publish(topic, payload)
    }
}
