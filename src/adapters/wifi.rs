//! WiFi station-mode adapter.
//!
//! One call to [`WifiStation::connect`] is one association attempt.
//! Retry and backoff belong to [`ConnectionManager`](crate::link::ConnectionManager).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: simulation with injectable failures for
//!   host-side tests.

use log::{info, warn};

use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID 1-32 printable bytes; password empty (open network) or 8-64 bytes.
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), CommsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::WifiConnectFailed);
    }
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CommsError::WifiConnectFailed);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiStation {
    wifi: BlockingWifi<EspWifi<'static>>,
    ssid: heapless::String<32>,
    started: bool,
}

#[cfg(target_os = "espidf")]
impl WifiStation {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> Result<Self, CommsError> {
        validate_credentials(ssid, password)?;

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))
            .map_err(|_| CommsError::WifiConnectFailed)?;
        let mut wifi =
            BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| CommsError::WifiConnectFailed)?;

        let ssid: heapless::String<32> =
            ssid.try_into().map_err(|_| CommsError::WifiConnectFailed)?;
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.clone(),
            password: password.try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method,
            ..Default::default()
        }))
        .map_err(|_| CommsError::WifiConnectFailed)?;

        Ok(Self {
            wifi,
            ssid,
            started: false,
        })
    }

    pub fn connect(&mut self) -> Result<(), CommsError> {
        if !self.started {
            self.wifi.start().map_err(|_| CommsError::WifiConnectFailed)?;
            self.started = true;
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        if let Err(e) = self.wifi.connect().and_then(|()| self.wifi.wait_netif_up()) {
            warn!("WiFi: connect failed ({})", e);
            // Leave the driver idle so the next attempt starts clean.
            let _ = self.wifi.disconnect();
            return Err(CommsError::WifiConnectFailed);
        }

        match self.wifi.wifi().sta_netif().get_ip_info() {
            Ok(ip) => info!("WiFi: connected, IP {}", ip.ip),
            Err(_) => info!("WiFi: connected"),
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct WifiStation {
    ssid: heapless::String<32>,
    connected: bool,
    failures_left: u32,
    attempts: u32,
}

#[cfg(not(target_os = "espidf"))]
impl WifiStation {
    pub fn new(ssid: &str, password: &str) -> Result<Self, CommsError> {
        validate_credentials(ssid, password)?;
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|_| CommsError::WifiConnectFailed)?;
        Ok(Self {
            ssid: s,
            connected: false,
            failures_left: 0,
            attempts: 0,
        })
    }

    pub fn connect(&mut self) -> Result<(), CommsError> {
        self.attempts = self.attempts.saturating_add(1);
        if self.failures_left > 0 {
            self.failures_left -= 1;
            warn!("WiFi(sim): association with '{}' failed", self.ssid);
            return Err(CommsError::WifiConnectFailed);
        }
        self.connected = true;
        info!("WiFi(sim): connected to '{}'", self.ssid);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Fail the next `n` connect attempts.
    pub fn sim_fail_next(&mut self, n: u32) {
        self.failures_left = n;
    }

    /// Drop the association as if the AP went away.
    pub fn sim_drop(&mut self) {
        self.connected = false;
    }

    pub fn sim_attempts(&self) -> u32 {
        self.attempts
    }
}
