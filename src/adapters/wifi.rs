//! WiFi station-mode adapter.
//!
//! Implements [`AssociationPort`]: apply station credentials, then request
//! a connection.  The request is fire-and-forget; whether the station ever
//! associates shows up later as a DHCP lease (or its absence).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::info;

use crate::adapters::utils::{validate_password, validate_ssid};
use crate::app::ports::{AssociationError, AssociationPort};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Station adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiStation {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    ssid: heapless::String<32>,
    /// Simulation: number of connect requests issued.
    #[cfg(not(target_os = "espidf"))]
    sim_connects: u32,
}

impl WifiStation {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            wifi,
            ssid: heapless::String::new(),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            sim_connects: 0,
        }
    }

    /// SSID of the last accepted credentials (empty if none).
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Simulation: connect requests issued so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn connect_requests(&self) -> u32 {
        self.sim_connects
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_configure(&mut self, ssid: &str, password: &str) -> Result<(), AssociationError> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| AssociationError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|_| AssociationError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.wifi
            .set_configuration(&conf)
            .map_err(|e| AssociationError::Driver(e.code()))?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi
                .start()
                .map_err(|e| AssociationError::Driver(e.code()))?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_configure(&mut self, _ssid: &str, _password: &str) -> Result<(), AssociationError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), AssociationError> {
        self.wifi
            .connect()
            .map_err(|e| AssociationError::Driver(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), AssociationError> {
        self.sim_connects = self.sim_connects.wrapping_add(1);
        info!("WiFi(sim): connect requested (attempt {})", self.sim_connects);
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiStation {
    fn default() -> Self {
        Self::new()
    }
}

impl AssociationPort for WifiStation {
    fn set_station_credentials(
        &mut self,
        ssid: &str,
        password: &str,
    ) -> Result<(), AssociationError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.platform_configure(ssid, password)?;

        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| AssociationError::InvalidSsid)?;
        info!("WiFi: credentials set for SSID '{}'", ssid);
        Ok(())
    }

    fn connect(&mut self) -> Result<(), AssociationError> {
        if self.ssid.is_empty() {
            return Err(AssociationError::InvalidSsid);
        }
        self.platform_connect()?;
        info!("WiFi: connecting to '{}'", self.ssid);
        Ok(())
    }
}
