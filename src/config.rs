//! Node configuration parameters
//!
//! All tunable parameters for the greenhouse node.  Defaults match the
//! reference deployment; a build can override them through environment
//! variables captured at compile time (see [`NodeConfig::from_build_env`]).

use core::fmt;
use core::net::{Ipv4Addr, SocketAddrV4};
use core::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::adapters::utils::{validate_password, validate_ssid};
use crate::app::ports::{AssociationError, SyncTarget};
use crate::pins;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field is out of range.
    ValidationFailed(&'static str),
    /// The override document is not valid JSON for [`NodeConfig`].
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Malformed => write!(f, "malformed override document"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Wi-Fi credentials
// ───────────────────────────────────────────────────────────────

/// Station credentials.  Constructed only through [`WifiCredentials::new`],
/// which applies the same checks as the Wi-Fi adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, AssociationError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|_| AssociationError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| AssociationError::InvalidPassword)?;
        Ok(creds)
    }
}

// ───────────────────────────────────────────────────────────────
// Settle mode
// ───────────────────────────────────────────────────────────────

/// How the orchestrator waits after starting address acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SettleMode {
    /// Sleep for `settle_delay_ms`, then start syncing regardless.
    FixedDelay,
    /// Block until an address is bound, or `max_wait_ms` elapses.
    UntilBound { max_wait_ms: u32 },
}

// ───────────────────────────────────────────────────────────────
// Node configuration
// ───────────────────────────────────────────────────────────────

/// How the Wi-Fi station associates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// The driver connects at boot with the configuration stored in NVS.
    Stored,
    /// The orchestrator applies the build-time credentials.
    Credentials,
}

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- Pump ---
    /// GPIO driving the pump
    pub pump_gpio: i32,
    /// Logical pump index (diagnostics only)
    pub pump_index: u8,
    /// Time the pin holds each level (ms); the wave period is twice this
    pub pump_half_period_ms: u32,

    // --- Time sync ---
    /// Base sleep unit (ms)
    pub base_sleep_ms: u32,
    /// Sync period in base units
    pub sync_period_units: u32,
    /// Wait after starting DHCP before the first sync (ms)
    pub settle_delay_ms: u32,
    pub settle_mode: SettleMode,
    /// SNTP server, IPv4 literal with port
    pub sntp_server: SocketAddrV4,
    /// Per-query response timeout (ms)
    pub sntp_timeout_ms: u32,

    // --- Tasks ---
    /// Stack size of each device task (bytes)
    pub task_stack_bytes: usize,
    /// Shared priority of both device tasks
    pub task_priority: u8,

    // --- Wi-Fi ---
    /// The station associates on its own; skip explicit association
    pub wifi_sta_auto: bool,
    pub wifi: Option<WifiCredentials>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Pump
            pump_gpio: pins::PUMP0_GPIO,
            pump_index: pins::PUMP0_INDEX,
            pump_half_period_ms: 10_000, // 20 s wave

            // Time sync
            base_sleep_ms: 1_000,
            sync_period_units: 5,
            settle_delay_ms: 5_000,
            settle_mode: SettleMode::FixedDelay,
            sntp_server: SocketAddrV4::new(Ipv4Addr::new(178, 215, 228, 24), 123),
            sntp_timeout_ms: 4_000,

            // Tasks
            task_stack_bytes: 4_096,
            task_priority: 7,

            // Wi-Fi
            wifi_sta_auto: false,
            wifi: None,
        }
    }
}

impl NodeConfig {
    /// Configuration baked in at compile time.
    ///
    /// Layers, in order: defaults, the `GREENHOUSE_CONFIG` JSON document,
    /// `GREENHOUSE_WIFI_SSID` / `GREENHOUSE_WIFI_PASSWORD`, and
    /// `GREENHOUSE_WIFI_STA_AUTO`.  Anything invalid is logged and skipped.
    pub fn from_build_env() -> Self {
        Self::layered(
            option_env!("GREENHOUSE_CONFIG"),
            option_env!("GREENHOUSE_WIFI_SSID"),
            option_env!("GREENHOUSE_WIFI_PASSWORD"),
            option_env!("GREENHOUSE_WIFI_STA_AUTO"),
        )
    }

    /// Parse a JSON override document.  Missing fields keep their defaults.
    pub fn from_json_overrides(doc: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub(crate) fn layered(
        doc: Option<&str>,
        ssid: Option<&str>,
        password: Option<&str>,
        sta_auto: Option<&str>,
    ) -> Self {
        let mut cfg = match doc {
            Some(doc) => Self::from_json_overrides(doc).unwrap_or_else(|e| {
                warn!("config: ignoring GREENHOUSE_CONFIG ({}), using defaults", e);
                Self::default()
            }),
            None => Self::default(),
        };

        if let Some(ssid) = ssid {
            match WifiCredentials::new(ssid, password.unwrap_or("")) {
                Ok(creds) => cfg.wifi = Some(creds),
                Err(e) => warn!("config: ignoring WiFi credentials ({})", e),
            }
        }

        if let Some(flag) = sta_auto {
            cfg.wifi_sta_auto = matches!(flag.trim(), "1" | "y" | "yes" | "true");
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=48).contains(&self.pump_gpio) {
            return Err(ConfigError::ValidationFailed("pump_gpio out of range"));
        }
        if self.pump_half_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("pump_half_period_ms must be > 0"));
        }
        if self.base_sleep_ms == 0 || self.sync_period_units == 0 {
            return Err(ConfigError::ValidationFailed("sync period must be > 0"));
        }
        if self.sntp_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("sntp_timeout_ms must be > 0"));
        }
        if self.sntp_server.port() == 0 {
            return Err(ConfigError::ValidationFailed("sntp_server port must be > 0"));
        }
        if let SettleMode::UntilBound { max_wait_ms: 0 } = self.settle_mode {
            return Err(ConfigError::ValidationFailed("settle max_wait_ms must be > 0"));
        }
        if self.task_stack_bytes < 2_048 {
            return Err(ConfigError::ValidationFailed("task_stack_bytes below 2048"));
        }
        // FreeRTOS: 0 is the idle task, configMAX_PRIORITIES is 25.
        if !(1..=24).contains(&self.task_priority) {
            return Err(ConfigError::ValidationFailed("task_priority out of range"));
        }
        if let Some(creds) = &self.wifi {
            validate_ssid(&creds.ssid)
                .map_err(|_| ConfigError::ValidationFailed("wifi ssid invalid"))?;
            validate_password(&creds.password)
                .map_err(|_| ConfigError::ValidationFailed("wifi password invalid"))?;
        }
        Ok(())
    }

    /// Who brings the station onto the network at boot.
    pub fn association(&self) -> Association {
        if self.wifi_sta_auto || self.wifi.is_none() {
            Association::Stored
        } else {
            Association::Credentials
        }
    }

    pub fn pump_half_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.pump_half_period_ms))
    }

    pub fn sync_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.base_sleep_ms) * u64::from(self.sync_period_units))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.settle_delay_ms))
    }

    pub fn sync_target(&self) -> SyncTarget {
        SyncTarget {
            server: self.sntp_server,
            timeout: Duration::from_millis(u64::from(self.sntp_timeout_ms)),
        }
    }
}
