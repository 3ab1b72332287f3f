//! Port traits — the hexagonal boundary between the tasks and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ActuatorController / Orchestrator (domain)
//! ```
//!
//! Driven adapters (GPIO, clock, netif, Wi-Fi, SNTP sockets, log output)
//! implement these traits.  The tasks consume them via generics, so the
//! domain core never touches the ESP-IDF directly and every path is
//! testable on the host with mocks.

use core::fmt;
use core::net::SocketAddrV4;
use core::time::Duration;
use std::sync::Arc;

use super::acquisition::AcquisitionObserver;
use super::model::{InterfaceId, NetBinding, SntpTime, Timestamp};

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the single irrigation actuator.
pub trait ActuatorPort {
    /// GPIO number of the pin behind this actuator (for diagnostics).
    fn gpio(&self) -> i32;

    /// Logical actuator index (pump 0, pump 1, ...).
    fn index(&self) -> u8;

    /// Whether the underlying GPIO port is usable.
    fn is_ready(&self) -> bool;

    /// Configure the pin as a digital output.  Called once before use.
    fn configure_output(&mut self) -> Result<(), ActuatorError>;

    /// Drive the pin high (`true`) or low (`false`).
    fn set_level(&mut self, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ system clock)
// ───────────────────────────────────────────────────────────────

/// Process-wide system clock.  Only the time-sync client writes it.
pub trait ClockPort {
    fn set_time(&mut self, ts: Timestamp) -> Result<(), ClockError>;
    fn get_time(&self) -> Result<Timestamp, ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Sleep primitive (scheduler)
// ───────────────────────────────────────────────────────────────

/// Suspends the calling task.  Provided by the RTOS in production.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Network acquisition port (driven adapter: DHCP client)
// ───────────────────────────────────────────────────────────────

/// Read access to an interface's current configuration.
///
/// Passed alongside every network event; observers read it only for
/// the events they care about.
pub trait InterfaceSnapshot {
    fn binding(&self) -> NetBinding;
}

/// Address acquisition (DHCP) on the device's network interfaces.
pub trait NetworkAcquisitionPort {
    /// Register the observer that receives network-management events.
    /// The port keeps the handle for the lifetime of the device.
    fn subscribe(&mut self, observer: Arc<AcquisitionObserver>) -> Result<(), NetError>;

    /// The interface acquisition should run on, if one exists.
    fn default_interface(&self) -> Option<InterfaceId>;

    /// Start acquiring an address on `iface`.  Completion is reported
    /// asynchronously through the subscribed observer.
    fn start_acquisition(&mut self, iface: InterfaceId) -> Result<(), NetError>;
}

// ───────────────────────────────────────────────────────────────
// Association port (driven adapter: Wi-Fi station)
// ───────────────────────────────────────────────────────────────

/// Wi-Fi station association.
pub trait AssociationPort {
    fn set_station_credentials(&mut self, ssid: &str, password: &str)
    -> Result<(), AssociationError>;

    fn connect(&mut self) -> Result<(), AssociationError>;
}

// ───────────────────────────────────────────────────────────────
// Time sync transport (driven adapter: SNTP over UDP)
// ───────────────────────────────────────────────────────────────

/// Where and how long to ask for the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTarget {
    pub server: SocketAddrV4,
    pub timeout: Duration,
}

/// One SNTP session.  Status codes follow the negative-errno convention.
pub trait SntpSession {
    /// Open the underlying socket towards the target server.
    fn init(&mut self) -> Result<(), i32>;

    /// Send one request and wait at most `timeout` for the reply.
    fn query(&mut self, timeout: Duration) -> Result<SntpTime, i32>;

    /// Release the session's resources.  Safe to call on a session whose
    /// `init` failed.
    fn close(&mut self);
}

/// Builds a fresh [`SntpSession`] for every sync attempt.
pub trait SessionFactory {
    type Session: SntpSession;

    fn create(&mut self, target: &SyncTarget) -> Self::Session;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The tasks emit structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ActuatorPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The GPIO port behind the actuator is not ready.
    NotReady { gpio: i32 },
    /// Configuring the pin as an output returned a platform error code.
    ConfigureFailed { code: i32, gpio: i32, index: u8 },
}

/// Errors from [`ClockPort`] operations (platform errno).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockError(pub i32);

/// Errors from [`NetworkAcquisitionPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// No default network interface is available.
    NoDefaultInterface,
    /// Event registration failed with a platform error code.
    SubscribeFailed(i32),
    /// The DHCP client refused to start.
    AcquisitionFailed(i32),
}

/// Errors from [`AssociationPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationError {
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open network) or 8-64 bytes.
    InvalidPassword,
    /// The Wi-Fi driver returned an error code.
    Driver(i32),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady { gpio } => write!(f, "GPIO{} port not ready", gpio),
            Self::ConfigureFailed { code, gpio, index } => write!(
                f,
                "error {}: failed to configure pin {} (PUMP '{}')",
                code, gpio, index
            ),
        }
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clock error {}", self.0)
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDefaultInterface => write!(f, "wifi interface not available"),
            Self::SubscribeFailed(rc) => write!(f, "event subscription failed (rc={})", rc),
            Self::AcquisitionFailed(rc) => write!(f, "DHCP start failed (rc={})", rc),
        }
    }
}

impl fmt::Display for AssociationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
            Self::Driver(rc) => write!(f, "WiFi driver error {}", rc),
        }
    }
}
