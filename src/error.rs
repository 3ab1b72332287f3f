//! Unified error types for the greenhouse firmware.
//!
//! Every condition that stops a task funnels into [`Error`].  Port-level
//! error enums live next to their port traits in
//! [`app::ports`](crate::app::ports); this module only aggregates them.
//! All variants are `Copy` so a stop reason can be logged, emitted as an
//! event, and returned from the task runner without allocation.

use core::fmt;

use crate::app::ports::{ActuatorError, NetError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Fatal-to-task conditions.  Recoverable failures (association, SNTP) are
/// logged where they happen and never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The actuator could not be brought up.
    Actuator(ActuatorError),
    /// The network interface needed for address acquisition is missing.
    Network(NetError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

impl From<NetError> for Error {
    fn from(e: NetError) -> Self {
        Self::Network(e)
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(e: crate::config::ConfigError) -> Self {
        match e {
            crate::config::ConfigError::ValidationFailed(msg) => Self::Config(msg),
            crate::config::ConfigError::Malformed => Self::Config("malformed override document"),
        }
    }
}

impl std::error::Error for Error {}
