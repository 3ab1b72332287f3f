//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::TaskStarted { task } => {
                info!("TASK | '{}' running", task);
            }
            AppEvent::TaskStopped { task, reason } => {
                error!("TASK | '{}' stopped: {}", task, reason);
            }
            AppEvent::ActuatorConfigured { gpio, index } => {
                info!("PUMP | pump {} on GPIO{} configured as output", index, gpio);
            }
            AppEvent::AssociationRequested { ssid } => {
                info!("NET  | associating with '{}'", ssid);
            }
            AppEvent::AssociationFailed(e) => {
                error!("NET  | failed to connect to WiFi: {}", e);
            }
            AppEvent::AcquisitionStarted(iface) => {
                info!("NET  | DHCP started on {}", iface);
            }
            AppEvent::NetworkWarning(e) => {
                warn!("NET  | {}", e);
            }
            AppEvent::Settled { waited, binding } => match binding {
                Some(b) => info!("NET  | bound {} after {} ms", b.address, waited.as_millis()),
                None => info!("NET  | settled after {} ms", waited.as_millis()),
            },
            AppEvent::TimeSynced { attempt, time } => {
                info!("SYNC | #{} sntp: 0 | clock set to {}", attempt, time.secs);
            }
            AppEvent::SyncFailed { attempt, error } => {
                warn!("SYNC | #{} sntp: {} | {}", attempt, error.code(), error);
            }
        }
    }
}
