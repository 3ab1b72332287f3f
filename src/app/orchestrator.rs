//! Network & time orchestrator — the second device task.
//!
//! ```text
//!  Idle ── subscribe observer, default iface? ──none──▶ FatalStop
//!                   │
//!        start DHCP ▼
//!      AddressAcquisitionStarted ──(creds, not sta-auto)──▶ AssociationRequested
//!                   │                                              │
//!                   └──────────────────────┬───────────────────────┘
//!                                 settle   ▼
//!                                      SyncLoop ⟲ sync_once, sleep(period)
//! ```
//!
//! The acquisition request goes out before association so that a node
//! with no network interface stops without touching the radio.
//!
//! Association failures are logged and ignored: address acquisition can
//! still succeed over an association the platform already holds.  Sync
//! failures never stop the loop and there is no backoff.

use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use log::warn;

use crate::config::{Association, NodeConfig, SettleMode, WifiCredentials};
use crate::error::Error;

use super::acquisition::AcquisitionObserver;
use super::events::AppEvent;
use super::ports::{AssociationPort, EventSink, NetError, NetworkAcquisitionPort, Sleeper};
use super::task::{DeviceTask, TaskControl};
use super::time_sync::TimeSync;

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    AssociationRequested,
    AddressAcquisitionStarted,
    SyncLoop,
}

/// The slice of [`NodeConfig`] the orchestrator needs.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub credentials: Option<WifiCredentials>,
    /// Station associates on its own (auto mode or NVS-stored config);
    /// skip the association step.
    pub sta_auto: bool,
    pub settle_delay: Duration,
    pub settle_mode: SettleMode,
    pub sync_period: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            credentials: config.wifi.clone(),
            sta_auto: config.association() == Association::Stored,
            settle_delay: config.settle_delay(),
            settle_mode: config.settle_mode,
            sync_period: config.sync_period(),
        }
    }
}

/// Sequences address acquisition → association → periodic time sync.
pub struct Orchestrator<N, W, T, Z, E> {
    net: N,
    station: Option<W>,
    sync: T,
    sleeper: Z,
    sink: E,
    observer: Arc<AcquisitionObserver>,
    settings: OrchestratorSettings,
    state: OrchestratorState,
    attempts: u64,
}

impl<N, W, T, Z, E> Orchestrator<N, W, T, Z, E>
where
    N: NetworkAcquisitionPort,
    W: AssociationPort,
    T: TimeSync,
    Z: Sleeper,
    E: EventSink,
{
    pub fn new(
        net: N,
        station: Option<W>,
        sync: T,
        sleeper: Z,
        sink: E,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            net,
            station,
            sync,
            sleeper,
            sink,
            observer: Arc::new(AcquisitionObserver::new()),
            settings,
            state: OrchestratorState::Idle,
            attempts: 0,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Sync attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Handle to the observer registered with the network port.
    pub fn observer(&self) -> &Arc<AcquisitionObserver> {
        &self.observer
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    pub fn net(&self) -> &N {
        &self.net
    }

    pub fn station(&self) -> Option<&W> {
        self.station.as_ref()
    }

    pub fn time_sync(&self) -> &T {
        &self.sync
    }

    fn associate(&mut self) {
        if self.settings.sta_auto {
            return;
        }
        let (Some(station), Some(creds)) = (self.station.as_mut(), self.settings.credentials.as_ref())
        else {
            warn!("WiFi: no station credentials, relying on existing association");
            return;
        };

        self.sink.emit(&AppEvent::AssociationRequested {
            ssid: creds.ssid.clone(),
        });
        // Both steps always run; the first failure is the one reported.
        let applied = station.set_station_credentials(&creds.ssid, &creds.password);
        let connected = station.connect();
        if let Err(e) = applied.and(connected) {
            self.sink.emit(&AppEvent::AssociationFailed(e));
        }
        self.state = OrchestratorState::AssociationRequested;
    }

    fn settle(&mut self) {
        match self.settings.settle_mode {
            SettleMode::FixedDelay => {
                self.sleeper.sleep(self.settings.settle_delay);
                self.sink.emit(&AppEvent::Settled {
                    waited: self.settings.settle_delay,
                    binding: None,
                });
            }
            SettleMode::UntilBound { max_wait_ms } => {
                let started = Instant::now();
                let binding = self
                    .observer
                    .wait_bound(Duration::from_millis(u64::from(max_wait_ms)));
                self.sink.emit(&AppEvent::Settled {
                    waited: started.elapsed(),
                    binding,
                });
            }
        }
    }
}

impl<N, W, T, Z, E> DeviceTask for Orchestrator<N, W, T, Z, E>
where
    N: NetworkAcquisitionPort,
    W: AssociationPort,
    T: TimeSync,
    Z: Sleeper,
    E: EventSink,
{
    fn name(&self) -> &'static str {
        "wifi_ntp_th"
    }

    fn prepare(&mut self) -> TaskControl {
        if let Err(e) = self.net.subscribe(Arc::clone(&self.observer)) {
            self.sink.emit(&AppEvent::NetworkWarning(e));
        }

        let Some(iface) = self.net.default_interface() else {
            return TaskControl::FatalStop(NetError::NoDefaultInterface.into());
        };

        match self.net.start_acquisition(iface) {
            Ok(()) => self.sink.emit(&AppEvent::AcquisitionStarted(iface)),
            Err(e) => self.sink.emit(&AppEvent::NetworkWarning(e)),
        }
        self.state = OrchestratorState::AddressAcquisitionStarted;

        self.associate();
        self.settle();
        self.state = OrchestratorState::SyncLoop;
        self.sink.emit(&AppEvent::TaskStarted { task: self.name() });
        TaskControl::Continue
    }

    fn step(&mut self) -> TaskControl {
        self.attempts += 1;
        let attempt = self.attempts;
        match self.sync.sync_once() {
            Ok(time) => self.sink.emit(&AppEvent::TimeSynced { attempt, time }),
            Err(error) => self.sink.emit(&AppEvent::SyncFailed { attempt, error }),
        }
        self.sleeper.sleep(self.settings.sync_period);
        TaskControl::Continue
    }

    fn stopped(&mut self, reason: &Error) {
        self.sink.emit(&AppEvent::TaskStopped {
            task: self.name(),
            reason: *reason,
        });
    }
}
