//! Greenhouse Node Firmware — Main Entry Point
//!
//! Two equal-priority device tasks, created together and released at once:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PumpDriver<GpioLine>   EspNetAcquisition   WifiStation        │
//! │  (ActuatorPort)         (DHCP)              (Association)      │
//! │  UdpSntpFactory         SystemClock         LogEventSink       │
//! │  (SNTP sessions)        (ClockPort)         (EventSink)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌─────────────────────────┐   ┌────────────────────────────┐  │
//! │  │ pump_0_th               │   │ wifi_ntp_th                │  │
//! │  │ ActuatorController      │   │ Orchestrator               │  │
//! │  │ square wave on GPIO     │   │ DHCP → assoc → SNTP loop   │  │
//! │  └─────────────────────────┘   └────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{info, warn};

use greenhouse::adapters::log_sink::LogEventSink;
use greenhouse::adapters::netif::EspNetAcquisition;
use greenhouse::adapters::sntp_udp::UdpSntpFactory;
use greenhouse::adapters::time::{SystemClock, ThreadSleeper};
use greenhouse::adapters::wifi::WifiStation;
use greenhouse::app::actuator::ActuatorController;
use greenhouse::app::orchestrator::{Orchestrator, OrchestratorSettings};
use greenhouse::app::task::run_until_fatal;
use greenhouse::app::time_sync::TimeSyncClient;
use greenhouse::config::{Association, NodeConfig};
use greenhouse::drivers::pump::{GpioLine, PumpDriver};
use greenhouse::drivers::task_pin::{start_together, TaskBody, TaskSpec};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Greenhouse node v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = NodeConfig::from_build_env();
    config.validate().map_err(greenhouse::Error::from)?;
    info!(
        "Config: pump GPIO{} half-period {} ms, SNTP {} every {} ms",
        config.pump_gpio,
        config.pump_half_period_ms,
        config.sntp_server,
        config.sync_period().as_millis()
    );

    // ── 3. Platform services ──────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?;

    // The driver always runs; DHCP has nothing to bind on a stopped radio.
    wifi.start()?;
    if config.association() == Association::Stored {
        if config.wifi.is_none() && !config.wifi_sta_auto {
            warn!("WiFi: no build-time credentials, joining with the NVS-stored station config");
        }
        if let Err(e) = wifi.connect() {
            warn!("WiFi connect request failed: {}", e);
        }
    }

    // ── 4. Tasks ──────────────────────────────────────────────
    let pump = ActuatorController::new(
        PumpDriver::new(GpioLine::new(config.pump_gpio), config.pump_index),
        ThreadSleeper,
        LogEventSink::new(),
        config.pump_half_period(),
    );

    let orchestrator = Orchestrator::new(
        EspNetAcquisition::new(),
        Some(WifiStation::new(wifi)),
        TimeSyncClient::new(UdpSntpFactory, SystemClock::new(), config.sync_target()),
        ThreadSleeper,
        LogEventSink::new(),
        OrchestratorSettings::from_config(&config),
    );

    let spec = |name| TaskSpec {
        name,
        priority: config.task_priority,
        stack_bytes: config.task_stack_bytes,
        core: None,
    };
    let pump_body: TaskBody = Box::new(move || {
        let mut task = pump;
        run_until_fatal(&mut task);
    });
    let net_body: TaskBody = Box::new(move || {
        let mut task = orchestrator;
        run_until_fatal(&mut task);
    });
    let handles = start_together(vec![
        (spec(c"pump_0_th"), pump_body),
        (spec(c"wifi_ntp_th"), net_body),
    ])?;

    info!("System ready.");

    // ── 5. Idle ───────────────────────────────────────────────
    // Tasks are never restarted; report each exit once.
    let mut reported = vec![false; handles.len()];
    loop {
        std::thread::sleep(Duration::from_secs(1));
        for (handle, seen) in handles.iter().zip(reported.iter_mut()) {
            if !*seen && handle.is_finished() {
                warn!("task '{}' has exited", handle.thread().name().unwrap_or("?"));
                *seen = true;
            }
        }
    }
}
