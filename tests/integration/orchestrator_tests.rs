//! Integration tests: network & time orchestrator.

use core::time::Duration;

use greenhouse::app::events::AppEvent;
use greenhouse::app::model::InterfaceId;
use greenhouse::app::orchestrator::{Orchestrator, OrchestratorSettings, OrchestratorState};
use greenhouse::app::ports::{AssociationError, NetError, SyncTarget};
use greenhouse::app::task::{DeviceTask, TaskControl, run_until_fatal};
use greenhouse::app::time_sync::{SyncError, TimeSyncClient};
use greenhouse::config::{NodeConfig, SettleMode, WifiCredentials};
use greenhouse::Error;

use crate::mock_ports::{
    CaptureSink, MockClock, MockNet, MockStation, Outcome, RecordingSleeper, ScriptedFactory,
    Trace, lease, trace,
};

type Client = TimeSyncClient<ScriptedFactory, MockClock>;
type Orch = Orchestrator<MockNet, MockStation, Client, RecordingSleeper, CaptureSink>;

fn settings() -> OrchestratorSettings {
    let mut cfg = NodeConfig::default();
    cfg.wifi = Some(WifiCredentials::new("greenhouse", "password123").unwrap());
    OrchestratorSettings::from_config(&cfg)
}

fn client(script: Vec<Outcome>, target: SyncTarget) -> Client {
    TimeSyncClient::new(ScriptedFactory::new(script), MockClock::default(), target)
}

fn assemble(t: &Trace, net: MockNet, station: MockStation, script: Vec<Outcome>, settings: OrchestratorSettings) -> Orch {
    Orchestrator::new(
        net,
        Some(station),
        client(script, NodeConfig::default().sync_target()),
        RecordingSleeper { sleeps: Vec::new(), trace: Some(t.clone()) },
        CaptureSink::default(),
        settings,
    )
}

fn build(t: &Trace, script: Vec<Outcome>, settings: OrchestratorSettings) -> Orch {
    assemble(t, MockNet::new(t.clone()), MockStation::new(t.clone()), script, settings)
}

#[test]
fn setup_runs_in_order_then_settles() {
    let t = trace();
    let mut o = build(&t, vec![], settings());
    assert_eq!(o.prepare(), TaskControl::Continue);

    assert_eq!(
        *t.borrow(),
        vec![
            "subscribe",
            "default_interface",
            "start_acquisition wlan0",
            "credentials",
            "connect",
            "sleep 5000",
        ]
    );
    assert_eq!(o.state(), OrchestratorState::SyncLoop);
    assert_eq!(o.station().unwrap().ssid.as_deref(), Some("greenhouse"));
    assert!(o.sink().events.contains(&AppEvent::AcquisitionStarted(InterfaceId("wlan0"))));
}

#[test]
fn missing_interface_stops_before_acquisition_and_association() {
    let t = trace();
    let mut net = MockNet::new(t.clone());
    net.iface = false;
    let mut o = assemble(&t, net, MockStation::new(t.clone()), vec![], settings());

    let reason = run_until_fatal(&mut o);
    assert_eq!(reason, Error::Network(NetError::NoDefaultInterface));
    assert_eq!(reason.to_string(), "network: wifi interface not available");
    // The radio is never asked to associate on a node that cannot get an address.
    assert_eq!(*t.borrow(), vec!["subscribe", "default_interface"]);
    assert_eq!(o.station().unwrap().ssid, None);
    assert_eq!(o.attempts(), 0);
    assert_eq!(o.time_sync().factory().log.borrow().created, 0);
}

#[test]
fn association_failure_is_not_fatal() {
    let t = trace();
    let mut station = MockStation::new(t.clone());
    station.connect_err = Some(AssociationError::Driver(-3));
    let mut o = assemble(&t, MockNet::new(t.clone()), station, vec![], settings());

    assert_eq!(o.prepare(), TaskControl::Continue);
    assert!(o
        .sink()
        .events
        .contains(&AppEvent::AssociationFailed(AssociationError::Driver(-3))));
    assert_eq!(o.state(), OrchestratorState::SyncLoop);
}

#[test]
fn acquisition_warnings_do_not_stop_setup() {
    let t = trace();
    let mut net = MockNet::new(t.clone());
    net.subscribe_err = Some(NetError::SubscribeFailed(-1));
    net.start_err = Some(NetError::AcquisitionFailed(-2));
    let mut o = assemble(&t, net, MockStation::new(t.clone()), vec![], settings());

    assert_eq!(o.prepare(), TaskControl::Continue);
    let warnings = o.sink().count(|e| matches!(e, AppEvent::NetworkWarning(_)));
    assert_eq!(warnings, 2);
}

#[test]
fn sta_auto_skips_association_calls() {
    let t = trace();
    let mut s = settings();
    s.sta_auto = true;
    let mut o = build(&t, vec![], s);
    o.prepare();
    assert!(!t.borrow().iter().any(|c| c == "credentials" || c == "connect"));
    assert_eq!(o.station().unwrap().ssid, None);
}

#[test]
fn without_credentials_association_is_left_to_the_driver() {
    let t = trace();
    let s = OrchestratorSettings::from_config(&NodeConfig::default());
    assert!(s.sta_auto);
    let mut o = build(&t, vec![], s);
    assert_eq!(o.prepare(), TaskControl::Continue);
    assert!(!t.borrow().iter().any(|c| c == "credentials" || c == "connect"));
    assert!(t.borrow().iter().any(|c| c == "start_acquisition wlan0"));
}

#[test]
fn failed_sync_waits_full_period_before_next_attempt() {
    let t = trace();
    let mut o = build(&t, vec![Outcome::query_fails(-110), Outcome::ok(1_760_000_000)], settings());
    o.prepare();
    t.borrow_mut().clear();

    o.step();
    o.step();

    // No retry between the failure and the period sleep.
    assert_eq!(*t.borrow(), vec!["sleep 5000", "sleep 5000"]);
    assert_eq!(o.attempts(), 2);
    assert!(o.sink().events.contains(&AppEvent::SyncFailed {
        attempt: 1,
        error: SyncError::QueryFailed(-110),
    }));
    assert_eq!(
        o.time_sync().clock().set.iter().map(|ts| ts.secs).collect::<Vec<_>>(),
        vec![1_760_000_000]
    );
}

#[test]
fn sync_loop_never_stops_on_errors() {
    let t = trace();
    let script = vec![Outcome::init_fails(-12); 8];
    let mut o = build(&t, script, settings());
    assert_eq!(o.prepare(), TaskControl::Continue);
    for _ in 0..8 {
        assert_eq!(o.step(), TaskControl::Continue);
    }
    let log = o.time_sync().factory().log.borrow();
    assert_eq!((log.created, log.closed), (8, 8));
}

#[test]
fn until_bound_settles_on_lease() {
    let t = trace();
    let mut s = settings();
    s.settle_mode = SettleMode::UntilBound { max_wait_ms: 5_000 };
    let mut net = MockNet::new(t.clone());
    net.bind_on_start = Some(lease(77));
    let mut o = assemble(&t, net, MockStation::new(t.clone()), vec![], s);

    o.prepare();
    assert_eq!(o.observer().bound_count(), 1);
    // Bound-wait mode never uses the fixed settle sleep.
    assert!(o.sleeper().sleeps.is_empty());
    assert!(o.sink().events.iter().any(|e| matches!(
        e,
        AppEvent::Settled { binding: Some(b), .. } if *b == lease(77)
    )));
}

#[test]
fn until_bound_gives_up_after_max_wait() {
    let t = trace();
    let mut s = settings();
    s.settle_mode = SettleMode::UntilBound { max_wait_ms: 20 };
    let mut o = build(&t, vec![], s);
    o.prepare();
    assert_eq!(o.state(), OrchestratorState::SyncLoop);
    assert!(o.sink().events.iter().any(|e| matches!(
        e,
        AppEvent::Settled { binding: None, waited } if *waited >= Duration::from_millis(20)
    )));
}
