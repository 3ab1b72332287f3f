//! Mock port adapters for integration tests.
//!
//! Every mock records the calls it receives so tests can assert on the
//! full interaction history.  Mocks that take part in ordering checks
//! push into a shared [`Trace`].

use core::net::Ipv4Addr;
use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use greenhouse::app::acquisition::AcquisitionObserver;
use greenhouse::app::events::AppEvent;
use greenhouse::app::model::{InterfaceId, NetBinding, NetEventKind, SntpTime, Timestamp};
use greenhouse::app::ports::{
    ActuatorError, ActuatorPort, AssociationError, AssociationPort, ClockError, ClockPort,
    EventSink, InterfaceSnapshot, NetError, NetworkAcquisitionPort, SessionFactory, Sleeper,
    SntpSession, SyncTarget,
};

// ── Shared call trace ─────────────────────────────────────────

pub type Trace = Rc<RefCell<Vec<String>>>;

pub fn trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

// ── Actuator ──────────────────────────────────────────────────

pub struct MockActuator {
    pub ready: bool,
    pub configure_rc: Option<i32>,
    pub configured: u32,
    pub levels: Vec<bool>,
}

impl MockActuator {
    pub fn ready() -> Self {
        Self { ready: true, configure_rc: None, configured: 0, levels: Vec::new() }
    }
}

impl ActuatorPort for MockActuator {
    fn gpio(&self) -> i32 {
        2
    }
    fn index(&self) -> u8 {
        0
    }
    fn is_ready(&self) -> bool {
        self.ready
    }
    fn configure_output(&mut self) -> Result<(), ActuatorError> {
        self.configured += 1;
        match self.configure_rc {
            Some(code) => Err(ActuatorError::ConfigureFailed { code, gpio: 2, index: 0 }),
            None => Ok(()),
        }
    }
    fn set_level(&mut self, high: bool) {
        self.levels.push(high);
    }
}

// ── Sleeper ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Vec<Duration>,
    pub trace: Option<Trace>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, d: Duration) {
        self.sleeps.push(d);
        if let Some(t) = &self.trace {
            t.borrow_mut().push(format!("sleep {}", d.as_millis()));
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CaptureSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CaptureSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CaptureSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(e.clone());
    }
}

// ── Network acquisition ───────────────────────────────────────

pub fn lease(last_octet: u8) -> NetBinding {
    NetBinding {
        address: Ipv4Addr::new(192, 168, 1, last_octet),
        lease_secs: 7_200,
        netmask: Ipv4Addr::new(255, 255, 255, 0),
        gateway: Ipv4Addr::new(192, 168, 1, 1),
    }
}

pub struct Fixed(pub NetBinding);

impl InterfaceSnapshot for Fixed {
    fn binding(&self) -> NetBinding {
        self.0
    }
}

pub struct MockNet {
    pub iface: bool,
    pub subscribe_err: Option<NetError>,
    pub start_err: Option<NetError>,
    /// Delivered synchronously from `start_acquisition`.
    pub bind_on_start: Option<NetBinding>,
    pub observers: Vec<Arc<AcquisitionObserver>>,
    pub trace: Trace,
}

impl MockNet {
    pub fn new(trace: Trace) -> Self {
        Self {
            iface: true,
            subscribe_err: None,
            start_err: None,
            bind_on_start: None,
            observers: Vec::new(),
            trace,
        }
    }
}

impl NetworkAcquisitionPort for MockNet {
    fn subscribe(&mut self, observer: Arc<AcquisitionObserver>) -> Result<(), NetError> {
        self.trace.borrow_mut().push("subscribe".into());
        if let Some(e) = self.subscribe_err {
            return Err(e);
        }
        self.observers.push(observer);
        Ok(())
    }

    fn default_interface(&self) -> Option<InterfaceId> {
        self.trace.borrow_mut().push("default_interface".into());
        self.iface.then_some(InterfaceId("wlan0"))
    }

    fn start_acquisition(&mut self, iface: InterfaceId) -> Result<(), NetError> {
        self.trace.borrow_mut().push(format!("start_acquisition {}", iface));
        if let Some(e) = self.start_err {
            return Err(e);
        }
        if let Some(b) = self.bind_on_start {
            for obs in &self.observers {
                obs.on_event(NetEventKind::AddressBound, &Fixed(b));
            }
        }
        Ok(())
    }
}

// ── Association ───────────────────────────────────────────────

pub struct MockStation {
    pub credentials_err: Option<AssociationError>,
    pub connect_err: Option<AssociationError>,
    pub ssid: Option<String>,
    pub trace: Trace,
}

impl MockStation {
    pub fn new(trace: Trace) -> Self {
        Self { credentials_err: None, connect_err: None, ssid: None, trace }
    }
}

impl AssociationPort for MockStation {
    fn set_station_credentials(&mut self, ssid: &str, _pw: &str) -> Result<(), AssociationError> {
        self.trace.borrow_mut().push("credentials".into());
        self.ssid = Some(ssid.to_owned());
        self.credentials_err.map_or(Ok(()), Err)
    }

    fn connect(&mut self) -> Result<(), AssociationError> {
        self.trace.borrow_mut().push("connect".into());
        self.connect_err.map_or(Ok(()), Err)
    }
}

// ── SNTP sessions ─────────────────────────────────────────────

/// What one scripted session does.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub init: Result<(), i32>,
    pub query: Result<SntpTime, i32>,
}

#[allow(dead_code)]
impl Outcome {
    pub fn ok(seconds: u64) -> Self {
        Self { init: Ok(()), query: Ok(SntpTime { seconds, fraction: 0 }) }
    }
    pub fn init_fails(rc: i32) -> Self {
        Self { init: Err(rc), query: Err(-1) }
    }
    pub fn query_fails(rc: i32) -> Self {
        Self { init: Ok(()), query: Err(rc) }
    }
}

#[derive(Debug, Default)]
pub struct SessionLog {
    pub created: u32,
    pub inits: u32,
    pub queries: u32,
    pub closed: u32,
    pub timeouts: Vec<Duration>,
}

pub struct ScriptedSession {
    outcome: Outcome,
    log: Rc<RefCell<SessionLog>>,
}

impl SntpSession for ScriptedSession {
    fn init(&mut self) -> Result<(), i32> {
        self.log.borrow_mut().inits += 1;
        self.outcome.init
    }
    fn query(&mut self, timeout: Duration) -> Result<SntpTime, i32> {
        let mut log = self.log.borrow_mut();
        log.queries += 1;
        log.timeouts.push(timeout);
        self.outcome.query
    }
    fn close(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

pub struct ScriptedFactory {
    pub script: VecDeque<Outcome>,
    pub log: Rc<RefCell<SessionLog>>,
}

impl ScriptedFactory {
    pub fn new(script: impl IntoIterator<Item = Outcome>) -> Self {
        Self { script: script.into_iter().collect(), log: Rc::default() }
    }
}

impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    fn create(&mut self, _target: &SyncTarget) -> ScriptedSession {
        {
            let mut log = self.log.borrow_mut();
            assert_eq!(log.created, log.closed, "session opened while another is unclosed");
            log.created += 1;
        }
        let outcome = self.script.pop_front().unwrap_or(Outcome::query_fails(-110));
        ScriptedSession { outcome, log: self.log.clone() }
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockClock {
    pub set: Vec<Timestamp>,
    pub set_err: Option<i32>,
    pub reads: Cell<u32>,
}

impl ClockPort for MockClock {
    fn set_time(&mut self, ts: Timestamp) -> Result<(), ClockError> {
        if let Some(rc) = self.set_err {
            return Err(ClockError(rc));
        }
        self.set.push(ts);
        Ok(())
    }
    fn get_time(&self) -> Result<Timestamp, ClockError> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.set.last().copied().unwrap_or_default())
    }
}
