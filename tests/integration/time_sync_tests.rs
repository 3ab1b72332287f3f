//! Integration tests: SNTP time-sync client.

use core::net::{Ipv4Addr, SocketAddrV4};
use core::time::Duration;

use greenhouse::app::model::Timestamp;
use greenhouse::app::ports::SyncTarget;
use greenhouse::app::time_sync::{SyncError, TimeSync, TimeSyncClient};

use crate::mock_ports::{MockClock, Outcome, ScriptedFactory};

fn target() -> SyncTarget {
    SyncTarget {
        server: SocketAddrV4::new(Ipv4Addr::new(178, 215, 228, 24), 123),
        timeout: Duration::from_millis(4_000),
    }
}

fn client(script: Vec<Outcome>) -> TimeSyncClient<ScriptedFactory, MockClock> {
    TimeSyncClient::new(ScriptedFactory::new(script), MockClock::default(), target())
}

#[test]
fn init_failure_closes_session_and_keeps_clock() {
    let mut c = client(vec![Outcome::init_fails(-12)]);
    assert_eq!(c.sync_once(), Err(SyncError::InitFailed(-12)));

    let log = c.factory().log.borrow();
    assert_eq!((log.created, log.inits, log.queries, log.closed), (1, 1, 0, 1));
    assert!(c.clock().set.is_empty());
}

#[test]
fn query_timeout_closes_session_and_keeps_clock() {
    let mut c = client(vec![Outcome::query_fails(-110)]);
    assert_eq!(c.sync_once(), Err(SyncError::QueryFailed(-110)));

    let log = c.factory().log.borrow();
    assert_eq!((log.queries, log.closed), (1, 1));
    assert_eq!(log.timeouts, vec![Duration::from_millis(4_000)]);
    assert!(c.clock().set.is_empty());
}

#[test]
fn success_sets_clock_to_server_seconds() {
    let s = 1_760_000_000;
    let mut c = client(vec![Outcome::ok(s)]);
    assert_eq!(c.sync_once(), Ok(Timestamp::from_secs(s)));
    assert_eq!(c.clock().set, vec![Timestamp { secs: s, nanos: 0 }]);
    assert_eq!(c.factory().log.borrow().closed, 1);
}

#[test]
fn rejected_clock_write_is_reported_and_session_closed() {
    let mut c = TimeSyncClient::new(
        ScriptedFactory::new(vec![Outcome::ok(5)]),
        MockClock { set_err: Some(-1), ..MockClock::default() },
        target(),
    );
    assert_eq!(c.sync_once(), Err(SyncError::ClockRejected(-1)));
    assert_eq!(c.factory().log.borrow().closed, 1);
}

#[test]
fn every_attempt_uses_a_fresh_session() {
    let mut c = client(vec![Outcome::ok(1), Outcome::query_fails(-110), Outcome::ok(3)]);
    let results: Vec<_> = (0..3).map(|_| c.sync_once()).collect();

    assert_eq!(
        results,
        vec![
            Ok(Timestamp::from_secs(1)),
            Err(SyncError::QueryFailed(-110)),
            Ok(Timestamp::from_secs(3)),
        ]
    );
    let log = c.factory().log.borrow();
    assert_eq!((log.created, log.closed), (3, 3));
    assert_eq!(c.clock().set, vec![Timestamp::from_secs(1), Timestamp::from_secs(3)]);
}

#[test]
fn sessions_are_strictly_sequential() {
    let mut c = client(vec![
        Outcome::init_fails(-12),
        Outcome::query_fails(-110),
        Outcome::ok(7),
        Outcome::init_fails(-5),
    ]);
    for n in 1..=4 {
        let _ = c.sync_once();
        // The factory refuses to open a session while one is unclosed, and
        // each attempt leaves nothing open behind it.
        let log = c.factory().log.borrow();
        assert_eq!((log.created, log.closed), (n, n));
    }
}

#[test]
fn clock_is_read_back_after_every_attempt() {
    let mut c = client(vec![Outcome::init_fails(-12), Outcome::query_fails(-110), Outcome::ok(9)]);
    for _ in 0..3 {
        let _ = c.sync_once();
    }
    assert_eq!(c.clock().reads.get(), 3);
    assert_eq!(c.clock().set, vec![Timestamp::from_secs(9)]);
}
