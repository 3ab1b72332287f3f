//! Integration tests: address-acquisition observer.

use core::time::Duration;
use std::sync::Arc;

use greenhouse::adapters::netif::{LeaseSnapshot, SimNetwork};
use greenhouse::app::acquisition::AcquisitionObserver;
use greenhouse::app::model::NetEventKind;
use greenhouse::app::ports::NetworkAcquisitionPort;

use crate::mock_ports::lease;

#[test]
fn consecutive_bound_events_keep_the_latest_address() {
    let obs = AcquisitionObserver::new();
    obs.on_event(NetEventKind::AddressBound, &LeaseSnapshot(lease(10)));
    obs.on_event(NetEventKind::AddressBound, &LeaseSnapshot(lease(20)));

    assert_eq!(obs.bound_count(), 2);
    assert_eq!(obs.take_latest(), Some(lease(20)));
    assert_eq!(obs.take_latest(), None);
}

#[test]
fn sim_network_delivers_lease_to_waiting_observer() {
    let mut net = SimNetwork::new(lease(42), Duration::from_millis(10));
    let obs = Arc::new(AcquisitionObserver::new());
    net.subscribe(obs.clone()).unwrap();

    let iface = net.default_interface().unwrap();
    net.start_acquisition(iface).unwrap();

    assert_eq!(obs.wait_bound(Duration::from_secs(5)), Some(lease(42)));
    assert_eq!(obs.bound_count(), 1);
    assert_eq!(net.acquisition_starts(), 1);
}

#[test]
fn sim_network_without_interface() {
    let net = SimNetwork::new(lease(1), Duration::ZERO).without_interface();
    assert_eq!(net.default_interface(), None);
}
