//! Address-acquisition observer.
//!
//! The orchestrator owns one [`AcquisitionObserver`] behind an `Arc` and
//! hands a clone to the network port at registration time.  The port calls
//! [`AcquisitionObserver::on_event`] from the network stack's event task
//! for every network-management event.  Only the "address bound" event
//! is acted upon: the interface snapshot is read and logged.  Any other
//! event returns without touching the snapshot.
//!
//! The observer also latches the latest binding in an `embassy-sync`
//! [`Signal`], which is what [`wait_bound`](AcquisitionObserver::wait_bound)
//! blocks on when the orchestrator is configured to settle on the bound
//! event instead of a fixed delay.

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::info;

use super::model::{NetBinding, NetEventKind};
use super::ports::InterfaceSnapshot;

/// Subscription object registered with the network acquisition port.
pub struct AcquisitionObserver {
    latest: Signal<CriticalSectionRawMutex, NetBinding>,
    bound_events: AtomicU32,
}

impl Default for AcquisitionObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl AcquisitionObserver {
    pub const fn new() -> Self {
        Self {
            latest: Signal::new(),
            bound_events: AtomicU32::new(0),
        }
    }

    /// Network-management event entry point.
    ///
    /// Returns the binding that was logged, or `None` for ignored events.
    pub fn on_event(&self, kind: NetEventKind, iface: &dyn InterfaceSnapshot) -> Option<NetBinding> {
        if kind != NetEventKind::AddressBound {
            return None;
        }

        let binding = iface.binding();
        info!("Your address: {}", binding.address);
        info!("Lease time: {} seconds", binding.lease_secs);
        info!("Subnet: {}", binding.netmask);
        info!("Router: {}", binding.gateway);

        self.bound_events.fetch_add(1, Ordering::Relaxed);
        self.latest.signal(binding);
        Some(binding)
    }

    /// Number of bound events seen so far.
    pub fn bound_count(&self) -> u32 {
        self.bound_events.load(Ordering::Relaxed)
    }

    /// Take the most recent binding not yet consumed.
    pub fn take_latest(&self) -> Option<NetBinding> {
        self.latest.try_take()
    }

    /// Block the calling task until a binding is latched or `max_wait`
    /// elapses, whichever comes first.
    pub fn wait_bound(&self, max_wait: Duration) -> Option<NetBinding> {
        future::block_on(future::or(
            async { Some(self.latest.wait().await) },
            async {
                async_io_mini::Timer::after(max_wait).await;
                None
            },
        ))
    }
}
