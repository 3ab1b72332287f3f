//! Outbound application events.
//!
//! The tasks emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them — the
//! production build logs them to the serial console.

use core::time::Duration;

use crate::error::Error;

use super::model::{InterfaceId, NetBinding, Timestamp};
use super::ports::{AssociationError, NetError};
use super::time_sync::SyncError;

/// Structured events emitted by the two device tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A task finished its one-time setup and entered its loop.
    TaskStarted { task: &'static str },

    /// A task hit a fatal condition and stopped for good.
    TaskStopped { task: &'static str, reason: Error },

    /// The pump pin is configured as an output.
    ActuatorConfigured { gpio: i32, index: u8 },

    /// Station credentials applied and connection requested.
    AssociationRequested { ssid: heapless::String<32> },

    /// Association request failed (non-fatal).
    AssociationFailed(AssociationError),

    /// DHCP started on the interface.
    AcquisitionStarted(InterfaceId),

    /// A non-fatal network setup step failed.
    NetworkWarning(NetError),

    /// The settling wait after starting acquisition is over.
    /// `binding` is set only when the wait observed a bound lease.
    Settled {
        waited: Duration,
        binding: Option<NetBinding>,
    },

    /// A sync attempt committed a new system time.
    TimeSynced { attempt: u64, time: Timestamp },

    /// A sync attempt failed; the clock was not touched.
    SyncFailed { attempt: u64, error: SyncError },
}
