//! Domain data model shared by the tasks and the port traits.

use core::fmt;
use core::net::Ipv4Addr;

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// A wall-clock instant as the Clock Port understands it: seconds since
/// the Unix epoch plus a sub-second part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

impl Timestamp {
    /// Whole-second timestamp (sub-second part zeroed).
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs, nanos: 0 }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// Result of one successful SNTP query, already converted to the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SntpTime {
    /// Seconds since 1970-01-01T00:00:00Z.
    pub seconds: u64,
    /// NTP fraction of a second (2^-32 s units).
    pub fraction: u32,
}

impl SntpTime {
    /// Upper 32 bits of the seconds value.
    pub fn high_word(&self) -> u32 {
        (self.seconds >> 32) as u32
    }

    /// Lower 32 bits of the seconds value.
    pub fn low_word(&self) -> u32 {
        self.seconds as u32
    }
}

// ───────────────────────────────────────────────────────────────
// Network
// ───────────────────────────────────────────────────────────────

/// Handle naming a network interface known to the acquisition port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceId(pub &'static str);

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Snapshot of a DHCP lease as bound on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetBinding {
    pub address: Ipv4Addr,
    pub lease_secs: u32,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

/// Network-management events delivered by the acquisition port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEventKind {
    /// DHCP lease bound: the interface has an address.
    AddressBound,
    /// DHCP client started on the interface.
    AcquisitionStarted,
    /// The interface lost its address.
    AddressLost,
    /// Any other platform event id.
    Other(i32),
}
