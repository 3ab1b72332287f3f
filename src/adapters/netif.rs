//! Network-interface / DHCP acquisition adapter.
//!
//! Implements [`NetworkAcquisitionPort`].
//!
//! - **`target_os = "espidf"`**: the default station netif (`WIFI_STA_DEF`)
//!   and a raw `IP_EVENT` handler registered on the default event loop.
//!   `IP_EVENT_STA_GOT_IP` is delivered to observers as
//!   [`NetEventKind::AddressBound`] with the event's IP info as snapshot.
//! - **all other targets**: [`SimNetwork`] hands out a fixed lease from a
//!   helper thread after a configurable delay.

use std::sync::Arc;

use crate::app::acquisition::AcquisitionObserver;
use crate::app::model::{InterfaceId, NetBinding};
use crate::app::ports::{InterfaceSnapshot, NetError, NetworkAcquisitionPort};

/// Interface key of the ESP-IDF default Wi-Fi station netif.
pub const STA_IFKEY: &str = "WIFI_STA_DEF";

/// Snapshot backed by an already-captured binding.
#[derive(Debug, Clone, Copy)]
pub struct LeaseSnapshot(pub NetBinding);

impl InterfaceSnapshot for LeaseSnapshot {
    fn binding(&self) -> NetBinding {
        self.0
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use core::ffi::{c_void, CStr};
    use core::net::Ipv4Addr;

    use esp_idf_svc::sys;
    use log::warn;

    use super::*;
    use crate::app::model::NetEventKind;

    const STA_IFKEY_C: &CStr = c"WIFI_STA_DEF";

    fn ipv4(addr: sys::esp_ip4_addr_t) -> Ipv4Addr {
        // Stored in network byte order.
        Ipv4Addr::from(addr.addr.to_ne_bytes())
    }

    fn sta_handle() -> *mut sys::esp_netif_t {
        // SAFETY: key is a valid NUL-terminated string; null means absent.
        unsafe { sys::esp_netif_get_handle_from_ifkey(STA_IFKEY_C.as_ptr()) }
    }

    /// Reads the lease from a `IP_EVENT_STA_GOT_IP` payload on demand.
    struct GotIpSnapshot(*const sys::ip_event_got_ip_t);

    impl InterfaceSnapshot for GotIpSnapshot {
        fn binding(&self) -> NetBinding {
            // SAFETY: the event loop keeps the payload alive for the
            // duration of the handler call that owns this snapshot.
            let event = unsafe { &*self.0 };
            let mut lease: u32 = 0;
            // SAFETY: `lease` is a valid 4-byte out-buffer.
            let rc = unsafe {
                sys::esp_netif_dhcpc_option(
                    event.esp_netif,
                    sys::esp_netif_dhcp_option_mode_t_ESP_NETIF_OP_GET,
                    sys::esp_netif_dhcp_option_id_t_ESP_NETIF_IP_ADDRESS_LEASE_TIME,
                    (&mut lease as *mut u32).cast::<c_void>(),
                    core::mem::size_of::<u32>() as u32,
                )
            };
            if rc != sys::ESP_OK as i32 {
                lease = 0;
            }
            NetBinding {
                address: ipv4(event.ip_info.ip),
                lease_secs: lease,
                netmask: ipv4(event.ip_info.netmask),
                gateway: ipv4(event.ip_info.gw),
            }
        }
    }

    unsafe extern "C" fn on_ip_event(
        arg: *mut c_void,
        _base: sys::esp_event_base_t,
        id: i32,
        data: *mut c_void,
    ) {
        if arg.is_null() {
            return;
        }
        // SAFETY: `arg` is an `Arc<AcquisitionObserver>` pointer kept alive
        // by `EspNetAcquisition::observers` for the lifetime of the device.
        let observer = unsafe { &*(arg as *const AcquisitionObserver) };
        let kind = match id as u32 {
            sys::ip_event_t_IP_EVENT_STA_GOT_IP => NetEventKind::AddressBound,
            sys::ip_event_t_IP_EVENT_STA_LOST_IP => NetEventKind::AddressLost,
            other => NetEventKind::Other(other as i32),
        };
        match kind {
            NetEventKind::AddressBound => {
                if data.is_null() {
                    warn!("NET: GOT_IP event without payload");
                    return;
                }
                // `data` is an `ip_event_got_ip_t` only for GOT_IP.
                observer.on_event(kind, &GotIpSnapshot(data as *const sys::ip_event_got_ip_t));
            }
            _ => {
                observer.on_event(kind, &NoPayload);
            }
        }
    }

    /// Stand-in for events whose payload is not an `ip_event_got_ip_t`.
    struct NoPayload;

    impl InterfaceSnapshot for NoPayload {
        fn binding(&self) -> NetBinding {
            NetBinding {
                address: Ipv4Addr::UNSPECIFIED,
                lease_secs: 0,
                netmask: Ipv4Addr::UNSPECIFIED,
                gateway: Ipv4Addr::UNSPECIFIED,
            }
        }
    }

    /// DHCP client on the default station interface.
    #[derive(Default)]
    pub struct EspNetAcquisition {
        observers: Vec<Arc<AcquisitionObserver>>,
    }

    impl EspNetAcquisition {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl NetworkAcquisitionPort for EspNetAcquisition {
        fn subscribe(&mut self, observer: Arc<AcquisitionObserver>) -> Result<(), NetError> {
            let arg = Arc::as_ptr(&observer) as *mut c_void;
            let mut instance: sys::esp_event_handler_instance_t = core::ptr::null_mut();
            // SAFETY: the handler and its argument outlive the registration
            // (the Arc is retained below and never released).
            let rc = unsafe {
                sys::esp_event_handler_instance_register(
                    sys::IP_EVENT,
                    sys::ESP_EVENT_ANY_ID,
                    Some(on_ip_event),
                    arg,
                    &mut instance,
                )
            };
            if rc != sys::ESP_OK as i32 {
                return Err(NetError::SubscribeFailed(rc));
            }
            self.observers.push(observer);
            Ok(())
        }

        fn default_interface(&self) -> Option<InterfaceId> {
            (!sta_handle().is_null()).then_some(InterfaceId(STA_IFKEY))
        }

        fn start_acquisition(&mut self, _iface: InterfaceId) -> Result<(), NetError> {
            let handle = sta_handle();
            if handle.is_null() {
                return Err(NetError::NoDefaultInterface);
            }
            // SAFETY: `handle` is a live netif owned by the Wi-Fi driver.
            let rc = unsafe { sys::esp_netif_dhcpc_start(handle) };
            if rc != sys::ESP_OK as i32 && rc != sys::ESP_ERR_ESP_NETIF_DHCP_ALREADY_STARTED as i32 {
                return Err(NetError::AcquisitionFailed(rc));
            }
            Ok(())
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::EspNetAcquisition;

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::time::Duration;

    use log::info;

    use super::*;
    use crate::app::model::NetEventKind;

    /// Host stand-in for the DHCP client.
    pub struct SimNetwork {
        observers: Vec<Arc<AcquisitionObserver>>,
        iface_present: bool,
        lease: NetBinding,
        delay: Duration,
        starts: u32,
    }

    impl SimNetwork {
        pub fn new(lease: NetBinding, delay: Duration) -> Self {
            Self {
                observers: Vec::new(),
                iface_present: true,
                lease,
                delay,
                starts: 0,
            }
        }

        /// Simulate a board with no station interface.
        pub fn without_interface(mut self) -> Self {
            self.iface_present = false;
            self
        }

        pub fn observer_count(&self) -> usize {
            self.observers.len()
        }

        pub fn acquisition_starts(&self) -> u32 {
            self.starts
        }
    }

    impl NetworkAcquisitionPort for SimNetwork {
        fn subscribe(&mut self, observer: Arc<AcquisitionObserver>) -> Result<(), NetError> {
            self.observers.push(observer);
            Ok(())
        }

        fn default_interface(&self) -> Option<InterfaceId> {
            self.iface_present.then_some(InterfaceId(STA_IFKEY))
        }

        fn start_acquisition(&mut self, iface: InterfaceId) -> Result<(), NetError> {
            if !self.iface_present {
                return Err(NetError::NoDefaultInterface);
            }
            self.starts += 1;
            info!("NET(sim): DHCP started on {}", iface);

            let observers = self.observers.clone();
            let snapshot = LeaseSnapshot(self.lease);
            let delay = self.delay;
            std::thread::Builder::new()
                .name("sim-dhcp".into())
                .spawn(move || {
                    for obs in &observers {
                        obs.on_event(NetEventKind::AcquisitionStarted, &snapshot);
                    }
                    std::thread::sleep(delay);
                    for obs in &observers {
                        obs.on_event(NetEventKind::AddressBound, &snapshot);
                    }
                })
                .map(drop)
                .map_err(|e| NetError::AcquisitionFailed(-e.raw_os_error().unwrap_or(crate::sntp::errno::EIO)))
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::SimNetwork;
