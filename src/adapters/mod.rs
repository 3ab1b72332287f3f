//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                     | Connects to                  |
//! |-------------|--------------------------------|------------------------------|
//! | `log_sink`  | EventSink                      | Serial log output            |
//! | `netif`     | NetworkAcquisitionPort         | ESP-IDF netif / DHCP client  |
//! | `sntp_udp`  | SessionFactory, SntpSession    | UDP socket (lwIP)            |
//! | `time`      | ClockPort, Sleeper             | newlib realtime clock        |
//! | `wifi`      | AssociationPort                | ESP-IDF WiFi STA             |

pub mod log_sink;
pub mod netif;
pub mod sntp_udp;
pub mod time;
pub(crate) mod utils;
pub mod wifi;
