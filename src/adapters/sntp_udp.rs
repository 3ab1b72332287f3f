//! SNTP over UDP.
//!
//! Implements [`SessionFactory`] / [`SntpSession`] with
//! `std::net::UdpSocket`, which maps onto lwIP sockets on ESP-IDF and host
//! sockets in simulation.  Every session owns one socket: `init` binds and
//! connects it, `query` does a single request/reply exchange, `close`
//! drops it.

use core::net::{Ipv4Addr, SocketAddrV4};
use core::time::Duration;
use std::io;
use std::net::UdpSocket;

use log::{debug, warn};

use crate::app::model::SntpTime;
use crate::app::ports::{SessionFactory, SntpSession, SyncTarget};
use crate::sntp::{self, NtpTimestamp, errno};

/// Map a socket error onto a negative errno status.
fn status(e: &io::Error) -> i32 {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => -errno::ETIMEDOUT,
        _ => -e.raw_os_error().unwrap_or(errno::EIO),
    }
}

/// Transmit timestamp for a new request: the local clock, whatever it says.
fn local_transmit() -> NtpTimestamp {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    NtpTimestamp::from_unix(now.as_secs(), now.subsec_nanos())
}

/// Creates one [`UdpSntpSession`] per sync attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpSntpFactory;

impl SessionFactory for UdpSntpFactory {
    type Session = UdpSntpSession;

    fn create(&mut self, target: &SyncTarget) -> UdpSntpSession {
        UdpSntpSession::new(target.server)
    }
}

pub struct UdpSntpSession {
    server: SocketAddrV4,
    socket: Option<UdpSocket>,
}

impl UdpSntpSession {
    pub fn new(server: SocketAddrV4) -> Self {
        Self {
            server,
            socket: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }
}

impl SntpSession for UdpSntpSession {
    fn init(&mut self) -> Result<(), i32> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
            .map_err(|e| status(&e))?;
        socket.connect(self.server).map_err(|e| status(&e))?;
        self.socket = Some(socket);
        Ok(())
    }

    fn query(&mut self, timeout: Duration) -> Result<SntpTime, i32> {
        let socket = self.socket.as_ref().ok_or(-errno::EIO)?;
        // A zero read timeout means "block forever" to the socket layer.
        let timeout = timeout.max(Duration::from_millis(1));
        socket.set_read_timeout(Some(timeout)).map_err(|e| status(&e))?;

        let sent = local_transmit();
        socket
            .send(&sntp::encode_request(sent))
            .map_err(|e| status(&e))?;

        let mut buf = [0u8; 68];
        let n = socket.recv(&mut buf).map_err(|e| status(&e))?;
        sntp::decode_response(&buf[..n], sent).map_err(|e| {
            warn!("SNTP reply from {} rejected: {}", self.server, e);
            e.errno()
        })
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("SNTP session to {} closed", self.server);
        }
    }
}
