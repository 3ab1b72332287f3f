//! SNTP wire codec (RFC 4330, client side).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |LI | VN  |Mode |    Stratum    |     Poll      |   Precision   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          Root Delay / Root Dispersion / Reference ID          |  4..16
//! |                   Reference Timestamp (64)                    | 16..24
//! |                   Originate Timestamp (64)                    | 24..32
//! |                    Receive Timestamp (64)                     | 32..40
//! |                    Transmit Timestamp (64)                    | 40..48
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Pure functions only; the socket lives in
//! [`adapters::sntp_udp`](crate::adapters::sntp_udp).

use core::fmt;

use crate::app::model::SntpTime;

/// Size of an SNTP packet without extensions.
pub const PACKET_LEN: usize = 48;

/// Seconds from 1900-01-01 (NTP era 0) to 1970-01-01.
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const VERSION: u8 = 4;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;
const LEAP_UNSYNCHRONIZED: u8 = 3;

/// Negative errno values used as transport status codes (Linux numbering).
pub mod errno {
    pub const EIO: i32 = 5;
    pub const EAGAIN: i32 = 11;
    pub const EBADMSG: i32 = 74;
    pub const ETIMEDOUT: i32 = 110;
}

// ───────────────────────────────────────────────────────────────
// Timestamps
// ───────────────────────────────────────────────────────────────

/// 64-bit NTP timestamp: seconds and 2^-32 s fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

impl NtpTimestamp {
    /// Unix time → NTP.  Seconds wrap into the current era.
    pub fn from_unix(secs: u64, nanos: u32) -> Self {
        Self {
            seconds: secs.wrapping_add(NTP_UNIX_OFFSET) as u32,
            fraction: ((u64::from(nanos) << 32) / 1_000_000_000) as u32,
        }
    }

    /// NTP → Unix seconds.
    ///
    /// Seconds with the top bit clear are taken to be in era 1 (on or after
    /// 2036-02-07T06:28:16Z).  `None` for instants before the Unix epoch.
    pub fn to_unix_secs(self) -> Option<u64> {
        let mut secs = u64::from(self.seconds);
        if secs & 0x8000_0000 == 0 {
            secs += 1 << 32;
        }
        secs.checked_sub(NTP_UNIX_OFFSET)
    }

    pub fn is_zero(self) -> bool {
        self.seconds == 0 && self.fraction == 0
    }

    fn read(buf: &[u8], at: usize) -> Self {
        let word = |i: usize| u32::from_be_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        Self {
            seconds: word(at),
            fraction: word(at + 4),
        }
    }

    fn write(self, buf: &mut [u8], at: usize) {
        buf[at..at + 4].copy_from_slice(&self.seconds.to_be_bytes());
        buf[at + 4..at + 8].copy_from_slice(&self.fraction.to_be_bytes());
    }
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// Why a server reply was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    /// Fewer than [`PACKET_LEN`] bytes.
    Truncated(usize),
    /// Mode is neither server nor broadcast.
    BadMode(u8),
    /// Stratum 0: kiss-o'-death with its ASCII code.
    KissOfDeath([u8; 4]),
    /// Leap indicator 3: the server clock is not synchronized.
    Unsynchronized,
    /// Originate timestamp does not echo our transmit timestamp.
    OriginMismatch,
    /// Server sent an all-zero transmit timestamp.
    ZeroTransmit,
    /// Transmit timestamp lies before 1970.
    PreEpoch,
}

impl SntpError {
    /// Negative errno equivalent reported through the session port.
    pub fn errno(&self) -> i32 {
        match self {
            Self::KissOfDeath(_) | Self::Unsynchronized => -errno::EAGAIN,
            _ => -errno::EBADMSG,
        }
    }
}

impl fmt::Display for SntpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated(n) => write!(f, "short reply ({} bytes)", n),
            Self::BadMode(m) => write!(f, "unexpected mode {}", m),
            Self::KissOfDeath(code) => {
                write!(f, "kiss-o'-death {}", String::from_utf8_lossy(code))
            }
            Self::Unsynchronized => write!(f, "server clock unsynchronized"),
            Self::OriginMismatch => write!(f, "originate timestamp mismatch"),
            Self::ZeroTransmit => write!(f, "zero transmit timestamp"),
            Self::PreEpoch => write!(f, "transmit timestamp before 1970"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Encode / decode
// ───────────────────────────────────────────────────────────────

/// Client request: LI 0, VN 4, mode 3, transmit timestamp set.
pub fn encode_request(transmit: NtpTimestamp) -> [u8; PACKET_LEN] {
    let mut pkt = [0u8; PACKET_LEN];
    pkt[0] = (VERSION << 3) | MODE_CLIENT;
    transmit.write(&mut pkt, 40);
    pkt
}

/// Validate a server reply to the request sent with `sent` as its
/// transmit timestamp and extract the server's transmit time.
pub fn decode_response(buf: &[u8], sent: NtpTimestamp) -> Result<SntpTime, SntpError> {
    if buf.len() < PACKET_LEN {
        return Err(SntpError::Truncated(buf.len()));
    }

    let leap = buf[0] >> 6;
    let mode = buf[0] & 0x07;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(SntpError::BadMode(mode));
    }
    if buf[1] == 0 {
        return Err(SntpError::KissOfDeath([buf[12], buf[13], buf[14], buf[15]]));
    }
    if leap == LEAP_UNSYNCHRONIZED {
        return Err(SntpError::Unsynchronized);
    }
    if mode == MODE_SERVER && NtpTimestamp::read(buf, 24) != sent {
        return Err(SntpError::OriginMismatch);
    }

    let transmit = NtpTimestamp::read(buf, 40);
    if transmit.is_zero() {
        return Err(SntpError::ZeroTransmit);
    }
    let seconds = transmit.to_unix_secs().ok_or(SntpError::PreEpoch)?;
    Ok(SntpTime {
        seconds,
        fraction: transmit.fraction,
    })
}
