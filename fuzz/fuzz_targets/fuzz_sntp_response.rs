//! Fuzz target: `sntp::decode_response`
//!
//! Drives arbitrary datagrams into the SNTP reply decoder and asserts that
//! it never panics and that anything it accepts is a well-formed reply to
//! the request it was checked against.
//!
//! cargo fuzz run fuzz_sntp_response

#![no_main]

use greenhouse::sntp::{self, NtpTimestamp, PACKET_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Use the datagram's own originate field as "sent" half the time so
    // the accept path is reachable.
    let sent = if data.len() >= PACKET_LEN && data[0] & 0x80 == 0 {
        NtpTimestamp {
            seconds: u32::from_be_bytes([data[24], data[25], data[26], data[27]]),
            fraction: u32::from_be_bytes([data[28], data[29], data[30], data[31]]),
        }
    } else {
        NtpTimestamp { seconds: 0xE900_0000, fraction: 1 }
    };

    match sntp::decode_response(data, sent) {
        Ok(time) => {
            assert!(data.len() >= PACKET_LEN);
            assert_ne!(data[1], 0, "stratum 0 must be rejected");
            assert_ne!(data[0] >> 6, 3, "unsynchronized server must be rejected");
            assert!(time.seconds < (1u64 << 33));
        }
        Err(e) => assert!(e.errno() < 0),
    }
});
