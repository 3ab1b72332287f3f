//! System clock and sleep adapters.
//!
//! - **`target_os = "espidf"`** — `settimeofday()` / `gettimeofday()` on the
//!   newlib realtime clock that lwIP, TLS and logging timestamps read.
//! - **`not(target_os = "espidf")`** — an in-process simulated wall clock
//!   anchored on `std::time::Instant`, so host runs never touch the
//!   machine's real clock.

use core::time::Duration;

use crate::app::model::Timestamp;
use crate::app::ports::{ClockError, ClockPort, Sleeper};

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Process-wide realtime clock.
pub struct SystemClock {
    /// Simulation: last committed time and when it was committed.
    #[cfg(not(target_os = "espidf"))]
    anchor: Option<(Timestamp, std::time::Instant)>,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            anchor: None,
        }
    }
}

#[cfg(target_os = "espidf")]
fn last_errno() -> i32 {
    -std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(crate::sntp::errno::EIO)
}

#[cfg(target_os = "espidf")]
impl ClockPort for SystemClock {
    fn set_time(&mut self, ts: Timestamp) -> Result<(), ClockError> {
        use esp_idf_svc::sys;

        let tv = sys::timeval {
            tv_sec: ts.secs as sys::time_t,
            tv_usec: (ts.nanos / 1_000) as _,
        };
        // SAFETY: `tv` is a valid timeval; a null timezone is permitted.
        if unsafe { sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            return Err(ClockError(last_errno()));
        }
        Ok(())
    }

    fn get_time(&self) -> Result<Timestamp, ClockError> {
        use esp_idf_svc::sys;

        let mut tv = sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: `tv` is a valid out-pointer; a null timezone is permitted.
        if unsafe { sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return Err(ClockError(last_errno()));
        }
        Ok(Timestamp {
            secs: tv.tv_sec.max(0) as u64,
            nanos: (tv.tv_usec.max(0) as u32) * 1_000,
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for SystemClock {
    fn set_time(&mut self, ts: Timestamp) -> Result<(), ClockError> {
        log::info!("Clock(sim): set to {}", ts);
        self.anchor = Some((ts, std::time::Instant::now()));
        Ok(())
    }

    fn get_time(&self) -> Result<Timestamp, ClockError> {
        let Some((base, at)) = self.anchor else {
            // Never synced: report the host's time.
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_err(|_| ClockError(-crate::sntp::errno::EIO))?;
            return Ok(Timestamp {
                secs: now.as_secs(),
                nanos: now.subsec_nanos(),
            });
        };
        let now = Duration::new(base.secs, base.nanos) + at.elapsed();
        Ok(Timestamp {
            secs: now.as_secs(),
            nanos: now.subsec_nanos(),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Sleeper
// ───────────────────────────────────────────────────────────────

/// Blocks the calling thread.  On ESP-IDF this yields the FreeRTOS task.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
