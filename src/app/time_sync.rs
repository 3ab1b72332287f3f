//! SNTP time-sync client.
//!
//! One call to [`TimeSync::sync_once`] is one complete session:
//!
//! ```text
//!   create ─▶ init ──err──▶ InitFailed ─┐
//!               │ok                     │
//!             query ─err──▶ QueryFailed ┤
//!               │ok                     │
//!         clock.set_time ───────────────┤
//!                                       ▼
//!                                     close  (every path)
//!                                       │
//!                          clock.get_time (diagnostic read-back)
//! ```
//!
//! Sessions are never reused: each attempt builds a new one from the
//! [`SessionFactory`] and a [`SessionGuard`] closes it on drop, so the
//! release happens on every exit path including early returns.

use core::fmt;

use log::{error, info, warn};

use super::model::Timestamp;
use super::ports::{ClockPort, SessionFactory, SntpSession, SyncTarget};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// Why a sync attempt failed.  Codes are negative errno values from the
/// transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Session could not be initialised (socket/bind/connect).
    InitFailed(i32),
    /// Request failed or timed out, or the reply was rejected.
    QueryFailed(i32),
    /// The clock refused the new time.
    ClockRejected(i32),
}

impl SyncError {
    /// Raw status code carried by the error.
    pub fn code(&self) -> i32 {
        match self {
            Self::InitFailed(rc) | Self::QueryFailed(rc) | Self::ClockRejected(rc) => *rc,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed(rc) => write!(f, "failed to init SNTP IPv4 ctx: {}", rc),
            Self::QueryFailed(rc) => write!(f, "SNTP IPv4 request failed: {}", rc),
            Self::ClockRejected(rc) => write!(f, "clock_settime failed: {}", rc),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Seam used by the orchestrator
// ───────────────────────────────────────────────────────────────

/// Anything that can perform one sync attempt.
pub trait TimeSync {
    fn sync_once(&mut self) -> Result<Timestamp, SyncError>;
}

// ───────────────────────────────────────────────────────────────
// Scoped session
// ───────────────────────────────────────────────────────────────

/// Closes the wrapped session exactly once, on [`close`](Self::close) or
/// on drop.
pub struct SessionGuard<S: SntpSession> {
    session: S,
    open: bool,
}

impl<S: SntpSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session, open: true }
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Close now instead of at end of scope.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.open {
            self.session.close();
            self.open = false;
        }
    }
}

impl<S: SntpSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.release();
    }
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

/// SNTP client against one fixed server, committing results to the clock.
pub struct TimeSyncClient<F, C> {
    factory: F,
    clock: C,
    target: SyncTarget,
}

impl<F, C> TimeSyncClient<F, C>
where
    F: SessionFactory,
    C: ClockPort,
{
    pub fn new(factory: F, clock: C, target: SyncTarget) -> Self {
        Self {
            factory,
            clock,
            target,
        }
    }

    pub fn target(&self) -> &SyncTarget {
        &self.target
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Runs init → query → set inside the guard's scope.
    fn attempt(&mut self, guard: &mut SessionGuard<F::Session>) -> Result<Timestamp, SyncError> {
        let session = guard.session_mut();

        session.init().map_err(|rc| {
            error!("Failed to init SNTP IPv4 ctx: {}", rc);
            SyncError::InitFailed(rc)
        })?;

        info!("Sending SNTP IPv4 request...");
        let time = session.query(self.target.timeout).map_err(|rc| {
            error!("SNTP IPv4 request failed: {}", rc);
            SyncError::QueryFailed(rc)
        })?;

        let ts = Timestamp::from_secs(time.seconds);
        self.clock.set_time(ts).map_err(|e| {
            error!("Setting system time failed: {}", e);
            SyncError::ClockRejected(e.0)
        })?;

        info!("status: 0");
        info!(
            "time since Epoch: high word: {}, low word: {}",
            time.high_word(),
            time.low_word()
        );
        Ok(ts)
    }
}

impl<F, C> TimeSync for TimeSyncClient<F, C>
where
    F: SessionFactory,
    C: ClockPort,
{
    fn sync_once(&mut self) -> Result<Timestamp, SyncError> {
        let mut guard = SessionGuard::new(self.factory.create(&self.target));
        let outcome = self.attempt(&mut guard);
        guard.close();

        match self.clock.get_time() {
            Ok(now) => info!("clock_gettime returned {}", now.secs),
            Err(e) => warn!("clock read-back failed: {}", e),
        }

        outcome
    }
}
