//! Run-until-fatal task model.
//!
//! Both device tasks are loops with no external cancellation.  Each one
//! is expressed as a one-time [`DeviceTask::prepare`] followed by repeated
//! [`DeviceTask::step`] calls; every call answers with a [`TaskControl`].
//! [`run_until_fatal`] drives that contract on whatever thread the
//! scheduler hands it, so the same task code runs under FreeRTOS tasks,
//! host threads, or a test calling `step()` by hand.

use log::{error, info};

use crate::error::Error;

/// Verdict of one task iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Keep looping.
    Continue,
    /// Stop this task permanently.  Nothing restarts it.
    FatalStop(Error),
}

impl TaskControl {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalStop(_))
    }
}

/// A device task: setup once, then iterate forever.
pub trait DeviceTask {
    /// Thread name, also used in log lines.
    fn name(&self) -> &'static str;

    /// One-time setup before the loop.  A fatal result skips the loop.
    fn prepare(&mut self) -> TaskControl;

    /// One loop iteration, including its own sleep.
    fn step(&mut self) -> TaskControl;

    /// Called once with the reason the task stopped.
    fn stopped(&mut self, _reason: &Error) {}
}

/// Drive `task` until it reports a fatal condition and return that reason.
///
/// Under normal operation this never returns.
pub fn run_until_fatal<T: DeviceTask>(task: &mut T) -> Error {
    info!("task '{}': starting", task.name());

    let mut control = task.prepare();
    let reason = loop {
        match control {
            TaskControl::Continue => control = task.step(),
            TaskControl::FatalStop(reason) => break reason,
        }
    };

    error!("task '{}': stopped ({})", task.name(), reason);
    task.stopped(&reason);
    reason
}
