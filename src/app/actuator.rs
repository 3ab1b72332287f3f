//! Actuator controller — the pump duty-cycle task.
//!
//! Drives one actuator as a square wave: level `n mod 2` on iteration `n`,
//! one `period` sleep per iteration, so the wave period is `2 × period`
//! at 50 % duty.  The controller is the only writer of the pin.
//!
//! ```text
//!   prepare: is_ready? ──no──▶ FatalStop(NotReady)
//!               │yes
//!            configure_output ──err──▶ FatalStop(ConfigureFailed)
//!               │ok
//!   step:    set_level(n % 2) → sleep(period) → n += 1
//! ```

use core::time::Duration;

use crate::error::Error;

use super::events::AppEvent;
use super::ports::{ActuatorError, ActuatorPort, EventSink, Sleeper};
use super::task::{DeviceTask, TaskControl};

/// Level written on iteration `n`.
pub const fn level_for(n: u32) -> bool {
    n % 2 == 1
}

/// Owns one actuator's duty-cycle state machine.
pub struct ActuatorController<A, Z, E> {
    actuator: A,
    sleeper: Z,
    sink: E,
    period: Duration,
    counter: u32,
    name: &'static str,
}

impl<A, Z, E> ActuatorController<A, Z, E>
where
    A: ActuatorPort,
    Z: Sleeper,
    E: EventSink,
{
    pub fn new(actuator: A, sleeper: Z, sink: E, period: Duration) -> Self {
        Self {
            actuator,
            sleeper,
            sink,
            period,
            counter: 0,
            name: "pump_0_th",
        }
    }

    /// Override the task name (defaults to `pump_0_th`).
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Number of completed iterations (wrapping).
    pub fn iterations(&self) -> u32 {
        self.counter
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }
}

impl<A, Z, E> DeviceTask for ActuatorController<A, Z, E>
where
    A: ActuatorPort,
    Z: Sleeper,
    E: EventSink,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn prepare(&mut self) -> TaskControl {
        let gpio = self.actuator.gpio();
        if !self.actuator.is_ready() {
            return TaskControl::FatalStop(ActuatorError::NotReady { gpio }.into());
        }

        if let Err(e) = self.actuator.configure_output() {
            return TaskControl::FatalStop(e.into());
        }

        self.sink.emit(&AppEvent::ActuatorConfigured {
            gpio,
            index: self.actuator.index(),
        });
        self.sink.emit(&AppEvent::TaskStarted { task: self.name });
        TaskControl::Continue
    }

    fn step(&mut self) -> TaskControl {
        self.actuator.set_level(level_for(self.counter));
        self.sleeper.sleep(self.period);
        self.counter = self.counter.wrapping_add(1);
        TaskControl::Continue
    }

    fn stopped(&mut self, reason: &Error) {
        self.sink.emit(&AppEvent::TaskStopped {
            task: self.name,
            reason: *reason,
        });
    }
}
