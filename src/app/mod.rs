//! Application core — pure domain logic, zero I/O.
//!
//! The two device tasks live here: the pump duty-cycle
//! [`ActuatorController`](actuator::ActuatorController) and the network &
//! time [`Orchestrator`](orchestrator::Orchestrator).  All interaction with
//! hardware and the network stack happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod acquisition;
pub mod actuator;
pub mod events;
pub mod model;
pub mod orchestrator;
pub mod ports;
pub mod task;
pub mod time_sync;
