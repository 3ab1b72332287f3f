//! Actuator drivers, GPIO helpers, and task creation.

pub mod hw_init;
pub mod pump;
pub mod task_pin;
