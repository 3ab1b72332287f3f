//! Integration tests: pump duty-cycle task.

use core::time::Duration;

use greenhouse::app::actuator::ActuatorController;
use greenhouse::app::events::AppEvent;
use greenhouse::app::ports::ActuatorError;
use greenhouse::app::task::{DeviceTask, TaskControl, run_until_fatal};
use greenhouse::Error;

use crate::mock_ports::{CaptureSink, MockActuator, RecordingSleeper};

type Pump = ActuatorController<MockActuator, RecordingSleeper, CaptureSink>;

fn pump(actuator: MockActuator) -> Pump {
    ActuatorController::new(
        actuator,
        RecordingSleeper::default(),
        CaptureSink::default(),
        Duration::from_millis(10_000),
    )
}

#[test]
fn square_wave_with_one_sleep_per_level() {
    let mut c = pump(MockActuator::ready());
    assert_eq!(c.prepare(), TaskControl::Continue);
    for _ in 0..6 {
        c.step();
    }

    assert_eq!(c.actuator().levels, vec![false, true, false, true, false, true]);
    assert_eq!(c.sleeper().sleeps, vec![Duration::from_millis(10_000); 6]);
    assert_eq!(c.actuator().configured, 1);
}

#[test]
fn configured_event_precedes_task_start() {
    let mut c = pump(MockActuator::ready());
    c.prepare();
    assert_eq!(
        c.sink().events,
        vec![
            AppEvent::ActuatorConfigured { gpio: 2, index: 0 },
            AppEvent::TaskStarted { task: "pump_0_th" },
        ]
    );
}

#[test]
fn not_ready_actuator_stops_task_without_writes() {
    let mut c = pump(MockActuator { ready: false, ..MockActuator::ready() });
    let reason = run_until_fatal(&mut c);

    assert_eq!(reason, Error::Actuator(ActuatorError::NotReady { gpio: 2 }));
    assert!(c.actuator().levels.is_empty());
    assert_eq!(c.actuator().configured, 0);
    assert!(c.sleeper().sleeps.is_empty());
    assert_eq!(
        c.sink().events,
        vec![AppEvent::TaskStopped { task: "pump_0_th", reason }]
    );
}

#[test]
fn configure_failure_stops_task_with_code() {
    let mut c = pump(MockActuator { configure_rc: Some(-22), ..MockActuator::ready() });
    let reason = run_until_fatal(&mut c);

    assert_eq!(
        reason,
        Error::Actuator(ActuatorError::ConfigureFailed { code: -22, gpio: 2, index: 0 })
    );
    assert_eq!(reason.to_string(), "actuator: error -22: failed to configure pin 2 (PUMP '0')");
    assert!(c.actuator().levels.is_empty());
}

#[test]
fn custom_task_name_is_reported() {
    let mut c = pump(MockActuator::ready()).with_name("pump_1_th");
    c.prepare();
    assert_eq!(c.name(), "pump_1_th");
    assert!(c.sink().events.contains(&AppEvent::TaskStarted { task: "pump_1_th" }));
}
