//! Named, prioritized task spawning with a common start gate.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task with explicit name, priority, stack size and (optional)
//! core affinity.  On non-ESP targets, falls back to plain thread spawn.
//!
//! # ESP-IDF Threading Model
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread. This means the config→spawn pair must not be
//! interleaved with other thread creation on the same thread.
//!
//! # Start gate
//!
//! [`start_together`] creates every task first and releases them only once
//! all exist, so no task observes a half-created system.

use core::ffi::CStr;
use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{error, info};

/// CPU core identifiers for the ESP32 dual-core parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — protocol stacks (WiFi, lwIP).
    Pro = 0,
    /// Core 1 (APP_CPU) — application logic.
    App = 1,
}

/// How one task is created.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static CStr,
    pub priority: u8,
    pub stack_bytes: usize,
    /// `None` lets the scheduler place the task on either core.
    pub core: Option<Core>,
}

impl TaskSpec {
    pub fn display_name(&self) -> &'static str {
        self.name.to_str().unwrap_or("task")
    }
}

/// Spawn a thread configured by `spec`.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    // FreeRTOS tskNO_AFFINITY
    const NO_AFFINITY: i32 = 0x7FFF_FFFF;

    // SAFETY: the config struct is fully initialised by the IDF helper and
    // `spec.name` is a 'static NUL-terminated string.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core.map_or(NO_AFFINITY, |c| c as i32);
        cfg.prio = spec.priority as _;
        cfg.stack_size = spec.stack_bytes as _;
        cfg.thread_name = spec.name.as_ptr();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    info!(
        "Spawning '{}' on {:?} (pri={}, stack={}B)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_bytes
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_bytes)
        .spawn(f)
}

/// Simulation fallback — ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    info!(
        "Spawning '{}' (sim, no core pinning, stack={}B)",
        spec.display_name(),
        spec.stack_bytes
    );

    // Host threads need more headroom than a firmware task.
    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_bytes.max(64 * 1024))
        .spawn(f)
}

// ───────────────────────────────────────────────────────────────
// Start gate
// ───────────────────────────────────────────────────────────────

/// One-shot gate: tasks block in [`wait`](Self::wait) until it is opened
/// with a verdict.
#[derive(Debug, Default)]
pub struct StartGate {
    verdict: Mutex<Option<bool>>,
    cv: Condvar,
}

impl StartGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every waiter; `go == false` tells them to exit instead.
    pub fn open(&self, go: bool) {
        let mut v = self.verdict.lock().unwrap_or_else(PoisonError::into_inner);
        *v = Some(go);
        self.cv.notify_all();
    }

    /// Block until opened and return the verdict.
    pub fn wait(&self) -> bool {
        let mut v = self.verdict.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(go) = *v {
                return go;
            }
            v = self.cv.wait(v).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Boxed task body.
pub type TaskBody = Box<dyn FnOnce() + Send + 'static>;

/// Create every task, then start them all at once.
///
/// If any task cannot be created, the ones already created are released
/// with an abort verdict (their bodies never run) and the error is
/// returned.
pub fn start_together(tasks: Vec<(TaskSpec, TaskBody)>) -> io::Result<Vec<JoinHandle<()>>> {
    start_together_with(tasks, |spec, f| spawn_on_core(spec, f))
}

/// [`start_together`] with the thread creation step supplied by the caller.
pub fn start_together_with<S>(
    tasks: Vec<(TaskSpec, TaskBody)>,
    mut spawn: S,
) -> io::Result<Vec<JoinHandle<()>>>
where
    S: FnMut(&TaskSpec, TaskBody) -> io::Result<JoinHandle<()>>,
{
    let gate = Arc::new(StartGate::new());
    let mut handles = Vec::with_capacity(tasks.len());

    for (spec, body) in tasks {
        let task_gate = Arc::clone(&gate);
        let gated: TaskBody = Box::new(move || {
            if task_gate.wait() {
                body();
            }
        });
        match spawn(&spec, gated) {
            Ok(h) => handles.push(h),
            Err(e) => {
                error!("Failed to create task '{}': {}", spec.display_name(), e);
                gate.open(false);
                for h in handles {
                    let _ = h.join();
                }
                return Err(e);
            }
        }
    }

    gate.open(true);
    Ok(handles)
}
