//! Shared handle to the supervised child and process liveness probes.
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use chrono::{DateTime, Local};
use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};
use strum_macros::{AsRefStr, Display};
use tracing::debug;

use crate::error::SupervisorError;

/// What ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum TerminationTrigger {
    /// SIGTERM was delivered to the supervisor.
    ExternalSignal = 1,
    /// The launching process disappeared.
    ParentDeath = 2,
    /// The child exited on its own.
    NaturalExit = 3,
}

impl TerminationTrigger {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::ExternalSignal),
            2 => Some(Self::ParentDeath),
            3 => Some(Self::NaturalExit),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ChildInner {
    pid: u32,
    program: String,
    started_at: DateTime<Local>,
    trigger: AtomicU8,
}

/// Cheap, cloneable handle to the running child.
///
/// Kills go through the PID rather than the owned [`std::process::Child`], so
/// the watchers never contend with the foreground wait. Only the first
/// [`TerminationTrigger`] is recorded; later ones leave it untouched.
#[derive(Debug, Clone)]
pub struct ChildHandle {
    inner: Arc<ChildInner>,
}

impl ChildHandle {
    /// Creates a handle for a freshly spawned process.
    pub fn new(pid: u32, program: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ChildInner {
                pid,
                program: program.into(),
                started_at: Local::now(),
                trigger: AtomicU8::new(0),
            }),
        }
    }

    /// PID of the child.
    pub fn pid(&self) -> u32 {
        self.inner.pid
    }

    /// Program the child was started from.
    pub fn program(&self) -> &str {
        &self.inner.program
    }

    /// When the child was started.
    pub fn started_at(&self) -> DateTime<Local> {
        self.inner.started_at
    }

    /// The trigger that ended the session, if any has fired yet.
    pub fn trigger(&self) -> Option<TerminationTrigger> {
        TerminationTrigger::from_raw(self.inner.trigger.load(Ordering::SeqCst))
    }

    /// Records `trigger` unless another one got there first. Returns `true` if it won.
    pub fn record_trigger(&self, trigger: TerminationTrigger) -> bool {
        self.inner
            .trigger
            .compare_exchange(0, trigger as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Records `trigger` and sends SIGKILL to the child.
    ///
    /// Safe to call repeatedly and concurrently with the foreground wait; a
    /// child that is already gone yields [`SupervisorError::Kill`] with `ESRCH`.
    pub fn terminate(&self, trigger: TerminationTrigger) -> Result<(), SupervisorError> {
        if !self.record_trigger(trigger) {
            debug!(
                "Termination already triggered by {:?}; {trigger} is redundant",
                self.trigger()
            );
        }
        self.kill()
    }

    /// Sends SIGKILL to the child without waiting for it.
    pub fn kill(&self) -> Result<(), SupervisorError> {
        let pid = Pid::from_raw(self.inner.pid as i32);
        signal::kill(pid, Signal::SIGKILL).map_err(|source| SupervisorError::Kill {
            pid: self.inner.pid,
            source,
        })
    }
}

/// Answers whether a PID still refers to a live process.
pub trait LivenessProbe: Send + 'static {
    /// Returns `true` while `pid` refers to a running process.
    fn is_alive(&self, pid: u32) -> bool;
}

impl<F> LivenessProbe for F
where
    F: Fn(u32) -> bool + Send + 'static,
{
    fn is_alive(&self, pid: u32) -> bool {
        self(pid)
    }
}

/// Probes with signal 0, which checks existence without delivering anything.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalProbe;

#[cfg(unix)]
impl LivenessProbe for SignalProbe {
    fn is_alive(&self, pid: u32) -> bool {
        match signal::kill(Pid::from_raw(pid as i32), None) {
            Ok(()) => true,
            // Exists but belongs to someone else.
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

/// Liveness backend for the current platform.
#[cfg(unix)]
pub fn default_probe() -> SignalProbe {
    SignalProbe
}
