//! Kills the runner container once the process that launched us is gone.
//!
//! Gauge may be killed with SIGKILL, in which case it cannot stop the container
//! itself. The watchdog polls the parent PID instead of relying on
//! platform-specific death signals.
use std::{
    io,
    process,
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{info, warn};

use crate::{
    exit::ExitOutcome,
    process::{ChildHandle, LivenessProbe, TerminationTrigger},
};

/// Delay between two parent liveness probes.
pub const PARENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls the launching process and cleans up the child when it disappears.
pub struct ParentWatchdog<P> {
    parent_pid: u32,
    probe: P,
    interval: Duration,
}

impl<P: LivenessProbe> ParentWatchdog<P> {
    /// Watches `parent_pid` with `probe` at [`PARENT_POLL_INTERVAL`].
    pub fn new(parent_pid: u32, probe: P) -> Self {
        Self {
            parent_pid,
            probe,
            interval: PARENT_POLL_INTERVAL,
        }
    }

    /// Overrides the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// PID being watched.
    pub fn parent_pid(&self) -> u32 {
        self.parent_pid
    }

    /// Blocks until the parent is gone, then kills `child`.
    ///
    /// A failed kill is logged and otherwise ignored.
    pub fn watch(&self, child: &ChildHandle) {
        while self.probe.is_alive(self.parent_pid) {
            thread::sleep(self.interval);
        }

        info!(
            "Parent process with PID {} has terminated; killing PID {}",
            self.parent_pid,
            child.pid()
        );
        if let Err(err) = child.terminate(TerminationTrigger::ParentDeath) {
            warn!("{err}");
        }
    }

    /// Runs the watchdog on a background thread that exits the program once the
    /// parent is gone.
    pub fn spawn(self, child: ChildHandle) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("parent-watchdog".into())
            .spawn(move || {
                self.watch(&child);
                process::exit(ExitOutcome::Orphaned.code());
            })
    }
}
