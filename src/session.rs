//! One supervised run of the runner container.
use strum_macros::Display;
use tracing::{debug, warn};

use crate::{
    config::SessionConfig,
    env_filter::forwarded_environment,
    error::SupervisorError,
    exit::{ExitOutcome, ExitReporter},
    launcher::{self, LaunchedChild},
    process::{ChildHandle, default_probe},
    signal::SignalRelay,
    watchdog::ParentWatchdog,
};

/// Lifecycle of a session. Every terminal state ends the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    Idle,
    Launching,
    Running,
    Terminated,
}

/// Drives launch, watchers and the final wait for a single child.
pub struct Session<'a> {
    config: &'a SessionConfig,
    state: SessionState,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }

    /// Runs the session with the forwarded host environment.
    pub fn run(&mut self) -> Result<ExitOutcome, SupervisorError> {
        self.run_with_env(&forwarded_environment())
    }

    /// Launches the child with `forwarded_env`, starts the SIGTERM relay and
    /// parent watchdog, then waits for the child.
    ///
    /// A launch failure returns before any watcher is started.
    pub fn run_with_env(
        &mut self,
        forwarded_env: &[String],
    ) -> Result<ExitOutcome, SupervisorError> {
        self.transition(SessionState::Launching);
        let LaunchedChild { child, handle } =
            match launcher::launch(self.config, forwarded_env) {
                Ok(launched) => launched,
                Err(err) => {
                    self.transition(SessionState::Terminated);
                    return Err(err);
                }
            };
        self.transition(SessionState::Running);

        if let Err(err) = self.start_watchers(&handle) {
            if let Err(kill_err) = handle.kill() {
                warn!("{kill_err}");
            }
            self.transition(SessionState::Terminated);
            return Err(err);
        }

        let result = ExitReporter::new(child, handle).wait();
        self.transition(SessionState::Terminated);
        result
    }

    fn start_watchers(&self, handle: &ChildHandle) -> Result<(), SupervisorError> {
        SignalRelay::install()?.spawn(handle.clone())?;

        let watchdog = ParentWatchdog::new(self.config.parent_pid, default_probe());
        debug!("Watching parent PID {}", watchdog.parent_pid());
        watchdog.spawn(handle.clone())?;
        Ok(())
    }
}
