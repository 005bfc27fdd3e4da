//! Waits on the runner container and maps its outcome to our exit code.
use std::process::{Child, ExitStatus};

use tracing::{debug, info};

use crate::{
    error::{SupervisorError, WaitFailure},
    process::{ChildHandle, TerminationTrigger},
};

/// Terminal outcome of a session that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The child exited with status 0.
    Clean,
    /// The launching process died and the child was killed.
    Orphaned,
}

impl ExitOutcome {
    /// Exit code for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            ExitOutcome::Clean | ExitOutcome::Orphaned => 0,
        }
    }
}

/// Blocks on the child until it terminates.
pub struct ExitReporter {
    child: Child,
    handle: ChildHandle,
}

impl ExitReporter {
    pub fn new(child: Child, handle: ChildHandle) -> Self {
        Self { child, handle }
    }

    /// Waits for the child and classifies the result.
    ///
    /// Any non-zero status, signal death, or wait failure becomes
    /// [`SupervisorError::Wait`]. The child's own exit code is not preserved.
    /// A child killed after the parent died yields [`ExitOutcome::Orphaned`].
    pub fn wait(mut self) -> Result<ExitOutcome, SupervisorError> {
        let result = self.child.wait();
        if self.handle.record_trigger(TerminationTrigger::NaturalExit) {
            debug!("PID {} exited on its own", self.handle.pid());
        } else if let Some(trigger) = self.handle.trigger() {
            info!("PID {} terminated after {trigger}", self.handle.pid());
        }

        if self.handle.trigger() == Some(TerminationTrigger::ParentDeath) {
            return Ok(ExitOutcome::Orphaned);
        }
        classify(&self.handle, result)
    }
}

/// Maps the result of a wait to the session outcome.
pub fn classify(
    handle: &ChildHandle,
    result: std::io::Result<ExitStatus>,
) -> Result<ExitOutcome, SupervisorError> {
    let failure = match result {
        Ok(status) if status.success() => return Ok(ExitOutcome::Clean),
        Ok(status) => WaitFailure::Status(status),
        Err(err) => WaitFailure::Io(err),
    };

    Err(SupervisorError::Wait {
        program: handle.program().to_string(),
        pid: handle.pid(),
        source: failure,
    })
}
