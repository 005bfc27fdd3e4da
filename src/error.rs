//! Error handling for gauge-docker-java.
use std::{io, process::ExitStatus};

use thiserror::Error;

/// Exit code used for every fatal supervisor error.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Defines all possible errors that can occur while supervising the runner container.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required environment variable was not set.
    #[error("Could not find {0} env. Docker-Java Runner exiting...")]
    MissingEnv(&'static str),

    /// The container runtime could not be started.
    #[error("Failed to start {program}. {source}")]
    Launch {
        /// Program that was being started.
        program: String,
        /// The underlying error that occurred.
        #[source]
        source: io::Error,
    },

    /// The container runtime terminated abnormally or could not be waited on.
    #[error("process {program} with pid {pid} quit unexpectedly. {source}")]
    Wait {
        /// Program that was started.
        program: String,
        /// PID of the child process.
        pid: u32,
        /// What went wrong.
        #[source]
        source: WaitFailure,
    },

    /// A best-effort kill failed.
    #[error("Failed to kill process with pid {pid}. {source}")]
    Kill {
        /// PID that was signalled.
        pid: u32,
        /// The underlying errno.
        #[source]
        source: nix::errno::Errno,
    },

    /// The termination signal handler could not be installed.
    #[error("Failed to install SIGTERM handler: {0}")]
    SignalSetup(#[from] nix::errno::Errno),

    /// Generic I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SupervisorError {
    /// Exit code the supervisor terminates with for this error.
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }
}

/// Reason a wait on the child did not report a clean exit.
#[derive(Debug, Error)]
pub enum WaitFailure {
    /// The child exited with a non-zero code or was killed by a signal.
    #[error("{0}")]
    Status(ExitStatus),

    /// The wait syscall itself failed.
    #[error("{0}")]
    Io(#[from] io::Error),
}
