//! gauge-docker-java runs the Gauge Java runner inside a Docker container and
//! supervises it on behalf of Gauge: it forwards a filtered copy of the host
//! environment, relays SIGTERM to the container, kills the container if Gauge
//! dies, and turns the container's exit into its own exit code.

/// CLI interface.
pub mod cli;

/// Session configuration.
pub mod config;

/// Environment passthrough filtering.
pub mod env_filter;

/// Error handling.
pub mod error;

/// Waiting on the container and mapping its exit.
pub mod exit;

/// Building and starting the container runtime invocation.
pub mod launcher;

/// Shared child handle and liveness probes.
pub mod process;

/// Session lifecycle.
pub mod session;

/// SIGTERM relay.
pub mod signal;

/// Parent liveness watchdog.
pub mod watchdog;
