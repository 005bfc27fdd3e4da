//! Session configuration for the Docker runner.
use std::{env, path::PathBuf};

use crate::error::SupervisorError;

/// Environment variable Gauge uses to hand over the project root.
pub const PROJECT_ROOT_ENV: &str = "GAUGE_PROJECT_ROOT";

/// Container runtime invoked by default.
pub const DEFAULT_RUNTIME: &str = "docker";

/// Image the runner container is started from.
pub const DEFAULT_IMAGE: &str = "getgauge/java";

/// Java runner version installed in the image.
pub const DEFAULT_RUNNER_VERSION: &str = "0.5.0";

/// Mount point of the project inside the container.
pub const CONTAINER_PROJECT_ROOT: &str = "/opt/test";

/// Everything a session needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Host path of the Gauge project, bind mounted into the container.
    pub project_root: PathBuf,
    /// Container runtime executable.
    pub runtime: String,
    /// Image name passed to `run`.
    pub image: String,
    /// Version of the Java runner inside the image.
    pub runner_version: String,
    /// Project path as seen from inside the container.
    pub container_root: String,
    /// PID of the process that launched us.
    pub parent_pid: u32,
}

impl SessionConfig {
    /// Builds a configuration from the real process environment.
    pub fn from_env() -> Result<Self, SupervisorError> {
        let parent_pid = nix::unistd::getppid().as_raw() as u32;
        Self::from_lookup(|key| env::var(key).ok(), parent_pid)
    }

    /// Builds a configuration using `lookup` to read environment variables.
    pub fn from_lookup<F>(lookup: F, parent_pid: u32) -> Result<Self, SupervisorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = lookup(PROJECT_ROOT_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .ok_or(SupervisorError::MissingEnv(PROJECT_ROOT_ENV))?;

        Ok(Self {
            project_root,
            runtime: DEFAULT_RUNTIME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            runner_version: DEFAULT_RUNNER_VERSION.to_string(),
            container_root: CONTAINER_PROJECT_ROOT.to_string(),
            parent_pid,
        })
    }

    /// Overrides the container runtime executable.
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Overrides the image name.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Overrides the runner version.
    pub fn with_runner_version(mut self, version: impl Into<String>) -> Self {
        self.runner_version = version.into();
        self
    }

    /// Installation directory of the Java runner inside the container.
    pub fn runner_home(&self) -> String {
        format!("~/.gauge/plugins/java/{}", self.runner_version)
    }

    /// Glob matching the runner support libraries inside the container.
    pub fn support_libs(&self) -> String {
        format!("{}/libs/*", self.runner_home())
    }

    /// Path of the runner executable inside the container.
    pub fn runner_binary(&self) -> String {
        format!("{}/bin/gauge-java", self.runner_home())
    }
}
