//! Builds and starts the `docker run` invocation for the Java runner.
use std::process::{Child, Command, Stdio};

use tracing::{debug, info, warn};

use crate::{
    config::{PROJECT_ROOT_ENV, SessionConfig},
    error::SupervisorError,
    process::ChildHandle,
};

/// A started container runtime process.
#[derive(Debug)]
pub struct LaunchedChild {
    /// Owned process, waited on by the foreground only.
    pub child: Child,
    /// Shared handle for the background watchers.
    pub handle: ChildHandle,
}

/// Shell script run inside the container: install support libraries, then start the runner.
pub fn container_script(config: &SessionConfig) -> String {
    format!(
        "set -e; cd {root}; cp -r {libs} ./libs/; {runner} --start",
        root = config.container_root,
        libs = config.support_libs(),
        runner = config.runner_binary(),
    )
}

/// Arguments passed to the container runtime.
pub fn container_args(config: &SessionConfig, forwarded_env: &[String]) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--rm".to_string()];

    for entry in forwarded_env {
        args.push("-e".to_string());
        args.push(entry.clone());
    }

    args.extend([
        "-v".to_string(),
        format!("{}:{}", config.project_root.display(), config.container_root),
        "-e".to_string(),
        format!("{PROJECT_ROOT_ENV}={}", config.container_root),
        "--net=host".to_string(),
        config.image.clone(),
        "/bin/sh".to_string(),
        "-c".to_string(),
        container_script(config),
    ]);

    args
}

/// Starts the container runtime without waiting for it.
///
/// The child runs in the project root when it exists, otherwise in our own
/// working directory. It shares our stdout and stderr; stdin is closed.
pub fn launch(
    config: &SessionConfig,
    forwarded_env: &[String],
) -> Result<LaunchedChild, SupervisorError> {
    let args = container_args(config, forwarded_env);
    info!("Running command:\n\t{} {}", config.runtime, args.join(" "));

    let mut cmd = Command::new(&config.runtime);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if config.project_root.is_dir() {
        cmd.current_dir(&config.project_root);
    } else {
        warn!(
            "Project root {} is not a directory; starting {} from the current directory",
            config.project_root.display(),
            config.runtime
        );
    }

    let child = cmd.spawn().map_err(|source| SupervisorError::Launch {
        program: config.runtime.clone(),
        source,
    })?;

    let handle = ChildHandle::new(child.id(), config.runtime.clone());
    debug!(
        "Started {} with PID {} at {}",
        handle.program(),
        handle.pid(),
        handle.started_at().to_rfc3339()
    );

    Ok(LaunchedChild { child, handle })
}
