#[path = "common/mod.rs"]
mod common;

use std::{
    fs,
    process::{Command as StdCommand, Stdio},
    thread,
    time::{Duration, Instant},
};

use assert_cmd::Command;
use common::{FakeRuntime, wait_for_process_exit};
use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};
use predicates::{prelude::*, str::contains};
use tempfile::tempdir;

#[test]
fn clean_exit_passes_filtered_env_and_exits_zero() {
    let temp = tempdir().expect("failed to create tempdir");
    let project = temp.path().join("project");
    fs::create_dir_all(&project).expect("create project dir");
    let runtime = FakeRuntime::write(temp.path(), "echo runner output\nexit 0");

    Command::new(assert_cmd::cargo::cargo_bin!("gauge-docker-java"))
        .env_clear()
        .env("PATH", "/usr/bin:/bin")
        .env("GAUGE_PROJECT_ROOT", &project)
        .env("MY_VAR", "1")
        .env("SUDO_USER", "bob")
        .env("HOME", temp.path())
        .arg("--start")
        .arg("--runtime")
        .arg(&runtime.script)
        .assert()
        .code(0)
        .stdout(contains("runner output"));

    let args = runtime.recorded_args();
    assert_eq!(&args[..2], ["run", "--rm"]);
    assert!(args.contains(&"MY_VAR=1".to_string()), "{args:?}");
    assert!(!args.iter().any(|arg| arg.starts_with("SUDO_")), "{args:?}");
    assert!(!args.iter().any(|arg| arg.starts_with("PATH=")), "{args:?}");
    assert!(!args.iter().any(|arg| arg.starts_with("HOME=")), "{args:?}");

    let mount = args.iter().position(|arg| arg == "-v").expect("bind mount flag");
    assert_eq!(
        &args[mount..],
        [
            "-v".to_string(),
            format!("{}:/opt/test", project.display()),
            "-e".to_string(),
            "GAUGE_PROJECT_ROOT=/opt/test".to_string(),
            "--net=host".to_string(),
            "getgauge/java".to_string(),
            "/bin/sh".to_string(),
            "-c".to_string(),
            "set -e; cd /opt/test; cp -r ~/.gauge/plugins/java/0.5.0/libs/* ./libs/; ~/.gauge/plugins/java/0.5.0/bin/gauge-java --start".to_string(),
        ]
    );

    // Every forwarded entry is preceded by its own -e flag.
    for pair in args[2..mount].chunks(2) {
        assert_eq!(pair[0], "-e");
        assert!(pair[1].contains('='), "{pair:?}");
    }

    let cwd = fs::read_to_string(&runtime.cwd_file).expect("read cwd");
    assert_eq!(
        fs::canonicalize(cwd.trim()).unwrap(),
        fs::canonicalize(&project).unwrap()
    );
}

#[test]
fn failing_child_reports_pid_and_exits_one() {
    let temp = tempdir().expect("failed to create tempdir");
    let runtime = FakeRuntime::write(temp.path(), "exit 42");

    let assert = Command::new(assert_cmd::cargo::cargo_bin!("gauge-docker-java"))
        .env("GAUGE_PROJECT_ROOT", temp.path())
        .arg("--start")
        .arg("--runtime")
        .arg(&runtime.script)
        .assert()
        .code(1)
        .stderr(contains("quit unexpectedly"));

    let pid = runtime.wait_for_pid();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains(&format!("with pid {pid}")), "{stderr}");
    assert!(
        stderr.contains(&runtime.script.display().to_string()),
        "{stderr}"
    );
}

#[test]
fn custom_image_and_version_are_used() {
    let temp = tempdir().expect("failed to create tempdir");
    let runtime = FakeRuntime::write(temp.path(), "exit 0");

    Command::new(assert_cmd::cargo::cargo_bin!("gauge-docker-java"))
        .env("GAUGE_PROJECT_ROOT", temp.path())
        .args(["--start", "--image", "local/java:dev", "--runner-version", "0.9.1"])
        .arg("--runtime")
        .arg(&runtime.script)
        .assert()
        .code(0);

    let args = runtime.recorded_args();
    assert!(args.contains(&"local/java:dev".to_string()), "{args:?}");
    let script = args.last().expect("container script");
    assert!(
        script.contains("~/.gauge/plugins/java/0.9.1/libs/*"),
        "{script}"
    );
}

#[test]
fn runner_does_not_read_our_stdin() {
    let temp = tempdir().expect("failed to create tempdir");
    let runtime = FakeRuntime::write(
        temp.path(),
        "if read -r line; then echo \"stdin: $line\"; fi\nexit 0",
    );

    Command::new(assert_cmd::cargo::cargo_bin!("gauge-docker-java"))
        .env("GAUGE_PROJECT_ROOT", temp.path())
        .arg("--start")
        .arg("--runtime")
        .arg(&runtime.script)
        .write_stdin("leaked input\n")
        .assert()
        .code(0)
        .stdout(contains("stdin:").not());
}

#[test]
fn missing_project_dir_still_starts_the_runner() {
    let temp = tempdir().expect("failed to create tempdir");
    let project = temp.path().join("not-created");
    let runtime = FakeRuntime::write(temp.path(), "exit 0");

    Command::new(assert_cmd::cargo::cargo_bin!("gauge-docker-java"))
        .env("GAUGE_PROJECT_ROOT", &project)
        .current_dir(temp.path())
        .arg("--start")
        .arg("--runtime")
        .arg(&runtime.script)
        .assert()
        .code(0);

    let args = runtime.recorded_args();
    assert!(
        args.contains(&format!("{}:/opt/test", project.display())),
        "{args:?}"
    );
    let cwd = fs::read_to_string(&runtime.cwd_file).expect("read cwd");
    assert_eq!(
        fs::canonicalize(cwd.trim()).unwrap(),
        fs::canonicalize(temp.path()).unwrap()
    );
}

#[test]
fn sigterm_kills_child_and_exits_one() {
    let temp = tempdir().expect("failed to create tempdir");
    let runtime = FakeRuntime::write(temp.path(), "exec sleep 30");

    let mut supervisor = StdCommand::new(assert_cmd::cargo::cargo_bin!("gauge-docker-java"))
        .env("GAUGE_PROJECT_ROOT", temp.path())
        .arg("--start")
        .arg("--runtime")
        .arg(&runtime.script)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn supervisor");

    let child_pid = runtime.wait_for_pid();
    // Give the supervisor time to install its handler after the launch.
    thread::sleep(Duration::from_millis(300));

    signal::kill(Pid::from_raw(supervisor.id() as i32), Signal::SIGTERM)
        .expect("send SIGTERM");

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = supervisor.try_wait().expect("try_wait") {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = supervisor.kill();
            panic!("supervisor did not exit after SIGTERM");
        }
        thread::sleep(Duration::from_millis(20));
    };

    assert_eq!(status.code(), Some(1));
    assert!(wait_for_process_exit(child_pid, Duration::from_secs(2)));
}
