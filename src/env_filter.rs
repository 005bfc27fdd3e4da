//! Selects which host environment variables are forwarded into the runner container.
use std::env;

/// Prefixes of `KEY=VALUE` entries that are never forwarded.
///
/// Matching is done against the whole entry, so `PATH=` only drops a variable
/// literally named `PATH` while `SUDO_` drops every variable whose name starts
/// with `SUDO_`.
pub const ENV_DENYLIST: &[&str] = &[
    "SUDO_",
    "LS_COLORS",
    "XAUTHORITY",
    "PATH=",
    "TERM=",
    "LANG=",
    "DISPLAY=",
    "HOME=",
    "LANGUAGE=",
    "COLORTERM=",
    "SHELL=",
    "MAIL=",
    "LOGNAME=",
    "USER=",
    "USERNAME=",
];

/// Returns `true` if `entry` starts with any prefix in `denylist`.
pub fn is_denied(entry: &str, denylist: &[&str]) -> bool {
    denylist.iter().any(|prefix| entry.starts_with(prefix))
}

/// Keeps the entries of `snapshot` that match no denylist prefix, in their original order.
pub fn filter_environment<S: AsRef<str>>(snapshot: &[S], denylist: &[&str]) -> Vec<String> {
    snapshot
        .iter()
        .filter(|entry| !is_denied(entry.as_ref(), denylist))
        .map(|entry| entry.as_ref().to_string())
        .collect()
}

/// Captures the current process environment as `KEY=VALUE` strings.
pub fn environment_snapshot() -> Vec<String> {
    env::vars_os()
        .map(|(key, value)| {
            format!("{}={}", key.to_string_lossy(), value.to_string_lossy())
        })
        .collect()
}

/// Environment entries to forward into the container for this process.
pub fn forwarded_environment() -> Vec<String> {
    filter_environment(&environment_snapshot(), ENV_DENYLIST)
}
