// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn cairn_home_respects_env_override() {
    std::env::set_var("CAIRN_HOME", "/tmp/cairn-test-home");
    assert_eq!(cairn_home(), PathBuf::from("/tmp/cairn-test-home"));
    std::env::remove_var("CAIRN_HOME");
}

#[test]
#[serial]
fn project_dir_respects_env_override() {
    std::env::set_var("CAIRN_PROJECT_DIR", "/tmp/cairn-test-project");
    assert_eq!(project_dir(), PathBuf::from("/tmp/cairn-test-project"));
    std::env::remove_var("CAIRN_PROJECT_DIR");
}

#[test]
#[serial]
fn from_env_uses_defaults_when_unset() {
    for var in [
        "CAIRN_MAX_CONCURRENT",
        "CAIRN_ADMISSION_INTERVAL_MS",
        "CAIRN_RETENTION_INTERVAL_MS",
        "CAIRN_RETENTION_AGE_MS",
        "CAIRN_SIGNAL_POLL_MS",
        "CAIRN_SIGNAL_STALE_MS",
        "CAIRN_RUNNER_DEADLINE_MS",
        "CAIRN_EXECUTOR_DEADLINE_MS",
    ] {
        std::env::remove_var(var);
    }
    let config = Config::from_env();
    assert_eq!(config.max_concurrent, 4);
    assert_eq!(config.admission_interval, Duration::from_millis(100));
    assert_eq!(config.retention_interval, Duration::from_secs(60));
    assert_eq!(config.retention_age, Duration::from_secs(24 * 60 * 60));
    assert_eq!(config.signal_poll_interval, Duration::from_millis(500));
    assert_eq!(config.signal_stale_after, Duration::from_secs(5 * 60));
    assert_eq!(config.runner_deadline, Duration::from_secs(10 * 60));
    assert_eq!(config.executor_deadline, Duration::from_secs(60));
}

#[test]
#[serial]
fn from_env_honors_overrides() {
    std::env::set_var("CAIRN_MAX_CONCURRENT", "9");
    let config = Config::from_env();
    assert_eq!(config.max_concurrent, 9);
    std::env::remove_var("CAIRN_MAX_CONCURRENT");
}

#[test]
fn derived_paths_nest_under_roots() {
    let config = Config {
        project_dir: PathBuf::from("/proj"),
        cairn_home: PathBuf::from("/home/.cairn"),
        max_concurrent: 4,
        admission_interval: Duration::from_millis(100),
        retention_interval: Duration::from_secs(60),
        retention_age: Duration::from_secs(1),
        signal_poll_interval: Duration::from_millis(500),
        signal_stale_after: Duration::from_secs(1),
        runner_deadline: Duration::from_secs(1),
        executor_deadline: Duration::from_secs(1),
        shutdown_grace: Duration::from_secs(5),
    };
    assert_eq!(config.overlay_root(), PathBuf::from("/proj/.agentfs"));
    assert_eq!(config.workspaces_root(), PathBuf::from("/home/.cairn/workspaces"));
    assert_eq!(config.signals_dir(), PathBuf::from("/home/.cairn/signals"));
    assert_eq!(config.socket_path(), PathBuf::from("/home/.cairn/cairnd.sock"));
}
