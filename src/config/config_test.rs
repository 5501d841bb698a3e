use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_confwatch_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("CONFWATCH__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = WatchCenterConfig::default();

    assert_eq!(config.watch.long_poll_timeout_ms, 30_000);
    assert_eq!(config.watch.event_queue_size, 10_240);
    assert_eq!(config.watch.sweep_interval_ms, 1_000);
    assert!(config.watch.recheck_after_register);
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_confwatch_env_vars();
    with_vars(
        vec![("CONFWATCH__WATCH__SWEEP_INTERVAL_MS", Some("250"))],
        || {
            let config = WatchCenterConfig::new().unwrap();

            assert_eq!(config.watch.sweep_interval_ms, 250);
            assert_eq!(config.watch.event_queue_size, 10_240);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_confwatch_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("watch_override.toml");

    std::fs::write(
        &config_path,
        r#"
        [watch]
        long_poll_timeout_ms = 5000
        recheck_after_register = false
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = WatchCenterConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override should load");

        assert_eq!(config.watch.long_poll_timeout_ms, 5000);
        assert!(!config.watch.recheck_after_register);
        assert_eq!(config.watch.sweep_interval_ms, 1_000);
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_confwatch_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("watch.toml");
    std::fs::write(
        &config_path,
        r#"
        [watch]
        event_queue_size = 512
        stream_buffer_size = 4
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("CONFWATCH__WATCH__EVENT_QUEUE_SIZE", Some("2048")),
        ],
        || {
            let config = WatchCenterConfig::new().unwrap();

            assert_eq!(config.watch.event_queue_size, 2048);
            assert_eq!(config.watch.stream_buffer_size, 4);
        },
    );
}

#[test]
#[serial]
fn new_should_fail_when_config_path_is_missing() {
    cleanup_all_confwatch_env_vars();
    with_vars(
        vec![("CONFIG_PATH", Some("/definitely/not/here/watch.toml"))],
        || {
            assert!(WatchCenterConfig::new().is_err());
        },
    );
}

#[test]
fn validation_should_fail_with_invalid_watch_config() {
    let mut config = WatchCenterConfig::default();
    config.watch.event_queue_size = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_pass_for_defaults() {
    assert!(WatchCenterConfig::default().validate().is_ok());
}
