//! Config hierarchy tests: project file, environment overrides, validation.
//!
//! These tests change the working directory and process environment, so they
//! run serially.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use std::path::Path;

use serial_test::serial;
use tempfile::TempDir;
use wpharness_core::{
    config::{load_partial_toml_file, BrowserName},
    load_config, DriverKind, Error,
};

const ENV_KEYS: &[&str] = &[
    "WPHARNESS_BASE_URL",
    "WPHARNESS_POST_ID",
    "WPHARNESS_WEBDRIVER_URL",
    "WPHARNESS_DRIVER",
    "WPHARNESS_BROWSER",
    "WPHARNESS_HEADLESS",
    "WPHARNESS_QUIESCENCE_MS",
    "WPHARNESS_SETTLE_MS",
    "WPHARNESS_SETTLE_TIMEOUT_MS",
    "WPHARNESS_LOGIN_USERNAME",
    "WPHARNESS_LOGIN_PASSWORD",
];

/// Runs `body` inside a fresh project directory with a clean environment.
struct ProjectDir {
    dir: TempDir,
    previous: std::path::PathBuf,
}

impl ProjectDir {
    fn new() -> Self {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        let dir = TempDir::new().expect("tempdir");
        let previous = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(dir.path()).expect("chdir");
        Self { dir, previous }
    }

    fn write_config(&self, content: &str) {
        let config_dir = self.dir.path().join(".wpharness");
        std::fs::create_dir_all(&config_dir).expect("mkdir");
        std::fs::write(config_dir.join("config.toml"), content).expect("write");
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for ProjectDir {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }
}

/// GIVEN: a project config setting only the driver and post id
/// WHEN: loading config
/// THEN: those keys override and everything else keeps its default
#[tokio::test]
#[serial]
async fn project_file_overrides_only_its_keys() {
    let project = ProjectDir::new();
    project.write_config(
        r#"
        post_id = 42
        driver = "http"

        [browser]
        name = "firefox"
        "#,
    );

    let config = load_config().await.unwrap();
    assert_eq!(config.post_id, 42);
    assert_eq!(config.driver, DriverKind::Http);
    assert_eq!(config.browser.name, BrowserName::Firefox);
    assert!(config.browser.headless);
    assert_eq!(config.limits.name, 245);
}

/// GIVEN: a project config and conflicting environment variables
/// WHEN: loading config
/// THEN: the environment wins
#[tokio::test]
#[serial]
async fn environment_beats_project_file() {
    let project = ProjectDir::new();
    project.write_config("base_url = \"http://file.test\"\n");
    std::env::set_var("WPHARNESS_BASE_URL", "http://env.test");
    std::env::set_var("WPHARNESS_QUIESCENCE_MS", "0");
    std::env::set_var("WPHARNESS_LOGIN_PASSWORD", "s3cret");

    let config = load_config().await.unwrap();
    assert_eq!(config.base_url, "http://env.test");
    assert_eq!(config.timing.quiescence_ms, 0);
    assert_eq!(config.login.password, "s3cret");
}

/// GIVEN: a malformed numeric environment override
/// WHEN: loading config
/// THEN: loading fails with an invalid config error naming the variable
#[tokio::test]
#[serial]
async fn malformed_env_override_is_rejected() {
    let _project = ProjectDir::new();
    std::env::set_var("WPHARNESS_POST_ID", "first");

    match load_config().await {
        Err(Error::InvalidConfig(message)) => assert!(message.contains("WPHARNESS_POST_ID")),
        other => panic!("expected invalid config, got {other:?}"),
    }
}

/// GIVEN: a config file with a typo'd key
/// WHEN: loading config
/// THEN: loading fails with a parse error
#[tokio::test]
#[serial]
async fn unknown_key_in_file_is_rejected() {
    let project = ProjectDir::new();
    project.write_config("[timing]\nsettle = 5\n");

    assert!(matches!(load_config().await, Err(Error::ParseError(_))));
}

/// GIVEN: a base URL without a scheme
/// WHEN: loading config
/// THEN: validation names the key
#[tokio::test]
#[serial]
async fn scheme_less_base_url_fails_validation() {
    let project = ProjectDir::new();
    project.write_config("base_url = \"localhost:8080\"\n");

    match load_config().await {
        Err(Error::ValidationError { field, .. }) => {
            assert_eq!(field.as_deref(), Some("base_url"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// GIVEN: no config file at the path
/// WHEN: loading it directly
/// THEN: an IO error is returned, which the hierarchy treats as absent
#[tokio::test]
#[serial]
async fn missing_file_is_an_io_error() {
    let project = ProjectDir::new();
    let result = load_partial_toml_file(&project.path().join("nope.toml")).await;
    assert!(matches!(result, Err(Error::IoError(_))));
}
