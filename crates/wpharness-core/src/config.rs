//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/wpharness/config.toml
//! 3. Project config: .wpharness/config.toml
//! 4. Environment variables: `WPHARNESS_*`
//! 5. CLI flags (applied by the binary)
//!
//! # Example Config
//!
//! ```toml
//! base_url = "http://localhost:8080"
//! post_id = 1
//! webdriver_url = "http://localhost:4444"
//! driver = "browser"
//!
//! [browser]
//! name = "firefox"
//! headless = true
//!
//! [timing]
//! quiescence_ms = 2000
//! settle_ms = 3000
//!
//! [limits]
//! name = 245
//! email = 100
//! comment = 65525
//!
//! [login]
//! username = "editor"
//! ```

use std::{path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    case::max_nominal_length,
    limits::{BoundaryLimits, LimitedField},
    Error, Result,
};

const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576; // 1 MB

/// Which submission driver runs the comment suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Real browser over WebDriver; native validation is observable.
    #[default]
    Browser,
    /// Direct form POST; always reaches server-side validation.
    Http,
}

impl FromStr for DriverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "browser" | "webdriver" => Ok(Self::Browser),
            "http" | "direct" => Ok(Self::Http),
            _ => Err(Error::InvalidConfig(format!(
                "Invalid driver: {s}. Must be one of: browser, http"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for DriverKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browser => write!(f, "browser"),
            Self::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrowserName {
    #[default]
    Chrome,
    Firefox,
}

impl FromStr for BrowserName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "firefox" | "gecko" => Ok(Self::Firefox),
            _ => Err(Error::InvalidConfig(format!(
                "Invalid browser: {s}. Must be one of: chrome, firefox"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for BrowserName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub post_id: u64,
    pub webdriver_url: String,
    pub driver: DriverKind,
    pub browser: BrowserConfig,
    pub timing: TimingConfig,
    pub limits: BoundaryLimits,
    pub login: LoginConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowserConfig {
    pub name: BrowserName,
    pub headless: bool,
}

/// Delays around each submission.
///
/// The quiescence delay must outlast the server's flood window or admitted
/// cases start reporting flood control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub quiescence_ms: u64,
    pub settle_ms: u64,
    pub long_settle_ms: u64,
    pub long_payload_chars: usize,
    pub settle_timeout_ms: u64,
    pub typing_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoginConfig {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            post_id: 1,
            webdriver_url: "http://localhost:4444".to_string(),
            driver: DriverKind::Browser,
            browser: BrowserConfig::default(),
            timing: TimingConfig::default(),
            limits: BoundaryLimits::default(),
            login: LoginConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            name: BrowserName::Chrome,
            headless: true,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: 2000,
            settle_ms: 3000,
            long_settle_ms: 5000,
            long_payload_chars: 10_000,
            settle_timeout_ms: 10_000,
            typing_limit: 64,
        }
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
        }
    }
}

impl TimingConfig {
    /// No delays at all; for runs against the in-process twin.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            quiescence_ms: 0,
            settle_ms: 0,
            long_settle_ms: 0,
            long_payload_chars: 10_000,
            settle_timeout_ms: 1_000,
            typing_limit: 64,
        }
    }

    #[must_use]
    pub const fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }

    /// Post-submit wait for a payload whose longest value is `longest` chars.
    #[must_use]
    pub const fn settle_for(&self, longest: usize) -> Duration {
        if longest > self.long_payload_chars {
            Duration::from_millis(self.long_settle_ms)
        } else {
            Duration::from_millis(self.settle_ms)
        }
    }

    #[must_use]
    pub const fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}

impl Config {
    /// URL of the post page carrying the comment form.
    #[must_use]
    pub fn form_page_url(&self) -> String {
        format!("{}/?p={}#respond", self.base(), self.post_id)
    }

    /// Endpoint the comment form posts to.
    #[must_use]
    pub fn comment_post_url(&self) -> String {
        format!("{}/wp-comments-post.php", self.base())
    }

    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/wp-login.php", self.base())
    }

    #[must_use]
    pub fn posts_api_url(&self) -> String {
        format!("{}/wp-json/wp/v2/posts", self.base())
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PARTIAL CONFIGURATION (explicit-key merge)
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub base_url: Option<String>,
    pub post_id: Option<u64>,
    pub webdriver_url: Option<String>,
    pub driver: Option<DriverKind>,
    pub browser: Option<PartialBrowserConfig>,
    pub timing: Option<PartialTimingConfig>,
    pub limits: Option<PartialLimitsConfig>,
    pub login: Option<PartialLoginConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialBrowserConfig {
    pub name: Option<BrowserName>,
    pub headless: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialTimingConfig {
    pub quiescence_ms: Option<u64>,
    pub settle_ms: Option<u64>,
    pub long_settle_ms: Option<u64>,
    pub long_payload_chars: Option<usize>,
    pub settle_timeout_ms: Option<u64>,
    pub typing_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialLimitsConfig {
    pub name: Option<usize>,
    pub email: Option<usize>,
    pub comment: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialLoginConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Merge a partial config: only keys present in `partial` override.
    pub fn merge_partial(&mut self, partial: PartialConfig) {
        if let Some(base_url) = partial.base_url {
            self.base_url = base_url;
        }
        if let Some(post_id) = partial.post_id {
            self.post_id = post_id;
        }
        if let Some(webdriver_url) = partial.webdriver_url {
            self.webdriver_url = webdriver_url;
        }
        if let Some(driver) = partial.driver {
            self.driver = driver;
        }

        if let Some(browser) = partial.browser {
            if let Some(name) = browser.name {
                self.browser.name = name;
            }
            if let Some(headless) = browser.headless {
                self.browser.headless = headless;
            }
        }
        if let Some(timing) = partial.timing {
            self.timing.merge_partial(timing);
        }
        if let Some(limits) = partial.limits {
            if let Some(name) = limits.name {
                self.limits.name = name;
            }
            if let Some(email) = limits.email {
                self.limits.email = email;
            }
            if let Some(comment) = limits.comment {
                self.limits.comment = comment;
            }
        }
        if let Some(login) = partial.login {
            if let Some(username) = login.username {
                self.login.username = username;
            }
            if let Some(password) = login.password {
                self.login.password = password;
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("WPHARNESS_BASE_URL") {
            self.base_url = value;
        }

        if let Ok(value) = std::env::var("WPHARNESS_POST_ID") {
            self.post_id = parse_env("WPHARNESS_POST_ID", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_WEBDRIVER_URL") {
            self.webdriver_url = value;
        }

        if let Ok(value) = std::env::var("WPHARNESS_DRIVER") {
            self.driver = parse_env("WPHARNESS_DRIVER", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_BROWSER") {
            self.browser.name = parse_env("WPHARNESS_BROWSER", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_HEADLESS") {
            self.browser.headless = parse_bool("WPHARNESS_HEADLESS", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_QUIESCENCE_MS") {
            self.timing.quiescence_ms = parse_env("WPHARNESS_QUIESCENCE_MS", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_SETTLE_MS") {
            self.timing.settle_ms = parse_env("WPHARNESS_SETTLE_MS", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_SETTLE_TIMEOUT_MS") {
            self.timing.settle_timeout_ms = parse_env("WPHARNESS_SETTLE_TIMEOUT_MS", &value)?;
        }

        if let Ok(value) = std::env::var("WPHARNESS_LOGIN_USERNAME") {
            self.login.username = value;
        }

        if let Ok(value) = std::env::var("WPHARNESS_LOGIN_PASSWORD") {
            self.login.password = value;
        }

        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("base_url", &self.base_url),
            ("webdriver_url", &self.webdriver_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::validation(
                    format!("{key} must start with http:// or https://"),
                    key,
                    url.as_str(),
                ));
            }
        }

        if self.post_id == 0 {
            return Err(Error::validation("post_id must be positive", "post_id", "0"));
        }

        for field in LimitedField::iter() {
            let limit = self.limits.limit(field);
            let floor = max_nominal_length(field);
            if limit < floor {
                return Err(Error::validation(
                    format!("limits.{field} must be at least {floor} to hold a nominal value"),
                    format!("limits.{field}"),
                    limit.to_string(),
                ));
            }
        }

        if self.timing.settle_timeout_ms < 100 {
            return Err(Error::validation(
                "settle_timeout_ms must be at least 100",
                "timing.settle_timeout_ms",
                self.timing.settle_timeout_ms.to_string(),
            ));
        }

        Ok(())
    }
}

impl TimingConfig {
    fn merge_partial(&mut self, partial: PartialTimingConfig) {
        if let Some(v) = partial.quiescence_ms {
            self.quiescence_ms = v;
        }
        if let Some(v) = partial.settle_ms {
            self.settle_ms = v;
        }
        if let Some(v) = partial.long_settle_ms {
            self.long_settle_ms = v;
        }
        if let Some(v) = partial.long_payload_chars {
            self.long_payload_chars = v;
        }
        if let Some(v) = partial.settle_timeout_ms {
            self.settle_timeout_ms = v;
        }
        if let Some(v) = partial.typing_limit {
            self.typing_limit = v;
        }
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidConfig(format!("Invalid {key} value: {e}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidConfig(format!(
            "Invalid {key} value: '{value}'. Must be 'true' or 'false'"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration with full hierarchy
///
/// # Errors
///
/// Returns error if:
/// - A config file is malformed TOML or contains unknown keys
/// - Environment overrides are malformed
/// - Config values fail validation
pub async fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        merge_file_if_present(&mut config, &global_path).await?;
    }

    let project_path = project_config_path()?;
    merge_file_if_present(&mut config, &project_path).await?;

    config.apply_env_vars()?;
    config.validate()?;

    Ok(config)
}

async fn merge_file_if_present(config: &mut Config, path: &std::path::Path) -> Result<()> {
    match load_partial_toml_file(path).await {
        Ok(partial) => {
            tracing::debug!(path = %path.display(), "Loaded config file");
            config.merge_partial(partial);
            Ok(())
        }
        // Missing file - skip silently
        Err(Error::IoError(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".wpharness/config.toml"))
        .map_err(|e| Error::IoError(format!("Failed to get current directory: {e}")))
}

fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "wpharness")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load a TOML file into a `PartialConfig` for explicit-key merge semantics.
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read (`IoError`)
/// - File is a symlink or larger than 1 MB (`ValidationError`)
/// - TOML is malformed or has unknown keys (`ParseError`)
pub async fn load_partial_toml_file(path: &std::path::Path) -> Result<PartialConfig> {
    let metadata = tokio::fs::symlink_metadata(path).await.map_err(|e| {
        Error::IoError(format!(
            "Failed to read config file metadata {}: {e}",
            path.display()
        ))
    })?;

    if metadata.file_type().is_symlink() {
        return Err(Error::validation(
            "Config file is a symbolic link - refusing to follow",
            "path",
            path.display().to_string(),
        ));
    }

    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(Error::validation(
            format!("Config file exceeds maximum size of {MAX_CONFIG_FILE_SIZE} bytes"),
            "path",
            path.display().to_string(),
        ));
    }

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::IoError(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::ParseError(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}
