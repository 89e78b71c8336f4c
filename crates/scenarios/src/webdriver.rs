//! [`BrowserSession`] over a WebDriver endpoint (chromedriver, geckodriver,
//! Selenium) using fantoccini.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use wpharness_core::{config::BrowserName, Config, NativeValidity};

use crate::{browser::BrowserSession, Result, ScenarioError};

const INJECT_SCRIPT: &str = r"
const el = document.querySelector(arguments[0]);
if (!el) { return false; }
el.value = arguments[1];
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return true;
";

const MAX_LENGTH_SCRIPT: &str = r"
const el = document.querySelector(arguments[0]);
return el && el.maxLength > 0 ? el.maxLength : null;
";

const VALIDITY_SCRIPT: &str = r"
const el = document.querySelector(arguments[0]);
if (!el || !el.validity) { return null; }
return { valueMissing: el.validity.valueMissing, typeMismatch: el.validity.typeMismatch };
";

const READY_SCRIPT: &str = "return document.readyState;";

pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Open a new session against `config.webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Browser`] if the endpoint refuses the session.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config));
        let client = builder
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| ScenarioError::browser("connect", &config.webdriver_url, e))?;

        info!(
            webdriver = %config.webdriver_url,
            browser = ?config.browser.name,
            headless = config.browser.headless,
            "WebDriver session opened"
        );
        Ok(Self { client })
    }

    async fn run_script(&self, script: &str, args: Vec<Value>, target: &str) -> Result<Value> {
        self.client
            .execute(script, args)
            .await
            .map_err(|e| ScenarioError::browser("execute script on", target, e))
    }
}

fn capabilities(config: &Config) -> Map<String, Value> {
    let mut caps = Map::new();
    match config.browser.name {
        BrowserName::Chrome => {
            let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
            if config.browser.headless {
                args.push("--headless=new");
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserName::Firefox => {
            let args: Vec<&str> = if config.browser.headless {
                vec!["-headless"]
            } else {
                Vec::new()
            };
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.client
            .goto(url)
            .await
            .map_err(|e| ScenarioError::browser("navigate to", url, e))
    }

    async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|e| ScenarioError::browser("read", "current url", e))
    }

    async fn page_source(&self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| ScenarioError::browser("read", "page source", e))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| ScenarioError::browser("find", selector, e))?;
        for element in elements {
            // Stale elements are simply not visible any more.
            if element.is_displayed().await.unwrap_or(false) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn clear(&self, selector: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| ScenarioError::browser("find", selector, e))?;
        element
            .clear()
            .await
            .map_err(|e| ScenarioError::browser("clear", selector, e))
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| ScenarioError::browser("find", selector, e))?;
        element
            .send_keys(text)
            .await
            .map_err(|e| ScenarioError::browser("type into", selector, e))
    }

    async fn inject_value(&self, selector: &str, value: &str) -> Result<()> {
        let found = self
            .run_script(INJECT_SCRIPT, vec![json!(selector), json!(value)], selector)
            .await?;
        if found.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(ScenarioError::browser("inject into", selector, "no such element"))
        }
    }

    async fn max_length(&self, selector: &str) -> Result<Option<usize>> {
        let value = self
            .run_script(MAX_LENGTH_SCRIPT, vec![json!(selector)], selector)
            .await?;
        Ok(value.as_u64().and_then(|n| usize::try_from(n).ok()))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| ScenarioError::browser("find", selector, e))?;
        element.click().await.map(|_| ()).map_err(|e| {
            if e.is_timeout() {
                ScenarioError::Timeout(format!("click {selector}: {e}"))
            } else {
                ScenarioError::browser("click", selector, e)
            }
        })
    }

    async fn validity(&self, selector: &str) -> Result<Option<NativeValidity>> {
        let value = self
            .run_script(VALIDITY_SCRIPT, vec![json!(selector)], selector)
            .await?;
        Ok(parse_validity(&value))
    }

    async fn is_ready(&self) -> Result<bool> {
        let state = self.run_script(READY_SCRIPT, Vec::new(), "document").await?;
        Ok(state.as_str() == Some("complete"))
    }

    async fn close(&self) -> Result<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| ScenarioError::browser("close", "session", e))
    }
}

fn parse_validity(value: &Value) -> Option<NativeValidity> {
    let object = value.as_object()?;
    Some(NativeValidity {
        value_missing: object.get("valueMissing")?.as_bool()?,
        type_mismatch: object.get("typeMismatch")?.as_bool()?,
    })
}
