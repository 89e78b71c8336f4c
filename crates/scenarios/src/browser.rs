//! The browser seam.
//!
//! Scenarios talk to a [`BrowserSession`], never to WebDriver directly, so the
//! submission driver and login flow run the same against a real browser and
//! against an in-memory mock.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;
use wpharness_core::NativeValidity;

use crate::Result;

/// Interval between visibility / readiness polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Element-level operations a scenario needs from a browser.
///
/// Selectors are CSS selectors. Operations on a missing element fail, except
/// the query methods, which answer `false` / `None`.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn page_source(&self) -> Result<String>;

    /// Whether any element matching `selector` is displayed.
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    async fn clear(&self, selector: &str) -> Result<()>;

    /// Key-level input, subject to the field's client-side limits.
    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Write `value` straight into the element's value and fire `input` and
    /// `change`, bypassing keystroke limits such as `maxlength`.
    async fn inject_value(&self, selector: &str, value: &str) -> Result<()>;

    /// The element's `maxlength`, if it declares one.
    async fn max_length(&self, selector: &str) -> Result<Option<usize>>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Constraint validation state, or `None` when unsupported or missing.
    async fn validity(&self, selector: &str) -> Result<Option<NativeValidity>>;

    /// Whether `document.readyState` is `complete`.
    async fn is_ready(&self) -> Result<bool>;

    /// End the session.
    async fn close(&self) -> Result<()>;
}

/// Poll until `selector` is visible or `timeout` elapses.
///
/// Command errors count as "not yet visible".
pub async fn wait_for_visible<S>(session: &S, selector: &str, timeout: Duration) -> bool
where
    S: BrowserSession + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        if session.is_visible(selector).await.unwrap_or(false) {
            return true;
        }
        if Instant::now() >= deadline {
            debug!(selector, ?timeout, "Element did not become visible");
            return false;
        }
        sleep(POLL_INTERVAL.min(timeout)).await;
    }
}

/// Poll until the document is ready or `timeout` elapses; `false` on timeout.
pub async fn wait_until_ready<S>(session: &S, timeout: Duration) -> bool
where
    S: BrowserSession + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        if session.is_ready().await.unwrap_or(false) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL.min(timeout)).await;
    }
}

/// `Some(true)` if any selector is visible, `None` if the browser could not say.
pub async fn any_visible<S>(session: &S, selectors: &[&str]) -> Option<bool>
where
    S: BrowserSession + ?Sized,
{
    for selector in selectors {
        match session.is_visible(selector).await {
            Ok(true) => return Some(true),
            Ok(false) => {}
            Err(_) => return None,
        }
    }
    Some(false)
}
