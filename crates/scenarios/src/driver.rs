//! Browser-backed submission of one test case.
//!
//! Sequence per case: quiesce, load the form, fill every field, quiesce,
//! submit, read native validity if the page did not navigate, settle,
//! snapshot. A submit that times out still gets a snapshot.

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wpharness_core::{
    page::{ERROR_SELECTORS, FORM_SELECTOR, MODERATION_SELECTORS, SUCCESS_SELECTORS},
    Config, Expectation, PageSignals, PageState, TestCase,
};

use crate::{
    browser::{any_visible, wait_for_visible, wait_until_ready, BrowserSession},
    Result, ScenarioError,
};

/// The submit button of the comment form.
pub const SUBMIT_SELECTOR: &str = "#submit";

/// Submits one case and reports where it landed.
#[async_trait]
pub trait Submitter: Send {
    /// # Errors
    ///
    /// Returns an error when the case could not be submitted at all.
    async fn submit(&mut self, case: &TestCase) -> Result<PageState>;
}

/// How a value reaches an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// Key-by-key, like a user.
    Type,
    /// Direct value write plus input/change events.
    Inject,
}

/// Inject when the value would be truncated by `maxlength` or is too long to
/// type in reasonable time; type otherwise.
#[must_use]
pub fn entry_mode(value: &str, max_length: Option<usize>, typing_limit: usize) -> EntryMode {
    let chars = value.chars().count();
    let truncated = max_length.is_some_and(|max| chars > max);
    if truncated || chars > typing_limit {
        EntryMode::Inject
    } else {
        EntryMode::Type
    }
}

pub struct BrowserDriver<S> {
    session: S,
    config: Config,
}

impl<S: BrowserSession> BrowserDriver<S> {
    pub const fn new(session: S, config: Config) -> Self {
        Self { session, config }
    }

    pub fn into_session(self) -> S {
        self.session
    }

    async fn fill(&self, case: &TestCase) -> Result<()> {
        for (field, value) in case.entries() {
            let selector = field.selector();
            self.session.clear(selector).await?;
            let Some(value) = value else {
                continue;
            };

            let max_length = self.session.max_length(selector).await.unwrap_or(None);
            match entry_mode(value, max_length, self.config.timing.typing_limit) {
                EntryMode::Type => self.session.type_text(selector, value).await?,
                EntryMode::Inject => {
                    debug!(
                        field = %field,
                        chars = value.chars().count(),
                        ?max_length,
                        "Injecting value"
                    );
                    self.session.inject_value(selector, value).await?;
                }
            }
        }
        Ok(())
    }

    async fn snapshot(&self) -> PageState {
        let settled = wait_until_ready(&self.session, self.config.timing.settle_timeout()).await;
        let url = self.session.current_url().await.unwrap_or_default();

        let Ok(html) = self.session.page_source().await else {
            warn!(url = %url, "Could not read page source");
            return PageState::unavailable(url);
        };
        let parsed = PageState::from_html(url, html);

        // Prefer live visibility over markup presence; keep the markup answer
        // when the browser cannot say.
        let fallback = parsed.signals;
        let signals = PageSignals {
            success_visible: any_visible(&self.session, SUCCESS_SELECTORS)
                .await
                .unwrap_or(fallback.success_visible),
            moderation_visible: any_visible(&self.session, MODERATION_SELECTORS)
                .await
                .unwrap_or(fallback.moderation_visible),
            error_visible: any_visible(&self.session, ERROR_SELECTORS)
                .await
                .unwrap_or(fallback.error_visible),
            form_present: fallback.form_present,
            comment_anchored: fallback.comment_anchored,
        };

        parsed.with_signals(signals).with_settled(settled)
    }
}

#[async_trait]
impl<S: BrowserSession> Submitter for BrowserDriver<S> {
    async fn submit(&mut self, case: &TestCase) -> Result<PageState> {
        let timing = &self.config.timing;
        sleep(timing.quiescence()).await;

        let form_url = self.config.form_page_url();
        self.session.goto(&form_url).await?;
        if !wait_for_visible(&self.session, FORM_SELECTOR, timing.settle_timeout()).await {
            return Err(ScenarioError::FormUnavailable { url: form_url });
        }

        self.fill(case).await?;
        sleep(timing.quiescence()).await;

        let before = self.session.current_url().await.unwrap_or_default();
        let completed = match self.session.click(SUBMIT_SELECTOR).await {
            Ok(()) => true,
            // The form went out; whatever the page shows now is the outcome.
            Err(ScenarioError::Timeout(detail)) => {
                warn!(
                    case_id = %case.partition.case_id(),
                    detail = %detail,
                    "Submit did not complete"
                );
                false
            }
            Err(e) => return Err(e),
        };

        let native = match case.partition.expectation() {
            Expectation::ConstraintViolation { field, .. } if completed => {
                let after = self.session.current_url().await.unwrap_or_default();
                if after == before {
                    self.session.validity(field.selector()).await.unwrap_or(None)
                } else {
                    None
                }
            }
            _ => None,
        };

        sleep(timing.settle_for(case.longest_value())).await;
        let page = self.snapshot().await.with_native(native);

        info!(
            case_id = %case.partition.case_id(),
            url = %page.url,
            settled = page.settled,
            "Submission landed"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_are_typed() {
        assert_eq!(entry_mode("John Smith 1", Some(245), 64), EntryMode::Type);
        assert_eq!(entry_mode("x", None, 64), EntryMode::Type);
    }

    #[test]
    fn values_past_maxlength_are_injected() {
        let value = "a".repeat(10);
        assert_eq!(entry_mode(&value, Some(9), 64), EntryMode::Inject);
        assert_eq!(entry_mode(&value, Some(10), 64), EntryMode::Type);
    }

    #[test]
    fn long_values_are_injected_even_within_maxlength() {
        let value = "a".repeat(245);
        assert_eq!(entry_mode(&value, Some(245), 64), EntryMode::Inject);
    }
}
