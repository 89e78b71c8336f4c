//! Direct form POST submission.
//!
//! Skips the browser entirely, so client-side validation never runs and every
//! case reaches the server's checks. A server that stops answering after the
//! form was sent yields an unreadable page, not an error.

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wpharness_core::{Config, PageState, TestCase};

use crate::{driver::Submitter, Result};

pub struct HttpFormDriver {
    client: reqwest::Client,
    config: Config,
}

impl HttpFormDriver {
    /// # Errors
    ///
    /// Returns [`crate::ScenarioError::Http`] if the client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timing.settle_timeout() * 3)
            .build()?;
        Ok(Self { client, config })
    }

    /// The form body a browser would send for `case`.
    #[must_use]
    pub fn form_body(&self, case: &TestCase) -> Vec<(&'static str, String)> {
        let mut body: Vec<_> = case
            .entries()
            .map(|(field, value)| (field.form_key(), value.unwrap_or_default().to_string()))
            .collect();
        body.push(("comment_post_ID", self.config.post_id.to_string()));
        body.push(("comment_parent", "0".to_string()));
        body
    }
}

#[async_trait]
impl Submitter for HttpFormDriver {
    async fn submit(&mut self, case: &TestCase) -> Result<PageState> {
        sleep(self.config.timing.quiescence()).await;

        let endpoint = self.config.comment_post_url();
        debug!(endpoint = %endpoint, case_id = %case.partition.case_id(), "Posting comment form");
        let sent = self
            .client
            .post(&endpoint)
            .form(&self.form_body(case))
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(endpoint = %endpoint, error = %e, "No response before timeout");
                return Ok(PageState::unavailable(endpoint));
            }
            Err(e) => return Err(e.into()),
        };

        let url = response.url().to_string();
        let status = response.status();
        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Response body could not be read");
                return Ok(PageState::unavailable(url));
            }
        };

        sleep(self.config.timing.settle_for(case.longest_value())).await;
        info!(
            case_id = %case.partition.case_id(),
            %status,
            url = %url,
            "Submission landed"
        );
        Ok(PageState::from_html(url, html))
    }
}
