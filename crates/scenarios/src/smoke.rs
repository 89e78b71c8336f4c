//! HTTP smoke checks: is the site up before anything heavier runs.

use tracing::info;
use wpharness_core::Config;

use crate::{Result, ScenarioError};

/// GET the posts REST endpoint and return how many posts it lists.
///
/// # Errors
///
/// [`ScenarioError::SmokeCheck`] on a non-success status or a body that is not
/// a JSON array; [`ScenarioError::Http`] on transport failure.
pub async fn check_posts_endpoint(client: &reqwest::Client, config: &Config) -> Result<usize> {
    let endpoint = config.posts_api_url();
    let response = client.get(&endpoint).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScenarioError::SmokeCheck {
            endpoint,
            reason: format!("status {status}"),
        });
    }

    let body: serde_json::Value = response.json().await?;
    let count = body
        .as_array()
        .map(Vec::len)
        .ok_or_else(|| ScenarioError::SmokeCheck {
            endpoint: endpoint.clone(),
            reason: "response is not a JSON array".to_string(),
        })?;

    info!(endpoint = %endpoint, count, "Posts endpoint reachable");
    Ok(count)
}

/// GET the login page and return its body length.
///
/// # Errors
///
/// [`ScenarioError::SmokeCheck`] on a non-success status or an empty body.
pub async fn check_login_page(client: &reqwest::Client, config: &Config) -> Result<usize> {
    let endpoint = config.login_url();
    let response = client.get(&endpoint).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScenarioError::SmokeCheck {
            endpoint,
            reason: format!("status {status}"),
        });
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(ScenarioError::SmokeCheck {
            endpoint,
            reason: "empty body".to_string(),
        });
    }

    info!(endpoint = %endpoint, bytes = body.len(), "Login page reachable");
    Ok(body.len())
}
