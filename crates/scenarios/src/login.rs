//! Administrator login through `wp-login.php`.

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};
use wpharness_core::Config;

use crate::{
    browser::{wait_for_visible, wait_until_ready, BrowserSession},
    Result, ScenarioError,
};

pub const USERNAME_SELECTOR: &str = "#user_login";
pub const PASSWORD_SELECTOR: &str = "#user_pass";
pub const LOGIN_SUBMIT_SELECTOR: &str = "#wp-submit";
/// The admin toolbar, present on every dashboard page.
pub const ADMIN_BAR_SELECTOR: &str = "#wpadminbar";
const DASHBOARD_PATH: &str = "/wp-admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub url: String,
    pub admin_bar_visible: bool,
}

/// Log in with the configured credentials and confirm the dashboard loaded.
///
/// # Errors
///
/// - [`ScenarioError::Core`] if no password is configured
/// - [`ScenarioError::Login`] if the login form never appears or the dashboard
///   is not reached
/// - [`ScenarioError::Browser`] on WebDriver failures
pub async fn login<S>(session: &S, config: &Config) -> Result<LoginOutcome>
where
    S: BrowserSession + ?Sized,
{
    if config.login.password.is_empty() {
        return Err(wpharness_core::Error::validation(
            "no login password configured (set WPHARNESS_LOGIN_PASSWORD)",
            "login.password",
            "",
        )
        .into());
    }

    let timeout = config.timing.settle_timeout();
    let url = config.login_url();
    session.goto(&url).await?;
    if !wait_for_visible(session, USERNAME_SELECTOR, timeout).await {
        return Err(ScenarioError::Login {
            reason: format!("login form not visible at {url}"),
        });
    }

    session.clear(USERNAME_SELECTOR).await?;
    session
        .type_text(USERNAME_SELECTOR, &config.login.username)
        .await?;
    session.clear(PASSWORD_SELECTOR).await?;
    session
        .type_text(PASSWORD_SELECTOR, &config.login.password)
        .await?;
    session.click(LOGIN_SUBMIT_SELECTOR).await?;

    sleep(config.timing.settle_for(0)).await;
    wait_until_ready(session, timeout).await;

    let landed = session.current_url().await?;
    let admin_bar_visible = wait_for_visible(session, ADMIN_BAR_SELECTOR, timeout).await;
    let outcome = LoginOutcome {
        url: landed,
        admin_bar_visible,
    };

    if outcome.url.contains(DASHBOARD_PATH) && outcome.admin_bar_visible {
        info!(user = %config.login.username, url = %outcome.url, "Logged in");
        Ok(outcome)
    } else {
        warn!(url = %outcome.url, admin_bar_visible, "Dashboard not reached");
        Err(ScenarioError::Login {
            reason: format!(
                "dashboard not reached (landed on {}, admin bar visible: {})",
                outcome.url, outcome.admin_bar_visible
            ),
        })
    }
}
