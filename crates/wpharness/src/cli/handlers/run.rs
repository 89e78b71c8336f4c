//! `wpharness run [comments|login|smoke|all]`

use std::{str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use clap::ArgMatches;
use scenarios::{
    check_login_page, check_posts_endpoint, login, BrowserDriver, BrowserSession, CheckReport,
    CommentSuite, HttpFormDriver, RunReport, SuiteReport, Submitter, WebDriverSession,
};
use tracing::{info, warn};
use wpharness_core::{load_config, CaseGenerator, ClockTokenSource, Config, DriverKind, Partition};

/// Which checks a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub smoke: bool,
    pub comments: bool,
    pub login: bool,
}

impl Targets {
    #[must_use]
    pub fn parse(target: &str) -> Self {
        match target {
            "comments" => Self {
                smoke: false,
                comments: true,
                login: false,
            },
            "login" => Self {
                smoke: false,
                comments: false,
                login: true,
            },
            "smoke" => Self {
                smoke: true,
                comments: false,
                login: false,
            },
            _ => Self {
                smoke: true,
                comments: true,
                login: true,
            },
        }
    }

    const fn needs_browser(self, driver: DriverKind) -> bool {
        self.login || (self.comments && matches!(driver, DriverKind::Browser))
    }
}

/// Layer command-line flags over the loaded configuration.
///
/// # Errors
///
/// Returns an error for an unknown driver or a result that fails validation.
pub fn apply_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url.clone_from(base_url);
    }
    if let Some(webdriver_url) = matches.get_one::<String>("webdriver-url") {
        config.webdriver_url.clone_from(webdriver_url);
    }
    if let Some(driver) = matches.get_one::<String>("driver") {
        config.driver = DriverKind::from_str(driver)?;
    }
    config.validate()?;
    Ok(())
}

/// Resolve `--only` case ids to partitions.
///
/// # Errors
///
/// Returns an error naming the first id that matches no case.
pub fn selected_partitions(matches: &ArgMatches) -> Result<Option<Vec<Partition>>> {
    let Some(ids) = matches.get_many::<String>("only") else {
        return Ok(None);
    };
    ids.map(|id| {
        Partition::from_case_id(id).with_context(|| {
            format!("Unknown case id '{id}'. Expected TC-COMMENT-01 through TC-COMMENT-14")
        })
    })
    .collect::<Result<Vec<_>>>()
    .map(Some)
}

pub async fn handle(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config().await?;
    apply_overrides(&mut config, matches)?;

    let target = matches
        .get_one::<String>("target")
        .map_or("all", String::as_str);
    let targets = Targets::parse(target);
    let only = selected_partitions(matches)?;
    let json = matches.get_flag("json");

    info!(
        base_url = %config.base_url,
        driver = %config.driver,
        target,
        "Starting run"
    );

    let mut report = RunReport::new(config.base_url.clone());

    if targets.smoke {
        report.checks.extend(run_smoke(&config).await);
    }

    let mut session = if targets.needs_browser(config.driver) {
        open_session(&config, &mut report).await
    } else {
        None
    };

    // Comments run before login: a logged-in session sees a different form.
    if targets.comments {
        report.comments = run_comments(&config, only.as_deref(), &mut session).await?;
    }

    if targets.login {
        if let Some(browser) = &session {
            report.checks.push(match login(browser, &config).await {
                Ok(outcome) => CheckReport::pass("login", format!("reached {}", outcome.url)),
                Err(e) => CheckReport::fail("login", e.to_string()),
            });
        }
    }

    if let Some(browser) = session {
        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser session");
        }
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_human());
    }

    if report.is_success() {
        Ok(())
    } else {
        anyhow::bail!("run against {} had failures", config.base_url)
    }
}

async fn run_smoke(config: &Config) -> Vec<CheckReport> {
    let client = reqwest::Client::new();
    let posts = match check_posts_endpoint(&client, config).await {
        Ok(count) => CheckReport::pass("posts-endpoint", format!("{count} post(s) listed")),
        Err(e) => CheckReport::fail("posts-endpoint", e.to_string()),
    };
    let login_page = match check_login_page(&client, config).await {
        Ok(bytes) => CheckReport::pass("login-page", format!("{bytes} bytes")),
        Err(e) => CheckReport::fail("login-page", e.to_string()),
    };
    vec![posts, login_page]
}

/// Connect to WebDriver, recording a failed `webdriver` check when that fails
/// so the checks already gathered still get reported.
pub async fn open_session(config: &Config, report: &mut RunReport) -> Option<WebDriverSession> {
    match WebDriverSession::connect(config).await {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(webdriver = %config.webdriver_url, error = %e, "No browser session");
            report.checks.push(CheckReport::fail("webdriver", e.to_string()));
            None
        }
    }
}

/// Run the comment suite with the configured driver. A browser run without a
/// session is skipped; its connection failure is already in the report.
async fn run_comments(
    config: &Config,
    only: Option<&[Partition]>,
    session: &mut Option<WebDriverSession>,
) -> Result<Option<SuiteReport>> {
    let generator = CaseGenerator::new(config.limits, Arc::new(ClockTokenSource::new()));

    match config.driver {
        DriverKind::Http => {
            let driver = HttpFormDriver::new(config.clone())?;
            let (report, _) = run_suite(driver, generator, config.post_id, only).await;
            Ok(Some(report))
        }
        DriverKind::Browser => {
            let Some(browser) = session.take() else {
                return Ok(None);
            };
            let driver = BrowserDriver::new(browser, config.clone());
            let (report, driver) = run_suite(driver, generator, config.post_id, only).await;
            *session = Some(driver.into_session());
            Ok(Some(report))
        }
    }
}

async fn run_suite<D: Submitter>(
    driver: D,
    generator: CaseGenerator,
    post_id: u64,
    only: Option<&[Partition]>,
) -> (SuiteReport, D) {
    let mut suite = CommentSuite::new(driver, generator, post_id);
    if let Some(partitions) = only {
        suite = suite.only(partitions);
    }
    let report = suite.run().await;
    (report, suite.into_driver())
}
