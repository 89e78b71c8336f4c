#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Reporting when no browser session can be opened.

use scenarios::{CheckReport, RunReport};
use wpharness::cli::handlers::run::open_session;
use wpharness_core::Config;

/// A WebDriver URL nothing listens on.
fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// GIVEN: smoke results already in the report and no WebDriver listening
/// WHEN: opening the browser session
/// THEN: no session is returned and the failure joins the earlier checks
#[tokio::test]
async fn unreachable_webdriver_is_reported_as_a_check() {
    let config = Config {
        webdriver_url: dead_endpoint(),
        ..Config::default()
    };
    let mut report = RunReport::new(config.base_url.clone());
    report
        .checks
        .push(CheckReport::pass("posts-endpoint", "1 post(s) listed"));

    let session = open_session(&config, &mut report).await;

    assert!(session.is_none());
    assert_eq!(report.checks.len(), 2);
    assert_eq!(report.checks[0].name, "posts-endpoint");
    assert_eq!(report.checks[1].name, "webdriver");
    assert!(!report.checks[1].passed);
    assert!(!report.is_success());
    assert!(report
        .render_human()
        .contains("Result: FAILED (webdriver)"));
}
