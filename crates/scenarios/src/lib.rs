//! # scenarios
//!
//! Drives the WordPress site under test: the comment-form boundary suite,
//! the administrator login flow and the HTTP smoke checks.
//!
//! Submission goes through [`Submitter`]: [`BrowserDriver`] over any
//! [`BrowserSession`] (normally [`WebDriverSession`]) or [`HttpFormDriver`]
//! for a plain form POST. Judging is delegated to `wpharness-core`.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod driver;
mod error;
pub mod http;
pub mod login;
pub mod report;
pub mod smoke;
pub mod suite;
pub mod webdriver;

pub use browser::BrowserSession;
pub use driver::{entry_mode, BrowserDriver, EntryMode, Submitter};
pub use error::{Result, ScenarioError};
pub use http::HttpFormDriver;
pub use login::{login, LoginOutcome};
pub use report::{CheckReport, RunReport};
pub use smoke::{check_login_page, check_posts_endpoint};
pub use suite::{CaseReport, CommentSuite, SuiteReport, SuiteTotals};
pub use webdriver::WebDriverSession;
