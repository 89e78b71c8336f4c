//! Snapshot of the page a submission landed on.

use itertools::Itertools;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// The comment form on the post page.
pub const FORM_SELECTOR: &str = "#commentform";
/// Elements shown after a comment was published.
pub const SUCCESS_SELECTORS: &[&str] = &[".comment-success", ".success"];
/// Elements shown after a comment was queued for moderation.
pub const MODERATION_SELECTORS: &[&str] = &[".comment-awaiting-moderation"];
/// Inline or full-page validation error markers. `#error-page` is the body id
/// of WordPress's `wp_die` screen.
pub const ERROR_SELECTORS: &[&str] = &[".comment-error", ".error", "#error", "#error-page"];

/// Browser-reported constraint validation state of one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeValidity {
    pub value_missing: bool,
    pub type_mismatch: bool,
}

/// Presence/visibility answers for the selector groups the classifier reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSignals {
    pub success_visible: bool,
    pub moderation_visible: bool,
    pub error_visible: bool,
    pub form_present: bool,
    pub comment_anchored: bool,
}

/// Everything the classifier may look at after one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub url: String,
    #[serde(skip)]
    pub html: String,
    /// Visible body text with whitespace collapsed.
    #[serde(skip)]
    pub text: String,
    pub signals: PageSignals,
    /// Validity of the field under test, when the browser reports one.
    pub native: Option<NativeValidity>,
    /// False when the page never reached a ready state within the bounded wait.
    pub settled: bool,
}

impl PageState {
    /// Build a state from raw markup, treating every present element as visible.
    #[must_use]
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let html = html.into();
        let document = Html::parse_document(&html);
        let signals = PageSignals {
            success_visible: any_present(&document, SUCCESS_SELECTORS),
            moderation_visible: any_present(&document, MODERATION_SELECTORS),
            error_visible: any_present(&document, ERROR_SELECTORS),
            form_present: any_present(&document, &[FORM_SELECTOR]),
            comment_anchored: anchored_comment_id(&url)
                .is_some_and(|id| any_present(&document, &[&format!("#comment-{id}")])),
        };
        let text = body_text(&document);

        Self {
            url,
            html,
            text,
            signals,
            native: None,
            settled: true,
        }
    }

    /// Best-effort state when the page could not be read at all.
    #[must_use]
    pub fn unavailable(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: String::new(),
            text: String::new(),
            signals: PageSignals::default(),
            native: None,
            settled: false,
        }
    }

    #[must_use]
    pub const fn with_signals(mut self, signals: PageSignals) -> Self {
        self.signals = signals;
        self
    }

    #[must_use]
    pub const fn with_native(mut self, native: Option<NativeValidity>) -> Self {
        self.native = native;
        self
    }

    #[must_use]
    pub const fn with_settled(mut self, settled: bool) -> Self {
        self.settled = settled;
        self
    }

    /// Literal, case-sensitive substring test on the visible text.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// Whether the URL still addresses post `post_id` through `?p=`.
    #[must_use]
    pub fn url_references_post(&self, post_id: u64) -> bool {
        Regex::new(&format!(r"[?&]p={post_id}(?:[&#]|$)"))
            .is_ok_and(|pattern| pattern.is_match(&self.url))
    }
}

/// `N` from a URL ending in `#comment-N`.
fn anchored_comment_id(url: &str) -> Option<u64> {
    let pattern = Regex::new(r"#comment-(\d+)$").ok()?;
    pattern.captures(url)?.get(1)?.as_str().parse().ok()
}

fn any_present(document: &Html, selectors: &[&str]) -> bool {
    selectors
        .iter()
        .filter_map(|raw| Selector::parse(raw).ok())
        .any(|selector| document.select(&selector).next().is_some())
}

fn body_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());
    root.text().flat_map(str::split_whitespace).join(" ")
}
