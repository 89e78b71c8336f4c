//! Run reports and their human / JSON renderings.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use wpharness_core::VerdictStatus;

use crate::suite::SuiteReport;

/// Result of a single non-suite check (login, smoke endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckReport {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Everything one `run` invocation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub base_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub checks: Vec<CheckReport>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comments: Option<SuiteReport>,
}

impl RunReport {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            base_url: base_url.into(),
            checks: Vec::new(),
            comments: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
            && self.comments.as_ref().map_or(true, SuiteReport::is_success)
    }

    /// Pretty JSON for `--json`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; the report types always serialize.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text summary for a terminal.
    #[must_use]
    pub fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "wpharness run against {}", self.base_url);

        if !self.checks.is_empty() {
            let _ = writeln!(out, "\nChecks:");
            for check in &self.checks {
                let mark = if check.passed { "PASS" } else { "FAIL" };
                let _ = writeln!(out, "  [{mark}] {:<16} {}", check.name, check.detail);
            }
        }

        if let Some(suite) = &self.comments {
            let _ = writeln!(out, "\nComment form:");
            for case in &suite.cases {
                let class = case
                    .classification
                    .map_or_else(|| "-".to_string(), |c| c.class.to_string());
                let (mark, note) = status_parts(&case.status);
                let _ = writeln!(
                    out,
                    "  [{mark}] {} {:<40} {:<20} {:>6}ms{note}",
                    case.case_id, case.title, class, case.duration_ms
                );
            }
            let _ = writeln!(
                out,
                "\n  {} passed, {} passed with note, {} failed",
                suite.passed(),
                suite.noted(),
                suite.failed()
            );
        }

        let failing = self
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .chain(
                self.comments
                    .iter()
                    .flat_map(|s| s.cases.iter())
                    .filter(|c| c.status.is_fail())
                    .map(|c| c.case_id.as_str()),
            )
            .join(", ");
        if failing.is_empty() {
            let _ = writeln!(out, "\nResult: OK");
        } else {
            let _ = writeln!(out, "\nResult: FAILED ({failing})");
        }
        out
    }
}

fn status_parts(status: &VerdictStatus) -> (&'static str, String) {
    match status {
        VerdictStatus::Pass => ("PASS", String::new()),
        VerdictStatus::PassWithNote(note) => ("NOTE", format!("  ({note})")),
        VerdictStatus::Fail(reason) => ("FAIL", format!("  ({reason})")),
    }
}
