//! Verdicts: what a classified outcome means for a given partition.
//!
//! The harness fails a case only when a specific expected marker is missing
//! (native constraint flag, literal length message) or when the outcome
//! contradicts the partition outright. Ambiguous pages never fail on their own.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    case::TestCase,
    classifier::{classify, Classification, OutcomeClass, RuleId, BACK_MARKER, ERROR_MARKER},
    limits::{FormField, LimitedField},
    page::PageState,
    partition::{Constraint, Expectation, Partition},
};

/// Where the deciding signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Evidence {
    /// The browser flagged the input itself.
    Native { constraint: Constraint },
    /// The page content after submission.
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    /// Passed on a tolerated signal (flood control, form still present, ...).
    PassWithNote(String),
    Fail(String),
}

impl VerdictStatus {
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub case_id: String,
    pub partition: Partition,
    pub classification: Classification,
    pub evidence: Evidence,
    pub status: VerdictStatus,
}

/// Judge the page `case` produced against its partition's expectation.
///
/// `post_id` is the post the form lives on; a URL still addressing it is the
/// weakest acceptable signal that a refused submission went nowhere.
#[must_use]
pub fn judge(case: &TestCase, page: &PageState, post_id: u64) -> Verdict {
    let classification = classify(page, case);
    let (evidence, status) = match case.partition.expectation() {
        Expectation::Admitted => (Evidence::Page, judge_admitted(&classification)),
        Expectation::LengthRejected { field } => {
            (Evidence::Page, judge_length(page, &classification, field))
        }
        Expectation::ConstraintViolation {
            field,
            constraint,
            server_enforced,
        } => {
            if native_flag(page, constraint) {
                (Evidence::Native { constraint }, VerdictStatus::Pass)
            } else {
                (
                    Evidence::Page,
                    judge_constraint_fallback(
                        page,
                        &classification,
                        field,
                        server_enforced,
                        post_id,
                    ),
                )
            }
        }
    };

    let verdict = Verdict {
        case_id: case.partition.case_id(),
        partition: case.partition,
        classification,
        evidence,
        status,
    };
    info!(
        case = %verdict.case_id,
        class = %verdict.classification.class,
        failed = verdict.status.is_fail(),
        "Judged case"
    );
    verdict
}

fn native_flag(page: &PageState, constraint: Constraint) -> bool {
    page.native.is_some_and(|validity| match constraint {
        Constraint::ValueMissing => validity.value_missing,
        Constraint::TypeMismatch => validity.type_mismatch,
    })
}

fn judge_admitted(classification: &Classification) -> VerdictStatus {
    match (classification.class, classification.rule) {
        (OutcomeClass::Accepted | OutcomeClass::PendingModeration, _) => VerdictStatus::Pass,
        (OutcomeClass::FloodControlled, _) => {
            VerdictStatus::PassWithNote("flood control throttled the submission".to_string())
        }
        (OutcomeClass::Indeterminate, RuleId::FormStillPresent) => {
            VerdictStatus::PassWithNote("comment form still present".to_string())
        }
        (OutcomeClass::Indeterminate, _) => {
            VerdictStatus::PassWithNote("no outcome signal on page".to_string())
        }
        (OutcomeClass::LengthRejected, _) => VerdictStatus::Fail(format!(
            "value within limit was rejected as too long ({})",
            classification
                .length_field
                .map_or_else(|| "unknown field".to_string(), |f| f.to_string())
        )),
        (OutcomeClass::ValidationRejected, _) => {
            VerdictStatus::Fail("valid submission was rejected with a validation error".to_string())
        }
    }
}

fn judge_length(
    page: &PageState,
    classification: &Classification,
    field: LimitedField,
) -> VerdictStatus {
    let missing: Vec<&str> = [ERROR_MARKER, field.too_long_phrase(), BACK_MARKER]
        .into_iter()
        .filter(|marker| !page.contains_text(marker))
        .collect();

    if missing.is_empty() && classification.class == OutcomeClass::LengthRejected {
        VerdictStatus::Pass
    } else {
        VerdictStatus::Fail(format!(
            "expected {field} length rejection, got {} (missing: {})",
            classification.class,
            if missing.is_empty() {
                "none".to_string()
            } else {
                missing.join(", ")
            }
        ))
    }
}

fn judge_constraint_fallback(
    page: &PageState,
    classification: &Classification,
    field: FormField,
    server_enforced: bool,
    post_id: u64,
) -> VerdictStatus {
    match (classification.class, classification.rule) {
        (OutcomeClass::ValidationRejected, _) => VerdictStatus::Pass,
        (OutcomeClass::FloodControlled, _) => {
            VerdictStatus::PassWithNote("flood control throttled the submission".to_string())
        }
        (OutcomeClass::Indeterminate, RuleId::FormStillPresent) => VerdictStatus::PassWithNote(
            "comment form still present; submission was not processed".to_string(),
        ),
        (OutcomeClass::Indeterminate, _) if page.url_references_post(post_id) => {
            VerdictStatus::PassWithNote(format!("URL still references post {post_id}"))
        }
        (OutcomeClass::Indeterminate, _) => VerdictStatus::Fail(format!(
            "no native {field} violation and no signal that the submission was refused"
        )),
        (OutcomeClass::Accepted | OutcomeClass::PendingModeration, _) if server_enforced => {
            VerdictStatus::Fail(format!("invalid {field} value was accepted"))
        }
        (OutcomeClass::Accepted | OutcomeClass::PendingModeration, _) => {
            VerdictStatus::PassWithNote(format!(
                "server normalised the {field} value; no native validation available"
            ))
        }
        (OutcomeClass::LengthRejected, _) => {
            VerdictStatus::Fail(format!("{field} constraint case was rejected as too long"))
        }
    }
}
