//! Outcome classification.
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! precedence, not importance:
//!
//! 1. literal length markers (most specific, must not be shadowed by a generic
//!    error selector)
//! 2. success / moderation selectors, or the anchor of a published comment
//! 3. rate-limit phrases (before validation so throttling is never reported as
//!    a form bug)
//! 4. validation error selectors
//! 5. the originating form is still on the page
//! 6. nothing matched

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, warn};

use crate::{
    case::TestCase,
    limits::{FormField, LimitedField},
    page::PageState,
};

/// Marker of the server's error banner.
pub const ERROR_MARKER: &str = "Error";
/// Marker of the link back to the form.
pub const BACK_MARKER: &str = "Back";
/// Generic fragment shared by every length message.
pub const TOO_LONG_MARKER: &str = "too long";
/// Phrases the server prints when throttling rapid submissions.
pub const FLOOD_PHRASES: &[&str] = &["too quickly", "Slow down"];

/// Result class of one submission. Exactly one is assigned per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeClass {
    Accepted,
    PendingModeration,
    FloodControlled,
    ValidationRejected,
    LengthRejected,
    Indeterminate,
}

impl OutcomeClass {
    /// Whether the comment was taken in, published or not.
    #[must_use]
    pub const fn is_admitted(self) -> bool {
        matches!(self, Self::Accepted | Self::PendingModeration)
    }
}

/// The precedence rule that produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleId {
    LengthMarkers,
    SuccessSelector,
    FloodPhrase,
    ErrorSelector,
    FormStillPresent,
    Fallthrough,
}

/// How a non-accepting outcome is treated by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Disposition {
    /// Length or format violation; asserted exactly.
    DeterministicReject,
    /// Flood control; logged, never failed.
    ExpectedInterference,
    /// Form still present; the submission was not processed.
    SoftPass,
    /// No usable signal; still not a hard failure on its own.
    HardIndeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub class: OutcomeClass,
    pub rule: RuleId,
    /// Field named by the length message, for `LengthRejected`.
    pub length_field: Option<LimitedField>,
}

impl Classification {
    #[must_use]
    pub const fn disposition(&self) -> Option<Disposition> {
        match (self.class, self.rule) {
            (OutcomeClass::Accepted | OutcomeClass::PendingModeration, _) => None,
            (OutcomeClass::LengthRejected | OutcomeClass::ValidationRejected, _) => {
                Some(Disposition::DeterministicReject)
            }
            (OutcomeClass::FloodControlled, _) => Some(Disposition::ExpectedInterference),
            (OutcomeClass::Indeterminate, RuleId::FormStillPresent) => Some(Disposition::SoftPass),
            (OutcomeClass::Indeterminate, _) => Some(Disposition::HardIndeterminate),
        }
    }
}

/// One predicate → class mapping.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: RuleId,
    pub applies: fn(&PageState) -> bool,
    pub class: fn(&PageState) -> OutcomeClass,
}

/// The decision procedure, in precedence order.
pub const RULES: &[Rule] = &[
    Rule {
        id: RuleId::LengthMarkers,
        applies: has_length_markers,
        class: length_rejected,
    },
    Rule {
        id: RuleId::SuccessSelector,
        applies: has_success_selector,
        class: admitted,
    },
    Rule {
        id: RuleId::FloodPhrase,
        applies: has_flood_phrase,
        class: flood_controlled,
    },
    Rule {
        id: RuleId::ErrorSelector,
        applies: has_error_selector,
        class: validation_rejected,
    },
    Rule {
        id: RuleId::FormStillPresent,
        applies: has_form,
        class: indeterminate,
    },
];

fn has_length_markers(page: &PageState) -> bool {
    page.contains_text(ERROR_MARKER)
        && page.contains_text(BACK_MARKER)
        && page.contains_text(TOO_LONG_MARKER)
}

const fn has_success_selector(page: &PageState) -> bool {
    page.signals.moderation_visible
        || page.signals.success_visible
        || page.signals.comment_anchored
}

fn has_flood_phrase(page: &PageState) -> bool {
    FLOOD_PHRASES.iter().any(|phrase| page.contains_text(phrase))
}

const fn has_error_selector(page: &PageState) -> bool {
    page.signals.error_visible
}

const fn has_form(page: &PageState) -> bool {
    page.signals.form_present
}

const fn length_rejected(_: &PageState) -> OutcomeClass {
    OutcomeClass::LengthRejected
}

// Moderation and publication both satisfy an admitted expectation; the
// moderation marker is the more specific of the two.
const fn admitted(page: &PageState) -> OutcomeClass {
    if page.signals.moderation_visible {
        OutcomeClass::PendingModeration
    } else {
        OutcomeClass::Accepted
    }
}

const fn flood_controlled(_: &PageState) -> OutcomeClass {
    OutcomeClass::FloodControlled
}

const fn validation_rejected(_: &PageState) -> OutcomeClass {
    OutcomeClass::ValidationRejected
}

const fn indeterminate(_: &PageState) -> OutcomeClass {
    OutcomeClass::Indeterminate
}

/// Which field the page's length message names, falling back to the case's
/// target when the message is generic.
fn length_field(page: &PageState, case: &TestCase) -> Option<LimitedField> {
    LimitedField::iter()
        .find(|field| page.contains_text(field.too_long_phrase()))
        .or_else(|| case.partition.target().and_then(FormField::limited))
}

/// Classify the page a submission of `case` produced.
#[must_use]
pub fn classify(page: &PageState, case: &TestCase) -> Classification {
    let matched = RULES.iter().find(|rule| (rule.applies)(page));

    let classification = matched.map_or(
        Classification {
            class: OutcomeClass::Indeterminate,
            rule: RuleId::Fallthrough,
            length_field: None,
        },
        |rule| {
            let class = (rule.class)(page);
            Classification {
                class,
                rule: rule.id,
                length_field: (class == OutcomeClass::LengthRejected)
                    .then(|| length_field(page, case))
                    .flatten(),
            }
        },
    );

    match classification.class {
        OutcomeClass::FloodControlled => warn!(
            partition = %case.partition,
            "Comment flood detected - expected in rapid testing"
        ),
        OutcomeClass::Indeterminate if classification.rule == RuleId::Fallthrough => warn!(
            partition = %case.partition,
            url = %page.url,
            settled = page.settled,
            "No outcome signal on page"
        ),
        _ => debug!(
            partition = %case.partition,
            class = %classification.class,
            rule = %classification.rule,
            "Classified submission"
        ),
    }

    classification
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        case::CaseGenerator,
        limits::BoundaryLimits,
        page::PageSignals,
        partition::Partition,
        token::SequenceTokenSource,
    };

    fn case(partition: Partition) -> TestCase {
        CaseGenerator::new(
            BoundaryLimits::default(),
            Arc::new(SequenceTokenSource::starting_at(7)),
        )
        .generate(partition)
    }

    fn page(text: &str, signals: PageSignals) -> PageState {
        let mut page = PageState::unavailable("http://wp.test/wp-comments-post.php")
            .with_signals(signals)
            .with_settled(true);
        page.text = text.to_string();
        page
    }

    #[test]
    fn length_markers_beat_generic_error_selector() {
        let state = page(
            "Error: Your comment is too long. « Back",
            PageSignals {
                error_visible: true,
                ..PageSignals::default()
            },
        );
        let result = classify(&state, &case(Partition::OverMaxComment));
        assert_eq!(result.class, OutcomeClass::LengthRejected);
        assert_eq!(result.rule, RuleId::LengthMarkers);
        assert_eq!(result.length_field, Some(LimitedField::Comment));
    }

    #[test]
    fn length_rejection_needs_back_affordance() {
        let state = page("Error: Your name is too long.", PageSignals::default());
        let result = classify(&state, &case(Partition::OverMaxName));
        assert_ne!(result.class, OutcomeClass::LengthRejected);
    }

    #[test]
    fn generic_too_long_falls_back_to_target_field() {
        let state = page("Error: value too long. Back", PageSignals::default());
        let result = classify(&state, &case(Partition::OverMaxEmail));
        assert_eq!(result.length_field, Some(LimitedField::Email));
    }

    #[test]
    fn moderation_wins_over_plain_success() {
        let state = page(
            "Your comment is awaiting moderation.",
            PageSignals {
                moderation_visible: true,
                success_visible: true,
                form_present: true,
                ..PageSignals::default()
            },
        );
        assert_eq!(
            classify(&state, &case(Partition::Nominal)).class,
            OutcomeClass::PendingModeration
        );
    }

    #[test]
    fn published_comment_anchor_is_accepted_despite_form() {
        let state = PageState::from_html(
            "http://wp.test/?p=1#comment-5",
            r#"<body><ol class="commentlist"><li id="comment-5">This is a great post!</li></ol>
<div id="respond"><form id="commentform"></form></div></body>"#,
        );
        let result = classify(&state, &case(Partition::Nominal));
        assert_eq!(result.class, OutcomeClass::Accepted);
        assert_eq!(result.rule, RuleId::SuccessSelector);
    }

    #[test]
    fn flood_is_checked_before_validation_errors() {
        let state = page(
            "Error: You are posting comments too quickly. Slow down. « Back",
            PageSignals {
                error_visible: true,
                ..PageSignals::default()
            },
        );
        let result = classify(&state, &case(Partition::Nominal));
        assert_eq!(result.class, OutcomeClass::FloodControlled);
        assert_eq!(result.disposition(), Some(Disposition::ExpectedInterference));
    }

    #[test]
    fn form_still_present_is_a_soft_pass() {
        let state = page(
            "Leave a Reply",
            PageSignals {
                form_present: true,
                ..PageSignals::default()
            },
        );
        let result = classify(&state, &case(Partition::OmittedName));
        assert_eq!(result.class, OutcomeClass::Indeterminate);
        assert_eq!(result.disposition(), Some(Disposition::SoftPass));
    }

    #[test]
    fn blank_page_falls_through() {
        let state = PageState::unavailable("about:blank");
        let result = classify(&state, &case(Partition::Nominal));
        assert_eq!(result.rule, RuleId::Fallthrough);
        assert_eq!(result.disposition(), Some(Disposition::HardIndeterminate));
    }

    #[test]
    fn rules_cover_every_id_but_fallthrough() {
        let ids: Vec<_> = RULES.iter().map(|rule| rule.id).collect();
        let expected: Vec<_> = RuleId::iter().filter(|id| *id != RuleId::Fallthrough).collect();
        assert_eq!(ids, expected);
    }
}
