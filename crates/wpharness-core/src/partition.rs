//! Equivalence partitions of the comment form.
//!
//! Each partition moves exactly one field to a boundary, a malformed value,
//! or an omitted value; every other field stays nominal.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::limits::{FormField, LimitedField};

/// Native constraint a browser reports on an input without a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Constraint {
    /// `required` field submitted empty
    ValueMissing,
    /// `type=email` / `type=url` field holding a malformed value
    TypeMismatch,
}

/// What a partition promises about the submission outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// The comment is taken in (published or queued for moderation).
    Admitted,
    /// The server rejects the value for exceeding the field's limit.
    LengthRejected { field: LimitedField },
    /// The browser (or, failing that, the server) refuses the value.
    ConstraintViolation {
        field: FormField,
        constraint: Constraint,
        /// Whether the server also refuses the value when the browser does not.
        server_enforced: bool,
    },
}

/// Partition selector for [`crate::CaseGenerator::generate`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Partition {
    Nominal,
    OmittedUrl,
    OmittedName,
    MinName,
    MaxValidName,
    OverMaxName,
    OmittedEmail,
    MalformedEmail,
    OverMaxEmail,
    MalformedUrl,
    OmittedComment,
    MinComment,
    MaxValidComment,
    OverMaxComment,
}

impl Partition {
    /// All partitions in suite order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Stable case identifier, `TC-COMMENT-01` through `TC-COMMENT-14`.
    #[must_use]
    pub fn case_id(self) -> String {
        format!("TC-COMMENT-{:02}", self.ordinal())
    }

    /// Resolve a case identifier back to its partition.
    #[must_use]
    pub fn from_case_id(id: &str) -> Option<Self> {
        Self::iter().find(|p| p.case_id().eq_ignore_ascii_case(id.trim()))
    }

    const fn ordinal(self) -> u8 {
        match self {
            Self::Nominal => 1,
            Self::OmittedUrl => 2,
            Self::OmittedName => 3,
            Self::MinName => 4,
            Self::MaxValidName => 5,
            Self::OverMaxName => 6,
            Self::OmittedEmail => 7,
            Self::MalformedEmail => 8,
            Self::OverMaxEmail => 9,
            Self::MalformedUrl => 10,
            Self::OmittedComment => 11,
            Self::MinComment => 12,
            Self::MaxValidComment => 13,
            Self::OverMaxComment => 14,
        }
    }

    /// Human title used in reports.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Nominal => "Submit complete comment",
            Self::OmittedUrl => "Submit comment without website",
            Self::OmittedName => "Validate empty name field",
            Self::MinName => "Single character name",
            Self::MaxValidName => "Maximum name length",
            Self::OverMaxName => "Name exceeding limit",
            Self::OmittedEmail => "Validate empty email field",
            Self::MalformedEmail => "Invalid email format",
            Self::OverMaxEmail => "Email exceeding limit",
            Self::MalformedUrl => "Invalid website URL",
            Self::OmittedComment => "Validate empty comment field",
            Self::MinComment => "Single character comment",
            Self::MaxValidComment => "Maximum comment length",
            Self::OverMaxComment => "Comment exceeding limit",
        }
    }

    /// The field this partition moves off its nominal value, if any.
    #[must_use]
    pub const fn target(self) -> Option<FormField> {
        match self {
            Self::Nominal => None,
            Self::OmittedName | Self::MinName | Self::MaxValidName | Self::OverMaxName => {
                Some(FormField::Author)
            }
            Self::OmittedEmail | Self::MalformedEmail | Self::OverMaxEmail => {
                Some(FormField::Email)
            }
            Self::OmittedUrl | Self::MalformedUrl => Some(FormField::Url),
            Self::OmittedComment
            | Self::MinComment
            | Self::MaxValidComment
            | Self::OverMaxComment => Some(FormField::Comment),
        }
    }

    #[must_use]
    pub const fn expectation(self) -> Expectation {
        match self {
            Self::Nominal
            | Self::OmittedUrl
            | Self::MinName
            | Self::MaxValidName
            | Self::MinComment
            | Self::MaxValidComment => Expectation::Admitted,
            Self::OverMaxName => Expectation::LengthRejected {
                field: LimitedField::Name,
            },
            Self::OverMaxEmail => Expectation::LengthRejected {
                field: LimitedField::Email,
            },
            Self::OverMaxComment => Expectation::LengthRejected {
                field: LimitedField::Comment,
            },
            Self::OmittedName => Expectation::ConstraintViolation {
                field: FormField::Author,
                constraint: Constraint::ValueMissing,
                server_enforced: true,
            },
            Self::OmittedEmail => Expectation::ConstraintViolation {
                field: FormField::Email,
                constraint: Constraint::ValueMissing,
                server_enforced: true,
            },
            Self::OmittedComment => Expectation::ConstraintViolation {
                field: FormField::Comment,
                constraint: Constraint::ValueMissing,
                server_enforced: true,
            },
            Self::MalformedEmail => Expectation::ConstraintViolation {
                field: FormField::Email,
                constraint: Constraint::TypeMismatch,
                server_enforced: true,
            },
            Self::MalformedUrl => Expectation::ConstraintViolation {
                field: FormField::Url,
                constraint: Constraint::TypeMismatch,
                server_enforced: false,
            },
        }
    }
}
