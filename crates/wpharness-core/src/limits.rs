//! Form fields and the server-side length limits they are tested against.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Domain appended to generated over-limit email addresses.
pub const EMAIL_DOMAIN: &str = "@domain.com";

/// A field of the comment form, addressed by a stable element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FormField {
    Author,
    Email,
    Url,
    Comment,
}

impl FormField {
    /// CSS selector of the input element.
    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::Author => "#author",
            Self::Email => "#email",
            Self::Url => "#url",
            Self::Comment => "#comment",
        }
    }

    /// Name of the field in a `wp-comments-post.php` form body.
    #[must_use]
    pub const fn form_key(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Email => "email",
            Self::Url => "url",
            Self::Comment => "comment",
        }
    }

    /// The length-limited field this form field maps to, if any.
    #[must_use]
    pub const fn limited(self) -> Option<LimitedField> {
        match self {
            Self::Author => Some(LimitedField::Name),
            Self::Email => Some(LimitedField::Email),
            Self::Comment => Some(LimitedField::Comment),
            Self::Url => None,
        }
    }
}

/// A field with a documented server-side maximum length.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LimitedField {
    Name,
    Email,
    Comment,
}

impl LimitedField {
    /// The literal phrase the server prints when this field is too long.
    #[must_use]
    pub const fn too_long_phrase(self) -> &'static str {
        match self {
            Self::Name => "Your name is too long",
            Self::Email => "Your email address is too long",
            Self::Comment => "Your comment is too long",
        }
    }

    #[must_use]
    pub const fn form_field(self) -> FormField {
        match self {
            Self::Name => FormField::Author,
            Self::Email => FormField::Email,
            Self::Comment => FormField::Comment,
        }
    }
}

/// Maximum accepted lengths, in characters.
///
/// A value of exactly the limit must be accepted (or moderated); one character
/// more must be rejected with the field's "too long" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryLimits {
    pub name: usize,
    pub email: usize,
    pub comment: usize,
}

impl Default for BoundaryLimits {
    fn default() -> Self {
        Self {
            name: 245,
            email: 100,
            comment: 65_525,
        }
    }
}

impl BoundaryLimits {
    #[must_use]
    pub const fn limit(&self, field: LimitedField) -> usize {
        match field {
            LimitedField::Name => self.name,
            LimitedField::Email => self.email,
            LimitedField::Comment => self.comment,
        }
    }
}
