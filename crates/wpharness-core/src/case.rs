//! Test case generation.

use std::sync::Arc;

use tracing::debug;

use crate::{
    limits::{BoundaryLimits, FormField, LimitedField, EMAIL_DOMAIN},
    partition::Partition,
    token::{TokenSource, UniquenessToken},
};

/// Website submitted whenever the URL field is not under test.
pub const NOMINAL_URL: &str = "https://example.com";
/// Email value with no `@` or domain.
pub const MALFORMED_EMAIL: &str = "invalidemail";
/// URL value with no scheme.
pub const MALFORMED_URL: &str = "not-a-url";

const NOMINAL_NAME_PREFIX: &str = "John Smith ";
const NOMINAL_EMAIL_PREFIX: &str = "john";
const NOMINAL_EMAIL_DOMAIN: &str = "@example.com";
const NOMINAL_COMMENT_PREFIX: &str = "This is a great post! ";
/// Decimal digits of `u64::MAX`, the longest token.
const MAX_TOKEN_DIGITS: usize = 20;

/// Longest nominal value `field` can carry, whatever the token.
///
/// A limit below this cannot hold a nominal value, so cases targeting another
/// field would overshoot this one too.
#[must_use]
pub const fn max_nominal_length(field: LimitedField) -> usize {
    MAX_TOKEN_DIGITS
        + match field {
            LimitedField::Name => NOMINAL_NAME_PREFIX.len(),
            LimitedField::Email => NOMINAL_EMAIL_PREFIX.len() + NOMINAL_EMAIL_DOMAIN.len(),
            LimitedField::Comment => NOMINAL_COMMENT_PREFIX.len(),
        }
}

/// One submission of the comment form.
///
/// An empty string means the field is left blank; `url: None` means the
/// website field is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub partition: Partition,
    pub token: UniquenessToken,
    pub name: String,
    pub email: String,
    pub url: Option<String>,
    pub comment: String,
}

impl TestCase {
    /// Value to write into `field`; `None` means clear it and write nothing.
    #[must_use]
    pub fn value(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Author => Some(self.name.as_str()),
            FormField::Email => Some(self.email.as_str()),
            FormField::Url => self.url.as_deref(),
            FormField::Comment => Some(self.comment.as_str()),
        }
        .filter(|v| !v.is_empty())
    }

    /// Fields in the order a user fills them in.
    pub fn entries(&self) -> impl Iterator<Item = (FormField, Option<&str>)> + '_ {
        [
            FormField::Author,
            FormField::Email,
            FormField::Url,
            FormField::Comment,
        ]
        .into_iter()
        .map(move |field| (field, self.value(field)))
    }

    /// Length in characters of the longest value in the case.
    #[must_use]
    pub fn longest_value(&self) -> usize {
        self.entries()
            .filter_map(|(_, value)| value.map(|v| v.chars().count()))
            .max()
            .unwrap_or(0)
    }
}

/// Builds one [`TestCase`] per partition with a fresh token each time.
#[derive(Clone)]
pub struct CaseGenerator {
    limits: BoundaryLimits,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for CaseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseGenerator")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl CaseGenerator {
    #[must_use]
    pub fn new(limits: BoundaryLimits, tokens: Arc<dyn TokenSource>) -> Self {
        Self { limits, tokens }
    }

    #[must_use]
    pub const fn limits(&self) -> &BoundaryLimits {
        &self.limits
    }

    /// Build the case for `partition`.
    ///
    /// Targeted values have exactly the length the partition names; all other
    /// fields hold nominal values carrying the case's token.
    #[must_use]
    pub fn generate(&self, partition: Partition) -> TestCase {
        let token = self.tokens.next_token();
        let mut case = nominal(partition, token);

        match partition {
            Partition::Nominal => {}
            Partition::OmittedUrl => case.url = None,
            Partition::OmittedName => case.name.clear(),
            Partition::MinName => case.name = "a".to_string(),
            Partition::MaxValidName => case.name = self.sized(LimitedField::Name, token, 0),
            Partition::OverMaxName => case.name = self.sized(LimitedField::Name, token, 1),
            Partition::OmittedEmail => case.email.clear(),
            Partition::MalformedEmail => case.email = MALFORMED_EMAIL.to_string(),
            Partition::OverMaxEmail => case.email = self.sized(LimitedField::Email, token, 1),
            Partition::MalformedUrl => case.url = Some(MALFORMED_URL.to_string()),
            Partition::OmittedComment => case.comment.clear(),
            Partition::MinComment => case.comment = "a".to_string(),
            Partition::MaxValidComment => {
                case.comment = self.sized(LimitedField::Comment, token, 0);
            }
            Partition::OverMaxComment => {
                case.comment = self.sized(LimitedField::Comment, token, 1);
            }
        }

        debug!(
            partition = %partition,
            token = %token,
            longest = case.longest_value(),
            "Generated test case"
        );
        case
    }

    /// A value of exactly `limit + overshoot` characters for `field`.
    fn sized(&self, field: LimitedField, token: UniquenessToken, overshoot: usize) -> String {
        let length = self.limits.limit(field) + overshoot;
        match field {
            LimitedField::Email => {
                let local = length.saturating_sub(EMAIL_DOMAIN.len()).max(1);
                format!("{}{EMAIL_DOMAIN}", pad_to(&token.to_string(), local))
            }
            LimitedField::Name => pad_to(&token.to_string(), length),
            LimitedField::Comment => pad_to(&format!("{NOMINAL_COMMENT_PREFIX}{token} "), length),
        }
    }
}

fn nominal(partition: Partition, token: UniquenessToken) -> TestCase {
    TestCase {
        partition,
        token,
        name: format!("{NOMINAL_NAME_PREFIX}{token}"),
        email: format!("{NOMINAL_EMAIL_PREFIX}{token}{NOMINAL_EMAIL_DOMAIN}"),
        url: Some(NOMINAL_URL.to_string()),
        comment: format!("{NOMINAL_COMMENT_PREFIX}{token}"),
    }
}

/// `seed` cut or padded with `a` to exactly `length` characters.
fn pad_to(seed: &str, length: usize) -> String {
    seed.chars()
        .chain(std::iter::repeat('a'))
        .take(length)
        .collect()
}
