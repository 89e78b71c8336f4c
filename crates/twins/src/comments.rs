//! `wp-comments-post.php`: validate, store, redirect.
//!
//! Checks run in the order WordPress runs them: column lengths, required
//! name and email, email format, empty text, duplicates, flood window.

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    error::CommentRejection,
    pages::{MAX_AUTHOR, MAX_COMMENT, MAX_EMAIL, MAX_URL},
    state::{Comment, TwinConfig, TwinData, TwinState},
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub author: String,
    pub email: String,
    pub url: String,
    pub comment: String,
    #[serde(rename = "comment_post_ID")]
    pub comment_post_id: Option<u64>,
    pub comment_parent: Option<u64>,
}

/// A submission that passed every check, trimmed and ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedComment {
    pub post_id: u64,
    pub author: String,
    pub email: String,
    pub url: String,
    pub content: String,
}

/// Run the WordPress checks against `form` without touching state.
///
/// # Errors
///
/// Returns the first [`CommentRejection`] that applies.
pub fn check_submission(
    form: &CommentForm,
    config: &TwinConfig,
    data: &TwinData,
    now: Instant,
) -> Result<AcceptedComment, CommentRejection> {
    if form.comment_post_id != Some(config.post_id) {
        return Err(CommentRejection::UnknownPost);
    }

    let author = form.author.trim();
    let email = form.email.trim();
    let url = form.url.trim();
    let content = form.comment.trim();

    // Column limits are byte lengths.
    if author.len() > MAX_AUTHOR {
        return Err(CommentRejection::NameTooLong);
    }
    if email.len() > MAX_EMAIL {
        return Err(CommentRejection::EmailTooLong);
    }
    if url.len() > MAX_URL {
        return Err(CommentRejection::UrlTooLong);
    }
    if content.len() > MAX_COMMENT {
        return Err(CommentRejection::CommentTooLong);
    }

    if author.is_empty() || email.is_empty() {
        return Err(CommentRejection::MissingRequired);
    }
    if !is_email(email) {
        return Err(CommentRejection::InvalidEmail);
    }
    if content.is_empty() {
        return Err(CommentRejection::EmptyComment);
    }

    let duplicate = data.comments.iter().any(|c| {
        c.post_id == config.post_id
            && c.content == content
            && (c.author == author || c.email == email)
    });
    if duplicate {
        return Err(CommentRejection::Duplicate);
    }

    if !config.flood_window.is_zero() {
        if let Some(last) = data.last_comment_at {
            if now.saturating_duration_since(last) < config.flood_window {
                return Err(CommentRejection::Flood);
            }
        }
    }

    Ok(AcceptedComment {
        post_id: config.post_id,
        author: author.to_string(),
        email: email.to_string(),
        url: url.to_string(),
        content: content.to_string(),
    })
}

/// Loose address check in the spirit of WordPress's `is_email`.
#[must_use]
pub fn is_email(candidate: &str) -> bool {
    if candidate.len() < 6 || candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

pub async fn post_comment(
    State(state): State<TwinState>,
    Form(form): Form<CommentForm>,
) -> Response {
    let mut data = state.data.write().await;
    let now = Instant::now();

    let accepted = match check_submission(&form, &state.config, &data, now) {
        Ok(accepted) => accepted,
        Err(rejection) => {
            warn!(reason = %rejection, "Comment rejected");
            return rejection.into_response();
        }
    };

    let id = data.allocate_comment_id();
    data.comments.push_back(Comment {
        id,
        post_id: accepted.post_id,
        author: accepted.author,
        email: accepted.email,
        url: accepted.url,
        content: accepted.content,
        approved: false,
        date: Utc::now(),
    });
    data.last_comment_at = Some(now);
    info!(comment_id = id, post_id = accepted.post_id, "Comment held for moderation");

    let location = format!(
        "/?p={post}&unapproved={id}#comment-{id}",
        post = accepted.post_id
    );
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn form(author: &str, email: &str, comment: &str) -> CommentForm {
        CommentForm {
            author: author.to_string(),
            email: email.to_string(),
            url: String::new(),
            comment: comment.to_string(),
            comment_post_id: Some(1),
            comment_parent: Some(0),
        }
    }

    fn config() -> TwinConfig {
        TwinConfig {
            flood_window: Duration::ZERO,
            ..TwinConfig::default()
        }
    }

    fn stored(author: &str, email: &str, content: &str) -> Comment {
        Comment {
            id: 1,
            post_id: 1,
            author: author.to_string(),
            email: email.to_string(),
            url: String::new(),
            content: content.to_string(),
            approved: false,
            date: Utc::now(),
        }
    }

    #[test]
    fn nominal_comment_is_accepted_trimmed() {
        let result = check_submission(
            &form(" Jo ", "jo@example.com", " hi "),
            &config(),
            &TwinData::default(),
            Instant::now(),
        );
        let accepted = result.unwrap_or_else(|e| panic!("rejected: {e}"));
        assert_eq!(accepted.author, "Jo");
        assert_eq!(accepted.content, "hi");
    }

    #[test]
    fn limits_are_inclusive() {
        let data = TwinData::default();
        let at_limit = form(&"a".repeat(MAX_AUTHOR), "jo@example.com", "hi");
        assert!(check_submission(&at_limit, &config(), &data, Instant::now()).is_ok());

        let over = form(&"a".repeat(MAX_AUTHOR + 1), "jo@example.com", "hi");
        assert_eq!(
            check_submission(&over, &config(), &data, Instant::now()),
            Err(CommentRejection::NameTooLong)
        );
    }

    #[test]
    fn length_beats_required_fields() {
        let over = form("", &format!("{}@domain.com", "a".repeat(MAX_EMAIL)), "hi");
        assert_eq!(
            check_submission(&over, &config(), &TwinData::default(), Instant::now()),
            Err(CommentRejection::EmailTooLong)
        );
    }

    #[test]
    fn missing_fields_and_bad_email() {
        let data = TwinData::default();
        let now = Instant::now();
        assert_eq!(
            check_submission(&form("", "jo@example.com", "hi"), &config(), &data, now),
            Err(CommentRejection::MissingRequired)
        );
        assert_eq!(
            check_submission(&form("Jo", "invalidemail", "hi"), &config(), &data, now),
            Err(CommentRejection::InvalidEmail)
        );
        assert_eq!(
            check_submission(&form("Jo", "jo@example.com", "  "), &config(), &data, now),
            Err(CommentRejection::EmptyComment)
        );
    }

    #[test]
    fn duplicate_then_flood() {
        let mut data = TwinData::default();
        data.comments.push_back(stored("Jo", "jo@example.com", "hi"));
        let now = Instant::now();
        data.last_comment_at = Some(now);

        assert_eq!(
            check_submission(&form("Jo", "jo@example.com", "hi"), &config(), &data, now),
            Err(CommentRejection::Duplicate)
        );

        let flooding = TwinConfig {
            flood_window: Duration::from_secs(15),
            ..TwinConfig::default()
        };
        assert_eq!(
            check_submission(&form("Jo", "jo@example.com", "new"), &flooding, &data, now),
            Err(CommentRejection::Flood)
        );
        assert!(check_submission(
            &form("Jo", "jo@example.com", "new"),
            &flooding,
            &data,
            now + Duration::from_secs(16)
        )
        .is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("john1@example.com"));
        assert!(is_email("aaaa@domain.com"));
        assert!(!is_email("invalidemail"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@example.com"));
        assert!(!is_email("a@exa_mple.com"));
    }

    #[test]
    fn wrong_post_is_refused() {
        let mut submission = form("Jo", "jo@example.com", "hi");
        submission.comment_post_id = Some(99);
        assert_eq!(
            check_submission(&submission, &config(), &TwinData::default(), Instant::now()),
            Err(CommentRejection::UnknownPost)
        );
    }
}
