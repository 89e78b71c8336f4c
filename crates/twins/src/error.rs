//! Twin errors and the rejections it answers comment submissions with.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::pages;

/// Why a comment submission was refused, in the wording WordPress uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommentRejection {
    #[error("Your name is too long.")]
    NameTooLong,
    #[error("Your email address is too long.")]
    EmailTooLong,
    #[error("Your URL is too long.")]
    UrlTooLong,
    #[error("Your comment is too long.")]
    CommentTooLong,
    #[error("Please fill the required fields.")]
    MissingRequired,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please type your comment text.")]
    EmptyComment,
    #[error("Duplicate comment detected; it looks as though you have already said that!")]
    Duplicate,
    #[error("You are posting comments too quickly. Slow down.")]
    Flood,
    #[error("Sorry, comments are closed for this item.")]
    UnknownPost,
}

impl CommentRejection {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Duplicate => StatusCode::CONFLICT,
            Self::Flood => StatusCode::TOO_MANY_REQUESTS,
            Self::UnknownPost => StatusCode::NOT_FOUND,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for CommentRejection {
    fn into_response(self) -> Response {
        (
            self.status(),
            Html(pages::die_page("Comment Submission Failure", &self.to_string())),
        )
            .into_response()
    }
}

#[derive(Debug, Error)]
pub enum TwinError {
    #[error("Failed to bind twin listener on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Twin server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TwinError>;
