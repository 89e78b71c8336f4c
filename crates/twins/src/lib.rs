//! # twins
//!
//! A WordPress digital twin: the post page with its comment form,
//! `wp-comments-post.php`, `wp-login.php`, the dashboard and the posts REST
//! endpoint, all in memory. It lets the harness run end to end without a
//! real site.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod api;
pub mod comments;
mod error;
pub mod login;
pub mod pages;
pub mod state;

use std::net::SocketAddr;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{CommentRejection, Result, TwinError};
pub use state::{Comment, TwinConfig, TwinState};

#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub p: Option<u64>,
    pub unapproved: Option<u64>,
}

/// `GET /?p=<id>[&unapproved=<comment>]`
pub async fn post(State(state): State<TwinState>, Query(query): Query<PostQuery>) -> Response {
    let config = &state.config;
    match query.p {
        Some(id) if id == config.post_id => {
            let pending = match query.unapproved {
                Some(comment_id) => state.comment(comment_id).await,
                None => None,
            };
            Html(pages::post_page(config, pending.as_ref())).into_response()
        }
        // The front page lists the only post.
        None => Html(pages::post_page(config, None)).into_response(),
        Some(_) => (StatusCode::NOT_FOUND, Html(pages::not_found_page())).into_response(),
    }
}

pub fn router(state: TwinState) -> Router {
    Router::new()
        .route("/", get(post))
        .route(
            "/wp-comments-post.php",
            axum::routing::post(comments::post_comment),
        )
        .route(
            "/wp-login.php",
            get(login::show_login).post(login::submit_login),
        )
        .route("/wp-admin", get(login::dashboard))
        .route("/wp-admin/", get(login::dashboard))
        .route("/wp-json/wp/v2/posts", get(api::list_posts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A twin serving on a background task. Dropping it stops the server.
pub struct RunningTwin {
    pub addr: SocketAddr,
    pub state: TwinState,
    handle: JoinHandle<()>,
}

impl RunningTwin {
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for RunningTwin {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|source| TwinError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Serve on `127.0.0.1:<config.port>` until the process ends.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(config: TwinConfig) -> Result<()> {
    let listener = bind(&format!("127.0.0.1:{}", config.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, flood_window = ?config.flood_window, "WordPress twin listening");

    axum::serve(listener, router(TwinState::new(config)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

/// Serve on a background task; `port = 0` picks a free port.
///
/// # Errors
///
/// Returns an error if the port cannot be bound.
pub async fn spawn(config: TwinConfig) -> Result<RunningTwin> {
    let listener = bind(&format!("127.0.0.1:{}", config.port)).await?;
    let addr = listener.local_addr()?;
    let state = TwinState::new(config);
    let app = router(state.clone());

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "WordPress twin stopped");
        }
    });
    info!(%addr, "WordPress twin spawned");

    Ok(RunningTwin {
        addr,
        state,
        handle,
    })
}
