//! `wp-login.php` and the cookie-guarded dashboard.

use axum::{
    extract::State,
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    pages::{dashboard_page, login_page, AUTH_COOKIE},
    state::TwinState,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub log: String,
    pub pwd: String,
}

pub async fn show_login() -> Html<String> {
    Html(login_page(None))
}

pub async fn submit_login(State(state): State<TwinState>, Form(form): Form<LoginForm>) -> Response {
    let config = &state.config;
    if form.log.trim() != config.username || form.pwd != config.password {
        warn!(user = %form.log, "Login refused");
        let message = format!(
            "The password you entered for the username {} is incorrect.",
            form.log.trim()
        );
        return Html(login_page(Some(&message))).into_response();
    }

    let token = Uuid::new_v4().to_string();
    state.data.write().await.sessions.insert(token.clone());
    info!(user = %config.username, "Logged in");

    let cookie = format!("{AUTH_COOKIE}={token}; Path=/; HttpOnly");
    (
        StatusCode::FOUND,
        [(LOCATION, "/wp-admin/".to_string()), (SET_COOKIE, cookie)],
    )
        .into_response()
}

pub async fn dashboard(State(state): State<TwinState>, headers: HeaderMap) -> Response {
    let authenticated = match session_token(&headers) {
        Some(token) => state.has_session(&token).await,
        None => false,
    };
    if authenticated {
        Html(dashboard_page(&state.config.username)).into_response()
    } else {
        (
            StatusCode::FOUND,
            [(LOCATION, "/wp-login.php?redirect_to=%2Fwp-admin%2F".to_string())],
        )
            .into_response()
    }
}

/// The auth cookie's value, if the request carries one.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.to_string())
}
