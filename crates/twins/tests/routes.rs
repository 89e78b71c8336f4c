#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Route-level behaviour of the WordPress twin, driven through `oneshot`.

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use twins::{router, TwinConfig, TwinState};

fn app(flood_window: Duration) -> (Router, TwinState) {
    let state = TwinState::new(TwinConfig {
        port: 0,
        flood_window,
        ..TwinConfig::default()
    });
    (router(state.clone()), state)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn comment_body(author: &str, email: &str, comment: &str) -> String {
    format!(
        "author={author}&email={email}&url=&comment={comment}&comment_post_ID=1&comment_parent=0"
    )
}

// ============================================================================
// Comment submission
// ============================================================================

/// GIVEN: a valid comment
/// WHEN: posting it
/// THEN: it is stored unapproved and the redirect shows it awaiting moderation
#[tokio::test]
async fn valid_comment_redirects_to_moderation_notice() {
    let (app, state) = app(Duration::ZERO);

    let response = app
        .clone()
        .oneshot(form_post(
            "/wp-comments-post.php",
            &comment_body("Jo", "jo%40example.com", "Nice+post"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()[LOCATION].to_str().unwrap().to_string();
    assert_eq!(location, "/?p=1&unapproved=1#comment-1");

    let stored = state.comments().await;
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].approved);
    assert_eq!(stored[0].content, "Nice post");

    let page = text(app.oneshot(get("/?p=1&unapproved=1")).await.unwrap()).await;
    assert!(page.contains("comment-awaiting-moderation"));
    assert!(page.contains("id=\"commentform\""));
}

/// GIVEN: a 246 byte name
/// WHEN: posting it
/// THEN: the wp_die page names the field as too long
#[tokio::test]
async fn long_name_gets_die_page() {
    let (app, state) = app(Duration::ZERO);
    let name = "a".repeat(246);

    let response = app
        .oneshot(form_post(
            "/wp-comments-post.php",
            &comment_body(&name, "jo%40example.com", "hi"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = text(response).await;
    assert!(page.contains("id=\"error-page\""));
    assert!(page.contains("Error:</strong> Your name is too long."));
    assert!(page.contains("&laquo; Back"));
    assert!(state.comments().await.is_empty());
}

/// GIVEN: flood control with a long window
/// WHEN: two different comments arrive back to back
/// THEN: the second is throttled with 429
#[tokio::test]
async fn rapid_second_comment_is_throttled() {
    let (app, _) = app(Duration::from_secs(60));

    let first = app
        .clone()
        .oneshot(form_post(
            "/wp-comments-post.php",
            &comment_body("Jo", "jo%40example.com", "one"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::FOUND);

    let second = app
        .oneshot(form_post(
            "/wp-comments-post.php",
            &comment_body("Al", "al%40example.com", "two"),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(text(second).await.contains("too quickly"));
}

/// GIVEN: the same comment posted twice
/// WHEN: flood control is off
/// THEN: the repeat is refused as a duplicate
#[tokio::test]
async fn repeated_comment_is_duplicate() {
    let (app, _) = app(Duration::ZERO);
    let body = comment_body("Jo", "jo%40example.com", "same");

    let _ = app
        .clone()
        .oneshot(form_post("/wp-comments-post.php", &body))
        .await
        .unwrap();
    let again = app
        .oneshot(form_post("/wp-comments-post.php", &body))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Login and dashboard
// ============================================================================

/// GIVEN: the configured credentials
/// WHEN: logging in and following to the dashboard with the cookie
/// THEN: the admin bar is rendered
#[tokio::test]
async fn login_sets_cookie_for_dashboard() {
    let (app, _) = app(Duration::ZERO);

    let response = app
        .clone()
        .oneshot(form_post("/wp-login.php", "log=admin&pwd=password"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/wp-admin/");
    let cookie = response.headers()[SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let dashboard = app
        .oneshot(
            Request::get("/wp-admin/")
                .header(COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(text(dashboard).await.contains("id=\"wpadminbar\""));
}

/// GIVEN: a wrong password
/// WHEN: logging in
/// THEN: the login page comes back with an error and no cookie
#[tokio::test]
async fn wrong_password_stays_on_login() {
    let (app, _) = app(Duration::ZERO);

    let response = app
        .oneshot(form_post("/wp-login.php", "log=admin&pwd=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let page = text(response).await;
    assert!(page.contains("login_error"));
    assert!(page.contains("id=\"user_login\""));
}

/// GIVEN: no session cookie
/// WHEN: opening the dashboard
/// THEN: the request is sent to the login page
#[tokio::test]
async fn dashboard_requires_login() {
    let (app, _) = app(Duration::ZERO);
    let response = app.oneshot(get("/wp-admin/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(response.headers()[LOCATION]
        .to_str()
        .unwrap()
        .starts_with("/wp-login.php"));
}

// ============================================================================
// REST and pages
// ============================================================================

/// GIVEN: the twin
/// WHEN: listing posts over REST
/// THEN: a JSON array with the configured post is returned
#[tokio::test]
async fn posts_endpoint_lists_the_post() {
    let (app, _) = app(Duration::ZERO);
    let response = app.oneshot(get("/wp-json/wp/v2/posts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&text(response).await).unwrap();
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], 1);
}

/// GIVEN: an unknown post id
/// WHEN: requesting its page
/// THEN: 404
#[tokio::test]
async fn unknown_post_is_not_found() {
    let (app, _) = app(Duration::ZERO);
    let response = app.oneshot(get("/?p=42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
