//! The slice of the REST API the smoke checks read.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::TwinState;

/// `GET /wp-json/wp/v2/posts`
pub async fn list_posts(State(state): State<TwinState>) -> Json<Value> {
    let config = &state.config;
    Json(json!([{
        "id": config.post_id,
        "status": "publish",
        "type": "post",
        "link": format!("/?p={}", config.post_id),
        "title": { "rendered": config.post_title },
        "comment_status": "open",
    }]))
}
