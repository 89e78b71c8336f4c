//! Shared twin state: one post, its comments and the login sessions.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use im::{HashSet, Vector};
use serde::Serialize;
use tokio::{sync::RwLock, time::Instant};

#[derive(Debug, Clone)]
pub struct TwinConfig {
    pub port: u16,
    pub post_id: u64,
    pub post_title: String,
    /// Minimum gap between two accepted comments; zero disables flood control.
    pub flood_window: Duration,
    pub username: String,
    pub password: String,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            post_id: 1,
            post_title: "Hello world!".to_string(),
            flood_window: Duration::from_secs(15),
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author: String,
    pub email: String,
    pub url: String,
    pub content: String,
    pub approved: bool,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct TwinData {
    pub comments: Vector<Comment>,
    pub sessions: HashSet<String>,
    pub last_comment_at: Option<Instant>,
    next_comment_id: u64,
}

impl TwinData {
    pub(crate) fn allocate_comment_id(&mut self) -> u64 {
        self.next_comment_id += 1;
        self.next_comment_id
    }
}

#[derive(Debug, Clone)]
pub struct TwinState {
    pub config: Arc<TwinConfig>,
    pub data: Arc<RwLock<TwinData>>,
}

impl TwinState {
    #[must_use]
    pub fn new(config: TwinConfig) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(RwLock::new(TwinData::default())),
        }
    }

    /// Snapshot of every stored comment.
    pub async fn comments(&self) -> Vector<Comment> {
        self.data.read().await.comments.clone()
    }

    pub async fn comment(&self, id: u64) -> Option<Comment> {
        self.data
            .read()
            .await
            .comments
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub async fn has_session(&self, token: &str) -> bool {
        self.data.read().await.sessions.contains(token)
    }
}
