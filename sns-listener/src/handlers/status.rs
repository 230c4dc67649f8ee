use askama::Template;
use axum::{extract::State, response::IntoResponse};

use crate::models::NotificationRecord;
use crate::services::StoreSnapshot;
use crate::startup::AppState;

/// Status page. The browser reloads it every 5 seconds.
#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub total: usize,
    pub topics: Vec<(String, u64)>,
    /// Newest first.
    pub records: Vec<NotificationRecord>,
}

impl From<StoreSnapshot> for StatusTemplate {
    fn from(snapshot: StoreSnapshot) -> Self {
        Self {
            total: snapshot.total(),
            records: snapshot.newest_first().cloned().collect(),
            topics: snapshot.topics.into_iter().collect(),
        }
    }
}

pub async fn status_page(State(state): State<AppState>) -> impl IntoResponse {
    StatusTemplate::from(state.store.snapshot())
}

pub async fn clear_messages(State(state): State<AppState>) -> impl IntoResponse {
    let cleared = state.store.clear();
    tracing::info!("Cleared all stored messages");
    StatusTemplate::from(cleared)
}
