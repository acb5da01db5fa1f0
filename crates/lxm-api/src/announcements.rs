use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use lxm_types::api::AnnouncementRequest;
use lxm_types::models::{Announcement, snapshot_now};

use crate::state::AppState;

pub async fn send_announcement(
    State(state): State<AppState>,
    Json(req): Json<AnnouncementRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let timestamp = snapshot_now();
    let st = state.clone();
    let (msg, ts) = (message.clone(), timestamp.clone());
    let id = tokio::task::spawn_blocking(move || st.db.insert_announcement(&msg, &ts))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(Announcement {
            id,
            message,
            timestamp,
        }),
    ))
}

/// Newest first, same order the creator dashboard shows them.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let rows = tokio::task::spawn_blocking(move || st.db.list_announcements())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let feed: Vec<Announcement> = rows
        .into_iter()
        .map(|row| Announcement {
            id: row.id,
            message: row.message,
            timestamp: row.timestamp,
        })
        .collect();

    Ok(Json(feed))
}
