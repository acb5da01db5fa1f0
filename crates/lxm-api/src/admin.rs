use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, warn};

use crate::state::AppState;

/// Wipe submissions, creators, announcements and notifications. No
/// confirmation step; this is irreversible.
pub async fn clear_data(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    tokio::task::spawn_blocking(move || st.db.clear_all())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    warn!("All ledger data cleared");
    Ok("All data cleared successfully!")
}
