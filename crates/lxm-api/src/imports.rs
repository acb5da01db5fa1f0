use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info};

use lxm_types::api::ImportResponse;

use crate::reconcile;
use crate::state::AppState;

/// Manager upload of the views report (raw CSV body). One pass/fail notice;
/// per-row misses are not reported individually.
pub async fn upload_views_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match reconcile::import_views(state.sheet.as_ref(), &body).await {
        Ok(updated) => {
            info!("Views import updated {} sheet row(s)", updated);
            Ok(Json(ImportResponse { updated }))
        }
        Err(e) if e.is_validation() => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("Views import failed against the sheet: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
