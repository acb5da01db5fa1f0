use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};

use lxm_db::models::SubmissionRow;
use lxm_types::api::{CreateSubmissionRequest, RejectRequest};
use lxm_types::models::{Submission, SubmissionStatus};

use crate::lifecycle::{self, LifecycleError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmissionsQuery {
    /// "All" (default) or one of the status names.
    pub status: Option<String>,
}

/// Creator-facing submission. An unknown creator token is an access-denied
/// response, mirroring the public submit form.
pub async fn create_submission(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reel_link = req.reel_link.trim().to_string();
    if reel_link.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "A reel link is required.".into()));
    }

    let submission = lifecycle::create_submission(&state, &creator_id, &reel_link)
        .await
        .map_err(|e| match e {
            LifecycleError::CreatorNotFound => (
                StatusCode::FORBIDDEN,
                "Invalid creator ID. Access denied.".to_string(),
            ),
            other => lifecycle_error(other),
        })?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Manager list view, filterable by status.
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<SubmissionsQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let filter = match query.status.as_deref() {
        None | Some("All") => None,
        Some(s) => Some(SubmissionStatus::parse(s).ok_or(StatusCode::BAD_REQUEST)?),
    };

    let st = state.clone();
    let rows = tokio::task::spawn_blocking(move || st.db.list_submissions(filter))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let submissions: Vec<Submission> = rows.into_iter().map(from_row).collect();
    Ok(Json(submissions))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    lifecycle::approve(&state, id).await.map_err(lifecycle_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    lifecycle::reject(&state, id, &req.reason)
        .await
        .map_err(lifecycle_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rereview(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    lifecycle::rereview(&state, id)
        .await
        .map_err(lifecycle_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn lifecycle_error(e: LifecycleError) -> (StatusCode, String) {
    let status = match &e {
        LifecycleError::CreatorNotFound | LifecycleError::SubmissionNotFound => {
            StatusCode::NOT_FOUND
        }
        LifecycleError::EmptyReason => StatusCode::BAD_REQUEST,
        LifecycleError::Ledger(err) => {
            error!("Ledger error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

fn from_row(row: SubmissionRow) -> Submission {
    let status = SubmissionStatus::parse(&row.status).unwrap_or_else(|| {
        warn!("Corrupt status '{}' on submission {}", row.status, row.id);
        SubmissionStatus::Pending
    });

    Submission {
        id: row.id,
        reel_link: row.reel_link,
        submission_time: row.submission_time,
        status,
        rejection_reason: row.rejection_reason,
        creator_id: row.creator_id,
    }
}
