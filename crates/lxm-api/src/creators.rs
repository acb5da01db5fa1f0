use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use lxm_db::models::CreatorRow;
use lxm_types::api::{DashboardResponse, OnboardCreatorRequest, UpdateCpmRequest};
use lxm_types::models::{Announcement, Creator};

use crate::state::AppState;

/// 8-char creator token, carried in submission and dashboard URLs.
pub fn new_creator_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Filtered spreadsheet view scoped to one creator's username.
fn dashboard_link(base: &str, username: &str) -> String {
    format!("{base}/edit#gid=0&f={username}")
}

pub async fn onboard_creator(
    State(state): State<AppState>,
    Json(req): Json<OnboardCreatorRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !req.cpm.is_finite() || req.cpm < 0.0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let creator = Creator {
        id: new_creator_token(),
        username: username.clone(),
        cpm: req.cpm,
        email: req.email.filter(|e| !e.trim().is_empty()),
        dashboard_link: dashboard_link(&state.dashboard_base, &username),
    };

    let st = state.clone();
    let row = to_row(&creator);
    tokio::task::spawn_blocking(move || st.db.create_creator(&row))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    info!("Onboarded creator {} ({})", creator.username, creator.id);
    Ok((StatusCode::CREATED, Json(creator)))
}

pub async fn list_creators(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let rows = tokio::task::spawn_blocking(move || st.db.list_creators())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let creators: Vec<Creator> = rows.into_iter().map(from_row).collect();
    Ok(Json(creators))
}

pub async fn update_cpm(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCpmRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if !req.cpm.is_finite() || req.cpm < 0.0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let st = state.clone();
    let changed = tokio::task::spawn_blocking(move || st.db.update_creator_cpm(&id, req.cpm))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !changed {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let target = id.clone();
    tokio::task::spawn_blocking(move || st.db.delete_creator(&target))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    info!("Deleted creator {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Creator dashboard: identity plus the announcement feed, newest first.
pub async fn creator_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let (creator, announcements) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let creator = st.db.get_creator(&id)?;
        let announcements = st.db.list_announcements()?;
        Ok((creator, announcements))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let creator = creator.ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(DashboardResponse {
        creator: from_row(creator),
        announcements: announcements
            .into_iter()
            .map(|row| Announcement {
                id: row.id,
                message: row.message,
                timestamp: row.timestamp,
            })
            .collect(),
    }))
}

fn to_row(creator: &Creator) -> CreatorRow {
    CreatorRow {
        id: creator.id.clone(),
        username: creator.username.clone(),
        cpm: creator.cpm,
        email: creator.email.clone(),
        dashboard_link: creator.dashboard_link.clone(),
    }
}

fn from_row(row: CreatorRow) -> Creator {
    Creator {
        id: row.id,
        username: row.username,
        cpm: row.cpm,
        email: row.email,
        dashboard_link: row.dashboard_link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_tokens_are_short_and_unique() {
        let a = new_creator_token();
        let b = new_creator_token();

        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn dashboard_link_filters_on_username() {
        let link = dashboard_link("https://docs.google.com/spreadsheets/d/abc123", "ana");
        assert_eq!(
            link,
            "https://docs.google.com/spreadsheets/d/abc123/edit#gid=0&f=ana"
        );
    }
}
