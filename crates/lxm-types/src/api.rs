use serde::{Deserialize, Serialize};

use crate::models::{Announcement, Creator};

// -- Creators --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnboardCreatorRequest {
    pub username: String,
    pub cpm: f64,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCpmRequest {
    pub cpm: f64,
}

// -- Submissions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSubmissionRequest {
    pub reel_link: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectRequest {
    pub reason: String,
}

// -- Announcements --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnouncementRequest {
    pub message: String,
}

/// Creator dashboard payload: identity plus the announcement feed,
/// newest first.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub creator: Creator,
    pub announcements: Vec<Announcement>,
}

// -- Imports --

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Sheet rows that matched an uploaded link and were updated.
    pub updated: usize,
}
