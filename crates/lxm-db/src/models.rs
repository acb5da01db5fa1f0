/// Database row types — these map directly to SQLite rows.
/// Distinct from lxm-types API models to keep the DB layer independent;
/// status stays a raw TEXT value here and is parsed at the API boundary.

pub struct CreatorRow {
    pub id: String,
    pub username: String,
    pub cpm: f64,
    pub email: Option<String>,
    pub dashboard_link: String,
}

pub struct SubmissionRow {
    pub id: i64,
    pub reel_link: String,
    pub submission_time: String,
    pub status: String,
    pub rejection_reason: String,
    pub creator_id: String,
}

pub struct AnnouncementRow {
    pub id: i64,
    pub message: String,
    pub timestamp: String,
}
