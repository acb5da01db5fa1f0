use serde::{Deserialize, Serialize};

/// Timestamp format used for submission/announcement snapshots and mirrored
/// verbatim into the revenue sheet.
pub const SNAPSHOT_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Current time rendered in the snapshot format.
pub fn snapshot_now() -> String {
    chrono::Utc::now().format(SNAPSHOT_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "Pending",
            SubmissionStatus::Approved => "Approved",
            SubmissionStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(SubmissionStatus::Pending),
            "Approved" => Some(SubmissionStatus::Approved),
            "Rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    /// 8-char token; embedded in the dashboard link.
    pub id: String,
    pub username: String,
    pub cpm: f64,
    pub email: Option<String>,
    pub dashboard_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub reel_link: String,
    /// Creation-time snapshot, immutable after insert.
    pub submission_time: String,
    pub status: SubmissionStatus,
    /// Non-empty iff status == Rejected.
    pub rejection_reason: String,
    pub creator_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub message: String,
    pub timestamp: String,
}
