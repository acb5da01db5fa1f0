use crate::Database;
use crate::models::{AnnouncementRow, CreatorRow, SubmissionRow};
use anyhow::Result;
use lxm_types::models::SubmissionStatus;
use rusqlite::Connection;

impl Database {
    // -- Creators --

    pub fn create_creator(&self, row: &CreatorRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO creators (id, username, cpm, email, dashboard_link) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![row.id, row.username, row.cpm, row.email, row.dashboard_link],
            )?;
            Ok(())
        })
    }

    pub fn get_creator(&self, id: &str) -> Result<Option<CreatorRow>> {
        self.with_conn(|conn| query_creator(conn, id))
    }

    pub fn list_creators(&self) -> Result<Vec<CreatorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, cpm, email, dashboard_link FROM creators ORDER BY username",
            )?;
            let rows = stmt
                .query_map([], creator_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no creator has the given id.
    pub fn update_creator_cpm(&self, id: &str, cpm: f64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE creators SET cpm = ?1 WHERE id = ?2",
                rusqlite::params![cpm, id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_creator(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM creators WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Submissions --

    /// Inserts at Pending and returns the new row id. Creator existence is
    /// the lifecycle engine's precondition, not enforced here.
    pub fn insert_submission(
        &self,
        reel_link: &str,
        submission_time: &str,
        creator_id: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO submissions (reel_link, submission_time, creator_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![reel_link, submission_time, creator_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_submission(&self, id: i64) -> Result<Option<SubmissionRow>> {
        self.with_conn(|conn| query_submission(conn, id))
    }

    pub fn list_submissions(&self, filter: Option<SubmissionStatus>) -> Result<Vec<SubmissionRow>> {
        self.with_conn(|conn| match filter {
            Some(status) => {
                let mut stmt = conn.prepare(
                    "SELECT id, reel_link, submission_time, status, rejection_reason, creator_id
                     FROM submissions WHERE status = ?1 ORDER BY id",
                )?;
                let rows = stmt
                    .query_map([status.as_str()], submission_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, reel_link, submission_time, status, rejection_reason, creator_id
                     FROM submissions ORDER BY id",
                )?;
                let rows = stmt
                    .query_map([], submission_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            }
        })
    }

    /// Returns false when no submission has the given id.
    pub fn set_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
        reason: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE submissions SET status = ?1, rejection_reason = ?2 WHERE id = ?3",
                rusqlite::params![status.as_str(), reason, id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Announcements --

    pub fn insert_announcement(&self, message: &str, timestamp: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO announcements (message, timestamp) VALUES (?1, ?2)",
                rusqlite::params![message, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first, so the latest announcement leads the dashboard feed.
    pub fn list_announcements(&self) -> Result<Vec<AnnouncementRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, message, timestamp FROM announcements ORDER BY id DESC")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(AnnouncementRow {
                        id: row.get(0)?,
                        message: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Wipes every table. Irreversible.
    pub fn clear_all(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute_batch(
                "DELETE FROM submissions;
                 DELETE FROM creators;
                 DELETE FROM announcements;
                 DELETE FROM notifications;",
            )?;
            Ok(())
        })
    }
}

fn query_creator(conn: &Connection, id: &str) -> Result<Option<CreatorRow>> {
    let mut stmt = conn
        .prepare("SELECT id, username, cpm, email, dashboard_link FROM creators WHERE id = ?1")?;

    let row = stmt.query_row([id], creator_from_row).optional()?;

    Ok(row)
}

fn query_submission(conn: &Connection, id: i64) -> Result<Option<SubmissionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, reel_link, submission_time, status, rejection_reason, creator_id
         FROM submissions WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], submission_from_row).optional()?;

    Ok(row)
}

fn creator_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<CreatorRow, rusqlite::Error> {
    Ok(CreatorRow {
        id: row.get(0)?,
        username: row.get(1)?,
        cpm: row.get(2)?,
        email: row.get(3)?,
        dashboard_link: row.get(4)?,
    })
}

fn submission_from_row(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<SubmissionRow, rusqlite::Error> {
    Ok(SubmissionRow {
        id: row.get(0)?,
        reel_link: row.get(1)?,
        submission_time: row.get(2)?,
        status: row.get(3)?,
        rejection_reason: row.get(4)?,
        creator_id: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
