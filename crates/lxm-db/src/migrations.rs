use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS creators (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL,
            cpm             REAL NOT NULL,
            email           TEXT,
            dashboard_link  TEXT NOT NULL
        );

        -- creator_id is a soft reference: creators may be deleted while
        -- their submissions remain in the review history.
        CREATE TABLE IF NOT EXISTS submissions (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            reel_link         TEXT NOT NULL,
            submission_time   TEXT NOT NULL,
            status            TEXT NOT NULL DEFAULT 'Pending',
            rejection_reason  TEXT NOT NULL DEFAULT '',
            creator_id        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_submissions_status
            ON submissions(status);

        CREATE TABLE IF NOT EXISTS announcements (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            message     TEXT NOT NULL,
            timestamp   TEXT NOT NULL
        );

        -- Declared for layout parity; no surfaced operation writes to it.
        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            creator_id  TEXT,
            message     TEXT,
            timestamp   TEXT
        );
        ",
    )?;

    info!("Ledger migrations complete");
    Ok(())
}
