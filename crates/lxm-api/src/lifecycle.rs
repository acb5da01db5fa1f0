//! Submission lifecycle: Pending -> Approved/Rejected -> back to Pending.
//!
//! The ledger is authoritative for workflow state. Approve and reject also
//! append an audit row to the revenue sheet, but that mirror is best-effort:
//! a sheet failure is logged and swallowed, never rolled back into the
//! ledger. Re-review touches the ledger only.

use thiserror::Error;
use tracing::error;

use lxm_types::models::{Submission, SubmissionStatus, snapshot_now};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("creator not found")]
    CreatorNotFound,

    #[error("submission not found")]
    SubmissionNotFound,

    #[error("a rejection reason is required")]
    EmptyReason,

    #[error(transparent)]
    Ledger(#[from] anyhow::Error),
}

/// Creator-facing entry point. The referenced creator must exist; otherwise
/// nothing is inserted.
pub async fn create_submission(
    state: &AppState,
    creator_id: &str,
    reel_link: &str,
) -> Result<Submission, LifecycleError> {
    let st = state.clone();
    let creator_id = creator_id.to_string();
    let reel_link = reel_link.to_string();

    run_blocking(move || {
        if st.db.get_creator(&creator_id)?.is_none() {
            return Err(LifecycleError::CreatorNotFound);
        }

        let submission_time = snapshot_now();
        let id = st
            .db
            .insert_submission(&reel_link, &submission_time, &creator_id)?;

        Ok(Submission {
            id,
            reel_link,
            submission_time,
            status: SubmissionStatus::Pending,
            rejection_reason: String::new(),
            creator_id,
        })
    })
    .await
}

/// Approve a submission and mirror an audit row:
/// username, link, time, "Approved", cpm snapshot, blank views/earnings/reason.
pub async fn approve(state: &AppState, id: i64) -> Result<(), LifecycleError> {
    let st = state.clone();
    let (username, cpm, reel_link, submission_time) = run_blocking(move || {
        let sub = st
            .db
            .get_submission(id)?
            .ok_or(LifecycleError::SubmissionNotFound)?;
        st.db
            .set_submission_status(id, SubmissionStatus::Approved, "")?;

        let creator = st
            .db
            .get_creator(&sub.creator_id)?
            .ok_or(LifecycleError::CreatorNotFound)?;

        Ok((creator.username, creator.cpm, sub.reel_link, sub.submission_time))
    })
    .await?;

    let row = vec![
        username,
        reel_link,
        submission_time,
        SubmissionStatus::Approved.to_string(),
        cpm.to_string(),
        String::new(),
        String::new(),
        String::new(),
    ];
    if let Err(e) = state.sheet.append_row(row).await {
        error!("Revenue sheet append failed for submission {}: {}", id, e);
    }

    Ok(())
}

/// Reject a submission with a mandatory reason and mirror an audit row with
/// blank cpm/views/earnings and the reason populated.
pub async fn reject(state: &AppState, id: i64, reason: &str) -> Result<(), LifecycleError> {
    let reason = reason.trim().to_string();
    if reason.is_empty() {
        return Err(LifecycleError::EmptyReason);
    }

    let st = state.clone();
    let mirror_reason = reason.clone();
    let (username, reel_link, submission_time) = run_blocking(move || {
        let sub = st
            .db
            .get_submission(id)?
            .ok_or(LifecycleError::SubmissionNotFound)?;
        st.db
            .set_submission_status(id, SubmissionStatus::Rejected, &reason)?;

        let creator = st
            .db
            .get_creator(&sub.creator_id)?
            .ok_or(LifecycleError::CreatorNotFound)?;

        Ok((creator.username, sub.reel_link, sub.submission_time))
    })
    .await?;

    let row = vec![
        username,
        reel_link,
        submission_time,
        SubmissionStatus::Rejected.to_string(),
        String::new(),
        String::new(),
        String::new(),
        mirror_reason,
    ];
    if let Err(e) = state.sheet.append_row(row).await {
        error!("Revenue sheet append failed for submission {}: {}", id, e);
    }

    Ok(())
}

/// Send a submission back to review: status Pending, reason cleared.
/// No sheet mirror for this transition.
pub async fn rereview(state: &AppState, id: i64) -> Result<(), LifecycleError> {
    let st = state.clone();
    run_blocking(move || {
        let changed = st
            .db
            .set_submission_status(id, SubmissionStatus::Pending, "")?;
        if !changed {
            return Err(LifecycleError::SubmissionNotFound);
        }
        Ok(())
    })
    .await
}

/// Ledger work is blocking rusqlite; keep it off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, LifecycleError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LifecycleError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LifecycleError::Ledger(anyhow::anyhow!("ledger task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lxm_db::Database;
    use lxm_db::models::CreatorRow;
    use lxm_sheets::memory::MemorySheet;
    use lxm_sheets::{COL_CPM, COL_REASON, COL_STATUS, COL_USERNAME};

    use crate::state::AppStateInner;

    fn test_state() -> (AppState, Arc<MemorySheet>) {
        let sheet = Arc::new(MemorySheet::new());
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            sheet: sheet.clone(),
            dashboard_base: "https://docs.google.com/spreadsheets/d/test".to_string(),
        });
        (state, sheet)
    }

    fn seed_creator(state: &AppState, id: &str, username: &str, cpm: f64) {
        state
            .db
            .create_creator(&CreatorRow {
                id: id.to_string(),
                username: username.to_string(),
                cpm,
                email: None,
                dashboard_link: format!("https://example.com/d/{username}"),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn create_enters_at_pending() {
        let (state, _sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);

        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        assert_eq!(sub.status, SubmissionStatus::Pending);
        assert_eq!(sub.rejection_reason, "");

        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Pending");
    }

    #[tokio::test]
    async fn create_with_unknown_creator_inserts_nothing() {
        let (state, _sheet) = test_state();

        let err = create_submission(&state, "missing1", "https://reels.test/r/1")
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::CreatorNotFound));
        assert!(state.db.list_submissions(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn approve_commits_ledger_and_mirrors_row() {
        let (state, sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);
        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        approve(&state, sub.id).await.unwrap();

        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Approved");
        assert_eq!(row.rejection_reason, "");

        let mirrored = sheet.snapshot().await;
        assert_eq!(mirrored.len(), 2); // header + audit row
        let audit = &mirrored[1];
        assert_eq!(audit[COL_USERNAME - 1], "ana");
        assert_eq!(audit[COL_STATUS - 1], "Approved");
        assert_eq!(audit[COL_CPM - 1], "5");
        assert_eq!(audit[COL_REASON - 1], "");
    }

    #[tokio::test]
    async fn reject_requires_a_reason() {
        let (state, sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);
        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        let err = reject(&state, sub.id, "   ").await.unwrap_err();
        assert!(matches!(err, LifecycleError::EmptyReason));

        // Nothing mutated, nothing mirrored.
        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Pending");
        assert_eq!(sheet.data_row_count().await, 0);
    }

    #[tokio::test]
    async fn reason_is_nonempty_exactly_while_rejected() {
        let (state, _sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);
        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        reject(&state, sub.id, "blurry footage").await.unwrap();
        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Rejected");
        assert_eq!(row.rejection_reason, "blurry footage");

        rereview(&state, sub.id).await.unwrap();
        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Pending");
        assert_eq!(row.rejection_reason, "");

        reject(&state, sub.id, "still blurry").await.unwrap();
        approve(&state, sub.id).await.unwrap();
        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Approved");
        assert_eq!(row.rejection_reason, "");
    }

    #[tokio::test]
    async fn repeated_approvals_append_independent_audit_rows() {
        let (state, sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);
        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        approve(&state, sub.id).await.unwrap();
        rereview(&state, sub.id).await.unwrap();
        approve(&state, sub.id).await.unwrap();

        // Re-review mirrors nothing; each approve appends its own row.
        assert_eq!(sheet.data_row_count().await, 2);
        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Approved");
    }

    #[tokio::test]
    async fn mirror_failure_never_rolls_back_the_ledger() {
        let (state, sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);
        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        sheet.set_fail_appends(true).await;
        approve(&state, sub.id).await.unwrap();

        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Approved");
        assert_eq!(sheet.data_row_count().await, 0);
    }

    #[tokio::test]
    async fn approve_after_creator_deletion_commits_but_surfaces_the_miss() {
        let (state, sheet) = test_state();
        seed_creator(&state, "aaaa1111", "ana", 5.0);
        let sub = create_submission(&state, "aaaa1111", "https://reels.test/r/1")
            .await
            .unwrap();

        state.db.delete_creator("aaaa1111").unwrap();

        let err = approve(&state, sub.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::CreatorNotFound));

        // The ledger transition had already committed; only the mirror is lost.
        let row = state.db.get_submission(sub.id).unwrap().unwrap();
        assert_eq!(row.status, "Approved");
        assert_eq!(sheet.data_row_count().await, 0);
    }

    #[tokio::test]
    async fn transitions_on_unknown_submission_fail() {
        let (state, _sheet) = test_state();

        assert!(matches!(
            approve(&state, 42).await.unwrap_err(),
            LifecycleError::SubmissionNotFound
        ));
        assert!(matches!(
            reject(&state, 42, "reason").await.unwrap_err(),
            LifecycleError::SubmissionNotFound
        ));
        assert!(matches!(
            rereview(&state, 42).await.unwrap_err(),
            LifecycleError::SubmissionNotFound
        ));
    }
}
