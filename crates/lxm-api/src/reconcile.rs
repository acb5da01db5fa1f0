//! Earnings reconciliation: match an uploaded (Link, Views) report against
//! the revenue sheet and recompute earnings from the cpm snapshot stored on
//! each matched row.
//!
//! The sheet has no transactions, so the import is a non-atomic batch: a
//! row-level failure aborts the run, but cells already written stay written.

use thiserror::Error;

use lxm_sheets::{COL_CPM, COL_EARNINGS, COL_LINK, COL_VIEWS, HEADER_ROWS, RevenueSheet, SheetError};

const LINK_HEADER: &str = "Link";
const VIEWS_HEADER: &str = "Views";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("report is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("could not read the uploaded report: {0}")]
    Csv(#[from] csv::Error),

    #[error("report line {line}: invalid view count '{value}'")]
    InvalidViews { line: usize, value: String },

    #[error("sheet row {row}: invalid stored cpm '{value}'")]
    InvalidCpm { row: usize, value: String },

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl ImportError {
    /// True when the fault is in the uploaded report rather than the sheet.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ImportError::Sheet(_))
    }
}

/// Run one views import over `report` (CSV bytes with `Link` and `Views`
/// headers; extra columns ignored). Returns how many sheet rows were updated.
///
/// Per report row: find the first sheet row whose link matches exactly, read
/// its cpm snapshot, compute earnings = views / 1000 * cpm, and overwrite the
/// views and earnings cells. Rows with no matching link are skipped silently.
pub async fn import_views(
    sheet: &dyn RevenueSheet,
    report: &[u8],
) -> Result<usize, ImportError> {
    let mut reader = csv::Reader::from_reader(report);

    // Header validation happens before the sheet is touched at all.
    let headers = reader.headers()?.clone();
    let link_idx = headers.iter().position(|h| h == LINK_HEADER);
    let views_idx = headers.iter().position(|h| h == VIEWS_HEADER);

    let (Some(link_idx), Some(views_idx)) = (link_idx, views_idx) else {
        let missing = [(LINK_HEADER, link_idx), (VIEWS_HEADER, views_idx)]
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(ImportError::MissingColumns(missing));
    };

    let rows = sheet.all_rows().await?;
    let mut updated = 0usize;

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = i + 2; // line 1 is the header

        let link = record.get(link_idx).unwrap_or("");
        let views_raw = record.get(views_idx).unwrap_or("");
        let views: i64 = views_raw
            .trim()
            .parse()
            .map_err(|_| ImportError::InvalidViews {
                line,
                value: views_raw.to_string(),
            })?;

        let Some(row) = find_link_row(&rows, link) else {
            continue;
        };

        let cpm_raw = sheet.read_cell(row, COL_CPM).await?;
        let cpm: f64 = cpm_raw
            .trim()
            .parse()
            .map_err(|_| ImportError::InvalidCpm {
                row,
                value: cpm_raw.clone(),
            })?;

        let earnings = (views as f64 / 1000.0) * cpm;

        sheet.update_cell(row, COL_VIEWS, &views.to_string()).await?;
        sheet
            .update_cell(row, COL_EARNINGS, &earnings.to_string())
            .await?;
        updated += 1;
    }

    Ok(updated)
}

/// 1-based index of the first data row whose link column matches exactly
/// (case-sensitive, full string).
fn find_link_row(rows: &[Vec<String>], link: &str) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(HEADER_ROWS)
        .find(|(_, row)| row.get(COL_LINK - 1).is_some_and(|cell| cell == link))
        .map(|(i, _)| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lxm_sheets::memory::MemorySheet;

    async fn seed_row(sheet: &MemorySheet, username: &str, link: &str, cpm: &str) {
        sheet
            .append_row(vec![
                username.to_string(),
                link.to_string(),
                "2025-01-04 09:15 AM".to_string(),
                "Approved".to_string(),
                cpm.to_string(),
                String::new(),
                String::new(),
                String::new(),
            ])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn matched_row_gets_views_and_computed_earnings() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;

        let updated = import_views(&sheet, b"Link,Views\nabc,1000\n").await.unwrap();

        assert_eq!(updated, 1);
        assert_eq!(sheet.read_cell(2, COL_VIEWS).await.unwrap(), "1000");
        assert_eq!(sheet.read_cell(2, COL_EARNINGS).await.unwrap(), "5");
    }

    #[tokio::test]
    async fn fractional_cpm_scales_by_thousand_views() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "https://reels.test/r/9", "7.5").await;

        import_views(&sheet, b"Link,Views\nhttps://reels.test/r/9,2000\n")
            .await
            .unwrap();

        assert_eq!(sheet.read_cell(2, COL_EARNINGS).await.unwrap(), "15");
    }

    #[tokio::test]
    async fn unmatched_link_is_skipped_without_aborting() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;

        let updated = import_views(&sheet, b"Link,Views\nnowhere,50\nabc,1000\n")
            .await
            .unwrap();

        // The miss is silent; the later row still lands.
        assert_eq!(updated, 1);
        assert_eq!(sheet.read_cell(2, COL_VIEWS).await.unwrap(), "1000");
    }

    #[tokio::test]
    async fn missing_views_column_aborts_before_any_write() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;

        let err = import_views(&sheet, b"Link,Impressions\nabc,1000\n")
            .await
            .unwrap_err();

        match err {
            ImportError::MissingColumns(cols) => assert_eq!(cols, vec!["Views".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sheet.read_cell(2, COL_VIEWS).await.unwrap(), "");
    }

    #[tokio::test]
    async fn headerless_report_names_both_missing_columns() {
        let sheet = MemorySheet::new();

        let err = import_views(&sheet, b"a,b\n1,2\n").await.unwrap_err();

        match err {
            ImportError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Link".to_string(), "Views".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn bad_view_count_aborts_but_keeps_earlier_writes() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;
        seed_row(&sheet, "ben", "def", "4.0").await;

        let err = import_views(&sheet, b"Link,Views\nabc,1000\ndef,not-a-number\n")
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::InvalidViews { line: 3, .. }));
        // First row was written before the abort and stays written.
        assert_eq!(sheet.read_cell(2, COL_VIEWS).await.unwrap(), "1000");
        assert_eq!(sheet.read_cell(3, COL_VIEWS).await.unwrap(), "");
    }

    #[tokio::test]
    async fn extra_report_columns_are_ignored() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;

        let updated = import_views(
            &sheet,
            b"Campaign,Link,Posted,Views\nwinter,abc,2025-01-02,3000\n",
        )
        .await
        .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(sheet.read_cell(2, COL_EARNINGS).await.unwrap(), "15");
    }

    #[tokio::test]
    async fn duplicate_sheet_links_update_the_first_row() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;
        seed_row(&sheet, "ana", "abc", "9.0").await; // later re-approval

        import_views(&sheet, b"Link,Views\nabc,1000\n").await.unwrap();

        assert_eq!(sheet.read_cell(2, COL_VIEWS).await.unwrap(), "1000");
        assert_eq!(sheet.read_cell(3, COL_VIEWS).await.unwrap(), "");
    }

    #[tokio::test]
    async fn report_with_no_data_rows_is_a_no_op() {
        let sheet = MemorySheet::new();
        seed_row(&sheet, "ana", "abc", "5.0").await;

        let updated = import_views(&sheet, b"Link,Views\n").await.unwrap();
        assert_eq!(updated, 0);
    }
}
