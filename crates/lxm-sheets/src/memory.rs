use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{RevenueSheet, SheetError};

/// In-memory revenue sheet.
///
/// Serves two jobs: the test double for the lifecycle engine and importer,
/// and the dev-mode sheet the server falls back to when no service-account
/// credentials are configured.
pub struct MemorySheet {
    rows: RwLock<Vec<Vec<String>>>,
    fail_appends: RwLock<bool>,
}

impl MemorySheet {
    /// Empty sheet with the standard header row pre-seeded.
    pub fn new() -> Self {
        let header = [
            "Username",
            "Link",
            "Submission Time",
            "Status",
            "CPM",
            "Views",
            "Earnings",
            "Rejection Reason",
        ];
        Self {
            rows: RwLock::new(vec![header.iter().map(|s| s.to_string()).collect()]),
            fail_appends: RwLock::new(false),
        }
    }

    /// Make every subsequent append fail, to exercise the best-effort
    /// mirror path.
    pub async fn set_fail_appends(&self, fail: bool) {
        *self.fail_appends.write().await = fail;
    }

    /// Snapshot of the full sheet, header included.
    pub async fn snapshot(&self) -> Vec<Vec<String>> {
        self.rows.read().await.clone()
    }

    /// Number of data rows (header excluded).
    pub async fn data_row_count(&self) -> usize {
        self.rows.read().await.len().saturating_sub(crate::HEADER_ROWS)
    }
}

impl Default for MemorySheet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevenueSheet for MemorySheet {
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, SheetError> {
        Ok(self.rows.read().await.clone())
    }

    async fn append_row(&self, cells: Vec<String>) -> Result<(), SheetError> {
        if *self.fail_appends.read().await {
            return Err(SheetError::Api {
                status: 503,
                body: "append disabled".to_string(),
            });
        }
        self.rows.write().await.push(cells);
        Ok(())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), SheetError> {
        if row == 0 || col == 0 {
            return Err(SheetError::OutOfRange { row, col });
        }

        let mut rows = self.rows.write().await;
        let target = rows
            .get_mut(row - 1)
            .ok_or(SheetError::OutOfRange { row, col })?;

        // Sheets grow ragged rows on demand; do the same here.
        if target.len() < col {
            target.resize(col, String::new());
        }
        target[col - 1] = value.to_string();
        Ok(())
    }

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, SheetError> {
        if row == 0 || col == 0 {
            return Err(SheetError::OutOfRange { row, col });
        }

        let rows = self.rows.read().await;
        let target = rows
            .get(row - 1)
            .ok_or(SheetError::OutOfRange { row, col })?;
        Ok(target.get(col - 1).cloned().unwrap_or_default())
    }
}
