pub mod google;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

/// Column layout of the revenue sheet, 1-based. Row 1 is the header row;
/// data rows start at `HEADER_ROWS + 1`.
pub const HEADER_ROWS: usize = 1;
pub const COL_USERNAME: usize = 1;
pub const COL_LINK: usize = 2;
pub const COL_TIME: usize = 3;
pub const COL_STATUS: usize = 4;
pub const COL_CPM: usize = 5;
pub const COL_VIEWS: usize = 6;
pub const COL_EARNINGS: usize = 7;
pub const COL_REASON: usize = 8;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheet API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("service account auth failed: {0}")]
    Auth(String),

    #[error("cannot load credentials: {0}")]
    Credentials(String),

    #[error("cell ({row}, {col}) is out of range")]
    OutOfRange { row: usize, col: usize },
}

/// Append-only audit mirror of the submission workflow. Rows and columns are
/// 1-based to match the spreadsheet UI.
///
/// Implement this trait to swap the backing spreadsheet out for a test
/// double or another provider.
#[async_trait]
pub trait RevenueSheet: Send + Sync {
    /// Every row in the sheet, header row included. Trailing empty cells may
    /// be absent, so rows are not guaranteed to be the same width.
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, SheetError>;

    /// Append a row after the last data row.
    async fn append_row(&self, cells: Vec<String>) -> Result<(), SheetError>;

    /// Overwrite a single cell.
    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), SheetError>;

    /// Read a single cell; an unset cell reads as an empty string.
    async fn read_cell(&self, row: usize, col: usize) -> Result<String, SheetError>;
}
