use std::sync::Arc;

use lxm_db::Database;
use lxm_sheets::RevenueSheet;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub sheet: Arc<dyn RevenueSheet>,
    /// Spreadsheet URL base the per-creator dashboard links are derived from.
    pub dashboard_base: String,
}
