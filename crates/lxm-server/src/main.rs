use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use lxm_api::state::{AppState, AppStateInner};
use lxm_api::{admin, announcements, creators, imports, submissions};
use lxm_sheets::RevenueSheet;
use lxm_sheets::google::GoogleSheet;
use lxm_sheets::memory::MemorySheet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lxm=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("LXM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LXM_PORT")
        .unwrap_or_else(|_| "10000".into())
        .parse()?;
    let db_path = std::env::var("LXM_DB_PATH").unwrap_or_else(|_| "submissions.db".into());
    let sheet_id = std::env::var("LXM_SHEET_ID").unwrap_or_default();
    let worksheet = std::env::var("LXM_SHEET_RANGE").unwrap_or_else(|_| "Creators".into());

    // Init ledger
    let db = lxm_db::Database::open(&PathBuf::from(&db_path))?;

    // Revenue sheet: the Google client when credentials are injected,
    // otherwise an in-memory sheet so the workflow stays usable in dev.
    let sheet: Arc<dyn RevenueSheet> = match std::env::var("LXM_SHEET_CREDENTIALS") {
        Ok(creds_path) if !creds_path.is_empty() => {
            if sheet_id.is_empty() {
                anyhow::bail!("LXM_SHEET_ID must be set when LXM_SHEET_CREDENTIALS is configured");
            }
            let sheet =
                GoogleSheet::from_credentials_file(Path::new(&creds_path), &sheet_id, &worksheet)?;
            info!("Revenue sheet: spreadsheet {} / worksheet {}", sheet_id, worksheet);
            Arc::new(sheet)
        }
        _ => {
            warn!("LXM_SHEET_CREDENTIALS not set; using the in-memory revenue sheet (dev mode)");
            Arc::new(MemorySheet::new())
        }
    };

    let dashboard_base = if sheet_id.is_empty() {
        "https://docs.google.com/spreadsheets/d/dev".to_string()
    } else {
        format!("https://docs.google.com/spreadsheets/d/{sheet_id}")
    };

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        sheet,
        dashboard_base,
    });

    // Routes
    let app = Router::new()
        .route(
            "/creators",
            get(creators::list_creators).post(creators::onboard_creator),
        )
        .route("/creators/{id}", delete(creators::delete_creator))
        .route("/creators/{id}/cpm", post(creators::update_cpm))
        .route("/creators/{id}/dashboard", get(creators::creator_dashboard))
        .route(
            "/creators/{creator_id}/submissions",
            post(submissions::create_submission),
        )
        .route("/submissions", get(submissions::list_submissions))
        .route("/submissions/{id}/approve", post(submissions::approve))
        .route("/submissions/{id}/reject", post(submissions::reject))
        .route("/submissions/{id}/rereview", post(submissions::rereview))
        .route(
            "/announcements",
            get(announcements::list_announcements).post(announcements::send_announcement),
        )
        .route("/imports/views", post(imports::upload_views_report))
        .route("/clear", post(admin::clear_data))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("LXM server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
