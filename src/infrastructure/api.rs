//! HTTP front end
//!
//! Two read-only routes over the snapshot store:
//! - `GET /` renders the page template against the current batch
//! - `GET /products-csv` exports the batch as CSV, rows in reverse order
//!
//! Both hold the store's read lock while rendering, so every response
//! reflects exactly one published batch.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::core::{Batch, SnapshotStore};
use crate::infrastructure::metrics::BoardMetrics;
use crate::infrastructure::template::{PageTemplate, TemplateError};
use crate::{log_api, BoardError};

/// CSV column names
pub const CSV_HEADER: [&str; 3] = ["ID", "Telegram Username", "Product"];

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub metrics: Arc<BoardMetrics>,
    /// Directory containing templates/index.html
    pub template_root: Arc<PathBuf>,
}

/// Per-request failures
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    CsvFlush(String),

    #[error("timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Build the router; `/products-csv` is mounted only when `csv_export` is set
pub fn router(state: AppState, csv_export: bool) -> Router {
    let mut app = Router::new().route("/", get(page_handler));

    if csv_export {
        app = app.route("/products-csv", get(csv_handler));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve until `shutdown` is cancelled
pub async fn start_server(
    state: AppState,
    listen_addr: &str,
    csv_export: bool,
    shutdown: CancellationToken,
) -> Result<(), BoardError> {
    let app = router(state, csv_export);

    let listener = TcpListener::bind(listen_addr)
        .await
        .map_err(|e| BoardError::Bind(listen_addr.to_string(), e))?;
    log_api!(Level::INFO, "Server started on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    log_api!(Level::INFO, "Server stopped");
    Ok(())
}

/// Handler for `/`
async fn page_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let result = render_page(&state).await;
    match &result {
        Ok(_) => state.metrics.record_page_render(),
        Err(e) => {
            state.metrics.record_failure();
            log_api!(Level::WARN, "Page render failed: {}", e);
        }
    }
    result.map(Html)
}

async fn render_page(state: &AppState) -> Result<String, ApiError> {
    let template = PageTemplate::load(&state.template_root).await?;
    let html = state.store.read(|batch| template.render(batch))?;
    Ok(html)
}

/// Handler for `/products-csv`
async fn csv_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (body, disposition) = match export_csv(&state, OffsetDateTime::now_utc()) {
        Ok(export) => export,
        Err(e) => {
            state.metrics.record_failure();
            log_api!(Level::WARN, "CSV export failed: {}", e);
            return Err(e);
        }
    };
    state.metrics.record_csv_export();

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

fn export_csv(state: &AppState, now: OffsetDateTime) -> Result<(Vec<u8>, String), ApiError> {
    let disposition = format!("attachment;filename={}.csv", export_timestamp(now)?);
    let body = state.store.read(write_csv)?;
    Ok((body, disposition))
}

/// Serialize a batch: header row, then records last-generated first
pub fn write_csv(batch: &Batch) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::with_capacity(batch.len() * 64));

    writer.write_record(CSV_HEADER)?;
    for record in batch.records().iter().rev() {
        writer.write_record(record.csv_row())?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::CsvFlush(e.error().to_string()))
}

/// RFC 3339 UTC timestamp at whole-second precision
///
/// Fails for years RFC 3339 cannot express.
pub fn export_timestamp(now: OffsetDateTime) -> Result<String, ApiError> {
    let now = now.to_offset(time::UtcOffset::UTC);
    let whole_seconds = now.replace_nanosecond(0).unwrap_or(now);
    Ok(whole_seconds.format(&Rfc3339)?)
}
