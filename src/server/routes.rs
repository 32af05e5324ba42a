//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::aggregate::MapMarker;
use crate::auth::AdminSession;
use crate::error::Error;
use crate::exchange::{Category, ExchangeRecord, NewExchange};
use crate::geo::GeoBackend;
use crate::server::state::AppState;
use crate::service::ImportReport;
use crate::store::{FilterState, Stats};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Header carrying the admin session token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Create the API router
pub fn create_router<B: GeoBackend + 'static>(state: Arc<AppState<B>>) -> Router {
    // Try the configured directory first, then next to the executable
    let configured = state.config.server.static_dir.clone();
    let static_path = if std::path::Path::new(&configured).exists() {
        configured
    } else {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&configured)))
            .filter(|path| path.exists())
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or(configured)
    };

    Router::new()
        .route("/api/status", get(status_handler::<B>))
        .route("/api/exchanges", get(exchanges_handler::<B>).post(create_handler::<B>))
        .route("/api/exchanges/:id", put(update_handler::<B>).delete(delete_handler::<B>))
        .route("/api/markers", get(markers_handler::<B>))
        .route("/api/stats", get(stats_handler::<B>))
        .route("/api/filters", get(filters_handler::<B>))
        .route("/api/admin/login", post(login_handler::<B>))
        .route("/api/admin/logout", post(logout_handler::<B>))
        .route("/api/admin/import", post(import_handler::<B>))
        .route("/api/admin/export", get(export_handler::<B>))
        .route("/api/admin/data", delete(clear_handler::<B>))
        .fallback_service(ServeDir::new(&static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "VALIDATION_ERROR" | "CSV_ERROR" | "INVALID_QUERY" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Csv(_) => "CSV_ERROR",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Persistence(_) => "PERSISTENCE_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Build a filter from decoded query pairs
///
/// Accepts `category` repeated or as a comma list (`all` selects every
/// category, including unlabeled records), plus `activity`, `school` and
/// `search`. Without any non-empty `category` the four programs are
/// selected.
pub fn parse_filter(params: &[(String, String)]) -> Result<FilterState, ApiError> {
    let mut filter = FilterState::default();
    let mut categories: Option<BTreeSet<Category>> = None;

    for (key, value) in params {
        match key.as_str() {
            "category" => {
                let labels: Vec<&str> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect();
                if labels.is_empty() {
                    continue;
                }

                let selected = categories.get_or_insert_with(BTreeSet::new);
                for label in labels {
                    if label.eq_ignore_ascii_case("all") {
                        selected.extend(FilterState::all().categories);
                        continue;
                    }
                    let category: Category = label.parse().map_err(|e: String| ApiError {
                        error: e,
                        code: "INVALID_QUERY".to_string(),
                    })?;
                    selected.insert(category);
                }
            }
            "activity" => filter = filter.with_activity(value.as_str()),
            "school" => filter = filter.with_school(value.as_str()),
            "search" => filter = filter.with_search(value.as_str()),
            _ => {}
        }
    }

    if let Some(categories) = categories {
        filter.categories = categories;
    }
    Ok(filter)
}

async fn require_admin<B>(state: &AppState<B>, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    state.admin.authorize(token, Utc::now()).await?;
    Ok(())
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Number of exchanges
    pub exchanges: usize,
    /// Number of distinct destinations
    pub destinations: usize,
    /// Destinations with a stored coordinate
    pub located: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<StatusResponse> {
    let service = state.service.lock().await;
    let store = service.store();

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        exchanges: store.len(),
        destinations: store.unique_destinations().len(),
        located: store.coordinates().len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Exchange list response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangesResponse {
    pub exchanges: Vec<ExchangeRecord>,
    pub count: usize,
}

/// Filtered exchanges
///
/// GET /api/exchanges
async fn exchanges_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ExchangesResponse>, ApiError> {
    let filter = parse_filter(&params)?;
    let service = state.service.lock().await;

    let exchanges: Vec<ExchangeRecord> = service.filter(&filter).into_iter().cloned().collect();
    let count = exchanges.len();
    Ok(Json(ExchangesResponse { exchanges, count }))
}

/// Markers for the filtered exchanges
///
/// GET /api/markers
async fn markers_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<MapMarker>>, ApiError> {
    let filter = parse_filter(&params)?;
    let service = state.service.lock().await;
    Ok(Json(service.markers(&filter)))
}

/// Counts for the filtered exchanges
///
/// GET /api/stats
async fn stats_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Stats>, ApiError> {
    let filter = parse_filter(&params)?;
    let service = state.service.lock().await;
    Ok(Json(service.stats(&filter)))
}

/// Filter choices response
#[derive(Debug, Serialize, Deserialize)]
pub struct FiltersResponse {
    pub activities: Vec<String>,
    pub schools: Vec<String>,
    pub categories: Vec<Category>,
}

/// Values available for the filter controls
///
/// GET /api/filters
async fn filters_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<FiltersResponse> {
    let service = state.service.lock().await;
    let store = service.store();

    Json(FiltersResponse {
        activities: store.unique_activities(),
        schools: store.unique_schools(),
        categories: store.unique_categories(),
    })
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Open an admin session
///
/// POST /api/admin/login
async fn login_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AdminSession>, ApiError> {
    let session = state.admin.login(&req.password, Utc::now()).await?;
    Ok(Json(session))
}

/// End the caller's admin session
///
/// POST /api/admin/logout
async fn logout_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    headers: HeaderMap,
) -> StatusCode {
    if let Some(token) = headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        state.admin.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

/// Add an exchange
///
/// POST /api/exchanges
async fn create_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    headers: HeaderMap,
    Json(req): Json<NewExchange>,
) -> Result<(StatusCode, Json<ExchangeRecord>), ApiError> {
    require_admin(&state, &headers).await?;
    let _geocoding = state.geocoding.lock().await;
    let record = state.service.lock().await.add(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Replace an exchange
///
/// PUT /api/exchanges/:id
async fn update_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(req): Json<NewExchange>,
) -> Result<Json<ExchangeRecord>, ApiError> {
    require_admin(&state, &headers).await?;
    let _geocoding = state.geocoding.lock().await;
    let record = state.service.lock().await.update(id, req).await?;
    Ok(Json(record))
}

/// Delete an exchange
///
/// DELETE /api/exchanges/:id
async fn delete_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers).await?;
    state.service.lock().await.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append exchanges from a `;`-delimited file in the request body
///
/// The paced lookups run without holding the service lock, so the map
/// stays readable during a long import. Other geocoding requests wait.
///
/// POST /api/admin/import
async fn import_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ImportReport>, ApiError> {
    require_admin(&state, &headers).await?;
    let _geocoding = state.geocoding.lock().await;

    let (pending, lookup) = {
        let mut service = state.service.lock().await;
        (service.stage_import(body.as_bytes())?, service.lookup())
    };
    let results = lookup.resolve_each(pending.destinations().to_vec()).await;
    let report = state.service.lock().await.finish_import(pending, results);

    Ok(Json(report))
}

/// Download all exchanges as a file
///
/// GET /api/admin/export
async fn export_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers).await?;
    let csv = state.service.lock().await.export_csv()?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"Utbyten.csv\""),
        ],
        csv,
    ))
}

/// Remove all exchanges and coordinates
///
/// DELETE /api/admin/data
async fn clear_handler<B: GeoBackend>(
    State(state): State<Arc<AppState<B>>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers).await?;
    state.service.lock().await.clear();
    Ok(StatusCode::NO_CONTENT)
}
