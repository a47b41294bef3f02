// 🌐 Web API - form + JSON endpoints over a NumerologyService

use crate::calculator::{self, CalculationResult, LetterValue};
use crate::history::{HistoryFilter, HistoryRecord, HistoryStore};
use crate::service::{NumerologyService, Submission};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
pub struct AppState<S: HistoryStore> {
    service: Arc<Mutex<NumerologyService<S>>>,
}

impl<S: HistoryStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: HistoryStore> AppState<S> {
    pub fn new(service: NumerologyService<S>) -> Self {
        AppState {
            service: Arc::new(Mutex::new(service)),
        }
    }

    /// A panic mid-request can't leave the service half-updated, so a
    /// poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, NumerologyService<S>> {
        self.service.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message),
    };
    (status, Json(body)).into_response()
}

/// Either `name`, or the two form fields
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CalculateRequest {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
struct CalculationResponse {
    name: String,
    /// Letters actually counted, e.g. "JOHN"
    normalized: String,
    value: u32,
    is_master: bool,
    meaning: Option<&'static str>,
    letters: Vec<LetterValue>,
    sum: u32,
    reductions: Vec<u32>,
    breakdown: String,
    saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<HistoryRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_warning: Option<String>,
}

impl From<Submission> for CalculationResponse {
    fn from(submission: Submission) -> Self {
        let Submission {
            result,
            previous,
            saved,
            storage_warning,
        } = submission;
        let meaning = result.meaning();
        let breakdown = result.breakdown();
        let normalized = result.normalized();
        let CalculationResult {
            name,
            letters,
            sum,
            reductions,
            value,
            is_master,
        } = result;

        Self {
            name,
            normalized,
            value,
            is_master,
            meaning,
            letters,
            sum,
            reductions,
            breakdown,
            saved: saved.is_some(),
            previous,
            storage_warning,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Comma-separated result values, e.g. `2,11`
    pub values: Option<String>,
}

impl HistoryQuery {
    fn filter(&self) -> Result<HistoryFilter, String> {
        let Some(raw) = self.values.as_deref() else {
            return Ok(HistoryFilter::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| format!("Invalid filter value: {:?}", part))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(HistoryFilter::from_values)
    }
}

#[derive(Serialize)]
struct MeaningEntry {
    value: u32,
    is_master: bool,
    meaning: &'static str,
}

#[derive(Serialize)]
struct TableEntry {
    digit: u8,
    letters: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/calculate - Compute and append to history
async fn calculate<S: HistoryStore + Send + 'static>(
    State(state): State<AppState<S>>,
    request: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };
    let mut service = state.lock();

    let outcome = match &request.name {
        Some(name) => service.submit(name),
        None => service.submit_parts(
            request.first_name.as_deref().unwrap_or(""),
            request.last_name.as_deref().unwrap_or(""),
        ),
    };

    match outcome {
        Ok(submission) => {
            info!(value = submission.result.value, "calculated");
            let body = CalculationResponse::from(submission);
            (StatusCode::OK, Json(ApiResponse::ok(body))).into_response()
        }
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    }
}

/// GET /api/history?values=2,11 - Newest first, optionally filtered
async fn history<S: HistoryStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let service = state.lock();
    match service.history(&filter) {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::ok(records))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to load history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/meanings - Every possible value with its meaning
async fn meanings() -> impl IntoResponse {
    let entries: Vec<MeaningEntry> = calculator::possible_values()
        .filter_map(|value| {
            calculator::meaning(value).map(|meaning| MeaningEntry {
                value,
                is_master: calculator::is_master_number(value),
                meaning,
            })
        })
        .collect();
    Json(ApiResponse::ok(entries))
}

/// GET /api/table - Letter table in use
async fn table<S: HistoryStore + Send + 'static>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let groups = state.lock().calculator().letter_map().groups();
    let entries: Vec<TableEntry> = groups
        .into_iter()
        .map(|(digit, letters)| TableEntry {
            digit,
            letters: letters.iter().map(|l| l.as_char()).collect(),
        })
        .collect();
    Json(ApiResponse::ok(entries))
}

/// GET / - Serve the form
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S: HistoryStore + Send + 'static>(service: NumerologyService<S>) -> Router {
    let state = AppState::new(service);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/calculate", post(calculate::<S>))
        .route("/history", get(history::<S>))
        .route("/meanings", get(meanings))
        .route("/table", get(table::<S>))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
