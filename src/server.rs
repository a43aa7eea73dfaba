//! Axum application: state, router, JSON API handlers
//!
//! Three HTML pages (home, prediction form, dashboard) plus a small JSON
//! API mirroring them. The model is loaded once at startup and shared
//! read-only; the dataset is re-read from disk on every dashboard request.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::dashboard::Dashboard;
use crate::data;
use crate::features::PatientInput;
use crate::model::ChargesModel;
use crate::web::handlers::pages;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, immutable for the process lifetime.
    /// `None` when the artifact failed to load: prediction requests then
    /// return an error while the rest of the UI keeps serving.
    pub model: Option<Arc<ChargesModel>>,
    pub dataset_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(model_path: &Path, dataset_path: &Path) -> Self {
        let model = match ChargesModel::load(model_path) {
            Ok(model) => {
                tracing::info!(
                    "Loaded charges model from {} ({} trees)",
                    model_path.display(),
                    model.n_trees()
                );
                Some(Arc::new(model))
            }
            Err(e) => {
                tracing::error!("Failed to load charges model: {}", e);
                None
            }
        };

        Self {
            model,
            dataset_path: Arc::new(dataset_path.to_path_buf()),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // HTML pages
        .route("/", get(pages::home_page))
        .route("/predict", get(pages::predict_page).post(pages::predict_submit))
        .route("/dashboard", get(pages::dashboard_page))
        // JSON API
        .route("/health", get(health_check))
        .route("/api/predict", post(predict))
        .route("/api/dashboard", get(dashboard_json))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// One synchronous predict call per request; no retry, no batching, no
/// per-input caching.
async fn predict(
    State(state): State<AppState>,
    Json(input): Json<PatientInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let model = state.model.as_ref().ok_or(AppError::ModelUnavailable)?;

    let features = input.features();
    let charges = model.predict_charges(&features);

    tracing::debug!("Predicted charges {:.2} for features {:?}", charges, features);

    Ok(Json(serde_json::json!({
        "charges_usd": charges,
        "features": features,
    })))
}

async fn dashboard_json(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let df = data::load_dataset(&state.dataset_path)
        .map_err(|e| AppError::Dataset(e.to_string()))?;

    Ok(Json(Dashboard::from_dataframe(&df)))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    ModelUnavailable,
    Dataset(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Prediction model is not loaded; check the model artifact and restart".to_string(),
            ),
            AppError::Dataset(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
