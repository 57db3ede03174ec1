//! HTTP API for threadsense
//!
//! Endpoints:
//! - POST /analyze - Analyze one thread
//! - GET /calibration - Current normalization bounds
//! - GET /health - Health check

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::analyzer::ThreadAnalyzer;
use crate::core::providers::{select_providers, PrecomputedSignals};
use crate::types::{
    parse_unbounded, AnalysisConfig, NormalizationSession, RawThread, SharedNormalization, ThreadError,
    ThreadReport,
};

/// App state
pub struct AppState {
    pub config: AnalysisConfig,
    pub session: SharedNormalization,
}

/// Analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub thread: RawThread,
    pub signals: Option<PrecomputedSignals>,
    pub clusters: Option<usize>,
    pub neutral_threshold: Option<f64>,
    #[serde(default)]
    pub independent_normalization: bool,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Calibration response
#[derive(Debug, Serialize)]
pub struct CalibrationResponse {
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub observations: u64,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the API router with a fresh process-wide session
pub fn create_router(config: AnalysisConfig) -> Router {
    let state = Arc::new(AppState {
        config,
        session: NormalizationSession::new().shared(),
    });

    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/calibration", get(calibration))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Analyze one thread
///
/// Uses the server session unless the request asks for an independent one.
/// The metrics run on a blocking thread; the session lock is held only while
/// the coalition spread is recorded.
async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ThreadReport>, ApiError> {
    let req: AnalyzeRequest = parse_unbounded(&body).map_err(|err| {
        warn!(error = %err, "analyze request body rejected");
        error_response(StatusCode::BAD_REQUEST, &err.to_string())
    })?;

    let mut config = state.config.clone();
    if let Some(k) = req.clusters {
        config.clusters = k;
    }
    if let Some(t) = req.neutral_threshold {
        config.neutral_threshold = t;
    }

    let analyzer = ThreadAnalyzer::new(config);
    let (embedder, scorer) = select_providers(req.signals);
    let thread = req.thread;

    let prepared = tokio::task::spawn_blocking(move || {
        analyzer.prepare_raw(&thread, embedder.as_ref(), scorer.as_ref())
    })
    .await
    .map_err(|err| {
        warn!(error = %err, "analysis task failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "analysis task failed")
    })?;

    let prepared = prepared.map_err(|err| {
        warn!(error = %err, "analyze request rejected");
        error_response(status_for(&err), &err.to_string())
    })?;

    let report = if req.independent_normalization {
        prepared.finish(&mut NormalizationSession::new())
    } else {
        prepared.finish(&mut NormalizationSession::lock(&state.session))
    };

    info!(comments = report.comment_count, "analyze request served");
    Ok(Json(report))
}

/// Current normalization bounds
async fn calibration(State(state): State<Arc<AppState>>) -> Json<CalibrationResponse> {
    let session = NormalizationSession::lock(&state.session);

    Json(CalibrationResponse {
        min_score: session.min_score.is_finite().then_some(session.min_score),
        max_score: session.max_score.is_finite().then_some(session.max_score),
        observations: session.observations,
    })
}

fn status_for(err: &ThreadError) -> StatusCode {
    match err {
        e if e.is_input_error() => StatusCode::BAD_REQUEST,
        ThreadError::Provider(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Run the API server
pub async fn run_server(addr: &str, config: AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "threadsense API listening");
    println!("threadsense API running on {}", addr);
    println!("  POST /analyze      - Analyze a thread");
    println!("  GET  /calibration  - Normalization bounds");
    println!("  GET  /health       - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
