//! HTTP routes of the processing node

use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use guidepath_core::config::GuideConfig;
use guidepath_core::protocol::{
    AnalyzeRequest, AnalyzeResponse, HealthResponse, ANALYZE_PATH, HEALTH_PATH, IMAGE_FIELD,
};
use guidepath_core::{navigate, ChangeDebounce, Detection};
use guidepath_eye::{DebugArtifacts, PathDetector, VisionError};
use guidepath_spk::Narrator;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state of the processing node
#[derive(Clone)]
pub struct ApiState {
    pub detector: Arc<PathDetector>,
    pub narrator: Narrator,
    /// Last announced instruction, shared by all requests
    pub spoken: Arc<Mutex<ChangeDebounce>>,
    pub debug: Option<Arc<DebugArtifacts>>,
    pub max_body_bytes: usize,
}

impl ApiState {
    pub fn new(config: &GuideConfig, narrator: Narrator) -> Self {
        let debug = config
            .server
            .debug_artifacts
            .then(|| Arc::new(DebugArtifacts::new(config.server.debug_dir.clone())));

        Self {
            detector: Arc::new(PathDetector::new(config.clone())),
            narrator,
            spoken: Arc::new(Mutex::new(ChangeDebounce::new())),
            debug,
            max_body_bytes: config.server.max_body_bytes,
        }
    }
}

/// Create HTTP router with the analysis and health routes
pub fn create_router(state: ApiState) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .route(ANALYZE_PATH, post(analyze_handler))
        .route(HEALTH_PATH, get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::running())
}

async fn analyze_handler(
    State(state): State<ApiState>,
    request: Request,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let bytes = extract_image(&state, request).await?;
    let detection = run_detection(&state, bytes).await?;

    let navigation = navigate(&detection);
    let announce = state.spoken.lock().observe(&navigation);
    if announce {
        info!("{}", navigation.message);
        state.narrator.submit(navigation.message.clone());
    }

    Ok(Json(AnalyzeResponse::new(detection, navigation)))
}

/// Pull the encoded frame out of a multipart upload or a base64 JSON body
async fn extract_image(state: &ApiState, request: Request) -> Result<Bytes, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|_| ApiError::NoImage)?;
        while let Some(field) = multipart.next_field().await.map_err(|_| ApiError::NoImage)? {
            if field.name() == Some(IMAGE_FIELD) {
                return field.bytes().await.map_err(|_| ApiError::NoImage);
            }
        }
        Err(ApiError::NoImage)
    } else if content_type.starts_with("application/json") {
        let body = axum::body::to_bytes(request.into_body(), state.max_body_bytes)
            .await
            .map_err(|_| ApiError::NoImage)?;
        let payload: AnalyzeRequest = serde_json::from_slice(&body).map_err(|_| ApiError::NoImage)?;
        let bytes = STANDARD
            .decode(payload.image.trim())
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Bytes::from(bytes))
    } else {
        Err(ApiError::NoImage)
    }
}

/// Decode and analyze off the async workers, then persist debug images
async fn run_detection(state: &ApiState, bytes: Bytes) -> Result<Detection, ApiError> {
    let detector = state.detector.clone();
    let artifacts = state.debug.clone();

    let detection = tokio::task::spawn_blocking(move || -> Result<Detection, VisionError> {
        let analysis = detector.analyze_bytes(&bytes)?;
        if let Some(artifacts) = artifacts {
            if let Err(e) = artifacts.write(&analysis) {
                warn!("Failed to write debug artifacts to {}: {}", artifacts.dir().display(), e);
            }
        }
        Ok(analysis.detection)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("analysis task failed: {}", e)))??;

    Ok(detection)
}
