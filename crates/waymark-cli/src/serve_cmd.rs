use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use waymark_core::api::{
    AiServices, ErrorResponse, GenerateRoadmapBody, HealthResponse, IndexResponse,
    InstructionsBody, InstructionsResponse, LegacyRoadmapResponse, RoadmapResponse,
    ServiceStatus, timestamp_now,
};
use waymark_core::{
    GenerationSettings, Orchestrator, ProviderKind, ProviderRegistry, ProvidersConfig,
    ValidationError,
};

use crate::config::ServerConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Panic handler for [`CatchPanicLayer`]: a generic 500 with no details.
fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct ServerState {
    pub orchestrator: Orchestrator,
    pub port: u16,
    pub environment: String,
}

impl ServerState {
    pub fn new(orchestrator: Orchestrator, server: &ServerConfig) -> Self {
        Self {
            orchestrator,
            port: server.port,
            environment: server.environment.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// CORS from the configured allow-list. A `*` entry allows any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.iter().any(|o| o.trim() == "*") {
        return Ok(CorsLayer::permissive());
    }
    let values = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim()).with_context(|| format!("invalid CORS origin: {o:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn build_router(state: Arc<ServerState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/generate-roadmap", post(generate_roadmap))
        .route("/api/v2/generate-roadmap", post(generate_roadmap))
        .route("/api/v1/generate-roadmap", post(generate_roadmap_v1))
        .route("/api/instructions", post(generate_instructions))
        .route("/api/generate-instructions", post(generate_instructions))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(server: &ServerConfig, providers: &ProvidersConfig) -> Result<()> {
    let registry =
        ProviderRegistry::from_config(providers).context("failed to build provider clients")?;
    for kind in registry.list() {
        tracing::info!(provider = %kind, configured = registry.is_configured(kind), "provider registered");
    }
    if registry.list().iter().all(|kind| !registry.is_configured(*kind)) {
        tracing::warn!("no AI provider configured; all responses will use fallback content");
    }

    let orchestrator = Orchestrator::new(Arc::new(registry), GenerationSettings::default());
    let state = Arc::new(ServerState::new(orchestrator, server));
    let app = build_router(state, cors_layer(&server.allowed_origins)?);

    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", server.bind, server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(environment = %server.environment, "waymark serve listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("waymark serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse::default())
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let registry = state.orchestrator.registry();
    let gemini = registry.is_configured(ProviderKind::Gemini);
    let mistral = registry.is_configured(ProviderKind::Mistral);
    Json(HealthResponse {
        success: true,
        status: "healthy".to_owned(),
        gemini_configured: gemini,
        mistral_configured: mistral,
        port: state.port,
        environment: state.environment.clone(),
        ai_services: AiServices {
            gemini: ServiceStatus::new(gemini),
            mistral: ServiceStatus::new(mistral),
        },
        timestamp: timestamp_now(),
    })
}

async fn generate_roadmap(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<GenerateRoadmapBody>, JsonRejection>,
) -> Result<Json<RoadmapResponse>, AppError> {
    let Json(body) = body?;
    let request = body.validate()?;
    tracing::info!(category = %request.category(), "roadmap requested");

    let generated = state.orchestrator.generate_roadmap(&request).await;
    Ok(Json(RoadmapResponse::new(&request, generated)))
}

async fn generate_roadmap_v1(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<GenerateRoadmapBody>, JsonRejection>,
) -> Result<Json<LegacyRoadmapResponse>, AppError> {
    let Json(body) = body?;
    let request = body.validate()?;
    tracing::info!(category = %request.category(), "legacy roadmap requested");

    let generated = state.orchestrator.generate_roadmap(&request).await;
    Ok(Json(LegacyRoadmapResponse::from(generated)))
}

async fn generate_instructions(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<InstructionsBody>, JsonRejection>,
) -> Result<Json<InstructionsResponse>, AppError> {
    let Json(body) = body?;
    let request = body.validate()?;
    tracing::info!(
        category = %request.category,
        preference = %request.preference,
        "instructions requested"
    );

    let generated = state.orchestrator.generate_instructions(&request).await;
    Ok(Json(InstructionsResponse::from(generated)))
}

async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("route {method} {} not found", uri.path()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
