//! HTTP surface: the extraction endpoint, health probe and optional static files.

use crate::ai::{FieldExtractionService, GroqVisionClient};
use crate::models::{Config, ExtractRequest, ExtractResponse};
use crate::{fields, prompts, Error, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const EXTRACT_PATH: &str = "/api/extract";

/// Per-process dependencies shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider credential was configured.
    extractor: Option<Arc<dyn FieldExtractionService>>,
}

impl AppState {
    pub fn new(extractor: Option<Arc<dyn FieldExtractionService>>) -> Self {
        Self { extractor }
    }
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub extractor: Option<Arc<dyn FieldExtractionService>>,
}

/// Wires configuration and services into an axum router and serves it.
pub struct App {
    state: AppState,
    max_body_bytes: usize,
    static_dir: Option<PathBuf>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let extractor = GroqVisionClient::from_config(config, reqwest::Client::new()).map(
            |client| {
                info!("Using Groq model {}", client.model());
                Arc::new(client) as Arc<dyn FieldExtractionService>
            },
        );
        if extractor.is_none() {
            warn!("GROQ_API_KEY not set; extraction requests will be answered with 503");
        }

        Self::with_services(AppServices { extractor }, config.max_body_bytes)
    }

    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, max_body_bytes: usize) -> Self {
        Self {
            state: AppState::new(services.extractor),
            max_body_bytes,
            static_dir: None,
        }
    }

    /// Serve a web client from `dir` for every path the API does not own.
    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = Some(dir);
        self
    }

    pub fn router(&self) -> Router {
        let router = Router::new()
            .route(EXTRACT_PATH, any(extract_handler))
            .route("/health", get(health_handler));

        let router = match &self.static_dir {
            Some(dir) => router.fallback_service(SetResponseHeader::overriding(
                ServeDir::new(dir),
                CACHE_CONTROL,
                HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
            )),
            None => router.fallback(not_found_handler),
        };

        router
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on http://{}", listener.local_addr()?);
        if let Some(dir) = &self.static_dir {
            info!("Serving static files from {}", dir.display());
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// `/api/extract` for every method; anything but `POST` and `OPTIONS` is refused.
async fn extract_handler(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return preflight_response();
    }

    match extract(&state, &method, &body).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}

fn preflight_response() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}

async fn extract(
    state: &AppState,
    method: &Method,
    body: &std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    if method != Method::POST {
        return Err(Error::MethodNotAllowed);
    }

    let extractor = state.extractor.as_ref().ok_or(Error::NotConfigured)?;

    // Body buffering is judged only after the method and credential gates.
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(Error::PayloadTooLarge)
        }
        Err(rejection) => return Err(Error::BadRequest(rejection.body_text())),
    };

    let request: ExtractRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ExtractRequest::default()
    } else {
        serde_json::from_slice(body)
            .map_err(|e| Error::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let image = request.image()?;
    let prompt = prompts::extraction_prompt(request.prompt.as_deref());

    info!(
        mime_type = %image.mime_type,
        data_len = image.data64.len(),
        custom_prompt = prompt != prompts::EXTRACTION_DEFAULT,
        "Extracting document fields"
    );

    let raw = extractor.extract_fields(&image, prompt).await?;
    let parsed = fields::parse_fields(&raw)?;
    let response = ExtractResponse::from_fields(&parsed)?;

    Ok(([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(response)).into_response())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Error {
    Error::NotFound
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
