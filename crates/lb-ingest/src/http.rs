//! HTTP ingestion endpoint for Spline agents
//!
//! Agents post gzip-compressed lineage to `/api/<application>/...`. The
//! payload is decompressed and landed; when a [`LandingProcessor`] is
//! attached the landed file is translated and uploaded in the background.

use crate::decompress::gunzip;
use crate::error::{IngestError, IngestResult};
use crate::landing::{landing_path_for, LandingStore};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use chrono::Utc;
use lb_core::IngestConfig;
use lb_engine::LandingProcessor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Spline protocol version advertised on status checks
pub const SPLINE_API_VERSION_HEADER: &str = "ABSA-Spline-API-Version";
/// Request encodings accepted by the endpoint
pub const SPLINE_ACCEPT_ENCODING_HEADER: &str = "ABSA-Spline-Accept-Request-Encoding";

const WRONG_ENDPOINT: &str = "STATUS : wrong endpoint";
const STATUS_OK: &str = "STATUS : Everything's working";
const NOT_GZIP: &str = "Input file was not compressed gzip";
const LANDED: &str = "Everything's working";

/// State shared by every request
#[derive(Clone)]
pub struct IngestState {
    store: Arc<dyn LandingStore>,
    zone: String,
    source: String,
    processor: Option<LandingProcessor>,
}

impl IngestState {
    pub fn new(store: Arc<dyn LandingStore>, config: &IngestConfig) -> Self {
        Self {
            store,
            zone: config.zone.clone(),
            source: config.source.clone(),
            processor: None,
        }
    }

    /// Translate and upload every landed file in a background task.
    pub fn with_processor(mut self, processor: LandingProcessor) -> Self {
        self.processor = Some(processor);
        self
    }
}

/// Build the ingestion router.
pub fn router(state: IngestState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api", any(wrong_endpoint))
        .route("/api/", any(wrong_endpoint))
        .route("/api/{*param}", get(ingest).post(ingest))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

/// Serve the ingestion endpoint until Ctrl+C.
pub async fn serve(bind: &str, state: IngestState, max_body_bytes: usize) -> IngestResult<()> {
    let addr: SocketAddr = bind.parse().map_err(|e| IngestError::Bind {
        addr: bind.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| IngestError::Bind {
            addr: bind.to_string(),
            source,
        })?;
    log::info!("Ingestion endpoint listening on http://{}/api", addr);

    axum::serve(listener, router(state, max_body_bytes))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Could not install Ctrl+C handler: {}", e);
            }
            log::info!("Shutting down ingestion endpoint");
        })
        .await
        .map_err(IngestError::Serve)
}

async fn wrong_endpoint() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, WRONG_ENDPOINT).into_response()
}

async fn ingest(
    State(state): State<IngestState>,
    Path(param): Path<String>,
    body: Bytes,
) -> Response {
    let (application, endpoint) = match param.split_once('/') {
        Some((application, endpoint)) if !application.is_empty() => (application, endpoint),
        _ => {
            log::info!("{} called without a Spline endpoint", param);
            return wrong_endpoint().await;
        }
    };

    if endpoint == "status" || endpoint == format!("{application}/status") {
        return (
            StatusCode::OK,
            [
                (SPLINE_API_VERSION_HEADER, "1"),
                (SPLINE_ACCEPT_ENCODING_HEADER, "gzip"),
            ],
            STATUS_OK,
        )
            .into_response();
    }

    let payload = match gunzip(&body) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Rejecting payload for {}/{}: {}", application, endpoint, e);
            return (StatusCode::NO_CONTENT, NOT_GZIP).into_response();
        }
    };

    let landing = landing_path_for(&state.zone, &state.source, application, Utc::now());
    let written = match state.store.write(&landing, &payload).await {
        Ok(written) => written,
        Err(e) => {
            log::error!("{}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    if let Some(processor) = state.processor {
        tokio::spawn(process_landed(processor, written));
    }

    (StatusCode::OK, LANDED).into_response()
}

async fn process_landed(processor: LandingProcessor, path: PathBuf) {
    match processor.process_file(&path).await {
        Ok(Some(outcome)) => log::info!(
            "Processed {} into {}",
            path.display(),
            outcome.process_qualified_name
        ),
        Ok(None) => {}
        Err(e) => log::error!("Failed to process {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landing::FsLandingStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(root: &std::path::Path) -> Router {
        let state = IngestState::new(
            Arc::new(FsLandingStore::new(root)),
            &IngestConfig::default(),
        );
        router(state, 1024)
    }

    #[tokio::test]
    async fn test_bare_api_is_wrong_endpoint() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = app(temp.path())
            .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = app(temp.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/RAP/execution-events")
                    .header("content-length", "4096")
                    .body(Body::from(vec![0u8; 4096]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
