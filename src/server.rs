use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, Response, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::PortalResponse;
use crate::ena::EnaTransport;
use crate::error::FilterError;
use crate::pipeline::FilterPipeline;

const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Inbound body of `POST /api/ena`.
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub filter: String,
}

struct AppState<T: EnaTransport> {
    pipeline: Arc<FilterPipeline<T>>,
}

impl<T: EnaTransport> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

pub fn router<T: EnaTransport + 'static>(pipeline: FilterPipeline<T>) -> Router {
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    Router::new()
        .route("/api/ena", post(query::<T>))
        .route("/health", get(health))
        .with_state(state)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

/// Serves the query endpoint until the process is stopped.
pub fn serve<T: EnaTransport + 'static>(
    pipeline: FilterPipeline<T>,
    bind_addr: &str,
) -> Result<(), FilterError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| FilterError::Server(format!("failed to build tokio runtime: {err}")))?;

    let bind_addr = bind_addr.to_string();
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|err| FilterError::Server(format!("failed to bind {bind_addr}: {err}")))?;
        info!(%bind_addr, "listening");
        axum::serve(listener, router(pipeline))
            .await
            .map_err(|err| FilterError::Server(format!("axum server failed: {err}")))
    })
}

async fn health() -> impl IntoResponse {
    json_response(StatusCode::OK, br#"{"status":"ok"}"#.to_vec())
}

async fn query<T: EnaTransport + 'static>(
    State(state): State<AppState<T>>,
    request: Request<Body>,
) -> Response<Body> {
    let bytes = match to_bytes(request.into_body(), MAX_REQUEST_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return envelope(PortalResponse::error(400, format!("request body error: {err}")));
        }
    };
    let FilterRequest { filter } = match serde_json::from_slice::<FilterRequest>(&bytes) {
        Ok(request) => request,
        Err(err) => {
            return envelope(PortalResponse::error(400, format!("invalid request body: {err}")));
        }
    };

    let pipeline = Arc::clone(&state.pipeline);
    match tokio::task::spawn_blocking(move || pipeline.handle(&filter)).await {
        Ok(response) => envelope(response),
        Err(err) => {
            error!("pipeline task failed: {err}");
            envelope(PortalResponse::error(500, format!("pipeline task failed: {err}")))
        }
    }
}

fn envelope(response: PortalResponse) -> Response<Body> {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match serde_json::to_vec(&response.body) {
        Ok(body) => json_response(status, body),
        Err(err) => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"count": 0, "data": [], "error": err.to_string()})
                .to_string()
                .into_bytes(),
        ),
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Body> {
    let mut out = Response::new(Body::from(body));
    *out.status_mut() = status;
    out.headers_mut().insert(
        CONTENT_TYPE,
        axum::http::HeaderValue::from_static("application/json"),
    );
    out
}
