//! Framework front end.
//!
//! # Responsibilities
//! - Serve the HTCPCP routes through Axum and the tower-http middleware stack
//! - Convert framework requests into `ParsedRequest` and back
//! - Share the dispatcher (and pot store) with the raw TCP front end
//!
//! # Design Decisions
//! - A single fallback handler: routing stays in our `Router`, so both front
//!   ends answer identically
//! - Protocol headers are stamped by middleware instead of the encoder
//! - Connection management (keep-alive, HTTP/2) is left to hyper

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response as AxumResponse};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::request::ParsedRequest;
use crate::http::response::{Response, CONTENT_TYPE_JSON};
use crate::http::server::{dispatch_catching, ServerError};
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::routing::Router;

const X_PROTOCOL: HeaderName = HeaderName::from_static("x-protocol");
const X_RFC: HeaderName = HeaderName::from_static("x-rfc");
const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

/// Build the Axum application around `router`.
#[allow(deprecated)]
pub fn build_app(router: Arc<Router>, config: &ServerConfig) -> axum::Router {
    axum::Router::new()
        .fallback(dispatch)
        .with_state(router)
        .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.read_secs)))
        .layer(SetResponseHeaderLayer::overriding(
            X_PROTOCOL,
            HeaderValue::from_static("HTCPCP/1.0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_RFC,
            HeaderValue::from_static("RFC-2324, RFC-7168"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_POWERED_BY,
            HeaderValue::from_static("Coffee"),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve `app` on `listener` until `shutdown` fires.
pub async fn serve(
    app: axum::Router,
    listener: TcpListener,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTCPCP framework server starting");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(wait_for(shutdown))
        .await?;

    tracing::info!("HTCPCP framework server stopped");
    Ok(())
}

async fn dispatch(State(router): State<Arc<Router>>, request: Request) -> AxumResponse {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let mut parsed = ParsedRequest::new(parts.method.as_str(), parts.uri.path());
    for (name, value) in &parts.headers {
        parsed
            .headers
            .insert(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
    }

    // The body limit layer has already rejected oversized declared lengths.
    parsed.body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Failed to read request body");
            return into_axum(&Response::bad_request(), &parsed.method, start);
        }
    };

    let response = dispatch_catching(&router, &parsed, &request_id);
    into_axum(&response, &parsed.method, start)
}

fn into_axum(response: &Response, method: &str, start: Instant) -> AxumResponse {
    let encoded = StatusCode::from_u16(response.status())
        .ok()
        .zip(response.body_bytes().ok());

    let (status, bytes) = match encoded {
        Some(encoded) => encoded,
        None => {
            tracing::error!(status = response.status(), "Server error while encoding response");
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    };

    metrics::record_request(method, status.as_u16(), start);
    (status, [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)], Body::from(bytes)).into_response()
}
