use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::engine::briefing::BriefingRequest;
use crate::frontend::context::FrontendContext;

const BRIEFING_SEGMENT: &str = "briefing";

/// Serves `GET {mount_path}/{path_secret}/briefing`.
///
/// Check order: route shape and path secret (404), method (405), shutdown
/// (503), bearer token (401). Failures carry a fixed plain-text body.
pub async fn handle_request<B>(
    req: Request<B>,
    ctx: Arc<FrontendContext>,
) -> Result<Response<String>, Infallible> {
    let (parts, _body) = req.into_parts();
    let started = Instant::now();
    let path = parts.uri.path();

    let Some(secret) = route_secret(path, &ctx.settings.server.mount_path) else {
        return Ok(not_found());
    };
    if !ctx.auth.verify_path_secret(secret) {
        warn!(target: "briefing::http", "Path secret rejected");
        return Ok(not_found());
    }

    if parts.method != Method::GET {
        return Ok(plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }

    if ctx.server_state.is_shutting_down() {
        return Ok(plain(StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down"));
    }

    let authorization = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if !ctx.auth.verify_authorization(authorization) {
        warn!(target: "briefing::http", "Bearer token rejected");
        return Ok(plain(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    let _guard = ctx.server_state.track_request();
    let request = BriefingRequest::from_query(parts.uri.query());
    let timeout = Duration::from_millis(ctx.settings.server.request_timeout_ms);

    let briefing = match tokio::time::timeout(timeout, ctx.assembler.assemble(&request)).await {
        Ok(briefing) => briefing,
        Err(_) => {
            warn!(
                target: "briefing::http",
                timeout_ms = ctx.settings.server.request_timeout_ms,
                "Briefing timed out"
            );
            return Ok(plain(StatusCode::SERVICE_UNAVAILABLE, "Briefing timed out"));
        }
    };

    match serde_json::to_string(&briefing) {
        Ok(body) => {
            info!(
                target: "briefing::http",
                resources = briefing.data.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Briefing served"
            );
            Ok(json(StatusCode::OK, body))
        }
        Err(e) => {
            error!(target: "briefing::http", "Failed to serialize briefing: {}", e);
            Ok(plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))
        }
    }
}

/// Extracts the secret segment from `{mount}/{secret}/briefing`.
fn route_secret<'a>(path: &'a str, mount_path: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(mount_path)?.strip_prefix('/')?;
    let (secret, tail) = rest.split_once('/')?;
    let tail = tail.strip_suffix('/').unwrap_or(tail);
    (tail == BRIEFING_SEGMENT && !secret.is_empty()).then_some(secret)
}

fn not_found() -> Response<String> {
    plain(StatusCode::NOT_FOUND, "Not Found")
}

fn plain(status: StatusCode, body: &str) -> Response<String> {
    with_content_type(status, body.to_string(), "text/plain")
}

fn json(status: StatusCode, body: String) -> Response<String> {
    with_content_type(status, body, "application/json")
}

fn with_content_type(status: StatusCode, body: String, content_type: &'static str) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
