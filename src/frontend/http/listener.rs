use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::frontend::context::FrontendContext;

use super::handler::handle_request;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn run_http_server(ctx: Arc<FrontendContext>) -> anyhow::Result<()> {
    let addr: SocketAddr = ctx.settings.server.http_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!(
        target: "briefing::http",
        "HTTP server running at http://{}{}/<path_secret>/briefing",
        listener.local_addr()?,
        ctx.settings.server.mount_path
    );

    serve(listener, ctx).await
}

/// Accept loop over an already bound listener. Returns once shutdown has been
/// signalled and in-flight briefings have drained (or the drain timed out).
pub async fn serve(listener: TcpListener, ctx: Arc<FrontendContext>) -> anyhow::Result<()> {
    let keep_alive = ctx.settings.server.keep_alive;

    loop {
        if ctx.server_state.is_shutting_down() {
            break;
        }

        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = wait_for_shutdown(&ctx) => {
                info!(target: "briefing::http", "Shutdown requested, no longer accepting connections");
                break;
            }
        };

        let (stream, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                warn!(target: "briefing::http", error = %e, "Accept failed");
                continue;
            }
        };
        debug!(target: "briefing::http", %peer, "Accepted connection");

        tokio::spawn(serve_connection(TokioIo::new(stream), Arc::clone(&ctx), keep_alive));
    }

    drain(&ctx).await;
    info!(target: "briefing::http", "HTTP server shutdown complete");
    Ok(())
}

async fn serve_connection(
    io: TokioIo<tokio::net::TcpStream>,
    ctx: Arc<FrontendContext>,
    keep_alive: bool,
) {
    let service = service_fn(move |req| handle_request(req, Arc::clone(&ctx)));
    let mut builder = hyper::server::conn::http1::Builder::new();
    builder.keep_alive(keep_alive);

    let outcome = builder.serve_connection(io, service).await;

    if let Err(err) = outcome {
        if !is_peer_disconnect(&err) {
            warn!(target: "briefing::http", error = ?err, "Connection ended with an error");
        }
    }
}

fn is_peer_disconnect(err: &hyper::Error) -> bool {
    if err.is_incomplete_message() || err.is_closed() {
        return true;
    }
    let msg = err.to_string();
    ["connection closed", "broken pipe", "Connection reset"]
        .iter()
        .any(|needle| msg.contains(needle))
}

async fn wait_for_shutdown(ctx: &FrontendContext) {
    while !ctx.server_state.is_shutting_down() {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}

async fn drain(ctx: &FrontendContext) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while ctx.server_state.in_flight() > 0 {
        if tokio::time::Instant::now() >= deadline {
            warn!(
                target: "briefing::http",
                in_flight = ctx.server_state.in_flight(),
                "Shutdown drain timed out"
            );
            return;
        }
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}
