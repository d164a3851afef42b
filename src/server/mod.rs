//! HTTP surface of the debugger, used by the operator front-end.
//!
//! Every handler performs one operation against the shared [`Debugger`] and never answers
//! with a non-200 status: failures are only visible in the server logs.

mod handlers;

use crate::debugger::Debugger;
use axum::routing::any;
use axum::{middleware, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn router(debugger: Arc<Debugger>) -> Router {
    Router::new()
        .route("/", any(handlers::index))
        .route("/status", any(handlers::status))
        .route("/verified_breakpoints", any(handlers::verified_breakpoints))
        .route("/command/set_breakpoints", any(handlers::set_breakpoints))
        .route("/command/continue_all", any(handlers::continue_all))
        .route("/command/clear_breakpoints", any(handlers::clear_breakpoints))
        .route("/command/step", any(handlers::step))
        .route("/favicon.ico", any(handlers::favicon))
        .fallback(handlers::unknown)
        .layer(middleware::from_fn(handlers::log_request))
        .with_state(debugger)
}

/// Serve HTTP requests on an already bound listener.
pub async fn serve_on(listener: TcpListener, debugger: Arc<Debugger>) -> std::io::Result<()> {
    axum::serve(listener, router(debugger)).await
}

/// Bind `localhost:<port>` and serve HTTP requests.
pub async fn serve(port: u16, debugger: Arc<Debugger>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("localhost", port)).await?;
    log::info!(target: "http", "pogo debugger is listening @ {}", listener.local_addr()?);
    serve_on(listener, debugger).await?;
    Ok(())
}
