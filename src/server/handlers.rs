use crate::debugger::command::{ClearBreakpoints, ContinueAll, SetBreakpoints, Step};
use crate::debugger::{Debugger, Error, PageBreakpoints, StatusSnapshot};
use crate::weak_error;
use axum::body::Bytes;
use axum::extract::{Query, Request, State};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;

type DebuggerState = State<Arc<Debugger>>;

const INDEX_PAGE: &str = concat!(
    "<html><body>Hello pogo debugger!!",
    r#"<p>[GET]<a href="/status">/status</a>"#,
    r#"<p>[POST]<a href="command/set_breakpoints">/command/set_breakpoints</a>"#,
    "</body></html>"
);

pub(super) async fn log_request(request: Request, next: Next) -> Response {
    let uri = request.uri();
    if uri.path() != "/favicon.ico" {
        info!(
            target: "http",
            "debugger request {}/{}",
            uri.path(),
            uri.query().unwrap_or_default()
        );
    }
    next.run(request).await
}

pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub(super) async fn status(State(debugger): DebuggerState) -> Json<StatusSnapshot> {
    Json(debugger.status().await)
}

pub(super) async fn verified_breakpoints(State(debugger): DebuggerState) -> String {
    debugger.store().verified().await.dump()
}

pub(super) async fn set_breakpoints(State(debugger): DebuggerState, body: Bytes) -> Response {
    let Some(requested) = weak_error!(
        serde_json::from_slice::<Vec<PageBreakpoints>>(&body).map_err(Error::MalformedBreakpoints),
        "set breakpoints:"
    ) else {
        return ().into_response();
    };

    match weak_error!(
        SetBreakpoints::new(&debugger).run(requested).await,
        "set breakpoints:"
    ) {
        Some(verified) => Json(verified.to_pages()).into_response(),
        None => ().into_response(),
    }
}

pub(super) async fn continue_all(State(debugger): DebuggerState) {
    weak_error!(ContinueAll::new(&debugger).run().await, "continue all:");
}

pub(super) async fn clear_breakpoints(State(debugger): DebuggerState) -> &'static str {
    weak_error!(ClearBreakpoints::new(&debugger).run().await, "clear breakpoints:");
    "Breakpoints cleared"
}

#[derive(Debug, Deserialize)]
pub(super) struct StepQuery {
    thread_id: Option<String>,
}

pub(super) async fn step(State(debugger): DebuggerState, Query(query): Query<StepQuery>) {
    let Some(thread_id) = query.thread_id else {
        debug!(target: "http", "step without thread_id ignored");
        return;
    };
    if let Some(step) = weak_error!(Step::parse(&debugger, &thread_id), "step:") {
        weak_error!(step.run().await, "step:");
    }
}

pub(super) async fn favicon() {}

pub(super) async fn unknown(uri: Uri) -> String {
    format!("Unknown url: {uri}")
}
