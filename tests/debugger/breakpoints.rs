use crate::common::{debugger, debugger_with, id_assigning_queue, pause};
use pogo_debugger::debugger::command::SetBreakpoints;
use pogo_debugger::debugger::{BreakpointSet, Debugger, PageBreakpoint, PageBreakpoints};
use pogo_debugger::queue::{MemoryQueue, QueueError};
use serde_json::json;
use std::sync::Arc;

fn page(name: &str, lines: &[i64]) -> PageBreakpoints {
    PageBreakpoints {
        page: name.to_string(),
        breakpoints: lines.iter().map(|l| PageBreakpoint::new(*l, "")).collect(),
    }
}

#[tokio::test]
async fn test_identity_verifier_round_trip() {
    let (_, debugger) = debugger();
    let requested = vec![page("a", &[1, 2]), page("b", &[7])];

    let verified = SetBreakpoints::new(&debugger).run(requested.clone()).await.unwrap();

    assert_eq!(verified, BreakpointSet::from(requested.clone()));
    assert_eq!(debugger.store().verified().await, BreakpointSet::from(requested));
    assert_eq!(
        serde_json::to_value(verified.line_index()).unwrap(),
        json!({"a": {"1": true, "2": true}, "b": {"7": true}})
    );
}

#[tokio::test]
async fn test_verifier_ids_are_published() {
    let (queue, debugger) = debugger_with(id_assigning_queue());
    pause(&queue, &debugger, "h1", "t-A").await;

    let verified = SetBreakpoints::new(&debugger).run(vec![page("p", &[5])]).await.unwrap();

    assert_eq!(verified.to_pages(), vec![PageBreakpoints {
        page: "p".to_string(),
        breakpoints: vec![PageBreakpoint::new(5, "bp-5")],
    }]);
    assert_eq!(
        queue.response("h1"),
        Some(json!({"command": "set_breakpoints", "breakpoints": {"p": {"5": true}}}))
    );
}

#[tokio::test]
async fn test_verifier_binds_no_lines() {
    let queue = MemoryQueue::with_verifier(|_| Ok(json!([{"page": "p", "breakpoints": null}])));
    let (queue, debugger) = debugger_with(queue);
    pause(&queue, &debugger, "h1", "t-A").await;

    let verified = SetBreakpoints::new(&debugger).run(vec![page("p", &[5])]).await.unwrap();

    assert_eq!(verified.get("p"), Some(&[][..]));
    assert_eq!(
        queue.response("h1"),
        Some(json!({"command": "set_breakpoints", "breakpoints": {"p": {}}}))
    );
}

#[tokio::test]
async fn test_verifier_drops_and_moves_lines() {
    let queue = MemoryQueue::with_verifier(|_| {
        Ok(json!([{"page": "p", "breakpoints": [{"line": 6, "id": "bp-6"}]}]))
    });
    let (_, debugger) = debugger_with(queue);

    let verified = SetBreakpoints::new(&debugger)
        .run(vec![page("p", &[5, 100])])
        .await
        .unwrap();

    assert_eq!(verified.get("p"), Some(&[PageBreakpoint::new(6, "bp-6")][..]));
    assert_eq!(
        debugger.store().requested().await.get("p"),
        Some(&[PageBreakpoint::new(5, ""), PageBreakpoint::new(100, "")][..])
    );
}

#[tokio::test]
async fn test_pages_are_merged() {
    let (_, debugger) = debugger();
    SetBreakpoints::new(&debugger)
        .run(vec![page("a", &[1]), page("b", &[2])])
        .await
        .unwrap();

    let verified = SetBreakpoints::new(&debugger).run(vec![page("b", &[3])]).await.unwrap();

    assert_eq!(verified.get("a"), Some(&[PageBreakpoint::new(1, "")][..]));
    assert_eq!(verified.get("b"), Some(&[PageBreakpoint::new(3, "")][..]));
}

#[tokio::test]
async fn test_verification_failure_keeps_state() {
    let queue =
        MemoryQueue::with_verifier(|_| Err(QueueError::Rejected("no such page".to_string())));
    let (queue, debugger) = debugger_with(queue);
    pause(&queue, &debugger, "h1", "t-A").await;

    assert!(SetBreakpoints::new(&debugger).run(vec![page("p", &[5])]).await.is_err());

    assert!(debugger.store().verified().await.is_empty());
    assert!(debugger.store().requested().await.is_empty());
    assert_eq!(queue.response("h1"), None);
    assert!(debugger.store().active().await.contains_key("h1"));
}

#[tokio::test]
async fn test_malformed_verification_keeps_state() {
    let queue = MemoryQueue::with_verifier(|_| Ok(json!({"page": "p"})));
    let (_, debugger) = debugger_with(queue);

    let err = SetBreakpoints::new(&debugger).run(vec![page("p", &[5])]).await.unwrap_err();
    assert!(matches!(err, pogo_debugger::debugger::Error::MalformedVerification(_)));
    assert!(debugger.store().verified().await.is_empty());
}

#[tokio::test]
async fn test_breakpoints_install() {
    let queue = Arc::new(MemoryQueue::new());
    let debugger = Debugger::new(queue.clone()).with_breakpoints_install(true);

    SetBreakpoints::new(&debugger).run(vec![page("p", &[5, 7])]).await.unwrap();

    assert_eq!(queue.installed(), vec![json!({"p": {"5": true, "7": true}})]);
}

#[tokio::test]
async fn test_breakpoints_install_disabled_by_default() {
    let (queue, debugger) = debugger();

    SetBreakpoints::new(&debugger).run(vec![page("p", &[5])]).await.unwrap();

    assert!(queue.installed().is_empty());
}
