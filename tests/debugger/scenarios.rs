use crate::common::{debugger, pause, stop};
use pogo_debugger::debugger::command::{ClearBreakpoints, ContinueAll, SetBreakpoints, Step};
use pogo_debugger::debugger::{PageBreakpoint, PageBreakpoints};
use serde_json::json;

#[tokio::test]
async fn test_single_stop_and_continue() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;

    let status = debugger.status().await;
    assert_eq!(status.active.len(), 1);
    let thread = &status.active["h1"];
    assert_eq!(thread.thread_id_int, 1);
    assert_eq!(thread.notifications_count, 1);
    assert_eq!(thread.call_stack.len(), 1);

    assert_eq!(ContinueAll::new(&debugger).run().await.unwrap(), 1);

    assert_eq!(queue.response("h1"), Some(json!({"command": "continue"})));
    assert!(debugger.status().await.active.is_empty());
    assert!(debugger.store().is_blocked("h1").await);
}

#[tokio::test]
async fn test_notification_replay_is_suppressed() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;
    ContinueAll::new(&debugger).run().await.unwrap();

    assert!(!debugger.on_notification(&stop("h1", "t-A")).await.unwrap());
    assert!(debugger.status().await.active.is_empty());
}

#[tokio::test]
async fn test_repeated_notifications_are_counted() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;
    for _ in 0..4 {
        debugger.on_notification(&stop("h1", "t-A")).await.unwrap();
    }

    assert_eq!(debugger.status().await.active["h1"].notifications_count, 5);
}

#[tokio::test]
async fn test_breakpoints_rebroadcast() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;

    let verified = SetBreakpoints::new(&debugger)
        .run(vec![PageBreakpoints {
            page: "p".to_string(),
            breakpoints: vec![PageBreakpoint::new(5, "")],
        }])
        .await
        .unwrap();

    assert_eq!(verified.get("p"), Some(&[PageBreakpoint::new(5, "")][..]));
    assert_eq!(
        queue.response("h1"),
        Some(json!({"command": "set_breakpoints", "breakpoints": {"p": {"5": true}}}))
    );
    assert!(debugger.store().is_blocked("h1").await);
}

#[tokio::test]
async fn test_step_one_thread_of_two() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;
    pause(&queue, &debugger, "h2", "t-B").await;

    Step::parse(&debugger, "2").unwrap().run().await.unwrap();

    assert_eq!(queue.response("h1"), None);
    assert_eq!(queue.response("h2"), Some(json!({"command": "step"})));
    let active = debugger.store().active().await;
    assert!(active.contains_key("h1"));
    assert!(active.contains_key("h2"));
}

#[tokio::test]
async fn test_step_unknown_thread() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;

    assert_eq!(Step::new(&debugger, 7).run().await.unwrap(), 0);
    assert!(Step::parse(&debugger, "seven").is_err());
    assert_eq!(queue.response("h1"), None);
}

#[tokio::test]
async fn test_clear() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;
    SetBreakpoints::new(&debugger)
        .run(vec![PageBreakpoints {
            page: "p".to_string(),
            breakpoints: vec![PageBreakpoint::new(5, "")],
        }])
        .await
        .unwrap();
    pause(&queue, &debugger, "h2", "t-B").await;
    pause(&queue, &debugger, "h3", "t-A").await;

    ClearBreakpoints::new(&debugger).run().await.unwrap();

    assert_eq!(queue.response("h2"), Some(json!({"command": "clear_breakpoints"})));
    assert_eq!(queue.response("h3"), Some(json!({"command": "clear_breakpoints"})));
    let store = debugger.store();
    assert!(store.requested().await.is_empty());
    assert!(store.verified().await.is_empty());
    assert!(store.active().await.is_empty());
    assert!(store.blocked().await.is_empty());
}

#[tokio::test]
async fn test_stale_entries_collected_on_status() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-A").await;
    queue.set_response("h1", json!({"command": "continue"}));

    let status = debugger.status().await;
    assert!(!status.active.contains_key("h1"));
    assert!(debugger.store().is_blocked("h1").await);
}

#[tokio::test]
async fn test_frame_without_variables_can_be_released() {
    let (queue, debugger) = debugger();
    queue.push(
        "h1",
        json!({"depth": 1, "states": [{"page": "p", "line": 5, "file_name": "p.sql", "state": null}]}),
    );
    assert!(debugger.on_notification(&stop("h1", "t-A")).await.unwrap());

    let status = debugger.status().await;
    assert!(status.active["h1"].call_stack[0].state.is_empty());

    assert_eq!(ContinueAll::new(&debugger).run().await.unwrap(), 1);
    assert_eq!(queue.response("h1"), Some(json!({"command": "continue"})));
}

#[tokio::test]
async fn test_notification_for_missing_row_is_dropped() {
    let (_, debugger) = debugger();

    assert!(debugger.on_notification(&stop("h1", "t-A")).await.is_err());
    assert!(debugger.on_notification("{").await.is_err());
    assert!(debugger.status().await.active.is_empty());
}

#[tokio::test]
async fn test_thread_numbers_follow_first_seen_order() {
    let (queue, debugger) = debugger();
    pause(&queue, &debugger, "h1", "t-B").await;
    pause(&queue, &debugger, "h2", "t-A").await;
    pause(&queue, &debugger, "h3", "t-B").await;

    let active = debugger.store().active().await;
    assert_eq!(active["h1"].thread_id_int, 1);
    assert_eq!(active["h2"].thread_id_int, 2);
    assert_eq!(active["h3"].thread_id_int, 1);
    assert_eq!(debugger.store().threads().resolve(2).as_deref(), Some("t-A"));
}
