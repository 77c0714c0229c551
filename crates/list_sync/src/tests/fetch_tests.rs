use super::*;
use serde_json::json;

fn response(data: Vec<Record>, total: u64) -> ListResponse {
    ListResponse { data, total }
}

#[test]
fn replace_mode_swaps_items() {
    let mut orchestrator = FetchOrchestrator::default();
    let ticket = orchestrator.begin(ListPayload::default());
    orchestrator.complete(ticket, response(vec![json!("a"), json!("b")], 4));

    let ticket = orchestrator.begin(ListPayload::default());
    let completion = orchestrator.complete(ticket, response(vec![json!("c"), json!("d")], 4));

    assert_eq!(completion, Completion::Applied { stale_page: false });
    assert_eq!(orchestrator.items(), &[json!("c"), json!("d")]);
    assert_eq!(orchestrator.total_rows(), 4);
}

#[test]
fn append_mode_extends_items_once_then_returns_to_replace() {
    let mut orchestrator = FetchOrchestrator::default();
    let ticket = orchestrator.begin(ListPayload::default());
    orchestrator.complete(ticket, response(vec![json!("a"), json!("b")], 6));

    orchestrator.set_append();
    let ticket = orchestrator.begin(ListPayload::default());
    assert_eq!(ticket.mode(), FetchMode::Append);
    orchestrator.complete(ticket, response(vec![json!("c"), json!("d")], 6));

    assert_eq!(
        orchestrator.items(),
        &[json!("a"), json!("b"), json!("c"), json!("d")]
    );
    assert_eq!(orchestrator.mode(), FetchMode::Replace);
}

#[test]
fn empty_page_with_rows_is_reported_stale() {
    let mut orchestrator = FetchOrchestrator::default();
    let ticket = orchestrator.begin(ListPayload::default());
    let completion = orchestrator.complete(ticket, response(Vec::new(), 10));
    assert_eq!(completion, Completion::Applied { stale_page: true });

    let ticket = orchestrator.begin(ListPayload::default());
    let completion = orchestrator.complete(ticket, response(Vec::new(), 0));
    assert_eq!(completion, Completion::Applied { stale_page: false });
}

#[test]
fn superseded_ticket_leaves_state_untouched() {
    let mut orchestrator = FetchOrchestrator::default();
    let older = orchestrator.begin(ListPayload::default());
    let newer = orchestrator.begin(ListPayload::default());

    orchestrator.complete(newer, response(vec![json!("new")], 1));
    let completion = orchestrator.complete(older, response(vec![json!("old")], 9));

    assert_eq!(completion, Completion::Superseded);
    assert_eq!(orchestrator.items(), &[json!("new")]);
    assert_eq!(orchestrator.total_rows(), 1);
}

#[test]
fn superseded_append_does_not_reset_mode() {
    let mut orchestrator = FetchOrchestrator::default();
    orchestrator.set_append();
    let older = orchestrator.begin(ListPayload::default());
    let _newer = orchestrator.begin(ListPayload::default());

    orchestrator.complete(older, response(vec![json!("x")], 1));
    assert_eq!(orchestrator.mode(), FetchMode::Append);
}
