use super::*;

use std::collections::HashMap as QueryMap;

use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use shared::{
    domain::{CanonicalKey, ParamValue},
    error::ErrorCode,
};
use tokio::net::TcpListener;

async fn handle_list(Query(params): Query<QueryMap<String, String>>) -> impl IntoResponse {
    let page: u64 = params
        .get("page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    Json(json!({
        "data": [{ "page": page, "status": params.get("status") }],
        "total": 41,
    }))
}

async fn handle_failure() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(ApiError::new(ErrorCode::Forbidden, "list not visible")),
    )
}

async fn spawn_list_server() -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/orders", get(handle_list))
        .route("/api/broken", get(handle_failure));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn payload(entries: &[(&str, ParamValue)]) -> ListPayload {
    let mut payload = ListPayload::default();
    for (key, value) in entries {
        payload.insert(CanonicalKey::from(*key), value.clone());
    }
    payload
}

#[test]
fn endpoint_joins_base_path_and_action_path() {
    let action = HttpListAction::new("http://localhost:9000/api", "/orders").expect("action");
    assert_eq!(action.endpoint().as_str(), "http://localhost:9000/api/orders");

    let action = HttpListAction::new("http://localhost:9000/", "orders").expect("action");
    assert_eq!(action.endpoint().as_str(), "http://localhost:9000/orders");
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(HttpListAction::new("not a url", "orders").is_err());
}

#[test]
fn store_resolves_registered_actions_only() {
    let action = HttpListAction::new("http://localhost:9000", "orders").expect("action");
    let store = ActionStore::new().with_action("fetchOrders", Arc::new(action));

    assert!(store.contains("fetchOrders"));
    assert!(store.resolve("fetchOrders").is_ok());
    let err = store.resolve("fetchList").err().expect("missing action");
    assert!(matches!(err, PaginationError::ActionNotFound { ref name } if name == "fetchList"));
    assert_eq!(err.to_string(), "action \"fetchList\" not found in store");
}

#[tokio::test]
async fn http_action_sends_payload_as_query_and_decodes_page() {
    let server_url = spawn_list_server().await.expect("spawn server");
    let action = HttpListAction::new(&format!("{server_url}/api"), "orders").expect("action");

    let response = action
        .dispatch(&payload(&[
            ("page", ParamValue::Int(3)),
            ("per_page", ParamValue::Int(20)),
            ("status", ParamValue::from("open")),
        ]))
        .await
        .expect("dispatch");

    assert_eq!(response.total, 41);
    assert_eq!(response.data, vec![json!({ "page": 3, "status": "open" })]);
}

#[tokio::test]
async fn http_action_surfaces_backend_error_body() {
    let server_url = spawn_list_server().await.expect("spawn server");
    let action = HttpListAction::new(&format!("{server_url}/api"), "broken").expect("action");

    let err = action
        .dispatch(&ListPayload::default())
        .await
        .expect_err("must fail");
    let api_error = err.downcast_ref::<ApiError>().expect("api error in chain");
    assert_eq!(api_error.code, ErrorCode::Forbidden);
    assert!(format!("{err:#}").contains("403"), "unexpected error: {err:#}");
}
