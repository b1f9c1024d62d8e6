use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use bankapi::application::accounts::AccountService;
use bankapi::application::executor::TransferExecutor;
use bankapi::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransferStore};
use bankapi::interfaces::http::{AppState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let accounts = InMemoryAccountStore::new();
    let state = AppState {
        accounts: AccountService::new(Box::new(accounts.clone())),
        transfers: TransferExecutor::new(
            Box::new(accounts),
            Box::new(InMemoryTransferStore::new()),
        ),
    };
    router(Arc::new(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn create_account(app: &Router, number: &str, balance: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/accounts",
        Some(json!({ "accountNumber": number, "balance": balance })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn test_account_crud() {
    let app = app();
    let id = create_account(&app, "ES-0001", "150.25").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/accounts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountNumber"], "ES-0001");
    assert_eq!(body["balance"], "150.25");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/accounts/{id}"),
        Some(json!({ "accountNumber": "ES-0002", "balance": "10" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountNumber"], "ES-0002");

    let (status, body) = send(&app, Method::GET, "/api/v1/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/accounts/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/accounts/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["id"], id);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_invalid_account_data() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(json!({ "accountNumber": "ES-0001", "balance": "-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "account balance");
    assert_eq!(body["message"], "Balance must be non-negative");
}

#[tokio::test]
async fn test_duplicate_account_number_conflicts() {
    let app = app();
    create_account(&app, "ES-0001", "1").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/accounts",
        Some(json!({ "accountNumber": "ES-0001", "balance": "2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_transfer_flow() {
    let app = app();
    let from = create_account(&app, "SRC", "1000").await;
    let to = create_account(&app, "DST", "500").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({ "fromAccountId": from, "toAccountId": to, "amount": "100" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "COMPLETED");
    assert!(body["id"].is_i64());
    let transfer_id = body["id"].as_i64().unwrap();

    let (_, source) = send(&app, Method::GET, &format!("/api/v1/accounts/{from}"), None).await;
    let (_, dest) = send(&app, Method::GET, &format!("/api/v1/accounts/{to}"), None).await;
    assert_eq!(source["balance"], "900");
    assert_eq!(dest["balance"], "600");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/transfers/{transfer_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fromAccountId"], from);
}

#[tokio::test]
async fn test_rejected_transfer_payload() {
    let app = app();
    let from = create_account(&app, "SRC", "1000").await;
    let to = create_account(&app, "DST", "500").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({ "fromAccountId": from, "toAccountId": to, "amount": "2000" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Transfer Rejected");
    assert_eq!(body["message"], "Insufficient funds");
    assert_eq!(body["fromAccountId"], from);
    assert_eq!(body["toAccountId"], to);
    assert!(body["timestamp"].is_string());

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({ "fromAccountId": from, "toAccountId": to, "amount": "0" })),
    )
    .await;
    assert_eq!(body["message"], "Invalid amount");

    let (status, body) = send(&app, Method::GET, "/api/v1/transfers", None).await;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["status"].clone())
        .collect();
    assert_eq!(statuses, vec![json!("REJECTED"), json!("REJECTED")]);
}

#[tokio::test]
async fn test_transfer_to_unknown_account() {
    let app = app();
    let from = create_account(&app, "SRC", "1000").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({ "fromAccountId": from, "toAccountId": 77, "amount": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["id"], 77);

    let (_, body) = send(&app, Method::GET, "/api/v1/transfers", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_transfers_by_account_most_recent_first() {
    let app = app();
    let a = create_account(&app, "A", "100").await;
    let b = create_account(&app, "B", "100").await;

    for amount in ["1", "2", "3"] {
        send(
            &app,
            Method::POST,
            "/api/v1/transfers",
            Some(json!({ "fromAccountId": a, "toAccountId": b, "amount": amount })),
        )
        .await;
    }
    send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(json!({ "fromAccountId": b, "toAccountId": a, "amount": "5" })),
    )
    .await;

    let uri = format!("/api/v1/transfers/account/{a}");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let amounts: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["amount"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(amounts, vec!["3", "2", "1"]);
}

#[tokio::test]
async fn test_numeric_json_amounts_are_exact() {
    let app = app();
    // Parsed from text so the literals never pass through f64.
    let account: Value =
        serde_json::from_str(r#"{"accountNumber":"SRC","balance":1234567890.123456789}"#).unwrap();
    let (status, body) = send(&app, Method::POST, "/api/v1/accounts", Some(account)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["balance"], "1234567890.123456789");
    let from = body["id"].as_i64().unwrap();
    let to = create_account(&app, "DST", "0").await;

    let transfer: Value = serde_json::from_str(&format!(
        r#"{{"fromAccountId":{from},"toAccountId":{to},"amount":0.000000001}}"#
    ))
    .unwrap();
    let (status, body) = send(&app, Method::POST, "/api/v1/transfers", Some(transfer)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"], "0.000000001");

    let (_, source) = send(&app, Method::GET, &format!("/api/v1/accounts/{from}"), None).await;
    let (_, dest) = send(&app, Method::GET, &format!("/api/v1/accounts/{to}"), None).await;
    assert_eq!(source["balance"], "1234567890.123456788");
    assert_eq!(dest["balance"], "0.000000001");
}

#[tokio::test]
async fn test_unknown_transfer_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/transfers/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Transfer with ID 9 not found");
}
