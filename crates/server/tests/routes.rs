use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    server::router_for_tests(engine, db)
}

fn basic_auth(username: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers alice and returns her MAIN wallet id.
async fn register_alice(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            None,
            json!({"username": "alice", "password": "password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["mainWalletId"].as_str().unwrap().to_string()
}

async fn new_category(app: &Router, auth: &str, name: &str, kind: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/categories",
            Some(auth),
            json!({"name": name, "color": "#112233", "kind": kind}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["id"].as_str().unwrap().to_string()
}

async fn wallet_balance(app: &Router, auth: &str, wallet_id: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/wallets/{wallet_id}"))
                .header(header::AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["balance"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_then_identify() {
    let app = test_app().await;
    register_alice(&app).await;

    let auth = basic_auth("alice", "password");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/me")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = test_app().await;
    register_alice(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/wallets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/wallets")
                .header(header::AUTHORIZATION, basic_auth("alice", "wrong"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register_alice(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            None,
            json!({"username": "alice", "password": "other"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_transaction_moves_the_balance() {
    let app = test_app().await;
    let main_wallet_id = register_alice(&app).await;
    let auth = basic_auth("alice", "password");
    let expense = new_category(&app, &auth, "Groceries shop", "expense").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            Some(&auth),
            json!({
                "description": "weekly shop",
                "categoryId": expense,
                "amount": "75.50",
                "date": "2026-08-30T12:00:00Z",
                "walletId": main_wallet_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["amount"], "75.50");
    assert_eq!(body["isRefund"], false);
    assert!(body["transferId"].is_null());

    assert_eq!(wallet_balance(&app, &auth, &main_wallet_id).await, "-75.50");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/wallets/{main_wallet_id}/transactions"))
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_transaction_returns_204_and_restores_balance() {
    let app = test_app().await;
    let main_wallet_id = register_alice(&app).await;
    let auth = basic_auth("alice", "password");
    let expense = new_category(&app, &auth, "Coffee", "expense").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            Some(&auth),
            json!({
                "description": "espresso",
                "categoryId": expense,
                "amount": "2.50",
                "date": "2026-08-30T08:00:00Z",
                "walletId": main_wallet_id,
            }),
        ))
        .await
        .unwrap();
    let tx_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/transactions/{tx_id}"))
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(wallet_balance(&app, &auth, &main_wallet_id).await, "0.00");
}

#[tokio::test]
async fn transfer_creates_linked_legs_and_moves_both_balances() {
    let app = test_app().await;
    let main_wallet_id = register_alice(&app).await;
    let auth = basic_auth("alice", "password");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/wallets",
            Some(&auth),
            json!({"name": "Savings", "kind": "savings", "openingBalance": "1000.00"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let savings_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions/transfer",
            Some(&auth),
            json!({
                "fromWalletId": savings_id,
                "toWalletId": main_wallet_id,
                "amount": "200.00",
                "date": "2026-08-30T10:00:00Z",
                "description": "pocket money",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let outgoing_transfer_id = body["outgoing"]["transferId"].as_str().unwrap();
    assert_eq!(
        body["incoming"]["transferId"].as_str().unwrap(),
        outgoing_transfer_id
    );

    assert_eq!(wallet_balance(&app, &auth, &savings_id).await, "800.00");
    assert_eq!(wallet_balance(&app, &auth, &main_wallet_id).await, "200.00");
}

#[tokio::test]
async fn error_statuses_map_the_engine_taxonomy() {
    let app = test_app().await;
    let main_wallet_id = register_alice(&app).await;
    let auth = basic_auth("alice", "password");
    let expense = new_category(&app, &auth, "Stuff", "expense").await;

    // Unknown wallet: 404.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/wallets/{}", uuid::Uuid::new_v4()))
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Zero amount: engine validation, 422.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            Some(&auth),
            json!({
                "description": "nothing",
                "categoryId": expense,
                "amount": "0.00",
                "date": "2026-08-30T12:00:00Z",
                "walletId": main_wallet_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Unparseable amount: rejected before the engine, 400.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            Some(&auth),
            json!({
                "description": "garbage",
                "categoryId": expense,
                "amount": "12.3.4",
                "date": "2026-08-30T12:00:00Z",
                "walletId": main_wallet_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Duplicate wallet name: 409.
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/wallets",
                Some(&auth),
                json!({"name": "Savings", "kind": "savings"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}
