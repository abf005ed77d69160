//! End-to-end tests through the HTTP router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wallet_tracker_backend::{create_router, initialize_backend, Config};

async fn app() -> Router {
    let config = Config {
        port: 0,
        database_url: format!(
            "file:memdb_api_{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        ),
        jwt_secret: "test-secret".to_string(),
        jwt_expire_days: 30,
        client_origin: "http://localhost:3000".to_string(),
    };
    let state = initialize_backend(config).await.expect("backend init");
    create_router(state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": email, "password": "hunter22" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let app = app().await;

    let (status, body) = send(&app, request("GET", "/api/v1/accounts", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not authorized to access this route");

    let (status, body) = send(
        &app,
        request("GET", "/api/v1/accounts", Some("garbage-token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn tokens_for_deleted_users_are_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use wallet_tracker_backend::domain::services::auth_service::Claims;

    let app = app().await;

    // A structurally valid token whose subject was never registered
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "no-such-user".to_string(),
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    let (status, body) = send(&app, request("GET", "/api/v1/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No user found with this id");
}

#[tokio::test]
async fn register_login_and_me_round_trip() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;

    let (status, body) = send(&app, request("GET", "/api/v1/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong-pass" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn transactions_move_the_account_balance() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/accounts",
            Some(&token),
            Some(json!({ "name": "Checking", "type": "checking", "balance": 100.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/transactions",
            Some(&token),
            Some(json!({
                "type": "expense",
                "amount": 30.0,
                "category": "Food",
                "account": account_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["account"]["name"], "Checking");
    let transaction_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/accounts/{account_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(body["data"]["balance"], 70.0);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/v1/transactions/{transaction_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/accounts/{account_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(body["data"]["balance"], 100.0);
}

#[tokio::test]
async fn budget_listing_reports_derived_status() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/accounts",
            Some(&token),
            Some(json!({ "name": "Checking", "type": "checking", "balance": 1000.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/budgets",
            Some(&token),
            Some(json!({
                "category": "Food",
                "limit": 500.0,
                "period": "monthly",
                "start_date": "2025-01-01",
                "end_date": "2025-01-31",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "budget create failed: {body}");
    let budget_id = body["data"]["id"].as_str().unwrap().to_string();

    for amount in [100.0, 150.0, 100.0] {
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/v1/transactions",
                Some(&token),
                Some(json!({
                    "type": "expense",
                    "amount": amount,
                    "category": "Food",
                    "account": account_id,
                    "date": "2025-01-10T12:00:00Z",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/budgets/{budget_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["spent"], 350.0);
    assert_eq!(body["data"]["remaining"], 150.0);
    assert_eq!(body["data"]["percentage"], 70.0);

    // Overlapping window for the same category is rejected
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/budgets",
            Some(&token),
            Some(json!({
                "category": "Food",
                "limit": 300.0,
                "period": "monthly",
                "start_date": "2025-01-15",
                "end_date": "2025-02-15",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Budget already exists for this category and time period"
    );
}

#[tokio::test]
async fn users_cannot_see_each_others_data() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let (_, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/accounts",
            Some(&alice),
            Some(json!({ "name": "Secret", "type": "savings", "balance": 9000.0 })),
        ),
    )
    .await;
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/accounts/{account_id}"),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, request("GET", "/api/v1/accounts", Some(&bob), None)).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn report_summary_aggregates_the_history() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;

    let (_, body) = send(
        &app,
        request(
            "POST",
            "/api/v1/accounts",
            Some(&token),
            Some(json!({ "name": "Checking", "type": "checking" })),
        ),
    )
    .await;
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    for (kind, amount, category) in [
        ("income", 2000.0, "Salary"),
        ("expense", 400.0, "Food"),
        ("expense", 100.0, "Transportation"),
    ] {
        send(
            &app,
            request(
                "POST",
                "/api/v1/transactions",
                Some(&token),
                Some(json!({
                    "type": kind,
                    "amount": amount,
                    "category": category,
                    "account": account_id,
                    "date": "2025-01-10T12:00:00Z",
                })),
            ),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        request("GET", "/api/v1/reports/summary", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_income"], 2000.0);
    assert_eq!(body["data"]["total_expenses"], 500.0);
    assert_eq!(body["data"]["net"], 1500.0);
    assert_eq!(body["data"]["savings_rate"], 75.0);
}
