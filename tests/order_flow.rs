//! End-to-end order flow over the HTTP surface.
//!
//! Drives the real router (public placement, authenticated transition,
//! stock coupling) against an in-memory database.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use warung_server::core::{Config, ServerState, build_router};
use warung_server::db::models::{MenuCreate, MenuUpdate};
use warung_server::db::repository::MenuRepository;

async fn test_app() -> (Router, ServerState) {
    let mut config = Config::with_overrides("/tmp/warung-test", 0);
    config.jwt.secret = "integration-test-secret-0123456789abcdef".to_string();
    let state = ServerState::initialize_in_memory(&config).await;
    (build_router(state.clone()), state)
}

/// Seed a stock-tracked menu directly through the repository
async fn seed_menu(state: &ServerState, nama: &str, stock: i64) -> String {
    let repo = MenuRepository::new(state.get_db());
    let menu = repo
        .create(MenuCreate {
            nama: nama.to_string(),
            deskripsi: None,
            harga: 35_000,
            kategori: None,
            image: None,
            image_url: None,
        })
        .await
        .unwrap();
    let key = menu.key();
    repo.update(
        &key,
        MenuUpdate {
            status_stok: Some(true),
            jumlah_stok: Some(stock),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    key
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register a staff account and log in, returning the JWT
async fn login_staff(app: &Router) -> String {
    let (status, _) = send_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "kasir@warung.id",
            "password": "rahasia123",
            "full_name": "Kasir Satu",
            "role": "user"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "kasir@warung.id", "password": "rahasia123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

fn order_payload(menu_id: &str, quantity: i64) -> Value {
    json!({
        "orderType": "DINE_IN",
        "paymentMethod": "CASH",
        "tableNumber": "4",
        "items": [{
            "menuId": menu_id,
            "name": "Burger Keju",
            "quantity": quantity,
            "price": 35_000
        }]
    })
}

#[tokio::test]
async fn test_order_lifecycle_over_http() {
    let (app, state) = test_app().await;
    let menu_id = seed_menu(&state, "Burger Keju", 2).await;
    let token = login_staff(&app).await;

    // Place an order (public, no token)
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/orders",
        None,
        Some(order_payload(&menu_id, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    let order_key = order_id.strip_prefix("order:").unwrap().to_string();
    assert_eq!(body["data"]["queue_number"], json!(100));
    assert_eq!(body["data"]["status"], json!("PENDING"));

    // Customer polls the status without a token
    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/orders/{order_key}/status"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("PENDING"));

    // Transition requires authentication
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/orders/{order_key}/status"),
        None,
        Some(json!({ "action": "pending_to_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Kitchen starts production: stock is reserved
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/orders/{order_key}/status"),
        Some(&token),
        Some(json!({ "action": "pending_to_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("IN_PROGRESS"));

    let repo = MenuRepository::new(state.get_db());
    let menu = repo.find_by_id(&menu_id).await.unwrap().unwrap();
    assert_eq!(menu.jumlah_stok, Some(0));
    assert!(!menu.tersedia);

    // Repeating the transition is rejected with a conflict
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/orders/{order_key}/status"),
        Some(&token),
        Some(json!({ "action": "pending_to_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ok"], json!(false));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("IN_PROGRESS"));
    assert!(message.contains("pending_to_progress"));

    // Complete the order
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/orders/{order_key}/status"),
        Some(&token),
        Some(json!({ "action": "progress_to_done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("DONE"));
}

#[tokio::test]
async fn test_insufficient_stock_rejected_over_http() {
    let (app, state) = test_app().await;
    let menu_id = seed_menu(&state, "Burger Keju", 2).await;
    let token = login_staff(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/orders",
        None,
        Some(order_payload(&menu_id, 3)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["id"].as_str().unwrap();
    let order_key = order_id.strip_prefix("order:").unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/orders/{order_key}/status"),
        Some(&token),
        Some(json!({ "action": "pending_to_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["ok"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("Burger Keju"));

    // Stock and status unchanged
    let repo = MenuRepository::new(state.get_db());
    let menu = repo.find_by_id(&menu_id).await.unwrap().unwrap();
    assert_eq!(menu.jumlah_stok, Some(2));
    assert!(menu.tersedia);

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/orders/{order_key}/status"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("PENDING"));
}

#[tokio::test]
async fn test_invalid_order_and_unknown_action() {
    let (app, state) = test_app().await;
    let menu_id = seed_menu(&state, "Burger Keju", 5).await;
    let token = login_staff(&app).await;

    // Missing items
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/orders",
        None,
        Some(json!({ "orderType": "DINE_IN", "paymentMethod": "CASH", "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));

    // Unknown action on a real order
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/orders",
        None,
        Some(order_payload(&menu_id, 1)),
    )
    .await;
    let order_key = body["data"]["id"]
        .as_str()
        .unwrap()
        .strip_prefix("order:")
        .unwrap()
        .to_string();

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/orders/{order_key}/status"),
        Some(&token),
        Some(json!({ "action": "done_to_pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown order
    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/orders/999999/status",
        Some(&token),
        Some(json!({ "action": "pending_to_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Health stays public
    let (status, body) = send_json(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}
