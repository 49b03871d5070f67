//! In-process axum mock of the Nyraa backend REST API.
//!
//! Implements just enough of the contract for the client to exercise every
//! flow: health, the auth endpoints, orders, and the address book. State
//! lives in memory on [`MockBackend`] and is inspectable from tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use url::Url;

use nyraa_storefront::models::{Address, Order};

/// The bearer token the mock accepts.
pub const VALID_TOKEN: &str = "tok-valid";

/// The OTP code the mock accepts.
pub const VALID_OTP: &str = "123456";

/// The password the mock accepts for any email.
pub const VALID_PASSWORD: &str = "opensesame";

/// Programmable mock backend state.
pub struct MockBackend {
    /// Health endpoint answers 200 when true, 503 when false.
    pub healthy: AtomicBool,
    /// Order creation answers 500 when true.
    pub fail_orders: AtomicBool,
    /// Orders accepted so far.
    pub orders: Mutex<Vec<Order>>,
    /// Server-side address book.
    pub addresses: Mutex<Vec<Address>>,
    order_seq: AtomicU64,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            fail_orders: AtomicBool::new(false),
            orders: Mutex::new(Vec::new()),
            addresses: Mutex::new(Vec::new()),
            order_seq: AtomicU64::new(0),
        }
    }

    /// Number of orders the backend accepted.
    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

/// Bind an ephemeral port, spawn the mock, and return its handle and URL.
pub async fn serve() -> (Arc<MockBackend>, Url) {
    let backend = Arc::new(MockBackend::new());

    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/send-otp", post(acknowledge))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/login", post(login))
        .route("/api/auth/google", post(google))
        .route("/api/auth/forgot-password", post(acknowledge))
        .route("/api/auth/profile", get(profile))
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/stats", get(order_stats))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", patch(update_order_status))
        .route("/api/user/addresses", get(list_addresses).post(create_address))
        .route(
            "/api/user/addresses/{id}",
            put(update_address).delete(delete_address),
        )
        .route("/api/user/addresses/{id}/default", patch(set_default_address))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock");
    });

    let url = Url::parse(&format!("http://{addr}")).expect("mock url");
    (backend, url)
}

// =============================================================================
// Helpers
// =============================================================================

fn bearer_ok(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {VALID_TOKEN}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Authentication failed"})),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": format!("{what} not found")})),
    )
        .into_response()
}

fn auth_payload() -> Value {
    json!({
        "success": true,
        "token": VALID_TOKEN,
        "user": {"email": "asha@example.com", "name": "Asha Rao"}
    })
}

// =============================================================================
// Health and auth
// =============================================================================

async fn health(State(backend): State<Arc<MockBackend>>) -> Response {
    if backend.healthy.load(Ordering::Relaxed) {
        Json(json!({"status": "ok"})).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "database unavailable"})),
        )
            .into_response()
    }
}

async fn acknowledge() -> Json<Value> {
    Json(json!({"success": true, "message": "sent"}))
}

async fn verify_otp(Json(body): Json<Value>) -> Response {
    if body["otp"] == VALID_OTP {
        Json(auth_payload()).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid OTP"})),
        )
            .into_response()
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == VALID_PASSWORD {
        Json(auth_payload()).into_response()
    } else {
        unauthorized()
    }
}

async fn google(Json(body): Json<Value>) -> Response {
    if body["credential"] == "google-ok" {
        Json(auth_payload()).into_response()
    } else {
        unauthorized()
    }
}

async fn profile(headers: HeaderMap) -> Response {
    if bearer_ok(&headers) {
        Json(json!({
            "success": true,
            "user": {"email": "asha@example.com", "name": "Asha Rao"}
        }))
        .into_response()
    } else {
        unauthorized()
    }
}

// =============================================================================
// Orders
// =============================================================================

async fn create_order(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    if backend.fail_orders.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "order validation failed"})),
        )
            .into_response();
    }

    let n = backend.order_seq.fetch_add(1, Ordering::Relaxed) + 1;
    let now = Utc::now().to_rfc3339();

    let mut order = payload;
    order["id"] = json!(format!("ord-{n}"));
    order["orderNumber"] = json!(format!("NY-{}", 1000 + n));
    order["status"] = json!("pending");
    order["orderDate"] = json!(now);
    order["statusHistory"] = json!([{"status": "pending", "timestamp": now}]);

    // The stored copy goes through the real Order model, so a payload the
    // model cannot represent fails loudly here.
    let typed: Order = match serde_json::from_value(order.clone()) {
        Ok(typed) => typed,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": format!("bad order payload: {e}")})),
            )
                .into_response();
        }
    };
    backend.orders.lock().unwrap().push(typed);

    Json(json!({"success": true, "order": order})).into_response()
}

async fn list_orders(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(10);
    let status = params.get("status").cloned();

    let orders = backend.orders.lock().unwrap();
    let filtered: Vec<&Order> = orders
        .iter()
        .filter(|o| {
            status
                .as_ref()
                .is_none_or(|s| o.status.to_string() == s.to_lowercase())
        })
        .collect();

    let total = filtered.len();
    let start = (page - 1) * limit;
    let page_items: Vec<&&Order> = filtered.iter().skip(start).take(limit).collect();

    Json(json!({
        "success": true,
        "orders": page_items,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total.div_ceil(limit),
        }
    }))
    .into_response()
}

async fn get_order(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let orders = backend.orders.lock().unwrap();
    orders.iter().find(|o| o.id == id).map_or_else(
        || not_found("Order"),
        |order| Json(json!({"success": true, "order": order})).into_response(),
    )
}

async fn update_order_status(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let new_status = match serde_json::from_value(body["status"].clone()) {
        Ok(status) => status,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "invalid status"})),
            )
                .into_response();
        }
    };

    let mut orders = backend.orders.lock().unwrap();
    let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
        return not_found("Order");
    };

    order.status = new_status;
    order.status_history.push(nyraa_storefront::models::StatusChange {
        status: new_status,
        timestamp: Utc::now(),
        notes: body["notes"].as_str().map(ToOwned::to_owned),
    });

    Json(json!({"success": true, "order": order})).into_response()
}

async fn order_stats(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let orders = backend.orders.lock().unwrap();
    let count_by = |s: &str| {
        orders
            .iter()
            .filter(|o| o.status.to_string() == s)
            .count()
    };
    let total_spent: rust_decimal::Decimal = orders.iter().map(|o| o.total).sum();

    Json(json!({
        "success": true,
        "stats": {
            "totalOrders": orders.len(),
            "totalSpent": total_spent,
            "pending": count_by("pending"),
            "processing": count_by("processing"),
            "shipped": count_by("shipped"),
            "delivered": count_by("delivered"),
            "cancelled": count_by("cancelled"),
        }
    }))
    .into_response()
}

// =============================================================================
// Addresses
// =============================================================================

async fn list_addresses(State(backend): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let addresses = backend.addresses.lock().unwrap();
    Json(json!({"success": true, "addresses": &*addresses})).into_response()
}

async fn create_address(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(address): Json<Address>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let mut addresses = backend.addresses.lock().unwrap();
    if address.is_default {
        for a in addresses.iter_mut() {
            a.is_default = false;
        }
    }
    addresses.retain(|a| a.id != address.id);
    addresses.push(address.clone());

    Json(json!({"success": true, "address": address})).into_response()
}

async fn update_address(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(address): Json<Address>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let mut addresses = backend.addresses.lock().unwrap();
    let Some(existing) = addresses
        .iter_mut()
        .find(|a| a.id == nyraa_core::AddressId::new(id))
    else {
        return not_found("Address");
    };

    *existing = address.clone();
    Json(json!({"success": true, "address": address})).into_response()
}

async fn delete_address(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let mut addresses = backend.addresses.lock().unwrap();
    let target = nyraa_core::AddressId::new(id);
    if !addresses.iter().any(|a| a.id == target) {
        return not_found("Address");
    }
    addresses.retain(|a| a.id != target);

    Json(json!({"success": true})).into_response()
}

async fn set_default_address(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }

    let mut addresses = backend.addresses.lock().unwrap();
    let target = nyraa_core::AddressId::new(id);
    if !addresses.iter().any(|a| a.id == target) {
        return not_found("Address");
    }
    for a in addresses.iter_mut() {
        a.is_default = a.id == target;
    }

    Json(json!({"success": true})).into_response()
}
