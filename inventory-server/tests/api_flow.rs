//! End-to-end flows through the fully layered router
//!
//! Each test gets its own in-memory database and work directory and
//! drives the app with `oneshot`, carrying the session cookie by hand.

use std::io::Cursor;

use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use axum::body::Body;
use chrono::{Datelike, TimeZone, Utc};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use inventory_server::api::build_app;
use inventory_server::auth::JwtConfig;
use inventory_server::db::DbService;
use inventory_server::{Config, ServerState};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "inventory-test-boundary";

struct TestApp {
    app: Router,
    dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let jwt = JwtConfig {
            secret: "integration-test-secret-with-32-plus-chars".into(),
            expiration_minutes: 60,
            issuer: "inventory-server".into(),
            audience: "inventory-web".into(),
        };
        let config = Config::for_work_dir(dir.path(), jwt);
        let db = DbService::in_memory().await.unwrap();
        let state = ServerState::new(config, db.pool);
        Self {
            app: build_app(state),
            dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// Register and log in; returns the `accesstoken=...` cookie pair
    async fn login(&self, username: &str) -> String {
        let creds = json!({ "username": username, "password": "secret-pass" });
        let (status, _) = self
            .json("POST", "/api/auth/register", None, Some(creds.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(creds.to_string()))
            .unwrap();
        let (status, headers, _) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);

        let set_cookie = headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// Number of files in the image store
    fn stored_images(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("uploads").join("images"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn put_stock(&self, cookie: &str, product_id: i64, variants: Value) -> (StatusCode, Value) {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"variants\"\r\n\r\n\
             {variants}\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/products/{product_id}/stock"))
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }
}

/// Supplier, category and one product for the caller; returns (supplier, product)
async fn seed_catalog(app: &TestApp, cookie: &str, price: i64) -> (i64, i64) {
    let (status, category) = app
        .json("POST", "/api/categories", Some(cookie), Some(json!({ "name": "반지" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["name"], "반지");

    let (status, supplier) = app
        .json("POST", "/api/suppliers", Some(cookie), Some(json!({ "name": "S1" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let supplier_id = supplier["id"].as_i64().unwrap();

    let (status, products) = app
        .json(
            "POST",
            "/api/products/bulk",
            Some(cookie),
            Some(json!({
                "supplierId": supplier_id,
                "items": [{
                    "category": "반지",
                    "price": price,
                    "name": "P",
                    "sku": "R-001",
                    "hasSizes": true
                }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = products[0]["id"].as_i64().unwrap();
    (supplier_id, product_id)
}

#[tokio::test]
async fn test_order_flow_updates_stock_totals_and_statistics() {
    let app = TestApp::new().await;
    let cookie = app.login("alice").await;
    let (supplier_id, product_id) = seed_catalog(&app, &cookie, 10000).await;

    let (status, stock) = app
        .put_stock(
            &cookie,
            product_id,
            json!([
                { "color": "골드", "size": "11호", "quantity": 5 },
                { "color": "실버", "size": "11호", "quantity": 3 }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock["total"], 8);

    let (status, product) = app
        .json("GET", &format!("/api/products/{product_id}"), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["stock"], 8);
    assert_eq!(product["category"], "반지");
    assert_eq!(product["supplierName"], "S1");

    let (status, order) = app
        .json(
            "POST",
            "/api/orders",
            Some(&cookie),
            Some(json!({
                "supplierId": supplier_id,
                "items": [{
                    "productId": product_id,
                    "quantity": 2,
                    "selectedColor": "골드",
                    "selectedSize": "11호"
                }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["totalAmount"], 20000);
    assert_eq!(order["itemCount"], 2);
    assert_eq!(order["status"], "PENDING");
    assert!(order["orderNumber"].as_str().unwrap().starts_with("PO-"));
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    // Month of the order in the business time zone
    let placed = Utc
        .timestamp_millis_opt(order["date"].as_i64().unwrap())
        .unwrap()
        .with_timezone(&chrono_tz::Asia::Seoul);
    let (year, month) = (placed.year(), placed.month());

    let (status, report) = app
        .json(
            "GET",
            &format!(
                "/api/statistics/products?startYear={year}&startMonth={month}\
                 &endYear={year}&endMonth={month}&supplierId=&category=&color="
            ),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = report["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], product_id);
    assert_eq!(items[0]["totalQty"], 2);
    assert_eq!(items[0]["totalAmount"], 20000);
    assert_eq!(report["totals"]["qty"], 2);
    assert_eq!(report["totals"]["amount"], 20000);
    assert_eq!(report["range"]["start"], format!("{year}.{month}"));
    assert_eq!(report["filters"]["sortBy"], "quantity");

    let (status, updated) = app
        .json(
            "PATCH",
            &format!("/api/orders/{}", order["id"]),
            Some(&cookie),
            Some(json!({ "status": "COMPLETED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "COMPLETED");
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = TestApp::new().await;

    let (status, body) = app.json("GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["code"].as_u64().is_some());

    let (status, _) = app
        .json("GET", "/api/suppliers", Some("accesstoken=garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let cookie = app.login("alice").await;

    let (status, me) = app.json("GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["username"], "alice");

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");
    let cleared = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.starts_with("accesstoken=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_duplicate_register_conflicts() {
    let app = TestApp::new().await;
    app.login("alice").await;

    let (status, _) = app
        .json(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice", "password": "other-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, wrong_password) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, wrong_password);
}

#[tokio::test]
async fn test_foreign_entities_look_missing() {
    let app = TestApp::new().await;
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let (supplier_id, product_id) = seed_catalog(&app, &alice, 5000).await;

    let (own_status, missing) = app
        .json("GET", "/api/products/999999", Some(&bob), None)
        .await;
    let (status, foreign) = app
        .json("GET", &format!("/api/products/{product_id}"), Some(&bob), None)
        .await;
    assert_eq!(own_status, StatusCode::NOT_FOUND);
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing, foreign);

    let (status, _) = app
        .json("GET", &format!("/api/products/{product_id}/stock"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob cannot order Alice's product, even under her supplier id
    let (status, _) = app
        .json(
            "POST",
            "/api/orders",
            Some(&bob),
            Some(json!({
                "supplierId": supplier_id,
                "items": [{ "productId": product_id, "quantity": 1, "selectedColor": "골드" }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, products) = app.json("GET", "/api/products", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(products.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_with_products_cannot_be_deleted() {
    let app = TestApp::new().await;
    let cookie = app.login("alice").await;
    seed_catalog(&app, &cookie, 1000).await;

    let (status, categories) = app.json("GET", "/api/categories", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let ring = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "반지")
        .unwrap();

    let (status, _) = app
        .json("DELETE", &format!("/api/categories/{}", ring["id"]), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_oversized_order_quantity_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login("alice").await;
    let (supplier_id, product_id) = seed_catalog(&app, &cookie, 10000).await;

    let (status, body) = app
        .json(
            "POST",
            "/api/orders",
            Some(&cookie),
            Some(json!({
                "supplierId": supplier_id,
                "items": [{
                    "productId": product_id,
                    "quantity": i64::MAX / 1000,
                    "selectedColor": "골드",
                }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8);

    let (status, orders) = app.json("GET", "/api/orders", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_stock_leaves_previous_variants() {
    let app = TestApp::new().await;
    let cookie = app.login("alice").await;
    let (_, product_id) = seed_catalog(&app, &cookie, 1000).await;

    let (status, _) = app
        .put_stock(&cookie, product_id, json!([{ "color": "골드", "quantity": 4 }]))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put_stock(
            &cookie,
            product_id,
            json!([
                { "color": "로즈", "quantity": 1 },
                { "color": "로즈", "size": "", "quantity": 2 }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, stock) = app
        .json("GET", &format!("/api/products/{product_id}/stock"), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock["total"], 4);
    assert_eq!(stock["variants"][0]["color"], "골드");
    assert_eq!(stock["variants"][0]["size"], Value::Null);

    let (status, _) = app
        .json(
            "DELETE",
            &format!("/api/products/{product_id}/stock?color=%EA%B3%A8%EB%93%9C"),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, product) = app
        .json("GET", &format!("/api/products/{product_id}"), Some(&cookie), None)
        .await;
    assert_eq!(product["stock"], 0);
}

fn png_data_url() -> String {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 90]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", BASE64.encode(buffer))
}

#[tokio::test]
async fn test_failed_bulk_create_discards_new_images() {
    let app = TestApp::new().await;
    let cookie = app.login("alice").await;
    let (supplier_id, _) = seed_catalog(&app, &cookie, 1000).await;

    let item = |category: &str| {
        json!({
            "category": category,
            "price": 5000,
            "name": "Pendant",
            "sku": "PD-1",
            "imageBase64": png_data_url(),
        })
    };

    let (status, body) = app
        .json(
            "POST",
            "/api/products/bulk",
            Some(&cookie),
            Some(json!({ "supplierId": supplier_id, "items": [item("없는분류")] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("items[0].category").is_some());
    assert_eq!(app.stored_images(), 0);

    let (status, created) = app
        .json(
            "POST",
            "/api/products/bulk",
            Some(&cookie),
            Some(json!({ "supplierId": supplier_id, "items": [item("반지")] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.stored_images(), 1);

    // Same image again, failing: the file belongs to the product above
    let (status, _) = app
        .json(
            "POST",
            "/api/products/bulk",
            Some(&cookie),
            Some(json!({ "supplierId": supplier_id, "items": [item("없는분류")] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_images(), 1);

    let url = created[0]["imageUrl"].as_str().unwrap();
    let response = app
        .app
        .clone()
        .oneshot(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_routes() {
    let app = TestApp::new().await;

    let (status, health) = app.json("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (status, _) = app.json("GET", "/uploads/images/missing.jpg", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cookie = app.login("alice").await;
    let (status, meta) = app.json("GET", "/api/metadata", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(meta["ringSizes"].as_array().unwrap().len(), 21);
}
