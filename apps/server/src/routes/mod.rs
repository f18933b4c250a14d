//! # Route Module
//!
//! Builds the axum router over the shared state. Handlers acquire the
//! active store per request and hold it for the request's lifetime, which
//! fences them against concurrent mode switches.

use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod bills;
pub mod dashboard;
pub mod health;
pub mod items;
pub mod license;
pub mod mode;
pub mod reports;
pub mod sales;
pub mod settings;
pub mod stock;
pub mod tables;
pub mod users;

/// Bare acknowledgement for mutations with nothing else to return.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        SuccessResponse { success: true }
    }
}

/// Builds the full application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Billing
        .route("/sales/finalize", post(sales::finalize))
        // Mode registry
        .route("/mode", get(mode::get_mode).post(mode::set_mode))
        // Dine-in tables
        .route("/tables", get(tables::list_tables))
        .route("/tables/{table}/order", post(tables::save_order))
        // Catalog
        .route("/items", get(items::list))
        .route("/items/add", post(items::add))
        .route("/items/update", post(items::update))
        .route("/items/toggle", post(items::toggle))
        .route("/items/toggle-favorite", post(items::toggle_favorite))
        .route("/items/by-code/{code}", get(items::by_code))
        // Stock management
        .route("/stock/update", post(stock::update))
        .route("/stock/update-wholesale", post(stock::update_wholesale))
        .route("/stock/update-description", post(stock::update_description))
        // Auth & users
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", put(users::update).delete(users::delete))
        // Settings singletons
        .route(
            "/settings/invoice",
            get(settings::invoice).post(settings::set_invoice),
        )
        .route(
            "/settings/tables",
            get(settings::tables).post(settings::set_tables),
        )
        .route(
            "/settings/dashboard",
            get(settings::dashboard).post(settings::set_dashboard),
        )
        // Bill history
        .route("/bills", get(bills::list))
        .route("/bills/{id}", get(bills::detail))
        // Reports
        .route("/reports/daily", get(reports::daily))
        .route("/reports/monthly", get(reports::monthly))
        .route("/reports/items", get(reports::items))
        .route("/reports/login-history", get(reports::login_history))
        .route("/reports/stock-history", get(reports::stock_history))
        // Dashboard
        .route("/dashboard/summary", get(dashboard::summary))
        .route("/dashboard/sales-trend", get(dashboard::sales_trend))
        .route(
            "/dashboard/revenue-breakdown",
            get(dashboard::revenue_breakdown),
        )
        .route("/dashboard/top-items", get(dashboard::top_items))
        .route("/dashboard/payment-methods", get(dashboard::payment_methods))
        .route("/dashboard/stock-alerts", get(dashboard::stock_alerts))
        .route("/dashboard/expiry-alerts", get(dashboard::expiry_alerts))
        // License
        .route("/license/status", get(license::status))
        .route("/license/activate", post(license::activate))
        .route("/license/remove", post(license::remove))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Handler Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ServerConfig;
    use crate::state::AppState;

    use super::*;

    async fn app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            http_port: 0,
            data_dir: dir.path().to_path_buf(),
            license_path: dir.path().join("license.lic"),
        };
        let state = AppState::init(config).await.unwrap();
        (dir, router(Arc::new(state)))
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// First seeded item: (id, name, unit price paise, stock).
    async fn first_item(app: &Router) -> (i64, String, i64, i64) {
        let (status, items) = call(app, "GET", "/items", None).await;
        assert_eq!(status, StatusCode::OK);
        let item = &items.as_array().unwrap()[0];
        (
            item["id"].as_i64().unwrap(),
            item["name"].as_str().unwrap().to_string(),
            item["price"].as_i64().unwrap(),
            item["stock"].as_i64().unwrap(),
        )
    }

    fn sale_body(id: i64, name: &str, qty: i64, price: i64) -> Value {
        json!({
            "cart": [{
                "itemId": id,
                "name": name,
                "qty": qty,
                "unitPrice": price,
                "taxRate": 5.0,
                "mrp": null
            }],
            "total": qty * price,
            "fulfillmentType": "TAKE_AWAY",
            "tableNumber": null,
            "paymentMethod": "CASH",
            "cashReceived": qty * price,
            "changeDue": 0,
            "cashierIdentity": "cashier"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = app().await;
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    async fn test_finalize_sale_end_to_end() {
        let (_dir, app) = app().await;
        let (id, name, price, stock) = first_item(&app).await;

        let (status, body) =
            call(&app, "POST", "/sales/finalize", Some(sale_body(id, &name, 2, price))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let bill_id = body["billId"].as_i64().unwrap();
        assert_eq!(body["total"].as_i64().unwrap(), 2 * price);

        // Stock decremented.
        let (after_id, _, _, after_stock) = first_item(&app).await;
        assert_eq!(after_id, id);
        assert_eq!(after_stock, stock - 2);

        // Bill detail carries a copied line and the frozen snapshot.
        let (status, detail) = call(&app, "GET", &format!("/bills/{bill_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["items"].as_array().unwrap().len(), 1);
        assert_eq!(detail["items"][0]["itemName"], name);
        assert!(detail["invoiceConfigSnapshot"]
            .as_str()
            .unwrap()
            .contains("BILLING POS"));
    }

    #[tokio::test]
    async fn test_finalize_rejects_insufficient_stock() {
        let (_dir, app) = app().await;
        let (id, name, price, stock) = first_item(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            "/sales/finalize",
            Some(sale_body(id, &name, stock + 1, price)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert!(body["message"].as_str().unwrap().contains(&name));

        // Stock untouched.
        let (_, _, _, after_stock) = first_item(&app).await;
        assert_eq!(after_stock, stock);
    }

    #[tokio::test]
    async fn test_mode_read_and_gated_switch() {
        let (_dir, app) = app().await;

        let (status, body) = call(&app, "GET", "/mode", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "RESTAURANT");

        // A cashier cannot switch.
        let (status, body) = call(
            &app,
            "POST",
            "/mode",
            Some(json!({"mode": "GROCERY", "role": "CASHIER"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

        let (_, body) = call(&app, "GET", "/mode", None).await;
        assert_eq!(body["mode"], "RESTAURANT");

        // A SUPER_ADMIN can.
        let (status, body) = call(
            &app,
            "POST",
            "/mode",
            Some(json!({"mode": "GROCERY", "role": "SUPER_ADMIN"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["mode"], "GROCERY");

        let (_, body) = call(&app, "GET", "/mode", None).await;
        assert_eq!(body["mode"], "GROCERY");
    }

    #[tokio::test]
    async fn test_bad_mode_is_rejected() {
        let (_dir, app) = app().await;
        let (status, _) = call(
            &app,
            "POST",
            "/mode",
            Some(json!({"mode": "BAKERY", "role": "SUPER_ADMIN"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_table_order_lifecycle() {
        let (_dir, app) = app().await;
        let (id, name, price, _) = first_item(&app).await;

        // Park an order on table 4.
        let order = json!({"items": [{"itemId": id, "name": name, "qty": 2, "unitPricePaise": price}]});
        let (status, _) = call(&app, "POST", "/tables/4/order", Some(order)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, tables) = call(&app, "GET", "/tables", None).await;
        let table4 = &tables.as_array().unwrap()[3];
        assert_eq!(table4["status"], "OCCUPIED");
        assert_eq!(table4["order"].as_array().unwrap().len(), 1);

        // Finalize a dine-in sale for table 4; it becomes AVAILABLE.
        let mut sale = sale_body(id, &name, 2, price);
        sale["fulfillmentType"] = json!("DINE_IN");
        sale["tableNumber"] = json!(4);
        let (status, _) = call(&app, "POST", "/sales/finalize", Some(sale)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, tables) = call(&app, "GET", "/tables", None).await;
        let table4 = &tables.as_array().unwrap()[3];
        assert_eq!(table4["status"], "AVAILABLE");
        assert!(table4["order"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table_is_404() {
        let (_dir, app) = app().await;
        let order = json!({"items": [{"itemId": 1, "name": "Roti", "qty": 1, "unitPricePaise": 1000}]});
        let (status, _) = call(&app, "POST", "/tables/50/order", Some(order)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_flow() {
        let (_dir, app) = app().await;

        let (status, body) = call(
            &app,
            "POST",
            "/login",
            Some(json!({"username": "superadmin", "password": "super123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "SUPER_ADMIN");

        let (status, _) = call(
            &app,
            "POST",
            "/login",
            Some(json!({"username": "superadmin", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invoice_settings_gated() {
        let (_dir, app) = app().await;

        let update = json!({
            "heading": "TAX INVOICE",
            "companyName": "Sharma General Stores",
            "address": "12 MG Road",
            "gstNumber": "29ABCDE1234F1Z5",
            "fssaiId": "",
            "showWatermark": true,
            "forceBold": false,
            "role": "CASHIER"
        });
        let (status, _) = call(&app, "POST", "/settings/invoice", Some(update.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let mut as_admin = update;
        as_admin["role"] = json!("SUPER_ADMIN");
        let (status, _) = call(&app, "POST", "/settings/invoice", Some(as_admin)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, config) = call(&app, "GET", "/settings/invoice", None).await;
        assert_eq!(config["companyName"], "Sharma General Stores");
    }

    #[tokio::test]
    async fn test_dashboard_summary_has_seeded_history() {
        let (_dir, app) = app().await;
        let (status, body) =
            call(&app, "GET", "/dashboard/summary?range=LAST_30_DAYS", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["totalBills"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_license_status_without_license() {
        let (_dir, app) = app().await;
        let (status, body) = call(&app, "GET", "/license/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasLicense"], false);
    }
}
