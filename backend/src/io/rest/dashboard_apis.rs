//! # REST API for Dashboard Aggregates

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::error;

use crate::io::rest::error_status;
use crate::AppState;
use shared::DashboardStatsResponse;

/// Create a router for dashboard related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

async fn get_stats(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.dashboard_service.get_stats(&account_id) {
        Ok(stats) => {
            let response = DashboardStatsResponse {
                total_revenue: stats.total_revenue,
                pending_invoices: stats.pending_invoices,
                pending_quotes: stats.pending_quotes,
                low_stock_items: stats.low_stock_items,
                total_quotes: stats.total_quotes,
                total_invoices: stats.total_invoices,
                total_inventory_items: stats.total_inventory_items,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to compute dashboard stats: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::initialize_backend;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::util::ServiceExt; // for `oneshot`

    async fn test_app() -> (axum::Router, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state = initialize_backend(temp_dir.path()).expect("Failed to initialize backend");
        (crate::create_router(state), temp_dir)
    }

    async fn send(
        app: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(value) => Body::from(value.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_dashboard_stats_over_http() {
        let (app, _temp_dir) = test_app().await;

        send(
            &app,
            "POST",
            "/api/accounts/account::1/quotes",
            Some(json!({
                "client_ref": "client::1",
                "description": "Peinture salon",
                "items": [{"description": "Peinture", "quantity": 10.0, "unit_price": 30.0}]
            })),
        )
        .await;

        let (_, invoice) = send(
            &app,
            "POST",
            "/api/accounts/account::1/invoices",
            Some(json!({
                "quote_id": null,
                "kind": "deposit",
                "client_ref": "client::1",
                "description": "Acompte",
                "items": [{"description": "Acompte", "quantity": 1.0, "unit_price": 100.0}]
            })),
        )
        .await;
        let invoice_id = invoice["invoice"]["id"].as_str().unwrap().to_string();
        send(
            &app,
            "PUT",
            &format!("/api/accounts/account::1/invoices/{}/status", invoice_id),
            Some(json!({"status": "paid"})),
        )
        .await;

        let (status, stats) = send(
            &app,
            "GET",
            "/api/accounts/account::1/dashboard/stats",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_revenue"], 120.0);
        assert_eq!(stats["pending_quotes"], 1);
        assert_eq!(stats["pending_invoices"], 0);
        assert_eq!(stats["total_quotes"], 1);
        assert_eq!(stats["total_invoices"], 1);
        assert_eq!(stats["low_stock_items"], 0);
    }
}
