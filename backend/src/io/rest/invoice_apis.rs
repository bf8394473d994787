//! # REST API for Invoices
//!
//! Deposit and final invoices carry the amounts communicated to the
//! client; a final invoice is refused while the deposit is unpaid.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::invoices::{
    CreateInvoiceCommand, InvoiceListQuery, UpdateInvoiceStatusCommand,
};
use crate::io::rest::error_status;
use crate::io::rest::mappers::{InvoiceMapper, QuoteMapper};
use crate::AppState;
use shared::{
    CreateInvoiceRequest, InvoiceListResponse, InvoiceResponse, UpdateInvoiceStatusRequest,
};

/// Create a router for invoice related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:invoice_id", get(get_invoice))
        .route("/:invoice_id/status", put(update_invoice_status))
}

async fn create_invoice(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts/{}/invoices", account_id);

    let command = CreateInvoiceCommand {
        account_id,
        quote_id: request.quote_id,
        kind: InvoiceMapper::kind_to_domain(request.kind),
        client_ref: request.client_ref,
        description: request.description,
        items: QuoteMapper::items_to_domain(request.items),
    };

    match state.invoice_service.create_invoice(command) {
        Ok(invoice) => {
            let response = InvoiceResponse {
                invoice: InvoiceMapper::to_dto(invoice),
                success_message: "Invoice created".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create invoice: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListInvoicesParams {
    quote_id: Option<String>,
}

/// List invoices, optionally restricted to one quote
async fn list_invoices(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ListInvoicesParams>,
) -> impl IntoResponse {
    let query = InvoiceListQuery {
        quote_id: params.quote_id,
    };

    match state.invoice_service.list_invoices(&account_id, query) {
        Ok(invoices) => {
            let response = InvoiceListResponse {
                invoices: InvoiceMapper::to_dto_list(invoices),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list invoices: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_invoice(
    State(state): State<AppState>,
    Path((account_id, invoice_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.invoice_service.get_invoice(&account_id, &invoice_id) {
        Ok(invoice) => {
            let response = InvoiceResponse {
                invoice: InvoiceMapper::to_dto(invoice),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get invoice {}: {}", invoice_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn update_invoice_status(
    State(state): State<AppState>,
    Path((account_id, invoice_id)): Path<(String, String)>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/accounts/{}/invoices/{}/status",
        account_id, invoice_id
    );

    let command = UpdateInvoiceStatusCommand {
        account_id,
        invoice_id,
        status: InvoiceMapper::status_to_domain(request.status),
    };

    match state.invoice_service.update_status(command) {
        Ok(invoice) => {
            let response = InvoiceResponse {
                invoice: InvoiceMapper::to_dto(invoice),
                success_message: "Invoice status updated".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update invoice status: {}", e);
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

    async fn sent_quote(app: &axum::Router) -> String {
        let (_, quote) = send(
            app,
            "POST",
            "/api/accounts/account::1/quotes",
            Some(json!({
                "client_ref": "client::1",
                "description": "Pose de carrelage",
                "items": [{"description": "Carrelage 60x60", "quantity": 20.0, "unit_price": 35.0}]
            })),
        )
        .await;
        let quote_id = quote["quote"]["id"].as_str().unwrap().to_string();
        send(
            app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "artisan_sent"}, "version": 0})),
        )
        .await;
        quote_id
    }

    #[tokio::test]
    async fn test_final_invoice_blocked_until_deposit_paid() {
        let (app, _temp_dir) = test_app().await;
        let quote_id = sent_quote(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/accounts/account::1/invoices",
            Some(json!({
                "quote_id": quote_id,
                "kind": "final",
                "client_ref": "client::1",
                "description": "Solde carrelage",
                "items": [{"description": "Carrelage 60x60", "quantity": 20.0, "unit_price": 35.0}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "payment_received"}, "version": 1})),
        )
        .await;

        let (status, invoice) = send(
            &app,
            "POST",
            "/api/accounts/account::1/invoices",
            Some(json!({
                "quote_id": quote_id,
                "kind": "final",
                "client_ref": "client::1",
                "description": "Solde carrelage",
                "items": [{"description": "Carrelage 60x60", "quantity": 20.0, "unit_price": 35.0}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(invoice["invoice"]["total_ht"], 700.0);
        assert_eq!(invoice["invoice"]["total_ttc"], 840.0);
    }

    #[tokio::test]
    async fn test_list_invoices_filtered_by_quote() {
        let (app, _temp_dir) = test_app().await;
        let quote_id = sent_quote(&app).await;

        send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "payment_received"}, "version": 1})),
        )
        .await;

        send(
            &app,
            "POST",
            "/api/accounts/account::1/invoices",
            Some(json!({
                "quote_id": quote_id,
                "kind": "deposit",
                "client_ref": "client::1",
                "description": "Acompte carrelage",
                "items": [{"description": "Acompte", "quantity": 1.0, "unit_price": 252.0}]
            })),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/accounts/account::1/invoices",
            Some(json!({
                "quote_id": null,
                "kind": "final",
                "client_ref": "client::2",
                "description": "Dépannage fuite",
                "items": [{"description": "Intervention", "quantity": 1.0, "unit_price": 90.0}]
            })),
        )
        .await;

        let (status, all) = send(&app, "GET", "/api/accounts/account::1/invoices", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["invoices"].as_array().unwrap().len(), 2);

        let (status, filtered) = send(
            &app,
            "GET",
            &format!("/api/accounts/account::1/invoices?quote_id={}", quote_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(filtered["invoices"].as_array().unwrap().len(), 1);
        assert_eq!(filtered["invoices"][0]["quote_id"], quote_id);
    }

    #[tokio::test]
    async fn test_paid_invoice_is_frozen() {
        let (app, _temp_dir) = test_app().await;

        let (status, invoice) = send(
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
        assert_eq!(status, StatusCode::CREATED);
        let invoice_id = invoice["invoice"]["id"].as_str().unwrap().to_string();

        let (status, invoice) = send(
            &app,
            "PUT",
            &format!("/api/accounts/account::1/invoices/{}/status", invoice_id),
            Some(json!({"status": "paid"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(invoice["invoice"]["status"], "paid");
        assert!(invoice["invoice"]["paid_at"].as_str().is_some());

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/accounts/account::1/invoices/{}/status", invoice_id),
            Some(json!({"status": "pending"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
