//! # REST API for Quote Management
//!
//! Endpoints for creating quotes, editing draft items and applying
//! lifecycle events.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::quotes::{
    CreateQuoteCommand, QuoteEventCommand, QuoteListQuery, UpdateQuoteItemsCommand,
};
use crate::io::rest::error_status;
use crate::io::rest::mappers::QuoteMapper;
use crate::AppState;
use shared::{
    CreateQuoteRequest, QuoteEventRequest, QuoteListResponse, QuoteResponse,
    UpdateQuoteItemsRequest,
};

/// Create a router for quote related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quote).get(list_quotes))
        .route("/:quote_id", get(get_quote))
        .route("/:quote_id/items", put(update_items))
        .route("/:quote_id/events", post(apply_event))
}

#[derive(Debug, Deserialize)]
struct ListQuotesParams {
    status: Option<String>,
}

/// Create a new draft quote
async fn create_quote(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<CreateQuoteRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts/{}/quotes", account_id);

    let command = CreateQuoteCommand {
        account_id,
        client_ref: request.client_ref,
        description: request.description,
        items: QuoteMapper::items_to_domain(request.items),
    };

    match state.quote_service.create_quote(command) {
        Ok(quote) => {
            let response = QuoteResponse {
                quote: QuoteMapper::to_dto(quote),
                success_message: "Quote created".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create quote: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// List quotes, optionally filtered by status
async fn list_quotes(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(params): Query<ListQuotesParams>,
) -> impl IntoResponse {
    let query = QuoteListQuery {
        status: params.status,
    };

    match state.quote_service.list_quotes(&account_id, query) {
        Ok(quotes) => {
            let response = QuoteListResponse {
                quotes: QuoteMapper::to_dto_list(quotes),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list quotes: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Get a single quote
async fn get_quote(
    State(state): State<AppState>,
    Path((account_id, quote_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.quote_service.get_quote(&account_id, &quote_id) {
        Ok(quote) => {
            let response = QuoteResponse {
                quote: QuoteMapper::to_dto(quote),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get quote {}: {}", quote_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Replace the line items of a draft quote
async fn update_items(
    State(state): State<AppState>,
    Path((account_id, quote_id)): Path<(String, String)>,
    Json(request): Json<UpdateQuoteItemsRequest>,
) -> impl IntoResponse {
    info!("PUT /api/accounts/{}/quotes/{}/items", account_id, quote_id);

    let command = UpdateQuoteItemsCommand {
        account_id,
        quote_id,
        items: QuoteMapper::items_to_domain(request.items),
        expected_version: request.version,
    };

    match state.quote_service.update_items(command) {
        Ok(quote) => {
            let response = QuoteResponse {
                quote: QuoteMapper::to_dto(quote),
                success_message: "Quote items updated".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update quote items: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Apply a lifecycle event to a quote
async fn apply_event(
    State(state): State<AppState>,
    Path((account_id, quote_id)): Path<(String, String)>,
    Json(request): Json<QuoteEventRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/accounts/{}/quotes/{}/events - {:?}",
        account_id, quote_id, request.event
    );

    let event = match QuoteMapper::event_to_domain(request.event) {
        Ok(event) => event,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let command = QuoteEventCommand {
        account_id,
        quote_id,
        event,
        expected_version: request.version,
    };

    match state.quote_service.apply_event(command) {
        Ok(result) => {
            let message = match result.created_job_id {
                Some(job_id) => format!("Event applied, job {} created", job_id),
                None => "Event applied".to_string(),
            };
            let response = QuoteResponse {
                quote: QuoteMapper::to_dto(result.quote),
                success_message: message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to apply quote event: {}", e);
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
    async fn test_quote_lifecycle_over_http() {
        let (app, _temp_dir) = test_app().await;

        let (status, quote) = send(
            &app,
            "POST",
            "/api/accounts/account::1/quotes",
            Some(json!({
                "client_ref": "client::1",
                "description": "Pose parquet",
                "items": [{"description": "Parquet chêne", "quantity": 18.0, "unit_price": 35.0}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(quote["quote"]["status"], "draft");
        let quote_id = quote["quote"]["id"].as_str().unwrap().to_string();

        let (status, sent) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "artisan_sent"}, "version": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sent["quote"]["status"], "sent");
        assert_eq!(sent["quote"]["version"], 1);

        // Replaying with the stale version must conflict.
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "client_accepted"}, "version": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, accepted) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "client_accepted"}, "version": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(accepted["quote"]["status"], "accepted");

        let (status, list) = send(
            &app,
            "GET",
            "/api/accounts/account::1/quotes?status=accepted",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["quotes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_bad_request() {
        let (app, _temp_dir) = test_app().await;

        let (_, quote) = send(
            &app,
            "POST",
            "/api/accounts/account::1/quotes",
            Some(json!({
                "client_ref": "client::1",
                "description": "Clôture",
                "items": [{"description": "Panneaux", "quantity": 6.0, "unit_price": 80.0}]
            })),
        )
        .await;
        let quote_id = quote["quote"]["id"].as_str().unwrap();

        // A draft quote cannot be accepted.
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "client_accepted"}, "version": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_quote_is_not_found() {
        let (app, _temp_dir) = test_app().await;
        let (status, _) = send(
            &app,
            "GET",
            "/api/accounts/account::1/quotes/quote::42",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
