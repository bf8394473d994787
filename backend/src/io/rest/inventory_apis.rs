//! # REST API for Inventory

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use log::{error, info};

use crate::domain::commands::inventory::{
    CreateInventoryItemCommand, UpdateInventoryQuantityCommand,
};
use crate::io::rest::error_status;
use crate::io::rest::mappers::InventoryMapper;
use crate::AppState;
use shared::{
    CreateInventoryItemRequest, InventoryItemResponse, InventoryListResponse,
    UpdateInventoryQuantityRequest,
};

/// Create a router for inventory related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(list_low_stock))
        .route("/:item_id", get(get_item).delete(delete_item))
        .route("/:item_id/quantity", put(update_quantity))
}

async fn create_item(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<CreateInventoryItemRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts/{}/inventory", account_id);

    let command = CreateInventoryItemCommand {
        account_id,
        name: request.name,
        reference: request.reference,
        quantity: request.quantity,
        unit_price: request.unit_price,
        min_stock: request.min_stock,
        category: request.category,
    };

    match state.inventory_service.create_item(command) {
        Ok(item) => {
            let response = InventoryItemResponse {
                item: InventoryMapper::to_dto(item),
                success_message: "Item created".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create inventory item: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn list_items(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.inventory_service.list_items(&account_id) {
        Ok(items) => {
            let response = InventoryListResponse {
                items: InventoryMapper::to_dto_list(items),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list inventory: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Items at or below their minimum stock level
async fn list_low_stock(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.inventory_service.list_low_stock(&account_id) {
        Ok(items) => {
            let response = InventoryListResponse {
                items: InventoryMapper::to_dto_list(items),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list low stock items: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_item(
    State(state): State<AppState>,
    Path((account_id, item_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.inventory_service.get_item(&account_id, &item_id) {
        Ok(item) => {
            let response = InventoryItemResponse {
                item: InventoryMapper::to_dto(item),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get inventory item {}: {}", item_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn update_quantity(
    State(state): State<AppState>,
    Path((account_id, item_id)): Path<(String, String)>,
    Json(request): Json<UpdateInventoryQuantityRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/accounts/{}/inventory/{}/quantity",
        account_id, item_id
    );

    let command = UpdateInventoryQuantityCommand {
        account_id,
        item_id,
        quantity: request.quantity,
    };

    match state.inventory_service.update_quantity(command) {
        Ok(item) => {
            let response = InventoryItemResponse {
                item: InventoryMapper::to_dto(item),
                success_message: "Quantity updated".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update quantity: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn delete_item(
    State(state): State<AppState>,
    Path((account_id, item_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/accounts/{}/inventory/{}", account_id, item_id);

    match state.inventory_service.delete_item(&account_id, &item_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete inventory item {}: {}", item_id, e);
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
    async fn test_low_stock_listing_over_http() {
        let (app, _temp_dir) = test_app().await;

        let (status, item) = send(
            &app,
            "POST",
            "/api/accounts/account::1/inventory",
            Some(json!({
                "name": "Vis 4x40",
                "reference": "VIS-440",
                "quantity": 200,
                "unit_price": 0.08,
                "min_stock": 50,
                "category": "Visserie"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let item_id = item["item"]["id"].as_str().unwrap().to_string();

        let (_, low) = send(&app, "GET", "/api/accounts/account::1/inventory/low-stock", None).await;
        assert_eq!(low["items"].as_array().unwrap().len(), 0);

        let (status, item) = send(
            &app,
            "PUT",
            &format!("/api/accounts/account::1/inventory/{}/quantity", item_id),
            Some(json!({"quantity": 30})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["item"]["quantity"], 30);

        let (_, low) = send(&app, "GET", "/api/accounts/account::1/inventory/low-stock", None).await;
        assert_eq!(low["items"].as_array().unwrap().len(), 1);
        assert_eq!(low["items"][0]["id"], item_id);
    }

    #[tokio::test]
    async fn test_deleted_item_is_gone() {
        let (app, _temp_dir) = test_app().await;

        let (_, item) = send(
            &app,
            "POST",
            "/api/accounts/account::1/inventory",
            Some(json!({
                "name": "Sac de ciment 25kg",
                "reference": "CIM-25",
                "quantity": 12,
                "unit_price": 7.9,
                "min_stock": null,
                "category": null
            })),
        )
        .await;
        let item_id = item["item"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/accounts/account::1/inventory/{}", item_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/accounts/account::1/inventory/{}", item_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
