//! # REST API for Accounts
//!
//! Account creation plus the per-account configuration used to price
//! quotes. Changing the configuration recomputes deposits on quotes
//! still open for negotiation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};

use crate::domain::commands::accounts::{CreateAccountCommand, UpdateAccountConfigCommand};
use crate::io::rest::error_status;
use crate::io::rest::mappers::AccountMapper;
use crate::AppState;
use shared::{
    AccountConfigResponse, AccountListResponse, AccountResponse, CreateAccountRequest,
    UpdateAccountConfigRequest,
};

/// Create a router for account related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/:account_id", get(get_account))
        .route("/:account_id/config", get(get_config).put(update_config))
}

async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts");

    let command = CreateAccountCommand {
        company_name: request.company_name,
    };

    match state.account_service.create_account(command) {
        Ok(account) => {
            let response = AccountResponse {
                account: AccountMapper::to_dto(account),
                success_message: "Account created".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create account: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    match state.account_service.list_accounts() {
        Ok(accounts) => {
            let response = AccountListResponse {
                accounts: AccountMapper::to_dto_list(accounts),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list accounts: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.account_service.get_account(&account_id) {
        Ok(account) => {
            let response = AccountResponse {
                account: AccountMapper::to_dto(account),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get account {}: {}", account_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_config(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.account_service.get_config(&account_id) {
        Ok(config) => {
            let response = AccountConfigResponse {
                config: AccountMapper::config_to_dto(config),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get config for {}: {}", account_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn update_config(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<UpdateAccountConfigRequest>,
) -> impl IntoResponse {
    info!("PUT /api/accounts/{}/config", account_id);

    let current = match state.account_service.get_config(&account_id) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config for {}: {}", account_id, e);
            return (error_status(&e), e.to_string()).into_response();
        }
    };

    let command = UpdateAccountConfigCommand {
        account_id,
        config: AccountMapper::merge_config_request(current, request),
    };

    match state.account_service.update_config(command) {
        Ok(result) => {
            let message = if result.recomputed_quote_ids.is_empty() {
                "Configuration updated".to_string()
            } else {
                format!(
                    "Configuration updated, {} quote(s) recomputed",
                    result.recomputed_quote_ids.len()
                )
            };
            let response = AccountConfigResponse {
                config: AccountMapper::config_to_dto(result.config),
                success_message: message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update config: {}", e);
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
    async fn test_account_creation_and_config_defaults() {
        let (app, _temp_dir) = test_app().await;

        let (status, account) = send(
            &app,
            "POST",
            "/api/accounts",
            Some(json!({"company_name": "Menuiserie Blanchet"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let account_id = account["account"]["id"].as_str().unwrap().to_string();

        let (status, config) = send(
            &app,
            "GET",
            &format!("/api/accounts/{}/config", account_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(config["config"]["company_name"], "Menuiserie Blanchet");
        assert_eq!(config["config"]["deposit_percentage"], 30.0);
        assert_eq!(config["config"]["vat_rate"], 20.0);
    }

    #[tokio::test]
    async fn test_config_update_recomputes_open_quotes() {
        let (app, _temp_dir) = test_app().await;

        let (_, account) = send(
            &app,
            "POST",
            "/api/accounts",
            Some(json!({"company_name": "Plomberie Rivet"})),
        )
        .await;
        let account_id = account["account"]["id"].as_str().unwrap().to_string();

        let (_, quote) = send(
            &app,
            "POST",
            &format!("/api/accounts/{}/quotes", account_id),
            Some(json!({
                "client_ref": "client::1",
                "description": "Remplacement chauffe-eau",
                "items": [{"description": "Chauffe-eau 200L", "quantity": 1.0, "unit_price": 700.0}]
            })),
        )
        .await;
        let quote_id = quote["quote"]["id"].as_str().unwrap().to_string();
        assert_eq!(quote["quote"]["deposit_amount"], 252.0);

        let (status, config) = send(
            &app,
            "PUT",
            &format!("/api/accounts/{}/config", account_id),
            Some(json!({"deposit_percentage": 50.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(config["config"]["deposit_percentage"], 50.0);
        assert!(config["success_message"]
            .as_str()
            .unwrap()
            .contains("1 quote(s) recomputed"));

        let (_, quote) = send(
            &app,
            "GET",
            &format!("/api/accounts/{}/quotes/{}", account_id, quote_id),
            None,
        )
        .await;
        assert_eq!(quote["quote"]["deposit_amount"], 420.0);
    }

    #[tokio::test]
    async fn test_invalid_percentage_is_rejected() {
        let (app, _temp_dir) = test_app().await;

        let (_, account) = send(
            &app,
            "POST",
            "/api/accounts",
            Some(json!({"company_name": "Couverture Morel"})),
        )
        .await;
        let account_id = account["account"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/accounts/{}/config", account_id),
            Some(json!({"vat_rate": 130.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
