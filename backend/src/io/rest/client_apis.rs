//! # REST API for Clients

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};

use crate::domain::commands::clients::{CreateClientCommand, UpdateClientCommand};
use crate::io::rest::error_status;
use crate::io::rest::mappers::ClientMapper;
use crate::AppState;
use shared::{ClientListResponse, ClientResponse, CreateClientRequest, UpdateClientRequest};

/// Create a router for client related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:client_id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

async fn create_client(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<CreateClientRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts/{}/clients", account_id);

    let command = CreateClientCommand {
        account_id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        address: request.address,
    };

    match state.client_service.create_client(command) {
        Ok(client) => {
            let response = ClientResponse {
                client: ClientMapper::to_dto(client),
                success_message: "Client created".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create client: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn list_clients(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.client_service.list_clients(&account_id) {
        Ok(clients) => {
            let response = ClientListResponse {
                clients: ClientMapper::to_dto_list(clients),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list clients: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_client(
    State(state): State<AppState>,
    Path((account_id, client_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.client_service.get_client(&account_id, &client_id) {
        Ok(client) => {
            let response = ClientResponse {
                client: ClientMapper::to_dto(client),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get client {}: {}", client_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn update_client(
    State(state): State<AppState>,
    Path((account_id, client_id)): Path<(String, String)>,
    Json(request): Json<UpdateClientRequest>,
) -> impl IntoResponse {
    info!("PUT /api/accounts/{}/clients/{}", account_id, client_id);

    let command = UpdateClientCommand {
        account_id,
        client_id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        address: request.address,
    };

    match state.client_service.update_client(command) {
        Ok(client) => {
            let response = ClientResponse {
                client: ClientMapper::to_dto(client),
                success_message: "Client updated".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update client: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn delete_client(
    State(state): State<AppState>,
    Path((account_id, client_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/accounts/{}/clients/{}", account_id, client_id);

    match state.client_service.delete_client(&account_id, &client_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete client {}: {}", client_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}
