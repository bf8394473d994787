//! # REST API for the Scheduler
//!
//! A single admin endpoint running one reminder and overdue pass for
//! an account. The caller may pin `now` for replay and testing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use log::{error, info};

use crate::domain::commands::scheduler::RunSchedulerCommand;
use crate::io::rest::error_status;
use crate::AppState;
use shared::{RunSchedulerRequest, SchedulerRunResponse};

/// Create a router for scheduler related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/run", post(run_scheduler))
}

async fn run_scheduler(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<RunSchedulerRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts/{}/scheduler/run", account_id);

    let now = match request.now {
        Some(value) => match DateTime::parse_from_rfc3339(&value) {
            Ok(instant) => instant.with_timezone(&Utc),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid instant '{}': {}", value, e),
                )
                    .into_response()
            }
        },
        None => Utc::now(),
    };

    let command = RunSchedulerCommand { account_id, now };

    match state.scheduler_service.run(command) {
        Ok(result) => {
            let response = SchedulerRunResponse {
                actions_applied: result.actions.len(),
                details: result
                    .actions
                    .into_iter()
                    .map(|action| format!("{} {}", action.entity_id, action.action))
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Scheduler run failed: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}
