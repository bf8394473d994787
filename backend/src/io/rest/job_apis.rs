//! # REST API for Job Scheduling
//!
//! Endpoints driving a job from its creation (on quote acceptance)
//! through date negotiation to completion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use log::{error, info};

use crate::domain::commands::jobs::{
    AdvanceJobsCommand, ClientDateResponseCommand, CompleteJobCommand, ConfirmDatesCommand,
    ProposeDatesCommand,
};
use crate::io::rest::error_status;
use crate::io::rest::mappers::JobMapper;
use crate::AppState;
use shared::{
    AdvanceJobsRequest, AdvanceJobsResponse, ClientDateResponseRequest, CompleteJobRequest,
    ConfirmDatesRequest, JobListResponse, JobResponse, ProposeDatesRequest,
};

/// Create a router for job related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs))
        .route("/advance", post(advance_jobs))
        .route("/:job_id", get(get_job))
        .route("/:job_id/propose-dates", post(propose_dates))
        .route("/:job_id/client-response", post(record_client_response))
        .route("/:job_id/confirm-dates", post(confirm_dates))
        .route("/:job_id/complete", post(complete_job))
}

async fn list_jobs(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match state.job_service.list_jobs(&account_id) {
        Ok(jobs) => {
            let response = JobListResponse {
                jobs: JobMapper::to_dto_list(jobs),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list jobs: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_job(
    State(state): State<AppState>,
    Path((account_id, job_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.job_service.get_job(&account_id, &job_id) {
        Ok(job) => {
            let response = JobResponse {
                job: JobMapper::to_dto(job),
                success_message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to get job {}: {}", job_id, e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Artisan proposes a date range to the client
async fn propose_dates(
    State(state): State<AppState>,
    Path((account_id, job_id)): Path<(String, String)>,
    Json(request): Json<ProposeDatesRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/accounts/{}/jobs/{}/propose-dates",
        account_id, job_id
    );

    let range = match JobMapper::range_to_domain(request.range) {
        Ok(range) => range,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let command = ProposeDatesCommand {
        account_id,
        job_id,
        range,
        expected_version: request.version,
    };

    match state.job_service.propose_dates(command) {
        Ok(job) => {
            let response = JobResponse {
                job: JobMapper::to_dto(job),
                success_message: "Dates proposed to client".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to propose dates: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Record the client's accept or counter-proposal
async fn record_client_response(
    State(state): State<AppState>,
    Path((account_id, job_id)): Path<(String, String)>,
    Json(request): Json<ClientDateResponseRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/accounts/{}/jobs/{}/client-response",
        account_id, job_id
    );

    let response = match JobMapper::response_to_domain(request.response) {
        Ok(response) => response,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let command = ClientDateResponseCommand {
        account_id,
        job_id,
        response,
        expected_version: request.version,
    };

    match state.job_service.record_client_response(command) {
        Ok(job) => {
            let response = JobResponse {
                job: JobMapper::to_dto(job),
                success_message: "Client response recorded".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to record client response: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Artisan confirms the dates; the job becomes planned
async fn confirm_dates(
    State(state): State<AppState>,
    Path((account_id, job_id)): Path<(String, String)>,
    Json(request): Json<ConfirmDatesRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/accounts/{}/jobs/{}/confirm-dates",
        account_id, job_id
    );

    let command = ConfirmDatesCommand {
        account_id,
        job_id,
        expected_version: request.version,
    };

    match state.job_service.confirm_dates(command) {
        Ok(job) => {
            let response = JobResponse {
                job: JobMapper::to_dto(job),
                success_message: "Job planned".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to confirm dates: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Artisan marks the job finished
async fn complete_job(
    State(state): State<AppState>,
    Path((account_id, job_id)): Path<(String, String)>,
    Json(request): Json<CompleteJobRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts/{}/jobs/{}/complete", account_id, job_id);

    let command = CompleteJobCommand {
        account_id,
        job_id,
        expected_version: request.version,
    };

    match state.job_service.complete_job(command) {
        Ok(job) => {
            let response = JobResponse {
                job: JobMapper::to_dto(job),
                success_message: "Job completed".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to complete job: {}", e);
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

/// Start every planned job whose start date has arrived
async fn advance_jobs(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<AdvanceJobsRequest>,
) -> impl IntoResponse {
    let today = match request.today {
        Some(value) => match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid date '{}': {}", value, e),
                )
                    .into_response()
            }
        },
        None => Utc::now().date_naive(),
    };

    let command = AdvanceJobsCommand { account_id, today };

    match state.job_service.advance_jobs(command) {
        Ok(result) => {
            let response = AdvanceJobsResponse {
                started_job_ids: result.started_job_ids,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to advance jobs: {}", e);
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

    /// Accept a quote over HTTP and return the created job id.
    async fn accepted_job(app: &axum::Router) -> String {
        let (_, quote) = send(
            app,
            "POST",
            "/api/accounts/account::1/quotes",
            Some(json!({
                "client_ref": "client::1",
                "description": "Isolation combles",
                "items": [{"description": "Laine de verre", "quantity": 40.0, "unit_price": 8.0}]
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
        send(
            app,
            "POST",
            &format!("/api/accounts/account::1/quotes/{}/events", quote_id),
            Some(json!({"event": {"type": "client_accepted"}, "version": 1})),
        )
        .await;

        let (_, jobs) = send(app, "GET", "/api/accounts/account::1/jobs", None).await;
        jobs["jobs"][0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_counter_proposal_flow_over_http() {
        let (app, _temp_dir) = test_app().await;
        let job_id = accepted_job(&app).await;

        let (status, job) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/jobs/{}/propose-dates", job_id),
            Some(json!({
                "range": {"start": "2025-06-02", "end": "2025-06-06"},
                "version": 0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["job"]["status"], "awaiting_client_response");

        let (status, job) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/jobs/{}/client-response", job_id),
            Some(json!({
                "response": {"type": "counter", "range": {"start": "2025-06-09", "end": "2025-06-13"}},
                "version": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["job"]["status"], "client_proposed_alternate");

        let (status, job) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/jobs/{}/confirm-dates", job_id),
            Some(json!({"version": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["job"]["status"], "planned");
        assert_eq!(job["job"]["proposed_range"]["start"], "2025-06-09");

        let (status, result) = send(
            &app,
            "POST",
            "/api/accounts/account::1/jobs/advance",
            Some(json!({"today": "2025-06-09"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["started_job_ids"][0], job_id);

        let (status, job) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/jobs/{}/complete", job_id),
            Some(json!({"version": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["job"]["status"], "completed");
    }

    #[tokio::test]
    async fn test_completing_unstarted_job_is_bad_request() {
        let (app, _temp_dir) = test_app().await;
        let job_id = accepted_job(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/jobs/{}/complete", job_id),
            Some(json!({"version": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_range_is_bad_request() {
        let (app, _temp_dir) = test_app().await;
        let job_id = accepted_job(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/accounts/account::1/jobs/{}/propose-dates", job_id),
            Some(json!({
                "range": {"start": "2025-06-13", "end": "2025-06-09"},
                "version": 0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
