//! HTTP request handlers for the leave and payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{Actor, AttendanceRecord, Employee, PayrollMonth};

use super::request::{
    ActorBody, BACK_OFFICE_ROLES, EmployeeQuery, LeaveReportQuery, ListLeavesQuery,
    RejectLeaveBody, RunPayrollBody, StatusQuery, SubmitLeaveBody, YearQuery,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/leaves",
            post(submit_leave_handler).get(list_all_leaves_handler),
        )
        .route("/leaves/:id/cancel", post(cancel_leave_handler))
        .route("/leaves/:id/approve", post(approve_leave_handler))
        .route("/leaves/:id/reject", post(reject_leave_handler))
        .route("/employees", put(upsert_employee_handler))
        .route("/employees/:employee_id/leaves", get(list_leaves_handler))
        .route("/employees/:employee_id/balance", get(leave_balance_handler))
        .route("/employees/:employee_id/payslips", get(payslip_history_handler))
        .route("/attendance", post(record_attendance_handler))
        .route("/reports/leaves", get(leave_report_handler))
        .route("/payroll/run", post(run_payroll_handler))
        .route("/payroll/:month", get(get_payroll_handler))
        .route("/payroll/:month/summary", get(payroll_summary_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

fn respond<T: Serialize>(
    result: EngineResult<T>,
    status: StatusCode,
    correlation_id: Uuid,
) -> Response {
    match result {
        Ok(body) => json_response(status, body),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Request failed"
            );
            error_response(err.into())
        }
    }
}

/// Unwraps a JSON body or renders the rejection.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(error_response(ApiErrorResponse::new(
        StatusCode::BAD_REQUEST,
        error,
    )))
}

fn parse_path<T>(path: Result<Path<T>, PathRejection>, correlation_id: Uuid) -> Result<T, Response> {
    path.map(|Path(value)| value).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path parameter");
        error_response(ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error(rejection.body_text()),
        ))
    })
}

fn parse_query<T>(
    query: Result<Query<T>, QueryRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    query.map(|Query(value)| value).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
        error_response(ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error(rejection.body_text()),
        ))
    })
}

fn parse_month(month: &str) -> Result<PayrollMonth, Response> {
    month
        .parse::<PayrollMonth>()
        .map_err(|err| error_response(err.into()))
}

/// Approvals and payroll runs are reserved for back-office roles.
fn require_back_office(actor: &Actor, action: &str, correlation_id: Uuid) -> Result<(), Response> {
    if BACK_OFFICE_ROLES.contains(&actor.role) {
        return Ok(());
    }
    warn!(
        correlation_id = %correlation_id,
        actor_id = %actor.employee_id,
        role = ?actor.role,
        action,
        "Actor lacks a back-office role"
    );
    Err(error_response(ApiErrorResponse::new(
        StatusCode::FORBIDDEN,
        ApiError::forbidden(actor.role, action),
    )))
}

/// Handler for POST /leaves.
async fn submit_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitLeaveBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing leave submission");

    let body = match parse_body(payload, correlation_id) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let result = state.engine().submit_leave(&body.actor, &body.leave);
    respond(result, StatusCode::CREATED, correlation_id)
}

/// Handler for POST /leaves/:id/cancel.
async fn cancel_leave_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ActorBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, body) = match (parse_path(path, correlation_id), parse_body(payload, correlation_id)) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    info!(correlation_id = %correlation_id, application_id = id, "Processing leave cancellation");

    let result = state.engine().cancel_leave(id, &body.actor.employee_id);
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for POST /leaves/:id/approve.
async fn approve_leave_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ActorBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, body) = match (parse_path(path, correlation_id), parse_body(payload, correlation_id)) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    info!(correlation_id = %correlation_id, application_id = id, "Processing leave approval");

    if let Err(response) = require_back_office(&body.actor, "approve leave", correlation_id) {
        return response;
    }
    let result = state.engine().approve_leave(id, &body.actor.employee_id);
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for POST /leaves/:id/reject.
async fn reject_leave_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<RejectLeaveBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, body) = match (parse_path(path, correlation_id), parse_body(payload, correlation_id)) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    info!(correlation_id = %correlation_id, application_id = id, "Processing leave rejection");

    if let Err(response) = require_back_office(&body.actor, "reject leave", correlation_id) {
        return response;
    }
    let result =
        state
            .engine()
            .reject_leave(id, &body.actor.employee_id, body.reason.as_deref());
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for GET /leaves.
async fn list_all_leaves_handler(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(query, correlation_id) {
        Ok(query) => query,
        Err(response) => return response,
    };
    json_response(StatusCode::OK, state.engine().list_all_leaves(query.status))
}

/// Handler for GET /employees/:employee_id/leaves.
async fn list_leaves_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<ListLeavesQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(query, correlation_id) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let leaves = state
        .engine()
        .list_leaves(&employee_id, query.year, query.status);
    json_response(StatusCode::OK, leaves)
}

/// Handler for GET /employees/:employee_id/balance.
async fn leave_balance_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(query, correlation_id) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let result = state.engine().get_leave_balance(&employee_id, query.year);
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for GET /employees/:employee_id/payslips.
async fn payslip_history_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    json_response(StatusCode::OK, state.engine().payslip_history(&employee_id))
}

/// Handler for GET /reports/leaves.
async fn leave_report_handler(
    State(state): State<AppState>,
    query: Result<Query<LeaveReportQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(query, correlation_id) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let result =
        state
            .engine()
            .leave_report(query.from, query.to, query.leave_type, query.status);
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for POST /payroll/run.
///
/// Accepts a month and an optional employee and returns the stored records
/// plus any per-employee failures.
async fn run_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunPayrollBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run");

    let body = match parse_body(payload, correlation_id) {
        Ok(body) => body,
        Err(response) => return response,
    };
    if let Err(response) = require_back_office(&body.actor, "run payroll", correlation_id) {
        return response;
    }
    let month = match parse_month(&body.month) {
        Ok(month) => month,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = state.engine().run_payroll(
        month,
        body.employee_id.as_deref(),
        &body.actor.employee_id,
    );
    if let Ok(run) = &result {
        info!(
            correlation_id = %correlation_id,
            month = %month,
            records = run.records.len(),
            failures = run.failures.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Payroll run completed successfully"
        );
    }
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for GET /payroll/:month.
async fn get_payroll_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
    query: Result<Query<EmployeeQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(query, correlation_id) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let month = match parse_month(&month) {
        Ok(month) => month,
        Err(response) => return response,
    };
    let records = state
        .engine()
        .get_payroll(month, query.employee_id.as_deref());
    json_response(StatusCode::OK, records)
}

/// Handler for GET /payroll/:month/summary.
async fn payroll_summary_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Response {
    match parse_month(&month) {
        Ok(month) => json_response(StatusCode::OK, state.engine().payroll_summary(month)),
        Err(response) => response,
    }
}

/// Handler for PUT /employees.
async fn upsert_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee = match parse_body(payload, correlation_id) {
        Ok(employee) => employee,
        Err(response) => return response,
    };
    let result = employee.validate_base_salary().map(|()| {
        info!(
            correlation_id = %correlation_id,
            employee_id = %employee.id,
            category = %employee.category,
            "Employee upserted"
        );
        state.directory().upsert(employee.clone());
        employee
    });
    respond(result, StatusCode::OK, correlation_id)
}

/// Handler for POST /attendance.
async fn record_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRecord>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let record = match parse_body(payload, correlation_id) {
        Ok(record) => record,
        Err(response) => return response,
    };
    let result = state
        .attendance()
        .record(
            &record.employee_id,
            record.date,
            record.status,
            record.hours_worked,
        )
        .map(|()| record);
    respond(result, StatusCode::CREATED, correlation_id)
}
