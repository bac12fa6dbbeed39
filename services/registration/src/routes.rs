//! Registration service routes
//!
//! Every JSON response uses the same envelope: `{"error": false, "data": ...}`
//! on success and `{"error": true, "errMsg": "..."}` on failure.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    error::{RegistrationError, RegistrationResult},
    models::{CheckInRequest, ClassQuery, NewClass, Student, StudentQuery},
    state::AppState,
    validation::{parse_id, validate_class, validate_student},
};

/// Create the router for the registration service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health_check))
        .route("/class", post(create_class).delete(delete_class))
        .route("/class/all", get(list_classes))
        .route("/class/status", get(list_roster))
        .route("/student/import", post(import_roster))
        .route("/student/check-in", put(check_in))
        .route("/student", put(update_student).delete(delete_student))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "error": false,
        "data": data,
    }))
}

fn class_id(Query(query): Query<ClassQuery>) -> RegistrationResult<i64> {
    parse_id("classID", query.class_id.as_deref())
}

/// Liveness probe
pub async fn ping() -> &'static str {
    "pong"
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = matches!(state.registration.health_check().await, Ok(true));
    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if store_ok { "ok" } else { "degraded" },
            "service": "registration-service",
            "store": store_ok,
        })),
    )
}

/// Create a new class
pub async fn create_class(
    State(state): State<AppState>,
    payload: Result<Json<NewClass>, JsonRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let Json(payload) = payload?;
    validate_class(&payload).map_err(RegistrationError::Validation)?;

    let class = state.registration.create_class(payload).await?;
    Ok(ok(class))
}

/// Get all classes
pub async fn list_classes(State(state): State<AppState>) -> RegistrationResult<impl IntoResponse> {
    let classes = state.registration.list_classes().await?;
    Ok(ok(classes))
}

/// Import the roster of a class
pub async fn import_roster(
    State(state): State<AppState>,
    query: Result<Query<ClassQuery>, QueryRejection>,
    students: Result<Json<Vec<Student>>, JsonRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let class_id = class_id(query?)?;
    let Json(students) = students?;
    for student in &students {
        validate_student(student).map_err(RegistrationError::Validation)?;
    }

    state.registration.import_roster(class_id, &students).await?;
    Ok(ok("ok"))
}

/// Check a student in
pub async fn check_in(
    State(state): State<AppState>,
    query: Result<Query<ClassQuery>, QueryRejection>,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let class_id = class_id(query?)?;
    let Json(payload) = payload?;
    let employee_id = payload.employee_id.parse()?;

    let outcome = state.registration.check_in(class_id, employee_id).await?;
    info!(
        "Check-in for employee {} in class {}: {}",
        employee_id,
        class_id,
        outcome.message()
    );
    Ok(ok(outcome.message()))
}

/// Get the roster of a class with check-in status
pub async fn list_roster(
    State(state): State<AppState>,
    query: Result<Query<ClassQuery>, QueryRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let class_id = class_id(query?)?;
    let students = state.registration.list_roster(class_id).await?;
    Ok(ok(students))
}

/// Delete a class and its roster
pub async fn delete_class(
    State(state): State<AppState>,
    query: Result<Query<ClassQuery>, QueryRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let class_id = class_id(query?)?;
    state.registration.delete_class(class_id).await?;
    Ok(ok("ok"))
}

/// Insert or replace a single roster entry
pub async fn update_student(
    State(state): State<AppState>,
    query: Result<Query<ClassQuery>, QueryRejection>,
    student: Result<Json<Student>, JsonRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let class_id = class_id(query?)?;
    let Json(student) = student?;
    validate_student(&student).map_err(RegistrationError::Validation)?;

    state.registration.update_student(class_id, &student).await?;
    Ok(ok("ok"))
}

/// Remove a single roster entry
pub async fn delete_student(
    State(state): State<AppState>,
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> RegistrationResult<impl IntoResponse> {
    let Query(query) = query?;
    let class_id = parse_id("classID", query.class_id.as_deref())?;
    let employee_id = parse_id("employeeID", query.employee_id.as_deref())?;

    state
        .registration
        .delete_student(class_id, employee_id)
        .await?;
    Ok(ok("ok"))
}
