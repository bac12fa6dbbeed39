//! Custom error types for the registration service

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the registration service
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// The store could not be reached or a round trip failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The class counter produced a non-viable ID
    #[error("Class ID assignment failed")]
    AssignmentFailed,

    /// No class with this ID is registered
    #[error("Class {0} not found")]
    ClassNotFound(i64),

    /// No roster entry with this employee ID in the class
    #[error("Student {employee_id} not found in class {class_id}")]
    StudentNotFound { class_id: i64, employee_id: i64 },

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every check-in attempt lost its compare-and-set to another writer
    #[error("Check-in for employee {employee_id} in class {class_id} kept conflicting")]
    CheckInConflict { class_id: i64, employee_id: i64 },

    /// Bad request with message
    #[error("{0}")]
    Validation(String),
}

impl From<JsonRejection> for RegistrationError {
    fn from(rejection: JsonRejection) -> Self {
        RegistrationError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for RegistrationError {
    fn from(rejection: QueryRejection) -> Self {
        RegistrationError::Validation(rejection.body_text())
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegistrationError::StoreUnavailable(e) => {
                error!("Store unavailable: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
            RegistrationError::Serialization(e) => {
                error!("Serialization error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RegistrationError::CheckInConflict { .. } => StatusCode::CONFLICT,
            RegistrationError::AssignmentFailed
            | RegistrationError::ClassNotFound(_)
            | RegistrationError::StudentNotFound { .. }
            | RegistrationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = Json(json!({
            "error": true,
            "errMsg": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for registration results
pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RegistrationError::ClassNotFound(9).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RegistrationError::StoreUnavailable(StoreError::PoolExhausted(Duration::from_secs(5)))
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RegistrationError::CheckInConflict {
                class_id: 1,
                employee_id: 7
            }
            .into_response()
            .status(),
            StatusCode::CONFLICT
        );
    }
}
