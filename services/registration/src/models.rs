//! Registration entities and request payloads
//!
//! Field names on the wire (`classID`, `employeeID`, ...) are the ones
//! already persisted in the store and must not change.

use serde::{Deserialize, Serialize};

/// A scheduled attendance session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    #[serde(rename = "classID")]
    pub class_id: i64,
    #[serde(rename = "className")]
    pub class_name: String,
    pub date: String,
}

/// Request for class creation; the ID is assigned by the store
#[derive(Debug, Clone, Deserialize)]
pub struct NewClass {
    #[serde(rename = "className", default)]
    pub class_name: String,
    #[serde(default)]
    pub date: String,
}

impl NewClass {
    pub fn with_id(self, class_id: i64) -> Class {
        Class {
            class_id,
            class_name: self.class_name,
            date: self.date,
        }
    }
}

/// A roster entry, owned by exactly one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "employeeID")]
    pub employee_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub group: String,
    /// `true` once checked in
    #[serde(default)]
    pub status: bool,
}

/// Result of a check-in attempt.
///
/// Unknown IDs and repeated check-ins are ordinary outcomes reported to the
/// person at the desk, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    CheckedIn(Student),
    AlreadyCheckedIn(Student),
    NotFound,
}

pub const CHECK_IN_SUCCESSFUL: &str = "check-in successful";
pub const DUPLICATE_CHECK_IN: &str = "duplicate check-in";
pub const EMPLOYEE_NOT_FOUND: &str = "employee ID not found";

impl CheckInOutcome {
    /// Human-readable message shown to the end user
    pub fn message(&self) -> String {
        match self {
            CheckInOutcome::CheckedIn(student) => format!(
                "{}: {} ({})",
                CHECK_IN_SUCCESSFUL, student.name, student.group
            ),
            CheckInOutcome::AlreadyCheckedIn(_) => DUPLICATE_CHECK_IN.to_string(),
            CheckInOutcome::NotFound => EMPLOYEE_NOT_FOUND.to_string(),
        }
    }
}

/// `classID` query parameter shared by the class and student routes
#[derive(Debug, Clone, Deserialize)]
pub struct ClassQuery {
    #[serde(rename = "classID")]
    pub class_id: Option<String>,
}

/// Query for removing a single roster entry
#[derive(Debug, Clone, Deserialize)]
pub struct StudentQuery {
    #[serde(rename = "classID")]
    pub class_id: Option<String>,
    #[serde(rename = "employeeID")]
    pub employee_id: Option<String>,
}

/// Employee ID as sent by check-in clients, either `"7"` or `7`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EmployeeIdField {
    Number(i64),
    Text(String),
}

/// Request for check-in
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    #[serde(rename = "employeeID")]
    pub employee_id: EmployeeIdField,
}
