//! Input validation utilities

use crate::error::{RegistrationError, RegistrationResult};
use crate::models::{EmployeeIdField, NewClass, Student};

/// Validate a class creation request
pub fn validate_class(class: &NewClass) -> Result<(), String> {
    if class.class_name.trim().is_empty() {
        return Err("Class name is required".to_string());
    }

    if class.date.trim().is_empty() {
        return Err("Class date is required".to_string());
    }

    Ok(())
}

/// Validate a roster entry
pub fn validate_student(student: &Student) -> Result<(), String> {
    if student.employee_id <= 0 {
        return Err(format!(
            "Employee ID must be positive, got {}",
            student.employee_id
        ));
    }

    Ok(())
}

/// Parse a required numeric query parameter such as `classID`
pub fn parse_id(name: &str, value: Option<&str>) -> RegistrationResult<i64> {
    let value = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RegistrationError::Validation(format!("{} is required", name)))?;

    value
        .parse()
        .map_err(|_| RegistrationError::Validation(format!("{} must be an integer", name)))
}

impl EmployeeIdField {
    /// Employee ID as an integer, whichever way the client sent it
    pub fn parse(&self) -> RegistrationResult<i64> {
        match self {
            EmployeeIdField::Number(id) => Ok(*id),
            EmployeeIdField::Text(text) => parse_id("employeeID", Some(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_class() {
        let class = NewClass {
            class_name: "Math101".to_string(),
            date: "2024-01-01".to_string(),
        };
        assert!(validate_class(&class).is_ok());

        let unnamed = NewClass {
            class_name: "  ".to_string(),
            date: "2024-01-01".to_string(),
        };
        assert_eq!(
            validate_class(&unnamed),
            Err("Class name is required".to_string())
        );

        let undated = NewClass {
            class_name: "Math101".to_string(),
            date: String::new(),
        };
        assert!(validate_class(&undated).is_err());
    }

    #[test]
    fn test_validate_student() {
        let mut student = Student {
            employee_id: 7,
            name: "Ann".to_string(),
            department: "X".to_string(),
            group: "G1".to_string(),
            status: false,
        };
        assert!(validate_student(&student).is_ok());

        student.employee_id = 0;
        assert!(validate_student(&student).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("classID", Some(" 12 ")).unwrap(), 12);
        assert!(matches!(
            parse_id("classID", None),
            Err(RegistrationError::Validation(msg)) if msg == "classID is required"
        ));
        assert!(matches!(
            parse_id("classID", Some("abc")),
            Err(RegistrationError::Validation(msg)) if msg == "classID must be an integer"
        ));
    }

    #[test]
    fn test_employee_id_field_parse() {
        assert_eq!(EmployeeIdField::Number(7).parse().unwrap(), 7);
        assert_eq!(EmployeeIdField::Text("8".to_string()).parse().unwrap(), 8);
        assert!(EmployeeIdField::Text("x".to_string()).parse().is_err());
    }
}
