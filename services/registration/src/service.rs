//! Class and roster operations over the key-value store
//!
//! Store layout:
//! - `ClassID_Increment`: counter handing out class IDs
//! - `classList`: sorted set, score = class ID, member = class JSON
//! - `studentList:<classID>`: hash, field = employee ID, value = student JSON

use std::sync::Arc;

use common::KeyValueStore;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{RegistrationError, RegistrationResult};
use crate::models::{CheckInOutcome, Class, NewClass, Student};

pub const CLASS_ID_COUNTER: &str = "ClassID_Increment";
pub const CLASS_LIST: &str = "classList";

/// Hash key holding the roster of one class
pub fn roster_key(class_id: i64) -> String {
    format!("studentList:{}", class_id)
}

/// Decode stored records, dropping the ones that no longer parse
fn decode_all<T, I>(records: I, source: &str) -> Vec<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = String>,
{
    records
        .into_iter()
        .filter_map(|raw| match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed record in {}: {} ({})", source, e, raw);
                None
            }
        })
        .collect()
}

/// Registration service for class and roster operations
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn KeyValueStore>,
    check_in_max_attempts: u32,
}

impl RegistrationService {
    /// Create a new registration service
    pub fn new(store: Arc<dyn KeyValueStore>, check_in_max_attempts: u32) -> Self {
        Self {
            store,
            check_in_max_attempts: check_in_max_attempts.max(1),
        }
    }

    /// Register a class under a freshly assigned ID
    pub async fn create_class(&self, class: NewClass) -> RegistrationResult<Class> {
        let class_id = self.store.increment(CLASS_ID_COUNTER).await?;
        if class_id <= 0 {
            return Err(RegistrationError::AssignmentFailed);
        }

        let class = class.with_id(class_id);
        let member = serde_json::to_string(&class)?;
        self.store
            .sorted_set_add(CLASS_LIST, class_id, &member)
            .await?;

        info!("Created class {} ({})", class_id, class.class_name);
        Ok(class)
    }

    /// All classes, ascending by ID
    pub async fn list_classes(&self) -> RegistrationResult<Vec<Class>> {
        let members = self.store.sorted_set_range(CLASS_LIST, 0, -1).await?;
        Ok(decode_all(members, CLASS_LIST))
    }

    /// Store every student of `students`, replacing entries with the same employee ID.
    ///
    /// Writes are not rolled back: on failure the students before the failing one stay stored.
    pub async fn import_roster(
        &self,
        class_id: i64,
        students: &[Student],
    ) -> RegistrationResult<()> {
        let key = roster_key(class_id);
        for student in students {
            let value = serde_json::to_string(student)?;
            self.store
                .hash_field_set(&key, &student.employee_id.to_string(), &value)
                .await?;
        }

        info!("Imported {} students into class {}", students.len(), class_id);
        Ok(())
    }

    /// Mark a student as checked in.
    ///
    /// The write only lands if the stored record is still the one that was
    /// read, so concurrent check-ins for the same student report exactly one
    /// success.
    pub async fn check_in(
        &self,
        class_id: i64,
        employee_id: i64,
    ) -> RegistrationResult<CheckInOutcome> {
        let key = roster_key(class_id);
        let field = employee_id.to_string();

        for attempt in 1..=self.check_in_max_attempts {
            let Some(current) = self.store.hash_field_get(&key, &field).await? else {
                debug!("Employee {} not on roster of class {}", employee_id, class_id);
                return Ok(CheckInOutcome::NotFound);
            };

            let mut student: Student = serde_json::from_str(&current)?;
            if student.status {
                return Ok(CheckInOutcome::AlreadyCheckedIn(student));
            }

            student.status = true;
            let updated = serde_json::to_string(&student)?;
            if self
                .store
                .hash_field_compare_and_set(&key, &field, &current, &updated)
                .await?
            {
                info!("Employee {} checked in to class {}", employee_id, class_id);
                return Ok(CheckInOutcome::CheckedIn(student));
            }

            debug!(
                "Check-in of employee {} in class {} lost a race (attempt {})",
                employee_id, class_id, attempt
            );
        }

        Err(RegistrationError::CheckInConflict {
            class_id,
            employee_id,
        })
    }

    /// Roster of a class ordered by department, then employee ID
    pub async fn list_roster(&self, class_id: i64) -> RegistrationResult<Vec<Student>> {
        let key = roster_key(class_id);
        let fields = self.store.hash_get_all(&key).await?;

        let mut students: Vec<Student> = decode_all(fields.into_values(), &key);
        students.sort_by(|a, b| {
            a.department
                .cmp(&b.department)
                .then(a.employee_id.cmp(&b.employee_id))
        });
        Ok(students)
    }

    /// Remove a class together with its roster in one atomic step
    pub async fn delete_class(&self, class_id: i64) -> RegistrationResult<()> {
        let removed = self
            .store
            .remove_by_score_and_delete(CLASS_LIST, class_id, &roster_key(class_id))
            .await?;
        if removed != 1 {
            return Err(RegistrationError::ClassNotFound(class_id));
        }

        info!("Deleted class {} and its roster", class_id);
        Ok(())
    }

    /// Insert or replace one roster entry
    pub async fn update_student(&self, class_id: i64, student: &Student) -> RegistrationResult<()> {
        let value = serde_json::to_string(student)?;
        self.store
            .hash_field_set(&roster_key(class_id), &student.employee_id.to_string(), &value)
            .await?;
        Ok(())
    }

    pub async fn delete_student(&self, class_id: i64, employee_id: i64) -> RegistrationResult<()> {
        let removed = self
            .store
            .hash_field_delete(&roster_key(class_id), &employee_id.to_string())
            .await?;
        if removed != 1 {
            return Err(RegistrationError::StudentNotFound {
                class_id,
                employee_id,
            });
        }
        Ok(())
    }

    /// Check if the store is reachable
    pub async fn health_check(&self) -> RegistrationResult<bool> {
        Ok(self.store.health_check().await?)
    }
}
