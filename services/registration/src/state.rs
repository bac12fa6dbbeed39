//! Application state shared across handlers

use crate::service::RegistrationService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registration: RegistrationService,
}
