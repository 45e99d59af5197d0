// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

/// Status machine: SCHEDULED is the only non-terminal state.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![AppointmentStatus::Attended, AppointmentStatus::Cancelled],
            AppointmentStatus::Attended => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    pub fn validate_status_transition(
        &self,
        appointment: &Appointment,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", appointment.status, new_status);

        if !self.get_valid_transitions(appointment.status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", appointment.status, new_status);
            return Err(invalid_state(appointment.id, appointment.status));
        }
        Ok(())
    }

    /// Only live appointments can be moved.
    pub fn validate_reschedule(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        if appointment.status != AppointmentStatus::Scheduled {
            warn!("Refusing to reschedule {} appointment {}", appointment.status, appointment.id);
            return Err(invalid_state(appointment.id, appointment.status));
        }
        Ok(())
    }
}

fn invalid_state(id: Uuid, status: AppointmentStatus) -> AppointmentError {
    AppointmentError::InvalidState { id, status }
}
