// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use std::sync::Arc;

use doctor_cell::store::{AvailabilityRuleStore, TimeOffStore};
use shared_config::AppConfig;
use shared_database::StoreError;
use shared_models::TimeInterval;

use crate::models::{
    Appointment, AppointmentError, AppointmentQuery, AppointmentStatus, BookAppointmentRequest,
    RescheduleAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::store::AppointmentStore;

/// Create, move and close appointments. Every write that changes the
/// interval re-runs the conflict guard; the store settles races.
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn AppointmentStore>,
        rules: Arc<dyn AvailabilityRuleStore>,
        time_offs: Arc<dyn TimeOffStore>,
    ) -> Self {
        let conflict_service = ConflictDetectionService::new(config, rules, time_offs, Arc::clone(&store));

        Self {
            store,
            conflict_service,
            lifecycle_service: AppointmentLifecycleService::new(),
        }
    }

    pub fn conflicts(&self) -> &ConflictDetectionService {
        &self.conflict_service
    }

    pub async fn create_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        let doctor_id = request
            .doctor_id
            .ok_or_else(|| AppointmentError::Validation("doctor_id is required".to_string()))?;
        let patient_id = request
            .patient_id
            .ok_or_else(|| AppointmentError::Validation("patient_id is required".to_string()))?;
        validate_interval(request.start, request.end)?;

        info!("Booking appointment for patient {} with doctor {} at {}", patient_id, doctor_id, request.start);

        self.conflict_service
            .check_conflicts(doctor_id, request.start, request.end, None)
            .await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            clinic_id: request.clinic_id,
            start: request.start,
            end: request.end,
            status: request.status.unwrap_or_default(),
            concern: request.concern,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(appointment).await.map_err(|e| {
            if matches!(e, StoreError::UniqueViolation(_)) {
                warn!("Insert for doctor {} at {} lost to a concurrent booking", doctor_id, request.start);
            }
            AppointmentError::from(e)
        })?;

        info!("Appointment {} booked", created.id);
        Ok(created)
    }

    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        validate_interval(request.new_start, request.new_end)?;

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service.validate_reschedule(&current)?;

        debug!(
            "Rescheduling appointment {} from {} to {}",
            appointment_id, current.start, request.new_start
        );

        self.conflict_service
            .check_conflicts(current.doctor_id, request.new_start, request.new_end, Some(appointment_id))
            .await?;

        let expected_version = current.version;
        let candidate = Appointment {
            start: request.new_start,
            end: request.new_end,
            ..current
        };

        let updated = self.store.update(candidate, expected_version).await?;
        info!("Appointment {} rescheduled to {} (version {})", updated.id, updated.start, updated.version);
        Ok(updated)
    }

    /// Cancelling an already cancelled appointment returns it unchanged.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;

        if current.status == AppointmentStatus::Cancelled {
            debug!("Appointment {} already cancelled", appointment_id);
            return Ok(current);
        }
        self.lifecycle_service
            .validate_status_transition(&current, AppointmentStatus::Cancelled)?;

        let expected_version = current.version;
        let cancelled = self
            .store
            .update(
                Appointment {
                    status: AppointmentStatus::Cancelled,
                    ..current
                },
                expected_version,
            )
            .await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(cancelled)
    }

    /// Completion hook for the visit workflow.
    pub async fn mark_attended(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current, AppointmentStatus::Attended)?;

        let expected_version = current.version;
        let attended = self
            .store
            .update(
                Appointment {
                    status: AppointmentStatus::Attended,
                    ..current
                },
                expected_version,
            )
            .await?;

        info!("Appointment {} marked attended", appointment_id);
        Ok(attended)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound(format!("Appointment not found: {}", appointment_id)))
    }

    pub async fn search_appointments(&self, query: AppointmentQuery) -> Result<Vec<Appointment>, AppointmentError> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(AppointmentError::Validation("from must not be after to".to_string()));
            }
        }
        Ok(self.store.search(query).await?)
    }

    pub async fn find_by_doctor_and_start(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        self.store
            .find_by_doctor_and_start(doctor_id, start)
            .await?
            .ok_or_else(|| {
                AppointmentError::NotFound(format!("No appointment for doctor {} at {}", doctor_id, start))
            })
    }

    /// Whether `patient_id` has an attended visit with `doctor_id` starting
    /// before `before`. Reviews are only accepted after such a visit.
    pub async fn has_attended_visit(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<bool, AppointmentError> {
        let visits = self
            .store
            .search(AppointmentQuery {
                doctor_id: Some(doctor_id),
                patient_id: Some(patient_id),
                status: Some(AppointmentStatus::Attended),
                to: Some(before),
                limit: Some(1),
                ..AppointmentQuery::default()
            })
            .await?;
        Ok(!visits.is_empty())
    }
}

fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppointmentError> {
    if !TimeInterval::new(start, end).is_valid() {
        return Err(AppointmentError::Validation("end must be after start".to_string()));
    }
    Ok(())
}
