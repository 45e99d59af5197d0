use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::AvailabilityRule;
use doctor_cell::services::slots::project_breaks;
use doctor_cell::store::{AvailabilityRuleStore, TimeOffStore};
use shared_config::AppConfig;
use shared_models::TimeInterval;
use shared_utils::{iso_weekday, local_datetime};

use crate::models::{AppointmentError, ConflictCheckResponse};
use crate::store::AppointmentStore;

/// Read-only guard run before every create and reschedule.
///
/// Checks run in a fixed order and the first violation wins: weekday rule
/// and duration, then time-off, then overlap with live appointments.
pub struct ConflictDetectionService {
    rules: Arc<dyn AvailabilityRuleStore>,
    time_offs: Arc<dyn TimeOffStore>,
    appointments: Arc<dyn AppointmentStore>,
    timezone: Tz,
    enforce_working_hours: bool,
}

impl ConflictDetectionService {
    pub fn new(
        config: &AppConfig,
        rules: Arc<dyn AvailabilityRuleStore>,
        time_offs: Arc<dyn TimeOffStore>,
        appointments: Arc<dyn AppointmentStore>,
    ) -> Self {
        Self {
            rules,
            time_offs,
            appointments,
            timezone: config.service_timezone,
            enforce_working_hours: config.enforce_working_hours,
        }
    }

    pub async fn check_conflicts(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        debug!("Checking conflicts for doctor {} from {} to {}", doctor_id, start, end);

        self.check_availability(doctor_id, start, end).await?;
        self.check_time_off(doctor_id, start, end).await?;
        self.check_overlap(doctor_id, start, end, exclude_appointment_id).await?;

        Ok(())
    }

    /// Runs the same guard but reports business-rule violations as data.
    /// Store failures still surface as errors.
    pub async fn probe(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        if end <= start {
            return Err(AppointmentError::Validation("end must be after start".to_string()));
        }

        match self.check_conflicts(doctor_id, start, end, exclude_appointment_id).await {
            Ok(()) => Ok(ConflictCheckResponse {
                has_conflict: false,
                kind: None,
                message: None,
            }),
            Err(AppointmentError::Database(msg)) => Err(AppointmentError::Database(msg)),
            Err(e) => Ok(ConflictCheckResponse {
                has_conflict: true,
                kind: Some(e.kind().to_string()),
                message: Some(e.to_string()),
            }),
        }
    }

    async fn check_availability(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        let day_of_week = iso_weekday(start, self.timezone);

        let rule = self
            .rules
            .find_by_doctor_and_weekday(doctor_id, day_of_week)
            .await?
            .ok_or_else(|| {
                warn!("Doctor {} has no rule for weekday {}", doctor_id, day_of_week);
                AppointmentError::NoAvailability { doctor_id, day_of_week }
            })?;

        let minutes = (end - start).num_minutes();
        if rule.slot_minutes > 0 && minutes % i64::from(rule.slot_minutes) != 0 {
            return Err(AppointmentError::InvalidDuration {
                minutes,
                slot_minutes: rule.slot_minutes,
            });
        }

        if self.enforce_working_hours && !self.within_working_hours(&rule, start, end) {
            warn!("Booking {} - {} falls outside working hours of doctor {}", start, end, doctor_id);
            return Err(AppointmentError::NoAvailability { doctor_id, day_of_week });
        }

        Ok(())
    }

    fn within_working_hours(&self, rule: &AvailabilityRule, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let local = TimeInterval::new(local_datetime(start, self.timezone), local_datetime(end, self.timezone));
        let date = local.start.date();
        let work = TimeInterval::new(date.and_time(rule.work_start), date.and_time(rule.work_end));

        work.contains(&local) && !project_breaks(rule, date).iter().any(|b| b.overlaps(&local))
    }

    async fn check_time_off(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        let blocking = self.time_offs.find_overlapping(doctor_id, start, end).await?;
        if !blocking.is_empty() {
            warn!("Doctor {} is on time-off between {} and {}", doctor_id, start, end);
            return Err(AppointmentError::TimeOffConflict(doctor_id));
        }
        Ok(())
    }

    async fn check_overlap(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let existing = self.appointments.find_overlapping(doctor_id, start, end).await?;

        if let Some(conflict) = existing
            .iter()
            .find(|a| Some(a.id) != exclude_appointment_id && a.is_blocking())
        {
            warn!("Conflict detected for doctor {} with appointment {}", doctor_id, conflict.id);
            return Err(AppointmentError::Overlap(conflict.id));
        }
        Ok(())
    }
}
