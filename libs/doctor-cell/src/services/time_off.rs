use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::day_bounds;

use crate::models::{AvailabilityError, CreateTimeOffRequest, TimeOff};
use crate::store::TimeOffStore;

pub struct TimeOffService {
    store: Arc<dyn TimeOffStore>,
    timezone: Tz,
}

impl TimeOffService {
    pub fn new(config: &AppConfig, store: Arc<dyn TimeOffStore>) -> Self {
        Self {
            store,
            timezone: config.service_timezone,
        }
    }

    /// Records a leave window. Windows of the same doctor may not overlap
    /// or even touch one another.
    pub async fn create(&self, request: CreateTimeOffRequest) -> Result<TimeOff, AvailabilityError> {
        let doctor_id = request
            .doctor_id
            .ok_or_else(|| AvailabilityError::Validation("doctor_id is required".to_string()))?;

        if request.end <= request.start {
            return Err(AvailabilityError::Validation("Invalid start/end for time-off".to_string()));
        }
        if request.start < DateTime::<Utc>::UNIX_EPOCH {
            return Err(AvailabilityError::Validation("start can not be before 1970-01-01".to_string()));
        }

        debug!("Creating time-off for doctor {} from {} to {}", doctor_id, request.start, request.end);

        let existing = self.store.find_overlapping(doctor_id, request.start, request.end).await?;
        if !existing.is_empty() {
            warn!("Time-off for doctor {} overlaps {} existing window(s)", doctor_id, existing.len());
            return Err(AvailabilityError::TimeOffOverlap(doctor_id));
        }

        let created = self
            .store
            .insert(TimeOff {
                id: Uuid::new_v4(),
                doctor_id,
                start: request.start,
                end: request.end,
                reason: request.reason,
            })
            .await?;

        info!("Time-off {} created for doctor {}", created.id, doctor_id);
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<TimeOff, AvailabilityError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AvailabilityError::NotFound(format!("TimeOff not found: {}", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AvailabilityError> {
        if !self.store.delete(id).await? {
            return Err(AvailabilityError::NotFound(format!("TimeOff not found: {}", id)));
        }
        info!("Time-off {} deleted", id);
        Ok(())
    }

    /// Windows of `doctor_id` intersecting `[window_start, window_end]`,
    /// bounds inclusive.
    pub async fn find_active(
        &self,
        doctor_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, AvailabilityError> {
        Ok(self.store.find_overlapping(doctor_id, window_start, window_end).await?)
    }

    /// Windows still running at or after local midnight of `from`.
    pub async fn list_by_doctor_since(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<TimeOff>, AvailabilityError> {
        let (since, _) = day_bounds(from, self.timezone);
        Ok(self.store.list_by_doctor_since(doctor_id, since).await?)
    }
}
