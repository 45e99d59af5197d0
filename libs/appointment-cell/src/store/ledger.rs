use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use doctor_cell::store::BookingLedger;
use shared_database::StoreError;
use shared_models::TimeInterval;

use crate::models::AppointmentStatus;

use super::AppointmentStore;

/// Exposes SCHEDULED appointments to the slot generator.
pub struct AppointmentLedger {
    store: Arc<dyn AppointmentStore>,
}

impl AppointmentLedger {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookingLedger for AppointmentLedger {
    async fn booked_intervals(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval<DateTime<Utc>>>, StoreError> {
        let appointments = self.store.find_overlapping(doctor_id, start, end).await?;
        Ok(appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .map(|a| a.interval())
            .collect())
    }
}
