use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::overlaps;

use crate::models::{Appointment, AppointmentQuery};

use super::AppointmentStore;

/// Appointments held in process memory. A single write lock covers each
/// check-and-write, so uniqueness and version checks are atomic here.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    rows: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn start_taken(rows: &HashMap<Uuid, Appointment>, candidate: &Appointment) -> bool {
    candidate.is_blocking()
        && rows.values().any(|row| {
            row.id != candidate.id
                && row.is_blocking()
                && row.doctor_id == candidate.doctor_id
                && row.start == candidate.start
        })
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let mut rows: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.doctor_id == doctor_id && overlaps(row.start, row.end, start, end))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.start);
        Ok(rows)
    }

    async fn find_by_doctor_and_start(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|row| row.doctor_id == doctor_id && row.start == start && row.is_blocking())
            .cloned())
    }

    async fn search(&self, query: AppointmentQuery) -> Result<Vec<Appointment>, StoreError> {
        let mut rows: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        rows.sort_by_key(|row| Reverse(row.start));

        Ok(rows
            .into_iter()
            .skip(query.page_offset() as usize)
            .take(query.page_size() as usize)
            .collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(&appointment.id) {
            return Err(StoreError::UniqueViolation(format!("appointment {} already exists", appointment.id)));
        }
        if start_taken(&rows, &appointment) {
            return Err(StoreError::UniqueViolation(format!(
                "doctor {} already has a booking at {}",
                appointment.doctor_id, appointment.start
            )));
        }

        rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, mut appointment: Appointment, expected_version: i64) -> Result<Appointment, StoreError> {
        let mut rows = self.rows.write().await;

        let stored = rows
            .get(&appointment.id)
            .ok_or_else(|| StoreError::NotFound(format!("appointment {}", appointment.id)))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionMismatch { expected: expected_version });
        }
        if start_taken(&rows, &appointment) {
            return Err(StoreError::UniqueViolation(format!(
                "doctor {} already has a booking at {}",
                appointment.doctor_id, appointment.start
            )));
        }

        appointment.version = expected_version + 1;
        appointment.updated_at = Utc::now();
        rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }
}
