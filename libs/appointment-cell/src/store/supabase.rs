use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{timestamp_param, StoreError, SupabaseClient};

use crate::models::{Appointment, AppointmentQuery};

use super::AppointmentStore;

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Appointments in the `appointments` table. A partial unique index on
/// `(doctor_id, start) WHERE status <> 'cancelled'` backs the uniqueness
/// contract.
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Appointment>, StoreError> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;
        decode_rows(rows)
    }
}

fn decode_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

fn search_path(query: &AppointmentQuery) -> String {
    let mut filters = Vec::new();

    if let Some(doctor_id) = query.doctor_id {
        filters.push(format!("doctor_id=eq.{}", doctor_id));
    }
    if let Some(patient_id) = query.patient_id {
        filters.push(format!("patient_id=eq.{}", patient_id));
    }
    if let Some(clinic_id) = query.clinic_id {
        filters.push(format!("clinic_id=eq.{}", clinic_id));
    }
    if let Some(status) = query.status {
        filters.push(format!("status=eq.{}", status));
    }
    if let Some(from) = query.from {
        filters.push(format!("start=gte.{}", timestamp_param(from)));
    }
    if let Some(to) = query.to {
        filters.push(format!("start=lt.{}", timestamp_param(to)));
    }

    filters.push("order=start.desc".to_string());
    filters.push(format!("limit={}", query.page_size()));
    filters.push(format!("offset={}", query.page_offset()));

    format!("{}?{}", APPOINTMENTS_PATH, filters.join("&"))
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let path = format!("{}?id=eq.{}&limit=1", APPOINTMENTS_PATH, id);
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "{}?doctor_id=eq.{}&start=lt.{}&end=gt.{}&order=start.asc",
            APPOINTMENTS_PATH,
            doctor_id,
            timestamp_param(end),
            timestamp_param(start)
        );
        self.fetch(&path).await
    }

    async fn find_by_doctor_and_start(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError> {
        let path = format!(
            "{}?doctor_id=eq.{}&start=eq.{}&status=neq.cancelled&limit=1",
            APPOINTMENTS_PATH,
            doctor_id,
            timestamp_param(start)
        );
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn search(&self, query: AppointmentQuery) -> Result<Vec<Appointment>, StoreError> {
        self.fetch(&search_path(&query)).await
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        debug!("Inserting appointment {} for doctor {}", appointment.id, appointment.doctor_id);

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                APPOINTMENTS_PATH,
                Some(serde_json::to_value(&appointment)?),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update(&self, mut appointment: Appointment, expected_version: i64) -> Result<Appointment, StoreError> {
        appointment.version = expected_version + 1;
        appointment.updated_at = Utc::now();

        let path = format!(
            "{}?id=eq.{}&version=eq.{}",
            APPOINTMENTS_PATH, appointment.id, expected_version
        );
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(serde_json::to_value(&appointment)?),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        match decode_rows(rows)?.into_iter().next() {
            Some(updated) => Ok(updated),
            None => {
                warn!("Conditional update of appointment {} matched no row at version {}", appointment.id, expected_version);
                Err(StoreError::VersionMismatch { expected: expected_version })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;

    #[test]
    fn search_path_combines_filters() {
        let doctor_id = Uuid::nil();
        let query = AppointmentQuery {
            doctor_id: Some(doctor_id),
            status: Some(AppointmentStatus::Scheduled),
            limit: Some(10),
            ..AppointmentQuery::default()
        };

        assert_eq!(
            search_path(&query),
            format!(
                "/rest/v1/appointments?doctor_id=eq.{}&status=eq.scheduled&order=start.desc&limit=10&offset=0",
                doctor_id
            )
        );
    }

    #[test]
    fn page_size_is_clamped() {
        let query = AppointmentQuery { limit: Some(10_000), ..AppointmentQuery::default() };
        assert!(search_path(&query).ends_with("limit=200&offset=0"));
    }
}
