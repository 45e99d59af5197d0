use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::HeaderValue, Method};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::{timestamp_param, StoreError, SupabaseClient};

use crate::models::{AvailabilityRule, TimeOff};

use super::{AvailabilityRuleStore, TimeOffStore};

const RULES_PATH: &str = "/rest/v1/availability_rules";
const TIME_OFFS_PATH: &str = "/rest/v1/time_offs";

fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

/// Rules persisted in the `availability_rules` table, unique on
/// `(doctor_id, day_of_week)`.
pub struct SupabaseAvailabilityRuleStore {
    supabase: SupabaseClient,
}

impl SupabaseAvailabilityRuleStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AvailabilityRuleStore for SupabaseAvailabilityRuleStore {
    async fn find_by_doctor_and_weekday(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<AvailabilityRule>, StoreError> {
        let path = format!(
            "{}?doctor_id=eq.{}&day_of_week=eq.{}&limit=1",
            RULES_PATH, doctor_id, day_of_week
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(decode_rows(rows)?.into_iter().next())
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, StoreError> {
        let path = format!("{}?doctor_id=eq.{}&order=day_of_week.asc", RULES_PATH, doctor_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        decode_rows(rows)
    }

    async fn save(&self, rule: AvailabilityRule) -> Result<AvailabilityRule, StoreError> {
        debug!("Upserting availability rule for doctor {} day {}", rule.doctor_id, rule.day_of_week);

        let mut headers = SupabaseClient::representation_headers();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let path = format!("{}?on_conflict=doctor_id,day_of_week", RULES_PATH);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, &path, Some(serde_json::to_value(&rule)?), Some(headers))
            .await?;

        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("upsert returned no rows".to_string()))
    }
}

/// Time-off persisted in the `time_offs` table.
pub struct SupabaseTimeOffStore {
    supabase: SupabaseClient,
}

impl SupabaseTimeOffStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl TimeOffStore for SupabaseTimeOffStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeOff>, StoreError> {
        let path = format!("{}?id=eq.{}&limit=1", TIME_OFFS_PATH, id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(decode_rows(rows)?.into_iter().next())
    }

    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, StoreError> {
        let path = format!(
            "{}?doctor_id=eq.{}&start=lte.{}&end=gte.{}&order=start.asc",
            TIME_OFFS_PATH,
            doctor_id,
            timestamp_param(end),
            timestamp_param(start)
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        decode_rows(rows)
    }

    async fn list_by_doctor_since(
        &self,
        doctor_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, StoreError> {
        let path = format!(
            "{}?doctor_id=eq.{}&end=gte.{}&order=start.asc",
            TIME_OFFS_PATH,
            doctor_id,
            timestamp_param(since)
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        decode_rows(rows)
    }

    async fn insert(&self, time_off: TimeOff) -> Result<TimeOff, StoreError> {
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                TIME_OFFS_PATH,
                Some(serde_json::to_value(&time_off)?),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = format!("{}?id=eq.{}", TIME_OFFS_PATH, id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(SupabaseClient::representation_headers()))
            .await?;
        Ok(!rows.is_empty())
    }
}
