use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::overlaps_inclusive;

use crate::models::{AvailabilityRule, TimeOff};

use super::{AvailabilityRuleStore, TimeOffStore};

/// Rules keyed by `(doctor_id, day_of_week)`.
#[derive(Default)]
pub struct InMemoryAvailabilityRuleStore {
    rules: RwLock<HashMap<(Uuid, u8), AvailabilityRule>>,
}

impl InMemoryAvailabilityRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityRuleStore for InMemoryAvailabilityRuleStore {
    async fn find_by_doctor_and_weekday(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<AvailabilityRule>, StoreError> {
        Ok(self.rules.read().await.get(&(doctor_id, day_of_week)).cloned())
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, StoreError> {
        let mut rules: Vec<AvailabilityRule> = self
            .rules
            .read()
            .await
            .values()
            .filter(|rule| rule.doctor_id == doctor_id)
            .cloned()
            .collect();
        rules.sort_by_key(|rule| rule.day_of_week);
        Ok(rules)
    }

    async fn save(&self, rule: AvailabilityRule) -> Result<AvailabilityRule, StoreError> {
        self.rules
            .write()
            .await
            .insert((rule.doctor_id, rule.day_of_week), rule.clone());
        Ok(rule)
    }
}

#[derive(Default)]
pub struct InMemoryTimeOffStore {
    rows: RwLock<HashMap<Uuid, TimeOff>>,
}

impl InMemoryTimeOffStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimeOffStore for InMemoryTimeOffStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeOff>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, StoreError> {
        let mut rows: Vec<TimeOff> = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.doctor_id == doctor_id)
            .filter(|row| overlaps_inclusive(row.start, row.end, start, end))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.start);
        Ok(rows)
    }

    async fn list_by_doctor_since(
        &self,
        doctor_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, StoreError> {
        let mut rows: Vec<TimeOff> = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.doctor_id == doctor_id && row.end >= since)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.start);
        Ok(rows)
    }

    async fn insert(&self, time_off: TimeOff) -> Result<TimeOff, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&time_off.id) {
            return Err(StoreError::UniqueViolation(format!("time-off {} already exists", time_off.id)));
        }
        rows.insert(time_off.id, time_off.clone());
        Ok(time_off)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
