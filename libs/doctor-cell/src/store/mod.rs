//! Persistence seams for rules, time-off and the booking view used by the
//! slot generator.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::TimeInterval;

use crate::models::{AvailabilityRule, TimeOff};

pub use memory::{InMemoryAvailabilityRuleStore, InMemoryTimeOffStore};
pub use supabase::{SupabaseAvailabilityRuleStore, SupabaseTimeOffStore};

#[async_trait]
pub trait AvailabilityRuleStore: Send + Sync {
    async fn find_by_doctor_and_weekday(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<AvailabilityRule>, StoreError>;

    /// Rules ordered by weekday.
    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, StoreError>;

    /// Inserts or replaces the rule keyed by `(doctor_id, day_of_week)`.
    async fn save(&self, rule: AvailabilityRule) -> Result<AvailabilityRule, StoreError>;
}

#[async_trait]
pub trait TimeOffStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeOff>, StoreError>;

    /// Rows of `doctor_id` intersecting `[start, end]` with inclusive bounds.
    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, StoreError>;

    /// Rows of `doctor_id` ending at or after `since`, ordered by start.
    async fn list_by_doctor_since(
        &self,
        doctor_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<TimeOff>, StoreError>;

    async fn insert(&self, time_off: TimeOff) -> Result<TimeOff, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Read-only view of a doctor's live bookings.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Intervals of SCHEDULED appointments of `doctor_id` overlapping
    /// `[start, end)`.
    async fn booked_intervals(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval<DateTime<Utc>>>, StoreError>;
}
