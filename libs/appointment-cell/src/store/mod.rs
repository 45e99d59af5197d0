//! Appointment persistence. The store is the final arbiter for the
//! `(doctor_id, start)` uniqueness of live bookings and for the version
//! compare-and-swap; the services only run pre-write guards.

pub mod ledger;
pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_database::StoreError;

use crate::models::{Appointment, AppointmentQuery};

pub use ledger::AppointmentLedger;
pub use memory::InMemoryAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Appointments of `doctor_id` in any status whose `[start, end)`
    /// overlaps the given interval, ordered by start.
    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// The live (non-cancelled) appointment of `doctor_id` starting at `start`.
    async fn find_by_doctor_and_start(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Filtered page ordered by start, newest first.
    async fn search(&self, query: AppointmentQuery) -> Result<Vec<Appointment>, StoreError>;

    /// Fails with `UniqueViolation` when a live appointment of the same
    /// doctor already starts at the same instant.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    /// Writes `appointment` only if the stored version still equals
    /// `expected_version`. The stored row gets `expected_version + 1` and a
    /// fresh `updated_at`.
    async fn update(&self, appointment: Appointment, expected_version: i64) -> Result<Appointment, StoreError>;
}
