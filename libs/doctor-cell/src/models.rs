use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveTime, NaiveDate};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

// ==============================================================================
// WEEKLY AVAILABILITY RULES
// ==============================================================================

/// A fixed daily sub-window (e.g. lunch) in which no slot is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Recurring working hours of one doctor on one ISO weekday.
///
/// Identity is `(doctor_id, day_of_week)`; at most one rule exists per pair.
/// All times are wall-clock values in the service zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    /// ISO weekday, Monday = 1 .. Sunday = 7.
    pub day_of_week: u8,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    /// Slot granularity. Zero disables the duration-multiple check and
    /// yields no generated slots.
    pub slot_minutes: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    #[serde(default)]
    pub breaks: Vec<Break>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAvailabilityRuleRequest {
    pub doctor_id: Option<Uuid>,
    pub day_of_week: i32,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub slot_minutes: i32,
    pub buffer_before_minutes: Option<i32>,
    pub buffer_after_minutes: Option<i32>,
    /// Replaces the stored break list when present; `None` keeps it.
    pub breaks: Option<Vec<Break>>,
}

// ==============================================================================
// TIME-OFF
// ==============================================================================

/// Absolute-time leave that vetoes any booking intersecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOff {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeOffRequest {
    pub doctor_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeOffQuery {
    pub start: NaiveDate,
}

// ==============================================================================
// SLOTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Offerable start times (`HH:mm`) of one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AvailabilityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Overlapping time-off exists for doctor {0}")]
    TimeOffOverlap(Uuid),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<StoreError> for AvailabilityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AvailabilityError::NotFound(msg),
            other => AvailabilityError::Database(other.to_string()),
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            AvailabilityError::NotFound(msg) => AppError::NotFound(msg),
            e @ AvailabilityError::TimeOffOverlap(_) => AppError::Conflict {
                kind: "time_off_overlap",
                message: e.to_string(),
            },
            AvailabilityError::Database(msg) => AppError::Database(msg),
        }
    }
}
