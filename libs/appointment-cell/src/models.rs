// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::TimeInterval;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub concern: Option<String>,
    /// Optimistic-concurrency token, bumped by every successful write.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn interval(&self) -> TimeInterval<DateTime<Utc>> {
        TimeInterval::new(self.start, self.end)
    }

    /// Cancelled appointments no longer block anything.
    pub fn is_blocking(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Attended,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Attended => write!(f, "attended"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Draft of a new appointment. Identity and version are assigned on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub clinic_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: Option<AppointmentStatus>,
    pub concern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
}

/// Filters for paged appointment lookups. All filters are optional and
/// combine with AND; `from`/`to` bound the appointment start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub clinic_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

impl AppointmentQuery {
    pub fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn page_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// In-memory equivalent of the filters the PostgREST store sends.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.clinic_id.map_or(true, |id| appointment.clinic_id == Some(id))
            && self.status.map_or(true, |status| appointment.status == status)
            && self.from.map_or(true, |from| appointment.start >= from)
            && self.to.map_or(true, |to| appointment.start < to)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ByStartQuery {
    pub start: DateTime<Utc>,
}

// ==============================================================================
// CONFLICT DETECTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    /// Machine-readable reason, e.g. `overlap` or `time_off_conflict`.
    pub kind: Option<String>,
    pub message: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Doctor {doctor_id} has no availability on weekday {day_of_week}")]
    NoAvailability { doctor_id: Uuid, day_of_week: u8 },

    #[error("Duration of {minutes} minutes is not a multiple of the {slot_minutes} minute slot")]
    InvalidDuration { minutes: i64, slot_minutes: u32 },

    #[error("Doctor {0} has time-off during the requested interval")]
    TimeOffConflict(Uuid),

    #[error("Requested interval overlaps appointment {0}")]
    Overlap(Uuid),

    #[error("Appointment {id} cannot be changed while {status}")]
    InvalidState { id: Uuid, status: AppointmentStatus },

    #[error("Doctor already has a booking starting at that time: {0}")]
    DuplicateBooking(String),

    #[error("Appointment was modified concurrently (expected version {expected})")]
    StaleWrite { expected: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppointmentError {
    /// Stable name of the error kind, reported by the conflict probe.
    pub fn kind(&self) -> &'static str {
        match self {
            AppointmentError::Validation(_) => "validation",
            AppointmentError::NoAvailability { .. } => "no_availability",
            AppointmentError::InvalidDuration { .. } => "invalid_duration",
            AppointmentError::TimeOffConflict(_) => "time_off_conflict",
            AppointmentError::Overlap(_) => "overlap",
            AppointmentError::InvalidState { .. } => "invalid_state",
            AppointmentError::DuplicateBooking(_) => "duplicate_booking",
            AppointmentError::StaleWrite { .. } => "stale_write",
            AppointmentError::NotFound(_) => "not_found",
            AppointmentError::Database(_) => "database",
        }
    }
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppointmentError::NotFound(msg),
            StoreError::UniqueViolation(msg) => AppointmentError::DuplicateBooking(msg),
            StoreError::VersionMismatch { expected } => AppointmentError::StaleWrite { expected },
            other => AppointmentError::Database(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            e @ (AppointmentError::NoAvailability { .. } | AppointmentError::InvalidDuration { .. }) => {
                AppError::BadRequest(e.to_string())
            }
            AppointmentError::NotFound(msg) => AppError::NotFound(msg),
            e @ (AppointmentError::TimeOffConflict(_)
            | AppointmentError::Overlap(_)
            | AppointmentError::InvalidState { .. }
            | AppointmentError::DuplicateBooking(_)) => AppError::Conflict {
                kind: e.kind(),
                message: e.to_string(),
            },
            e @ AppointmentError::StaleWrite { .. } => AppError::PreconditionFailed(e.to_string()),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
