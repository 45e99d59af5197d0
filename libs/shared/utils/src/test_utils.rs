use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::time::resolve_local;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub service_timezone: Tz,
    pub enforce_working_hours: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            service_timezone: chrono_tz::Europe::London,
            enforce_working_hours: false,
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            service_timezone: self.service_timezone,
            enforce_working_hours: self.enforce_working_hours,
            ..AppConfig::default()
        }
    }
}

/// A UTC instant from calendar parts. Panics on invalid input; test use only.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid UTC timestamp")
}

/// The instant a wall clock in `tz` shows `hour:minute` on `date`.
pub fn local(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = date.and_hms_opt(hour, minute, 0).expect("valid wall-clock time");
    resolve_local(naive, tz).expect("wall-clock time exists in zone")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_row(
        id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: &str,
        version: i64,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "clinic_id": null,
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339(),
            "status": status,
            "concern": null,
            "version": version,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn availability_rule_row(doctor_id: Uuid, day_of_week: u8) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": day_of_week,
            "work_start": "09:00:00",
            "work_end": "17:00:00",
            "slot_minutes": 30,
            "buffer_before_minutes": 0,
            "buffer_after_minutes": 0,
            "breaks": [
                { "start": "12:30:00", "end": "13:00:00" }
            ]
        })
    }

    pub fn time_off_row(id: Uuid, doctor_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339(),
            "reason": null
        })
    }

    pub fn unique_violation() -> serde_json::Value {
        json!({
            "code": "23505",
            "details": "Key (doctor_id, start) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"appointments_doctor_start_key\""
        })
    }
}
