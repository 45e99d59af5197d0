#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

use appointment_cell::models::{Appointment, BookAppointmentRequest};
use appointment_cell::services::AppointmentBookingService;
use appointment_cell::store::{AppointmentLedger, InMemoryAppointmentStore};
use doctor_cell::models::{Break, UpsertAvailabilityRuleRequest};
use doctor_cell::services::{AvailabilityService, TimeOffService};
use doctor_cell::store::{InMemoryAvailabilityRuleStore, InMemoryTimeOffStore};
use shared_config::AppConfig;
use shared_utils::test_utils::TestConfig;

/// Booking, availability and time-off services wired over one set of
/// in-memory stores, the way the binary wires them.
pub struct Harness {
    pub booking: AppointmentBookingService,
    pub availability: AvailabilityService,
    pub time_off: TimeOffService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default().to_app_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let rules = Arc::new(InMemoryAvailabilityRuleStore::new());
        let time_offs = Arc::new(InMemoryTimeOffStore::new());
        let appointments = Arc::new(InMemoryAppointmentStore::new());
        let ledger = Arc::new(AppointmentLedger::new(appointments.clone()));

        Self {
            booking: AppointmentBookingService::new(&config, appointments, rules.clone(), time_offs.clone()),
            availability: AvailabilityService::new(&config, rules, ledger),
            time_off: TimeOffService::new(&config, time_offs),
        }
    }

    /// 09:00-17:00 in 30 minute slots on `day_of_week`.
    pub async fn add_rule(&self, doctor_id: Uuid, day_of_week: i32) {
        self.add_rule_with_breaks(doctor_id, day_of_week, vec![]).await;
    }

    pub async fn add_rule_with_breaks(&self, doctor_id: Uuid, day_of_week: i32, breaks: Vec<Break>) {
        self.availability
            .upsert_rule(UpsertAvailabilityRuleRequest {
                doctor_id: Some(doctor_id),
                day_of_week,
                work_start: hm(9, 0),
                work_end: hm(17, 0),
                slot_minutes: 30,
                buffer_before_minutes: None,
                buffer_after_minutes: None,
                breaks: Some(breaks),
            })
            .await
            .unwrap();
    }

    pub async fn add_week(&self, doctor_id: Uuid) {
        for day in 1..=7 {
            self.add_rule(doctor_id, day).await;
        }
    }

    pub async fn book(&self, doctor_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Appointment {
        self.booking
            .create_appointment(draft(doctor_id, start, end))
            .await
            .unwrap()
    }
}

pub fn draft(doctor_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: Some(doctor_id),
        patient_id: Some(Uuid::new_v4()),
        clinic_id: Some(Uuid::new_v4()),
        start,
        end,
        status: None,
        concern: Some("follow-up".to_string()),
    }
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}
