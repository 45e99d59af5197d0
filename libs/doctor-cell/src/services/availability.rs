use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::{day_bounds, format_hhmm, iso_weekday_of};

use crate::models::{AvailabilityError, AvailabilityRule, Break, DaySlots, UpsertAvailabilityRuleRequest};
use crate::services::slots::{generate_slots, project_booked};
use crate::store::{AvailabilityRuleStore, BookingLedger};

/// Weekly availability rules and the slot generator built on them.
pub struct AvailabilityService {
    rules: Arc<dyn AvailabilityRuleStore>,
    ledger: Arc<dyn BookingLedger>,
    timezone: Tz,
    max_range_days: u32,
}

impl AvailabilityService {
    pub fn new(
        config: &AppConfig,
        rules: Arc<dyn AvailabilityRuleStore>,
        ledger: Arc<dyn BookingLedger>,
    ) -> Self {
        Self {
            rules,
            ledger,
            timezone: config.service_timezone,
            max_range_days: config.max_availability_days,
        }
    }

    /// Create the rule for `(doctor_id, day_of_week)` or replace the
    /// existing one's fields in place. The break list is replaced only when
    /// the request carries one.
    pub async fn upsert_rule(
        &self,
        request: UpsertAvailabilityRuleRequest,
    ) -> Result<AvailabilityRule, AvailabilityError> {
        let doctor_id = validate_rule_request(&request)?;
        let day_of_week = request.day_of_week as u8;
        debug!("Upserting availability for doctor {} on day {}", doctor_id, day_of_week);

        let existing = self.rules.find_by_doctor_and_weekday(doctor_id, day_of_week).await?;

        let rule = match existing {
            Some(mut current) => {
                current.work_start = request.work_start;
                current.work_end = request.work_end;
                current.slot_minutes = request.slot_minutes as u32;
                current.buffer_before_minutes = request.buffer_before_minutes.unwrap_or(0) as u32;
                current.buffer_after_minutes = request.buffer_after_minutes.unwrap_or(0) as u32;
                if let Some(breaks) = request.breaks {
                    current.breaks = sorted(breaks);
                }
                current
            }
            None => AvailabilityRule {
                id: Uuid::new_v4(),
                doctor_id,
                day_of_week,
                work_start: request.work_start,
                work_end: request.work_end,
                slot_minutes: request.slot_minutes as u32,
                buffer_before_minutes: request.buffer_before_minutes.unwrap_or(0) as u32,
                buffer_after_minutes: request.buffer_after_minutes.unwrap_or(0) as u32,
                breaks: sorted(request.breaks.unwrap_or_default()),
            },
        };

        let saved = self.rules.save(rule).await?;
        info!("Availability rule {} saved for doctor {} day {}", saved.id, doctor_id, day_of_week);
        Ok(saved)
    }

    pub async fn find_rule(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<AvailabilityRule>, AvailabilityError> {
        Ok(self.rules.find_by_doctor_and_weekday(doctor_id, day_of_week).await?)
    }

    pub async fn list_rules(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, AvailabilityError> {
        Ok(self.rules.list_by_doctor(doctor_id).await?)
    }

    /// Offerable start times for every date in `[from, to]`.
    ///
    /// Days without a rule yield an empty list. Time-off is not consulted
    /// here: a listed slot can still be refused at booking time.
    pub async fn get_availability(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DaySlots>, AvailabilityError> {
        debug!("Calculating availability for doctor {} from {} to {}", doctor_id, from, to);

        if from > to {
            return Err(AvailabilityError::Validation("from must not be after to".to_string()));
        }
        let span = (to - from).num_days() + 1;
        if span > i64::from(self.max_range_days) {
            return Err(AvailabilityError::Validation(format!(
                "date range may cover at most {} days",
                self.max_range_days
            )));
        }

        let rules = self.rules.list_by_doctor(doctor_id).await?;

        let mut result = Vec::with_capacity(span as usize);
        for date in from.iter_days().take(span as usize) {
            let weekday = iso_weekday_of(date);
            let Some(rule) = rules.iter().find(|r| r.day_of_week == weekday) else {
                result.push(DaySlots { date, slots: Vec::new() });
                continue;
            };

            let (day_start, day_end) = day_bounds(date, self.timezone);
            let booked = self.ledger.booked_intervals(doctor_id, day_start, day_end).await?;
            let booked = project_booked(&booked, self.timezone);

            let slots = generate_slots(rule, date, self.timezone, &booked);
            result.push(DaySlots { date, slots });
        }

        Ok(result)
    }
}

fn validate_rule_request(request: &UpsertAvailabilityRuleRequest) -> Result<Uuid, AvailabilityError> {
    let doctor_id = request
        .doctor_id
        .ok_or_else(|| AvailabilityError::Validation("doctor_id is required".to_string()))?;

    if !(1..=7).contains(&request.day_of_week) {
        return Err(AvailabilityError::Validation("day_of_week must be between 1 (Monday) and 7 (Sunday)".to_string()));
    }
    if request.work_end <= request.work_start {
        return Err(AvailabilityError::Validation("work_end must be after work_start".to_string()));
    }
    if request.slot_minutes < 0 {
        return Err(AvailabilityError::Validation("slot_minutes cannot be negative".to_string()));
    }
    if request.buffer_before_minutes.unwrap_or(0) < 0 || request.buffer_after_minutes.unwrap_or(0) < 0 {
        return Err(AvailabilityError::Validation("buffer minutes cannot be negative".to_string()));
    }
    if let Some(breaks) = &request.breaks {
        if let Some(bad) = breaks.iter().find(|b| b.end <= b.start) {
            warn!("Rejecting break {}-{} for doctor {}", bad.start, bad.end, doctor_id);
            return Err(AvailabilityError::Validation(format!(
                "Break end {} must be after start {}",
                format_hhmm(bad.end),
                format_hhmm(bad.start)
            )));
        }
    }

    Ok(doctor_id)
}

fn sorted(mut breaks: Vec<Break>) -> Vec<Break> {
    breaks.sort_by_key(|b| b.start);
    breaks
}
