//! Projection of a weekly rule onto one calendar date.
//!
//! Everything here works on wall-clock `NaiveDateTime`s anchored to the
//! requested date, so buffers reaching across midnight never wrap.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use shared_models::TimeInterval;
use shared_utils::{format_hhmm, local_datetime, resolve_local};

use crate::models::AvailabilityRule;

/// Converts stored booking instants into wall-clock intervals of `tz`.
pub fn project_booked(
    booked: &[TimeInterval<DateTime<Utc>>],
    tz: Tz,
) -> Vec<TimeInterval<NaiveDateTime>> {
    booked
        .iter()
        .map(|interval| TimeInterval::new(local_datetime(interval.start, tz), local_datetime(interval.end, tz)))
        .collect()
}

/// Breaks of `rule` as wall-clock intervals on `date`.
pub fn project_breaks(rule: &AvailabilityRule, date: NaiveDate) -> Vec<TimeInterval<NaiveDateTime>> {
    rule.breaks
        .iter()
        .map(|b| TimeInterval::new(date.and_time(b.start), date.and_time(b.end)))
        .collect()
}

/// Offerable start times (`HH:mm`) of `rule` on `date`.
///
/// Walks `t` from the work start in `slot_minutes` steps while the slot
/// still ends within working hours. A slot is offered when its blocked
/// window `[t - buffer_before, t + slot + buffer_after)` overlaps neither a
/// break nor a booking, and its start exists as a local time on `date`.
pub fn generate_slots(
    rule: &AvailabilityRule,
    date: NaiveDate,
    tz: Tz,
    booked: &[TimeInterval<NaiveDateTime>],
) -> Vec<String> {
    if rule.slot_minutes == 0 || rule.work_end <= rule.work_start {
        return Vec::new();
    }

    let step = Duration::minutes(i64::from(rule.slot_minutes));
    let buffer_before = Duration::minutes(i64::from(rule.buffer_before_minutes));
    let buffer_after = Duration::minutes(i64::from(rule.buffer_after_minutes));

    let breaks = project_breaks(rule, date);
    let work_end = date.and_time(rule.work_end);

    let mut slots = Vec::new();
    let mut t = date.and_time(rule.work_start);

    while t + step <= work_end {
        let blocked = TimeInterval::new(t - buffer_before, t + step + buffer_after);

        let busy = breaks
            .iter()
            .chain(booked.iter())
            .any(|taken| blocked.overlaps(taken));

        // Spring-forward gap: this wall-clock time never happens today.
        if !busy && resolve_local(t, tz).is_some() {
            slots.push(format_hhmm(t.time()));
        }

        t += step;
    }

    slots
}
