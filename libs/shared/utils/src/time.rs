//! Conversions between absolute instants and the service's civil zone.
//!
//! Rules and breaks are wall-clock values reused across daylight-saving
//! transitions; appointments and time-off are stored as UTC instants.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Wall-clock date and time of `instant` in `tz`.
pub fn local_datetime(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// ISO weekday (Monday = 1 .. Sunday = 7) of `instant` as observed in `tz`.
pub fn iso_weekday(instant: DateTime<Utc>, tz: Tz) -> u8 {
    iso_weekday_of(instant.with_timezone(&tz).date_naive())
}

pub fn iso_weekday_of(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Maps a wall-clock value to an instant. Ambiguous values (autumn
/// fall-back) resolve to the earlier instant; values inside a spring-forward
/// gap do not exist and yield `None`.
pub fn resolve_local(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// `[start, end)` instants of the civil day `date` in `tz`.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (start_of_day(date, tz), start_of_day(next, tz))
}

fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());
    // Zones that skip midnight start the day at the first existing minute.
    (0..=180)
        .filter_map(|minutes| resolve_local(midnight + Duration::minutes(minutes), tz))
        .next()
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// `HH:mm`, the slot wire format.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
