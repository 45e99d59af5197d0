pub mod test_utils;
pub mod time;

pub use time::{day_bounds, format_hhmm, iso_weekday, iso_weekday_of, local_datetime, resolve_local};
