pub mod availability;
pub mod slots;
pub mod time_off;

pub use availability::AvailabilityService;
pub use time_off::TimeOffService;
