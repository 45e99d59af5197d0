pub mod error;
pub mod interval;

pub use interval::{overlaps, overlaps_inclusive, TimeInterval};
