pub mod handlers;
pub mod router;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

pub use models::*;
pub use services::*;
pub use state::AppointmentCellState;
