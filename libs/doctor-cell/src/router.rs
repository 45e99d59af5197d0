use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put, post},
};

use crate::handlers;
use crate::state::DoctorCellState;

pub fn doctor_routes(state: Arc<DoctorCellState>) -> Router {
    Router::new()
        // Weekly rules
        .route("/availability-rules", put(handlers::upsert_availability_rule))
        .route("/availability-rules/{doctor_id}", get(handlers::list_availability_rules))
        .route("/doctors/{doctor_id}/availability", get(handlers::get_doctor_availability))

        // Time-off
        .route("/time-offs", post(handlers::create_time_off))
        .route("/time-offs/{time_off_id}", get(handlers::get_time_off).delete(handlers::delete_time_off))
        .route("/time-offs/by-doctor/{doctor_id}", get(handlers::list_time_offs_for_doctor))

        .with_state(state)
}
