use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::store::AppointmentLedger;
use appointment_cell::AppointmentCellState;
use doctor_cell::router::doctor_routes;
use doctor_cell::DoctorCellState;
use shared_config::AppConfig;

use crate::stores::Stores;

pub fn create_router(config: &AppConfig, stores: Stores) -> Router {
    let ledger = Arc::new(AppointmentLedger::new(Arc::clone(&stores.appointments)));

    let doctor_state = Arc::new(DoctorCellState::new(
        config,
        Arc::clone(&stores.rules),
        Arc::clone(&stores.time_offs),
        ledger,
    ));
    let appointment_state = Arc::new(AppointmentCellState::new(
        config,
        stores.appointments,
        stores.rules,
        stores.time_offs,
    ));

    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/api/appointments", appointment_routes(appointment_state))
        .nest("/api", doctor_routes(doctor_state))
}
