// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentQuery, BookAppointmentRequest, ByStartQuery, ConflictCheckQuery, RescheduleAppointmentRequest,
};
use crate::state::AppointmentCellState;

// ==============================================================================
// CORE APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking.create_appointment(request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppointmentCellState>>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    debug!("Searching appointments with {:?}", query);

    let limit = query.page_size();
    let offset = query.page_offset();
    let appointments = state.booking.search_appointments(query).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
        "limit": limit,
        "offset": offset,
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.reschedule_appointment(appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.cancel_appointment(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn mark_attended(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.mark_attended(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// UTILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(state): State<Arc<AppointmentCellState>>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let report = state
        .booking
        .conflicts()
        .probe(query.doctor_id, query.start, query.end, query.exclude_appointment_id)
        .await?;
    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn get_doctor_appointment_by_start(
    State(state): State<Arc<AppointmentCellState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<ByStartQuery>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.find_by_doctor_and_start(doctor_id, query.start).await?;
    Ok(Json(json!(appointment)))
}
