use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{AvailabilityQuery, CreateTimeOffRequest, TimeOffQuery, UpsertAvailabilityRuleRequest};
use crate::state::DoctorCellState;

// ==============================================================================
// AVAILABILITY RULES
// ==============================================================================

#[axum::debug_handler]
pub async fn upsert_availability_rule(
    State(state): State<Arc<DoctorCellState>>,
    Json(request): Json<UpsertAvailabilityRuleRequest>,
) -> Result<Json<Value>, AppError> {
    let rule = state.availability.upsert_rule(request).await?;
    Ok(Json(json!(rule)))
}

#[axum::debug_handler]
pub async fn list_availability_rules(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let rules = state.availability.list_rules(doctor_id).await?;
    Ok(Json(json!({
        "doctor_id": doctor_id,
        "rules": rules,
        "total": rules.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let days = state
        .availability
        .get_availability(doctor_id, query.from, query.to)
        .await?;
    Ok(Json(json!(days)))
}

// ==============================================================================
// TIME-OFF
// ==============================================================================

#[axum::debug_handler]
pub async fn create_time_off(
    State(state): State<Arc<DoctorCellState>>,
    Json(request): Json<CreateTimeOffRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let time_off = state.time_off.create(request).await?;
    Ok((StatusCode::CREATED, Json(json!(time_off))))
}

#[axum::debug_handler]
pub async fn get_time_off(
    State(state): State<Arc<DoctorCellState>>,
    Path(time_off_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let time_off = state.time_off.get(time_off_id).await?;
    Ok(Json(json!(time_off)))
}

#[axum::debug_handler]
pub async fn delete_time_off(
    State(state): State<Arc<DoctorCellState>>,
    Path(time_off_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.time_off.delete(time_off_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_time_offs_for_doctor(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<TimeOffQuery>,
) -> Result<Json<Value>, AppError> {
    let time_offs = state.time_off.list_by_doctor_since(doctor_id, query.start).await?;
    Ok(Json(json!({
        "doctor_id": doctor_id,
        "time_offs": time_offs,
        "total": time_offs.len(),
    })))
}
