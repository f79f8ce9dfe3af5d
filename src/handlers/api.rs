use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::time::{format_time, parse_date};
use crate::services::slots;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<String>,
}

// GET /api/doctor/:doctor_id/slots?date=YYYY-MM-DD
pub async fn doctor_slots(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let raw = query
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Date parameter is required".to_string()))?;
    let date = parse_date(&raw)
        .map_err(|_| AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()))?;

    if state.store.get_doctor(&doctor_id)?.is_none() {
        return Err(AppError::NotFound("Doctor not found".to_string()));
    }

    let slots = slots::available_slots(state.store.as_ref(), &doctor_id, &date)?
        .iter()
        .map(format_time)
        .collect();

    Ok(Json(SlotsResponse { slots }))
}
