use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Redirect, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::auth::{login_as, DoctorSession, LoginForm};
use super::extract::{Form, JsonBody};
use crate::errors::AppError;
use crate::models::time::{parse_time, weekday_name};
use crate::models::{AvailabilityWindow, Role};
use crate::services::accounts::{self, NewDoctor};
use crate::services::booking::{self, Action};
use crate::services::dashboard::{self, DoctorDashboard};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    pub specialization: String,
    pub location: String,
    #[serde(default)]
    pub bio: String,
}

// POST /doctor/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    accounts::register_doctor(
        state.store.as_ref(),
        NewDoctor {
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            password: form.password,
            specialization: form.specialization,
            location: form.location,
            bio: form.bio,
        },
    )?;
    Ok(Redirect::to(Role::Doctor.login_path()))
}

// POST /doctor/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    login_as(&state, Role::Doctor, form)
}

// GET /doctor/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    DoctorSession(session): DoctorSession,
) -> Result<Json<DoctorDashboard>, AppError> {
    let today = Local::now().date_naive();
    let dash = dashboard::doctor_dashboard(state.store.as_ref(), &session.user_id, today)?;
    Ok(Json(dash))
}

#[derive(Serialize)]
pub struct DayOption {
    id: u8,
    name: &'static str,
}

#[derive(Serialize)]
pub struct AvailabilityPage {
    availability: Vec<AvailabilityWindow>,
    days: Vec<DayOption>,
}

// GET /doctor/availability
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    DoctorSession(session): DoctorSession,
) -> Result<Json<AvailabilityPage>, AppError> {
    let availability = state.store.availability_for_doctor(&session.user_id)?;
    let days = (0..7)
        .map(|id| DayOption {
            id,
            name: weekday_name(id),
        })
        .collect();
    Ok(Json(AvailabilityPage { availability, days }))
}

#[derive(Deserialize)]
pub struct WindowInput {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Deserialize)]
pub struct AvailabilityUpdate {
    pub windows: Vec<WindowInput>,
}

// POST /doctor/availability
pub async fn replace_availability(
    State(state): State<Arc<AppState>>,
    DoctorSession(session): DoctorSession,
    JsonBody(update): JsonBody<AvailabilityUpdate>,
) -> Result<Json<Vec<AvailabilityWindow>>, AppError> {
    let mut windows = Vec::with_capacity(update.windows.len());
    for (i, input) in update.windows.iter().enumerate() {
        let window = parse_time(&input.start_time)
            .and_then(|start| Ok((start, parse_time(&input.end_time)?)))
            .and_then(|(start, end)| AvailabilityWindow::new(&session.user_id, input.day_of_week, start, end))
            .map_err(|e| AppError::BadRequest(format!("window {}: {e}", i + 1)))?;
        windows.push(window);
    }

    state.store.replace_availability(&session.user_id, &windows)?;
    tracing::info!(doctor_id = %session.user_id, windows = windows.len(), "availability replaced");

    Ok(Json(state.store.availability_for_doctor(&session.user_id)?))
}

// POST /doctor/appointment/:id/:action
pub async fn manage_appointment(
    State(state): State<Arc<AppState>>,
    DoctorSession(session): DoctorSession,
    Path((appointment_id, action)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let action = Action::parse(&action)?;
    booking::change_status(
        state.store.as_ref(),
        &appointment_id,
        &session.user_id,
        Role::Doctor,
        action,
    )?;
    Ok(Redirect::to(Role::Doctor.dashboard_path()))
}
