use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Redirect, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::auth::{login_as, LoginForm, PatientSession};
use super::extract::Form;
use crate::errors::AppError;
use crate::models::time::{parse_date, parse_time};
use crate::models::{DoctorProfile, Role};
use crate::services::accounts::{self, NewPatient};
use crate::services::booking::{self, Action, BookingRequest};
use crate::services::dashboard::{self, PatientDashboard};
use crate::services::directory::{self, ConditionMatch, SearchResult};
use crate::services::slots::{self, DaySlot};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
}

// POST /patient/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    accounts::register_patient(
        state.store.as_ref(),
        NewPatient {
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            password: form.password,
        },
    )?;
    Ok(Redirect::to(Role::Patient.login_path()))
}

// POST /patient/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    login_as(&state, Role::Patient, form)
}

// GET /patient/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    PatientSession(session): PatientSession,
) -> Result<Json<PatientDashboard>, AppError> {
    let today = Local::now().date_naive();
    let dash = dashboard::patient_dashboard(state.store.as_ref(), &session.user_id, today)?;
    Ok(Json(dash))
}

// GET /find-doctors/:disease
pub async fn find_doctors(
    State(state): State<Arc<AppState>>,
    PatientSession(_): PatientSession,
    Path(disease): Path<String>,
) -> Result<Json<ConditionMatch>, AppError> {
    directory::find_by_condition(state.store.as_ref(), &disease)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Invalid disease selection".to_string()))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub specialization: Option<String>,
    pub location: Option<String>,
}

// GET /patient/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    PatientSession(_): PatientSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResult>, AppError> {
    let result = directory::search(
        state.store.as_ref(),
        query.specialization.as_deref(),
        query.location.as_deref(),
    )?;
    Ok(Json(result))
}

#[derive(Serialize)]
pub struct BookingPage {
    pub doctor: DoctorProfile,
    pub available_slots: Vec<DaySlot>,
}

// GET /patient/book/:doctor_id
pub async fn booking_page(
    State(state): State<Arc<AppState>>,
    PatientSession(_): PatientSession,
    Path(doctor_id): Path<String>,
) -> Result<Json<BookingPage>, AppError> {
    let doctor = state
        .store
        .get_doctor(&doctor_id)?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let available_slots = slots::upcoming_slots(
        state.store.as_ref(),
        &doctor.id,
        Local::now().date_naive(),
        state.config.booking_horizon_days,
    )?;

    Ok(Json(BookingPage {
        doctor: DoctorProfile::from(&doctor),
        available_slots,
    }))
}

#[derive(Deserialize)]
pub struct BookForm {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

// POST /patient/book/:doctor_id
pub async fn book(
    State(state): State<Arc<AppState>>,
    PatientSession(session): PatientSession,
    Path(doctor_id): Path<String>,
    Form(form): Form<BookForm>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&form.date)
        .map_err(|_| AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()))?;
    let time = parse_time(&form.time)
        .map_err(|_| AppError::BadRequest("Invalid time format. Use HH:MM".to_string()))?;

    booking::book(
        state.store.as_ref(),
        BookingRequest {
            doctor_id,
            patient_id: session.user_id,
            date,
            time,
            notes: form.notes,
        },
    )?;
    Ok(Redirect::to(Role::Patient.dashboard_path()))
}

// POST /patient/cancel/:appointment_id
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    PatientSession(session): PatientSession,
    Path(appointment_id): Path<String>,
) -> Result<Redirect, AppError> {
    booking::change_status(
        state.store.as_ref(),
        &appointment_id,
        &session.user_id,
        Role::Patient,
        Action::Cancel,
    )?;
    Ok(Redirect::to(Role::Patient.dashboard_path()))
}
