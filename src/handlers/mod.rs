use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod api;
pub mod auth;
pub mod doctor;
pub mod extract;
pub mod health;
pub mod pages;
pub mod patient;

pub fn router(state: Arc<AppState>) -> Router {
    // The slot lookup is public and read-only, so other origins may call it.
    let public_api = Router::new()
        .route("/api/doctor/:doctor_id/slots", get(api::doctor_slots))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]));

    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health::health))
        .route("/logout", get(auth::logout))
        .route(
            "/patient/login",
            get(pages::patient_login_page).post(patient::login),
        )
        .route("/patient/register", post(patient::register))
        .route("/patient/dashboard", get(patient::dashboard))
        .route("/patient/search", get(patient::search))
        .route("/find-doctors/:disease", get(patient::find_doctors))
        .route(
            "/patient/book/:doctor_id",
            get(patient::booking_page).post(patient::book),
        )
        .route("/patient/cancel/:appointment_id", post(patient::cancel))
        .route(
            "/doctor/login",
            get(pages::doctor_login_page).post(doctor::login),
        )
        .route("/doctor/register", post(doctor::register))
        .route("/doctor/dashboard", get(doctor::dashboard))
        .route(
            "/doctor/availability",
            get(doctor::get_availability).post(doctor::replace_availability),
        )
        .route(
            "/doctor/appointment/:id/:action",
            post(doctor::manage_appointment),
        )
        .merge(public_api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
