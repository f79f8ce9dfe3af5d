use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Role;
use crate::services::accounts;
use crate::services::session::{self, Session};
use crate::state::AppState;

/// A verified patient session. Anyone else is sent to the patient login page.
pub struct PatientSession(pub Session);

/// A verified doctor session. Anyone else is sent to the doctor login page.
pub struct DoctorSession(pub Session);

fn session_for(parts: &Parts, state: &AppState, role: Role) -> Result<Session, Redirect> {
    let cookies = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok());

    session::token_from_cookies(cookies)
        .and_then(|token| session::decode(token, &state.session_key, Utc::now().timestamp()))
        .filter(|s| s.role == role)
        .ok_or_else(|| {
            tracing::debug!(path = %parts.uri.path(), role = role.as_str(), "no valid session, redirecting to login");
            Redirect::to(role.login_path())
        })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for PatientSession {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        session_for(parts, state, Role::Patient).map(PatientSession)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for DoctorSession {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        session_for(parts, state, Role::Doctor).map(DoctorSession)
    }
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Verifies credentials, sets the session cookie and sends the user to
/// their dashboard.
pub fn login_as(state: &AppState, role: Role, form: LoginForm) -> Result<Response, AppError> {
    let identity = accounts::login(state.store.as_ref(), role, &form.email, &form.password)?;
    let ttl = state.config.session_ttl_minutes;
    let token = session::encode(&Session::start(identity, ttl), &state.session_key)?;

    Ok((
        [(header::SET_COOKIE, session::set_cookie(&token, ttl))],
        Redirect::to(role.dashboard_path()),
    )
        .into_response())
}

// GET /logout
pub async fn logout() -> Response {
    ([(header::SET_COOKIE, session::clear_cookie())], Redirect::to("/")).into_response()
}
