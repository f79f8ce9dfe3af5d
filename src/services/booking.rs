use chrono::{Local, NaiveDate, NaiveTime};

use crate::db::Store;
use crate::errors::AppError;
use crate::models::time::format_time;
use crate::models::{Appointment, AppointmentStatus, Role};
use crate::services::slots;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("The doctor is not available on {date} at {time}")]
    OutsideAvailability { date: NaiveDate, time: String },

    #[error("This time slot is already booked!")]
    AlreadyBooked,

    #[error("Invalid action")]
    InvalidAction,

    #[error("Appointment not found or you are not authorized to modify it")]
    NotFound,

    #[error("Appointment is already {0}")]
    NotBooked(&'static str),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::DoctorNotFound | BookingError::NotFound => AppError::NotFound(e.to_string()),
            BookingError::OutsideAvailability { .. } | BookingError::InvalidAction => {
                AppError::BadRequest(e.to_string())
            }
            BookingError::AlreadyBooked | BookingError::NotBooked(_) => AppError::Conflict(e.to_string()),
            BookingError::Storage(inner) => AppError::Storage(inner),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: String,
}

/// Books a slot the doctor offers on that date.
///
/// The duplicate check and the write are a single store call, so two
/// requests for the same slot cannot both succeed.
pub fn book(store: &dyn Store, req: BookingRequest) -> Result<Appointment, BookingError> {
    if store.get_doctor(&req.doctor_id)?.is_none() {
        return Err(BookingError::DoctorNotFound);
    }

    let windows = store.availability_for_doctor(&req.doctor_id)?;
    if !slots::offers_slot(&windows, &req.date, &req.time) {
        return Err(BookingError::OutsideAvailability {
            date: req.date,
            time: format_time(&req.time),
        });
    }

    let appointment = Appointment {
        id: uuid::Uuid::new_v4().to_string(),
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        date: req.date,
        time: req.time,
        status: AppointmentStatus::Booked,
        notes: req.notes.trim().to_string(),
        created_at: Local::now().naive_local(),
    };

    if !store.insert_appointment_if_free(&appointment)? {
        tracing::info!(
            doctor_id = %appointment.doctor_id,
            date = %appointment.date,
            time = %format_time(&appointment.time),
            "booking rejected: slot taken"
        );
        return Err(BookingError::AlreadyBooked);
    }

    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        patient_id = %appointment.patient_id,
        "appointment booked"
    );
    Ok(appointment)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Complete,
    Cancel,
}

impl Action {
    pub fn parse(s: &str) -> Result<Self, BookingError> {
        match s {
            "complete" => Ok(Action::Complete),
            "cancel" => Ok(Action::Cancel),
            _ => Err(BookingError::InvalidAction),
        }
    }

    fn target(&self) -> AppointmentStatus {
        match self {
            Action::Complete => AppointmentStatus::Completed,
            Action::Cancel => AppointmentStatus::Cancelled,
        }
    }
}

/// Applies `action` on behalf of `actor`. Patients may only cancel, and
/// only their own appointments; doctors may complete or cancel their own.
pub fn change_status(
    store: &dyn Store,
    appointment_id: &str,
    actor_id: &str,
    role: Role,
    action: Action,
) -> Result<Appointment, BookingError> {
    if role == Role::Patient && action != Action::Cancel {
        return Err(BookingError::InvalidAction);
    }

    let mut appointment = store
        .get_appointment(appointment_id)?
        .ok_or(BookingError::NotFound)?;

    let owner = match role {
        Role::Patient => &appointment.patient_id,
        Role::Doctor => &appointment.doctor_id,
    };
    if owner != actor_id {
        tracing::warn!(appointment_id, actor_id, role = role.as_str(), "status change by non-owner");
        return Err(BookingError::NotFound);
    }

    if !appointment.is_booked() {
        return Err(BookingError::NotBooked(appointment.status.as_str()));
    }

    let status = action.target();
    if !store.update_appointment_status(appointment_id, status)? {
        // Lost a race with another status change.
        return Err(match store.get_appointment(appointment_id)? {
            Some(current) => BookingError::NotBooked(current.status.as_str()),
            None => BookingError::NotFound,
        });
    }
    appointment.status = status;

    tracing::info!(appointment_id, status = status.as_str(), role = role.as_str(), "appointment updated");
    Ok(appointment)
}
