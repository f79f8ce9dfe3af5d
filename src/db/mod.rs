pub mod files;
pub mod migrations;
pub mod queries;
pub mod sqlite;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::config::{AppConfig, StorageBackend};
use crate::models::{Appointment, AppointmentStatus, AvailabilityWindow, Doctor, Patient};

pub use files::FileStore;
pub use sqlite::SqliteStore;

/// Persistence contract shared by every backend.
///
/// Inserts that can collide (account emails, booked slots) report the
/// collision as `Ok(false)` instead of an error, and perform their check and
/// write as one step.
pub trait Store: Send + Sync {
    fn insert_patient(&self, patient: &Patient) -> anyhow::Result<bool>;
    fn get_patient(&self, id: &str) -> anyhow::Result<Option<Patient>>;
    fn find_patient_by_email(&self, email: &str) -> anyhow::Result<Option<Patient>>;

    fn insert_doctor(&self, doctor: &Doctor) -> anyhow::Result<bool>;
    /// Writes the doctor and their weekly windows together. Nothing is
    /// written when the email is taken or any window fails.
    fn insert_doctor_with_schedule(&self, doctor: &Doctor, windows: &[AvailabilityWindow]) -> anyhow::Result<bool>;
    fn get_doctor(&self, id: &str) -> anyhow::Result<Option<Doctor>>;
    fn find_doctor_by_email(&self, email: &str) -> anyhow::Result<Option<Doctor>>;
    fn list_doctors(&self) -> anyhow::Result<Vec<Doctor>>;

    /// Writes a booked appointment unless (doctor, date, time) is already booked.
    fn insert_appointment_if_free(&self, appt: &Appointment) -> anyhow::Result<bool>;
    fn get_appointment(&self, id: &str) -> anyhow::Result<Option<Appointment>>;
    fn appointments_for_patient(&self, patient_id: &str) -> anyhow::Result<Vec<Appointment>>;
    fn appointments_for_doctor(&self, doctor_id: &str) -> anyhow::Result<Vec<Appointment>>;
    /// Times held by booked appointments; cancelled and completed ones are excluded.
    fn booked_times(&self, doctor_id: &str, date: &NaiveDate) -> anyhow::Result<Vec<NaiveTime>>;
    /// Moves a booked appointment to `status`. `Ok(false)` when the
    /// appointment is missing or no longer booked.
    fn update_appointment_status(&self, id: &str, status: AppointmentStatus) -> anyhow::Result<bool>;

    fn insert_availability(&self, window: &AvailabilityWindow) -> anyhow::Result<()>;
    /// Sorted by day of week, then start time.
    fn availability_for_doctor(&self, doctor_id: &str) -> anyhow::Result<Vec<AvailabilityWindow>>;
    fn replace_availability(&self, doctor_id: &str, windows: &[AvailabilityWindow]) -> anyhow::Result<()>;
}

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

pub fn open_store(config: &AppConfig) -> anyhow::Result<Box<dyn Store>> {
    match config.storage_backend {
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.database_url, "using sqlite store");
            Ok(Box::new(SqliteStore::new(init_db(&config.database_url)?)))
        }
        StorageBackend::Files => {
            tracing::info!(dir = %config.data_dir, "using file-per-record store");
            Ok(Box::new(FileStore::open(&config.data_dir)?))
        }
    }
}
