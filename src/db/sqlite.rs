use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use super::{queries, Store};
use crate::models::{Appointment, AppointmentStatus, AvailabilityWindow, Doctor, Patient};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }
}

impl Store for SqliteStore {
    fn insert_patient(&self, patient: &Patient) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        queries::insert_patient(&conn, patient)
    }

    fn get_patient(&self, id: &str) -> anyhow::Result<Option<Patient>> {
        let conn = self.conn()?;
        queries::get_patient(&conn, id)
    }

    fn find_patient_by_email(&self, email: &str) -> anyhow::Result<Option<Patient>> {
        let conn = self.conn()?;
        queries::find_patient_by_email(&conn, email)
    }

    fn insert_doctor(&self, doctor: &Doctor) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        queries::insert_doctor(&conn, doctor)
    }

    fn insert_doctor_with_schedule(&self, doctor: &Doctor, windows: &[AvailabilityWindow]) -> anyhow::Result<bool> {
        let mut conn = self.conn()?;
        queries::insert_doctor_with_schedule(&mut conn, doctor, windows)
    }

    fn get_doctor(&self, id: &str) -> anyhow::Result<Option<Doctor>> {
        let conn = self.conn()?;
        queries::get_doctor(&conn, id)
    }

    fn find_doctor_by_email(&self, email: &str) -> anyhow::Result<Option<Doctor>> {
        let conn = self.conn()?;
        queries::find_doctor_by_email(&conn, email)
    }

    fn list_doctors(&self) -> anyhow::Result<Vec<Doctor>> {
        let conn = self.conn()?;
        queries::list_doctors(&conn)
    }

    fn insert_appointment_if_free(&self, appt: &Appointment) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        queries::insert_appointment_if_free(&conn, appt)
    }

    fn get_appointment(&self, id: &str) -> anyhow::Result<Option<Appointment>> {
        let conn = self.conn()?;
        queries::get_appointment(&conn, id)
    }

    fn appointments_for_patient(&self, patient_id: &str) -> anyhow::Result<Vec<Appointment>> {
        let conn = self.conn()?;
        queries::appointments_for_patient(&conn, patient_id)
    }

    fn appointments_for_doctor(&self, doctor_id: &str) -> anyhow::Result<Vec<Appointment>> {
        let conn = self.conn()?;
        queries::appointments_for_doctor(&conn, doctor_id)
    }

    fn booked_times(&self, doctor_id: &str, date: &NaiveDate) -> anyhow::Result<Vec<NaiveTime>> {
        let conn = self.conn()?;
        queries::booked_times(&conn, doctor_id, date)
    }

    fn update_appointment_status(&self, id: &str, status: AppointmentStatus) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        queries::update_appointment_status(&conn, id, status)
    }

    fn insert_availability(&self, window: &AvailabilityWindow) -> anyhow::Result<()> {
        let conn = self.conn()?;
        queries::insert_availability(&conn, window)
    }

    fn availability_for_doctor(&self, doctor_id: &str) -> anyhow::Result<Vec<AvailabilityWindow>> {
        let conn = self.conn()?;
        queries::availability_for_doctor(&conn, doctor_id)
    }

    fn replace_availability(&self, doctor_id: &str, windows: &[AvailabilityWindow]) -> anyhow::Result<()> {
        let mut conn = self.conn()?;
        queries::replace_availability(&mut conn, doctor_id, windows)
    }
}
