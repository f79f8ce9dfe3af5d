use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::time::{format_time, parse_date, parse_time, DATE_FORMAT};
use crate::models::{Appointment, AppointmentStatus, AvailabilityWindow, Doctor, Patient};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|_| anyhow::anyhow!("invalid timestamp: {s}"))
}

// ── Patients ──

const PATIENT_COLUMNS: &str = "id, full_name, email, phone, password_hash, created_at";

/// Returns false when the email is already registered.
pub fn insert_patient(conn: &Connection, patient: &Patient) -> anyhow::Result<bool> {
    let result = conn.execute(
        "INSERT INTO patients (id, full_name, email, phone, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id,
            patient.full_name,
            patient.email,
            patient.phone,
            patient.password_hash,
            patient.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn get_patient(conn: &Connection, id: &str) -> anyhow::Result<Option<Patient>> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| Ok(parse_patient_row(row)))
        .optional()?
        .transpose()
}

pub fn find_patient_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Patient>> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1");
    conn.query_row(&sql, params![email], |row| Ok(parse_patient_row(row)))
        .optional()?
        .transpose()
}

fn parse_patient_row(row: &rusqlite::Row) -> anyhow::Result<Patient> {
    let created_at: String = row.get(5)?;
    Ok(Patient {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Doctors ──

const DOCTOR_COLUMNS: &str = "id, full_name, email, phone, password_hash, specialization, location, consultation_fee, bio, created_at";

/// Returns false when the email is already registered.
pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> anyhow::Result<bool> {
    let result = conn.execute(
        "INSERT INTO doctors (id, full_name, email, phone, password_hash, specialization, location, consultation_fee, bio, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            doctor.id,
            doctor.full_name,
            doctor.email,
            doctor.phone,
            doctor.password_hash,
            doctor.specialization,
            doctor.location,
            doctor.consultation_fee,
            doctor.bio,
            doctor.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Doctor row and availability in one transaction. Returns false when the
/// email is already registered.
pub fn insert_doctor_with_schedule(
    conn: &mut Connection,
    doctor: &Doctor,
    windows: &[AvailabilityWindow],
) -> anyhow::Result<bool> {
    let tx = conn.transaction()?;
    if !insert_doctor(&tx, doctor)? {
        return Ok(false);
    }
    for window in windows {
        insert_availability(&tx, window)?;
    }
    tx.commit()?;
    Ok(true)
}

pub fn get_doctor(conn: &Connection, id: &str) -> anyhow::Result<Option<Doctor>> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| Ok(parse_doctor_row(row)))
        .optional()?
        .transpose()
}

pub fn find_doctor_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Doctor>> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1");
    conn.query_row(&sql, params![email], |row| Ok(parse_doctor_row(row)))
        .optional()?
        .transpose()
}

pub fn list_doctors(conn: &Connection) -> anyhow::Result<Vec<Doctor>> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY full_name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_doctor_row(row)))?;

    let mut doctors = vec![];
    for row in rows {
        doctors.push(row??);
    }
    Ok(doctors)
}

fn parse_doctor_row(row: &rusqlite::Row) -> anyhow::Result<Doctor> {
    let created_at: String = row.get(9)?;
    Ok(Doctor {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        specialization: row.get(5)?,
        location: row.get(6)?,
        consultation_fee: row.get(7)?,
        bio: row.get(8)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Appointments ──

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, date, time, status, notes, created_at";

/// Inserts a booked appointment unless the doctor already has a booked
/// appointment at the same date and time. Returns false in that case.
pub fn insert_appointment_if_free(conn: &Connection, appt: &Appointment) -> anyhow::Result<bool> {
    let result = conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, time, status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appt.id,
            appt.patient_id,
            appt.doctor_id,
            appt.date.format(DATE_FORMAT).to_string(),
            format_time(&appt.time),
            appt.status.as_str(),
            appt.notes,
            appt.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| Ok(parse_appointment_row(row)))
        .optional()?
        .transpose()
}

pub fn appointments_for_patient(conn: &Connection, patient_id: &str) -> anyhow::Result<Vec<Appointment>> {
    query_appointments(
        conn,
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE patient_id = ?1 ORDER BY date ASC, time ASC"),
        patient_id,
    )
}

pub fn appointments_for_doctor(conn: &Connection, doctor_id: &str) -> anyhow::Result<Vec<Appointment>> {
    query_appointments(
        conn,
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE doctor_id = ?1 ORDER BY date ASC, time ASC"),
        doctor_id,
    )
}

fn query_appointments(conn: &Connection, sql: &str, owner_id: &str) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![owner_id], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn booked_times(conn: &Connection, doctor_id: &str, date: &NaiveDate) -> anyhow::Result<Vec<NaiveTime>> {
    let mut stmt = conn.prepare(
        "SELECT time FROM appointments WHERE doctor_id = ?1 AND date = ?2 AND status = 'booked' ORDER BY time ASC",
    )?;
    let rows = stmt.query_map(
        params![doctor_id, date.format(DATE_FORMAT).to_string()],
        |row| row.get::<_, String>(0),
    )?;

    let mut times = vec![];
    for row in rows {
        times.push(parse_time(&row?)?);
    }
    Ok(times)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE id = ?2 AND status = 'booked'",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let date: String = row.get(3)?;
    let time: String = row.get(4)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(7)?;

    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        date: parse_date(&date)?,
        time: parse_time(&time)?,
        status: AppointmentStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("unknown appointment status: {status}"))?,
        notes: row.get(6)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Availability ──

pub fn insert_availability(conn: &Connection, window: &AvailabilityWindow) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO availability (id, doctor_id, day_of_week, start_time, end_time, is_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            window.id,
            window.doctor_id,
            window.day_of_week,
            format_time(&window.start_time),
            format_time(&window.end_time),
            window.is_available as i32,
        ],
    )?;
    Ok(())
}

pub fn availability_for_doctor(conn: &Connection, doctor_id: &str) -> anyhow::Result<Vec<AvailabilityWindow>> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, day_of_week, start_time, end_time, is_available
         FROM availability WHERE doctor_id = ?1 ORDER BY day_of_week ASC, start_time ASC",
    )?;
    let rows = stmt.query_map(params![doctor_id], |row| Ok(parse_availability_row(row)))?;

    let mut windows = vec![];
    for row in rows {
        windows.push(row??);
    }
    Ok(windows)
}

/// Swaps the doctor's whole weekly schedule in one transaction.
pub fn replace_availability(
    conn: &mut Connection,
    doctor_id: &str,
    windows: &[AvailabilityWindow],
) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM availability WHERE doctor_id = ?1", params![doctor_id])?;
    for window in windows {
        insert_availability(&tx, window)?;
    }
    tx.commit()?;
    Ok(())
}

fn parse_availability_row(row: &rusqlite::Row) -> anyhow::Result<AvailabilityWindow> {
    let start_time: String = row.get(3)?;
    let end_time: String = row.get(4)?;
    Ok(AvailabilityWindow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        day_of_week: row.get(2)?,
        start_time: parse_time(&start_time)?,
        end_time: parse_time(&end_time)?,
        is_available: row.get::<_, i32>(5)? != 0,
    })
}
