use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Store;
use crate::models::specialty::conditions;
use crate::models::time::{format_time, long_date};
use crate::models::Appointment;

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    pub id: String,
    pub date: NaiveDate,
    pub date_label: String,
    pub time: String,
    pub status: &'static str,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_phone: Option<String>,
}

impl AppointmentView {
    fn from_appointment(a: &Appointment) -> Self {
        Self {
            id: a.id.clone(),
            date: a.date,
            date_label: long_date(&a.date),
            time: format_time(&a.time),
            status: a.status.as_str(),
            notes: a.notes.clone(),
            doctor_name: None,
            specialization: None,
            location: None,
            patient_name: None,
            patient_phone: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PatientDashboard {
    pub upcoming: Vec<AppointmentView>,
    pub past: Vec<AppointmentView>,
    pub common_diseases: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DoctorDashboard {
    pub today_label: String,
    pub todays_appointments: Vec<AppointmentView>,
    pub upcoming: Vec<AppointmentView>,
    pub past: Vec<AppointmentView>,
}

fn by_slot(a: &AppointmentView, b: &AppointmentView) -> std::cmp::Ordering {
    (a.date, &a.time).cmp(&(b.date, &b.time))
}

pub fn patient_dashboard(store: &dyn Store, patient_id: &str, today: NaiveDate) -> anyhow::Result<PatientDashboard> {
    let mut upcoming = vec![];
    let mut past = vec![];

    for appt in store.appointments_for_patient(patient_id)? {
        // Appointments whose doctor has disappeared are not shown.
        let Some(doctor) = store.get_doctor(&appt.doctor_id)? else {
            continue;
        };
        let mut view = AppointmentView::from_appointment(&appt);
        view.doctor_name = Some(doctor.full_name);
        view.specialization = Some(doctor.specialization);
        view.location = Some(doctor.location);

        if appt.is_booked() && appt.date >= today {
            upcoming.push(view);
        } else if appt.is_past(&today) {
            past.push(view);
        }
    }

    upcoming.sort_by(by_slot);
    past.sort_by(|a, b| by_slot(b, a));

    Ok(PatientDashboard {
        upcoming,
        past,
        common_diseases: conditions(),
    })
}

pub fn doctor_dashboard(store: &dyn Store, doctor_id: &str, today: NaiveDate) -> anyhow::Result<DoctorDashboard> {
    let mut todays_appointments = vec![];
    let mut upcoming = vec![];
    let mut past = vec![];

    for appt in store.appointments_for_doctor(doctor_id)? {
        let Some(patient) = store.get_patient(&appt.patient_id)? else {
            continue;
        };
        let mut view = AppointmentView::from_appointment(&appt);
        view.patient_name = Some(patient.full_name);
        view.patient_phone = Some(patient.phone);

        if appt.is_booked() && appt.date == today {
            todays_appointments.push(view);
        } else if appt.is_booked() && appt.date > today {
            upcoming.push(view);
        } else if appt.is_past(&today) {
            past.push(view);
        }
    }

    todays_appointments.sort_by(by_slot);
    upcoming.sort_by(by_slot);
    past.sort_by(|a, b| by_slot(b, a));

    Ok(DoctorDashboard {
        today_label: long_date(&today),
        todays_appointments,
        upcoming,
        past,
    })
}
