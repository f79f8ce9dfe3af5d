use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Store;
use crate::models::{Appointment, AppointmentStatus, AvailabilityWindow, Doctor, Patient};

const PATIENTS: &str = "patients";
const DOCTORS: &str = "doctors";
const APPOINTMENTS: &str = "appointments";
const AVAILABILITY: &str = "availability";

/// One pretty-printed JSON file per record: `<root>/<collection>/<id>.json`.
///
/// Lookups scan the whole collection directory. Every write that depends on
/// a prior read runs under `write_lock`, so uniqueness holds within one
/// process only.
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        for collection in [PATIENTS, DOCTORS, APPOINTMENTS, AVAILABILITY] {
            let dir = root.join(collection);
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("file store lock poisoned"))
    }

    /// `None` for ids that cannot be a plain file name.
    fn record_path(&self, collection: &str, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.root.join(collection).join(format!("{id}.json")))
    }

    fn save<T: Serialize>(&self, collection: &str, id: &str, record: &T) -> anyhow::Result<()> {
        let path = self
            .record_path(collection, id)
            .ok_or_else(|| anyhow::anyhow!("invalid record id: {id}"))?;
        let json = serde_json::to_string_pretty(record)?;

        // Write then rename so readers never see a half-written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, collection: &str, id: &str) -> anyhow::Result<Option<T>> {
        let Some(path) = self.record_path(collection, id) else {
            return Ok(None);
        };
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        let record = serde_json::from_str(&raw)
            .with_context(|| format!("malformed record {}", path.display()))?;
        Ok(Some(record))
    }

    /// Malformed files are logged and skipped.
    fn load_all<T: DeserializeOwned>(&self, collection: &str) -> anyhow::Result<Vec<T>> {
        let dir = self.root.join(collection);
        let mut records = vec![];

        for entry in fs::read_dir(&dir).with_context(|| format!("failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().map(|ext| ext != "json").unwrap_or(true) {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }

        Ok(records)
    }

    fn remove(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        if let Some(path) = self.record_path(collection, id) {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).with_context(|| format!("failed to remove {}", path.display())),
            }
        }
        Ok(())
    }

    fn appointments_where(&self, keep: impl Fn(&Appointment) -> bool) -> anyhow::Result<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .load_all(APPOINTMENTS)?
            .into_iter()
            .filter(|a| keep(a))
            .collect();
        appointments.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(appointments)
    }
}

impl Store for FileStore {
    fn insert_patient(&self, patient: &Patient) -> anyhow::Result<bool> {
        let _guard = self.lock()?;
        if self.find_patient_by_email(&patient.email)?.is_some() {
            return Ok(false);
        }
        self.save(PATIENTS, &patient.id, patient)?;
        Ok(true)
    }

    fn get_patient(&self, id: &str) -> anyhow::Result<Option<Patient>> {
        self.load(PATIENTS, id)
    }

    fn find_patient_by_email(&self, email: &str) -> anyhow::Result<Option<Patient>> {
        Ok(self
            .load_all::<Patient>(PATIENTS)?
            .into_iter()
            .find(|p| p.email == email))
    }

    fn insert_doctor(&self, doctor: &Doctor) -> anyhow::Result<bool> {
        let _guard = self.lock()?;
        if self.find_doctor_by_email(&doctor.email)?.is_some() {
            return Ok(false);
        }
        self.save(DOCTORS, &doctor.id, doctor)?;
        Ok(true)
    }

    fn insert_doctor_with_schedule(&self, doctor: &Doctor, windows: &[AvailabilityWindow]) -> anyhow::Result<bool> {
        let _guard = self.lock()?;
        if self.find_doctor_by_email(&doctor.email)?.is_some() {
            return Ok(false);
        }

        // Windows go first so the doctor never shows up with partial hours.
        let mut saved: Vec<&str> = vec![];
        let result = windows
            .iter()
            .try_for_each(|w| -> anyhow::Result<()> {
                self.save(AVAILABILITY, &w.id, w)?;
                saved.push(&w.id);
                Ok(())
            })
            .and_then(|()| self.save(DOCTORS, &doctor.id, doctor));

        if let Err(e) = result {
            for id in saved {
                if let Err(cleanup) = self.remove(AVAILABILITY, id) {
                    tracing::warn!(error = %cleanup, window_id = id, "failed to roll back availability window");
                }
            }
            return Err(e);
        }
        Ok(true)
    }

    fn get_doctor(&self, id: &str) -> anyhow::Result<Option<Doctor>> {
        self.load(DOCTORS, id)
    }

    fn find_doctor_by_email(&self, email: &str) -> anyhow::Result<Option<Doctor>> {
        Ok(self
            .load_all::<Doctor>(DOCTORS)?
            .into_iter()
            .find(|d| d.email == email))
    }

    fn list_doctors(&self) -> anyhow::Result<Vec<Doctor>> {
        let mut doctors: Vec<Doctor> = self.load_all(DOCTORS)?;
        doctors.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(doctors)
    }

    fn insert_appointment_if_free(&self, appt: &Appointment) -> anyhow::Result<bool> {
        let _guard = self.lock()?;
        if self.booked_times(&appt.doctor_id, &appt.date)?.contains(&appt.time) {
            return Ok(false);
        }
        self.save(APPOINTMENTS, &appt.id, appt)?;
        Ok(true)
    }

    fn get_appointment(&self, id: &str) -> anyhow::Result<Option<Appointment>> {
        self.load(APPOINTMENTS, id)
    }

    fn appointments_for_patient(&self, patient_id: &str) -> anyhow::Result<Vec<Appointment>> {
        self.appointments_where(|a| a.patient_id == patient_id)
    }

    fn appointments_for_doctor(&self, doctor_id: &str) -> anyhow::Result<Vec<Appointment>> {
        self.appointments_where(|a| a.doctor_id == doctor_id)
    }

    fn booked_times(&self, doctor_id: &str, date: &NaiveDate) -> anyhow::Result<Vec<NaiveTime>> {
        Ok(self
            .appointments_where(|a| a.doctor_id == doctor_id && a.date == *date && a.is_booked())?
            .into_iter()
            .map(|a| a.time)
            .collect())
    }

    fn update_appointment_status(&self, id: &str, status: AppointmentStatus) -> anyhow::Result<bool> {
        let _guard = self.lock()?;
        let Some(mut appt) = self.load::<Appointment>(APPOINTMENTS, id)? else {
            return Ok(false);
        };
        if !appt.is_booked() {
            return Ok(false);
        }
        appt.status = status;
        self.save(APPOINTMENTS, id, &appt)?;
        Ok(true)
    }

    fn insert_availability(&self, window: &AvailabilityWindow) -> anyhow::Result<()> {
        let _guard = self.lock()?;
        self.save(AVAILABILITY, &window.id, window)
    }

    fn availability_for_doctor(&self, doctor_id: &str) -> anyhow::Result<Vec<AvailabilityWindow>> {
        let mut windows: Vec<AvailabilityWindow> = self
            .load_all::<AvailabilityWindow>(AVAILABILITY)?
            .into_iter()
            .filter(|w| w.doctor_id == doctor_id)
            .collect();
        windows.sort_by(|a, b| (a.day_of_week, a.start_time).cmp(&(b.day_of_week, b.start_time)));
        Ok(windows)
    }

    fn replace_availability(&self, doctor_id: &str, windows: &[AvailabilityWindow]) -> anyhow::Result<()> {
        let _guard = self.lock()?;
        for existing in self.availability_for_doctor(doctor_id)? {
            self.remove(AVAILABILITY, &existing.id)?;
        }
        for window in windows {
            self.save(AVAILABILITY, &window.id, window)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contract;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_accounts_contract() {
        let (_dir, store) = store();
        contract::accounts(&store);
    }

    #[test]
    fn test_bookings_contract() {
        let (_dir, store) = store();
        contract::bookings(&store);
    }

    #[test]
    fn test_availability_contract() {
        let (_dir, store) = store();
        contract::availability(&store);
    }

    #[test]
    fn test_one_file_per_record() {
        let (dir, store) = store();
        store.insert_doctor(&contract::doctor("d1", "d1@example.com")).unwrap();
        let path = dir.path().join("doctors").join("d1.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["email"], "d1@example.com");
        assert_eq!(json["consultation_fee"], 500);
    }

    #[test]
    fn test_failed_schedule_leaves_nothing_behind() {
        let (dir, store) = store();
        let t = |s: &str| chrono::NaiveTime::parse_from_str(s, "%H:%M").unwrap();
        let good = AvailabilityWindow::new("d1", 0, t("09:00"), t("12:00")).unwrap();
        let mut bad = AvailabilityWindow::new("d1", 1, t("09:00"), t("12:00")).unwrap();
        bad.id = "../escape".to_string();

        assert!(store
            .insert_doctor_with_schedule(&contract::doctor("d1", "d1@example.com"), &[good, bad])
            .is_err());
        assert!(store.get_doctor("d1").unwrap().is_none());
        assert_eq!(dir.path().join("availability").read_dir().unwrap().count(), 0);
    }

    #[test]
    fn test_path_like_ids_are_not_found() {
        let (_dir, store) = store();
        assert!(store.get_doctor("../patients/p1").unwrap().is_none());
        assert!(store.get_appointment("").unwrap().is_none());
    }

    #[test]
    fn test_malformed_record_is_skipped_in_scans() {
        let (dir, store) = store();
        store.insert_doctor(&contract::doctor("d1", "d1@example.com")).unwrap();
        fs::write(dir.path().join("doctors").join("broken.json"), "{not json").unwrap();
        assert_eq!(store.list_doctors().unwrap().len(), 1);
        assert!(store.get_doctor("broken").is_err());
    }
}
