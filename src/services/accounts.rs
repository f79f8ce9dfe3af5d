use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Local;

use crate::db::Store;
use crate::errors::AppError;
use crate::models::account::DEFAULT_CONSULTATION_FEE;
use crate::models::availability::default_weekday_windows;
use crate::models::{Doctor, Patient, Role};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Email already exists!")]
    EmailTaken,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email or password!")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::EmailTaken => AppError::Conflict(e.to_string()),
            AccountError::MissingField(_) => AppError::BadRequest(e.to_string()),
            AccountError::InvalidCredentials => AppError::Unauthorized(e.to_string()),
            AccountError::Storage(inner) => AppError::Storage(inner),
        }
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub specialization: String,
    pub location: String,
    pub bio: String,
}

fn required(value: &str, field: &'static str) -> Result<String, AccountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    Ok(required(email, "email")?.to_lowercase())
}

pub fn register_patient(store: &dyn Store, new: NewPatient) -> Result<Patient, AccountError> {
    let patient = Patient {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: required(&new.full_name, "full_name")?,
        email: normalize_email(&new.email)?,
        phone: new.phone.trim().to_string(),
        password_hash: hash_password(&required(&new.password, "password")?)?,
        created_at: Local::now().naive_local(),
    };

    if !store.insert_patient(&patient)? {
        tracing::info!(email = %patient.email, "patient registration rejected: email taken");
        return Err(AccountError::EmailTaken);
    }

    tracing::info!(patient_id = %patient.id, "patient registered");
    Ok(patient)
}

/// Registers the doctor and gives them the default weekday schedule.
pub fn register_doctor(store: &dyn Store, new: NewDoctor) -> Result<Doctor, AccountError> {
    let doctor = Doctor {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: required(&new.full_name, "full_name")?,
        email: normalize_email(&new.email)?,
        phone: new.phone.trim().to_string(),
        password_hash: hash_password(&required(&new.password, "password")?)?,
        specialization: required(&new.specialization, "specialization")?,
        location: required(&new.location, "location")?,
        consultation_fee: DEFAULT_CONSULTATION_FEE,
        bio: new.bio.trim().to_string(),
        created_at: Local::now().naive_local(),
    };

    if !store.insert_doctor_with_schedule(&doctor, &default_weekday_windows(&doctor.id))? {
        tracing::info!(email = %doctor.email, "doctor registration rejected: email taken");
        return Err(AccountError::EmailTaken);
    }

    tracing::info!(doctor_id = %doctor.id, "doctor registered");
    Ok(doctor)
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub full_name: String,
}

pub fn login(store: &dyn Store, role: Role, email: &str, password: &str) -> Result<Identity, AccountError> {
    let email = email.trim().to_lowercase();
    let account = match role {
        Role::Patient => store
            .find_patient_by_email(&email)?
            .map(|p| (p.id, p.full_name, p.password_hash)),
        Role::Doctor => store
            .find_doctor_by_email(&email)?
            .map(|d| (d.id, d.full_name, d.password_hash)),
    };

    match account {
        Some((user_id, full_name, hash)) if verify_password(password, &hash) => {
            tracing::info!(user_id = %user_id, role = role.as_str(), "login succeeded");
            Ok(Identity {
                user_id,
                role,
                full_name,
            })
        }
        _ => {
            tracing::info!(role = role.as_str(), "login failed");
            Err(AccountError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, SqliteStore};

    fn store() -> SqliteStore {
        SqliteStore::new(init_db(":memory:").unwrap())
    }

    fn new_patient(email: &str) -> NewPatient {
        NewPatient {
            full_name: "Alice Doe".to_string(),
            email: email.to_string(),
            phone: "5551234567".to_string(),
            password: "s3cret".to_string(),
        }
    }

    fn new_doctor(email: &str) -> NewDoctor {
        NewDoctor {
            full_name: "Dr. Who".to_string(),
            email: email.to_string(),
            phone: "5557654321".to_string(),
            password: "tardis".to_string(),
            specialization: "Neurology".to_string(),
            location: "Chicago".to_string(),
            bio: String::new(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[test]
    fn test_duplicate_patient_email_rejected() {
        let store = store();
        register_patient(&store, new_patient("alice@example.com")).unwrap();
        let err = register_patient(&store, new_patient("Alice@Example.com ")).unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
    }

    #[test]
    fn test_blank_fields_rejected() {
        let store = store();
        let mut p = new_patient("alice@example.com");
        p.full_name = "   ".to_string();
        assert!(matches!(
            register_patient(&store, p).unwrap_err(),
            AccountError::MissingField("full_name")
        ));
        assert!(store.find_patient_by_email("alice@example.com").unwrap().is_none());
    }

    #[test]
    fn test_doctor_gets_default_availability() {
        let store = store();
        let doctor = register_doctor(&store, new_doctor("who@example.com")).unwrap();
        let windows = store.availability_for_doctor(&doctor.id).unwrap();
        assert_eq!(windows.len(), 5);
        assert_eq!(doctor.consultation_fee, 500);
    }

    #[test]
    fn test_duplicate_doctor_gets_no_extra_availability() {
        let store = store();
        register_doctor(&store, new_doctor("who@example.com")).unwrap();
        assert!(matches!(
            register_doctor(&store, new_doctor("who@example.com")).unwrap_err(),
            AccountError::EmailTaken
        ));
        assert_eq!(store.list_doctors().unwrap().len(), 1);
    }

    #[test]
    fn test_login_checks_role_and_password() {
        let store = store();
        let patient = register_patient(&store, new_patient("alice@example.com")).unwrap();

        let identity = login(&store, Role::Patient, "ALICE@example.com", "s3cret").unwrap();
        assert_eq!(identity.user_id, patient.id);
        assert_eq!(identity.role, Role::Patient);

        assert!(matches!(
            login(&store, Role::Patient, "alice@example.com", "wrong").unwrap_err(),
            AccountError::InvalidCredentials
        ));
        assert!(matches!(
            login(&store, Role::Doctor, "alice@example.com", "s3cret").unwrap_err(),
            AccountError::InvalidCredentials
        ));
    }
}
