use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONSULTATION_FEE: u32 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Patient => "/patient/login",
            Role::Doctor => "/doctor/login",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Patient => "/patient/dashboard",
            Role::Doctor => "/doctor/dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub specialization: String,
    pub location: String,
    #[serde(default = "default_fee")]
    pub consultation_fee: u32,
    #[serde(default)]
    pub bio: String,
    pub created_at: NaiveDateTime,
}

fn default_fee() -> u32 {
    DEFAULT_CONSULTATION_FEE
}

/// What the HTTP layer is allowed to show about a doctor.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub location: String,
    pub consultation_fee: u32,
    pub bio: String,
}

impl From<&Doctor> for DoctorProfile {
    fn from(d: &Doctor) -> Self {
        Self {
            id: d.id.clone(),
            full_name: d.full_name.clone(),
            email: d.email.clone(),
            phone: d.phone.clone(),
            specialization: d.specialization.clone(),
            location: d.location.clone(),
            consultation_fee: d.consultation_fee,
            bio: d.bio.clone(),
        }
    }
}
