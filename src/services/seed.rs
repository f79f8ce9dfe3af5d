use chrono::Local;

use crate::db::Store;
use crate::models::account::DEFAULT_CONSULTATION_FEE;
use crate::models::availability::default_weekday_windows;
use crate::models::Doctor;
use crate::services::accounts::hash_password;

const SAMPLES: [(&str, &str); 5] = [
    ("Cardiology", "New York"),
    ("Dermatology", "Los Angeles"),
    ("Neurology", "Chicago"),
    ("Pediatrics", "Houston"),
    ("Orthopedics", "Phoenix"),
];

/// Adds five sample doctors with weekday hours when the store has none.
/// Returns how many were created.
pub fn seed_sample_doctors(store: &dyn Store) -> anyhow::Result<usize> {
    if !store.list_doctors()?.is_empty() {
        return Ok(0);
    }

    let mut created = 0;
    for (i, (specialization, location)) in SAMPLES.iter().enumerate() {
        let n = i + 1;
        let doctor = Doctor {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: format!("Dr. Smith {n}"),
            email: format!("dr.smith{n}@example.com"),
            phone: format!("123456789{n}"),
            password_hash: hash_password(&format!("doctor{n}"))?,
            specialization: specialization.to_string(),
            location: location.to_string(),
            consultation_fee: DEFAULT_CONSULTATION_FEE,
            bio: format!("Experienced {specialization} specialist with 10+ years of practice"),
            created_at: Local::now().naive_local(),
        };

        if !store.insert_doctor_with_schedule(&doctor, &default_weekday_windows(&doctor.id))? {
            continue;
        }
        created += 1;
    }

    tracing::info!(count = created, "seeded sample doctors");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, SqliteStore};
    use crate::models::Role;
    use crate::services::accounts::login;

    #[test]
    fn test_seeds_once() {
        let store = SqliteStore::new(init_db(":memory:").unwrap());
        assert_eq!(seed_sample_doctors(&store).unwrap(), 5);
        assert_eq!(seed_sample_doctors(&store).unwrap(), 0);

        let doctors = store.list_doctors().unwrap();
        assert_eq!(doctors.len(), 5);
        for doctor in &doctors {
            assert_eq!(store.availability_for_doctor(&doctor.id).unwrap().len(), 5);
        }
    }

    #[test]
    fn test_sample_doctor_can_log_in() {
        let store = SqliteStore::new(init_db(":memory:").unwrap());
        seed_sample_doctors(&store).unwrap();
        let identity = login(&store, Role::Doctor, "dr.smith3@example.com", "doctor3").unwrap();
        assert_eq!(identity.full_name, "Dr. Smith 3");
    }
}
