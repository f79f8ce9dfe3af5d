use std::collections::BTreeSet;

use serde::Serialize;

use crate::db::Store;
use crate::models::specialty::specialty_for;
use crate::models::DoctorProfile;

#[derive(Debug, Serialize)]
pub struct ConditionMatch {
    pub disease: String,
    pub specialization: &'static str,
    pub doctors: Vec<DoctorProfile>,
}

/// `None` when the condition is not in the lookup table.
pub fn find_by_condition(store: &dyn Store, condition: &str) -> anyhow::Result<Option<ConditionMatch>> {
    let Some(specialization) = specialty_for(condition) else {
        return Ok(None);
    };

    let doctors = store
        .list_doctors()?
        .iter()
        .filter(|d| d.specialization == specialization)
        .map(DoctorProfile::from)
        .collect();

    Ok(Some(ConditionMatch {
        disease: condition.to_string(),
        specialization,
        doctors,
    }))
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub doctors: Vec<DoctorProfile>,
    pub specialties: Vec<String>,
    pub locations: Vec<String>,
}

/// Blank filters match everything. The facet lists always cover all doctors.
pub fn search(
    store: &dyn Store,
    specialization: Option<&str>,
    location: Option<&str>,
) -> anyhow::Result<SearchResult> {
    let all = store.list_doctors()?;
    let specialization = specialization.map(str::trim).filter(|s| !s.is_empty());
    let location = location.map(str::trim).filter(|s| !s.is_empty());

    let specialties: BTreeSet<String> = all.iter().map(|d| d.specialization.clone()).collect();
    let locations: BTreeSet<String> = all.iter().map(|d| d.location.clone()).collect();

    let doctors = all
        .iter()
        .filter(|d| specialization.map_or(true, |s| d.specialization == s))
        .filter(|d| location.map_or(true, |l| d.location == l))
        .map(DoctorProfile::from)
        .collect();

    Ok(SearchResult {
        doctors,
        specialties: specialties.into_iter().collect(),
        locations: locations.into_iter().collect(),
    })
}
