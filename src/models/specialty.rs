/// Common conditions and the specialty that treats them.
pub const CONDITION_SPECIALTIES: [(&str, &str); 10] = [
    ("Heart Disease", "Cardiology"),
    ("Diabetes", "Endocrinology"),
    ("Arthritis", "Rheumatology"),
    ("Asthma", "Pulmonology"),
    ("Depression", "Psychiatry"),
    ("High Blood Pressure", "Cardiology"),
    ("Migraine", "Neurology"),
    ("Thyroid Disorders", "Endocrinology"),
    ("Allergies", "Allergy and Immunology"),
    ("Back Pain", "Orthopedics"),
];

pub fn specialty_for(condition: &str) -> Option<&'static str> {
    CONDITION_SPECIALTIES
        .iter()
        .find(|(name, _)| *name == condition)
        .map(|(_, specialty)| *specialty)
}

pub fn conditions() -> Vec<&'static str> {
    CONDITION_SPECIALTIES.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(specialty_for("Migraine"), Some("Neurology"));
        assert_eq!(specialty_for("High Blood Pressure"), Some("Cardiology"));
        assert_eq!(specialty_for("Allergies"), Some("Allergy and Immunology"));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(specialty_for("migraine"), None);
        assert_eq!(specialty_for("Broken Leg"), None);
    }

    #[test]
    fn test_conditions_keep_table_order() {
        let names = conditions();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Heart Disease");
        assert_eq!(names[9], "Back Pain");
    }
}
