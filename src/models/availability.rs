use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::time::{hhmm, weekday_name};

/// A recurring weekly range during which a doctor accepts bookings.
/// `day_of_week` follows the ISO convention with Monday = 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityWindow {
    pub id: String,
    pub doctor_id: String,
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl AvailabilityWindow {
    pub fn new(
        doctor_id: &str,
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> anyhow::Result<Self> {
        if day_of_week > 6 {
            return Err(anyhow::anyhow!("invalid day of week: {day_of_week}"));
        }
        if start_time >= end_time {
            return Err(anyhow::anyhow!(
                "start time {} must be before end time {}",
                start_time.format("%H:%M"),
                end_time.format("%H:%M")
            ));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            doctor_id: doctor_id.to_string(),
            day_of_week,
            start_time,
            end_time,
            is_available: true,
        })
    }

    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }

    pub fn applies_to(&self, date: &NaiveDate) -> bool {
        self.is_available && self.day_of_week == day_index(date)
    }
}

pub fn day_index(date: &NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Monday to Friday, 09:00-17:00.
pub fn default_weekday_windows(doctor_id: &str) -> Vec<AvailabilityWindow> {
    let (Some(start), Some(end)) = (
        NaiveTime::from_hms_opt(9, 0, 0),
        NaiveTime::from_hms_opt(17, 0, 0),
    ) else {
        return Vec::new();
    };
    (0..5)
        .filter_map(|day| AvailabilityWindow::new(doctor_id, day, start, end).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn test_rejects_inverted_window() {
        assert!(AvailabilityWindow::new("doc", 0, t("17:00"), t("09:00")).is_err());
        assert!(AvailabilityWindow::new("doc", 0, t("09:00"), t("09:00")).is_err());
    }

    #[test]
    fn test_rejects_bad_day() {
        assert!(AvailabilityWindow::new("doc", 7, t("09:00"), t("17:00")).is_err());
    }

    #[test]
    fn test_day_index_is_monday_based() {
        // 2025-06-16 is a Monday, 2025-06-22 a Sunday
        assert_eq!(day_index(&NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()), 0);
        assert_eq!(day_index(&NaiveDate::from_ymd_opt(2025, 6, 22).unwrap()), 6);
    }

    #[test]
    fn test_applies_to_respects_active_flag() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let mut window = AvailabilityWindow::new("doc", 0, t("09:00"), t("17:00")).unwrap();
        assert!(window.applies_to(&monday));
        window.is_available = false;
        assert!(!window.applies_to(&monday));
    }

    #[test]
    fn test_default_weekday_windows() {
        let windows = default_weekday_windows("doc");
        assert_eq!(windows.len(), 5);
        assert_eq!(windows[0].day_name(), "Monday");
        assert_eq!(windows[4].day_name(), "Friday");
        assert!(windows.iter().all(|w| w.start_time == t("09:00") && w.end_time == t("17:00")));
    }

    #[test]
    fn test_serializes_times_as_hhmm() {
        let window = AvailabilityWindow::new("doc", 2, t("13:00"), t("17:30")).unwrap();
        let json = serde_json::to_value(&window).unwrap();
        assert_eq!(json["start_time"], "13:00");
        assert_eq!(json["end_time"], "17:30");
        let back: AvailabilityWindow = serde_json::from_value(json).unwrap();
        assert_eq!(back, window);
    }
}
