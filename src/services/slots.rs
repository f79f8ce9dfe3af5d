use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::db::Store;
use crate::models::availability::day_index;
use crate::models::time::{format_time, weekday_name};
use crate::models::AvailabilityWindow;

pub const SLOT_MINUTES: i64 = 30;

/// Walks each window in `SLOT_MINUTES` steps, keeping starts whose full slot
/// fits inside the window and that are not already taken.
///
/// Window order is preserved and overlapping windows may yield the same
/// time twice.
pub fn open_slots<'a>(
    windows: impl IntoIterator<Item = &'a AvailabilityWindow>,
    booked: &HashSet<NaiveTime>,
) -> Vec<NaiveTime> {
    let step = Duration::minutes(SLOT_MINUTES);
    let mut slots = vec![];

    for window in windows {
        let mut current = window.start_time;
        loop {
            // overflowing_add_signed wraps past midnight; a wrap means the slot
            // cannot fit before the window ends.
            let (slot_end, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 || slot_end > window.end_time {
                break;
            }
            if !booked.contains(&current) {
                slots.push(current);
            }
            current = slot_end;
        }
    }

    slots
}

/// Is `time` a slot start some active window offers on `date`?
pub fn offers_slot(windows: &[AvailabilityWindow], date: &NaiveDate, time: &NaiveTime) -> bool {
    let matching = windows.iter().filter(|w| w.applies_to(date));
    open_slots(matching, &HashSet::new()).contains(time)
}

pub fn available_slots(store: &dyn Store, doctor_id: &str, date: &NaiveDate) -> anyhow::Result<Vec<NaiveTime>> {
    let windows = store.availability_for_doctor(doctor_id)?;
    let booked: HashSet<NaiveTime> = store.booked_times(doctor_id, date)?.into_iter().collect();
    Ok(open_slots(windows.iter().filter(|w| w.applies_to(date)), &booked))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub slot_time: String,
}

/// Open slots for `days` consecutive dates starting at `from`.
pub fn upcoming_slots(
    store: &dyn Store,
    doctor_id: &str,
    from: NaiveDate,
    days: u32,
) -> anyhow::Result<Vec<DaySlot>> {
    let windows = store.availability_for_doctor(doctor_id)?;
    let mut result = vec![];

    for date in from.iter_days().take(days as usize) {
        let matching: Vec<&AvailabilityWindow> = windows.iter().filter(|w| w.applies_to(&date)).collect();
        if matching.is_empty() {
            continue;
        }
        let booked: HashSet<NaiveTime> = store.booked_times(doctor_id, &date)?.into_iter().collect();
        let day_name = weekday_name(day_index(&date));
        result.extend(open_slots(matching, &booked).into_iter().map(|t| DaySlot {
            date,
            day_name,
            slot_time: format_time(&t),
        }));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{contract, init_db, SqliteStore};

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn window(day: u8, start: &str, end: &str) -> AvailabilityWindow {
        AvailabilityWindow::new("d1", day, t(start), t(end)).unwrap()
    }

    fn fmt(slots: &[NaiveTime]) -> Vec<String> {
        slots.iter().map(format_time).collect()
    }

    fn store_with(windows: &[AvailabilityWindow]) -> SqliteStore {
        let store = SqliteStore::new(init_db(":memory:").unwrap());
        store.insert_patient(&contract::patient("p1", "p1@example.com")).unwrap();
        store.insert_doctor(&contract::doctor("d1", "d1@example.com")).unwrap();
        for w in windows {
            store.insert_availability(w).unwrap();
        }
        store
    }

    #[test]
    fn test_full_day_yields_sixteen_slots() {
        let windows = [window(0, "09:00", "17:00")];
        let slots = open_slots(&windows, &HashSet::new());
        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0], t("09:00"));
        assert_eq!(slots[15], t("16:30"));
        assert!(!slots.contains(&t("17:00")));
    }

    #[test]
    fn test_no_partial_trailing_slot() {
        let windows = [window(0, "09:00", "10:15")];
        assert_eq!(fmt(&open_slots(&windows, &HashSet::new())), vec!["09:00", "09:30"]);
    }

    #[test]
    fn test_window_shorter_than_slot_is_empty() {
        let windows = [window(0, "09:00", "09:20")];
        assert!(open_slots(&windows, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_booked_times_are_skipped() {
        let windows = [window(0, "09:00", "11:00")];
        let booked = HashSet::from([t("09:30")]);
        assert_eq!(fmt(&open_slots(&windows, &booked)), vec!["09:00", "10:00", "10:30"]);
    }

    #[test]
    fn test_split_day_leaves_gap() {
        let windows = [window(0, "09:00", "12:00"), window(0, "13:00", "17:00")];
        let slots = fmt(&open_slots(&windows, &HashSet::new()));
        assert_eq!(slots.len(), 6 + 8);
        assert!(slots.contains(&"11:30".to_string()));
        assert!(!slots.contains(&"12:00".to_string()));
        assert!(!slots.contains(&"12:30".to_string()));
        assert_eq!(slots[6], "13:00");
    }

    #[test]
    fn test_overlapping_windows_are_not_deduplicated() {
        let windows = [window(0, "09:00", "10:00"), window(0, "09:30", "10:30")];
        assert_eq!(
            fmt(&open_slots(&windows, &HashSet::new())),
            vec!["09:00", "09:30", "09:30", "10:00"]
        );
    }

    #[test]
    fn test_window_ending_at_midnight_does_not_loop() {
        let windows = [window(6, "23:00", "23:59")];
        assert_eq!(fmt(&open_slots(&windows, &HashSet::new())), vec!["23:00"]);
    }

    #[test]
    fn test_available_slots_matches_weekday_only() {
        let store = store_with(&[window(0, "09:00", "17:00")]);
        // 2025-06-16 is a Monday, 2025-06-17 a Tuesday
        assert_eq!(available_slots(&store, "d1", &d("2025-06-16")).unwrap().len(), 16);
        assert!(available_slots(&store, "d1", &d("2025-06-17")).unwrap().is_empty());
        assert!(available_slots(&store, "nobody", &d("2025-06-16")).unwrap().is_empty());
    }

    #[test]
    fn test_inactive_windows_are_ignored() {
        let mut inactive = window(0, "09:00", "17:00");
        inactive.is_available = false;
        let store = store_with(&[inactive]);
        assert!(available_slots(&store, "d1", &d("2025-06-16")).unwrap().is_empty());
    }

    #[test]
    fn test_only_booked_status_blocks() {
        let store = store_with(&[window(0, "09:00", "10:00")]);
        store
            .insert_appointment_if_free(&contract::appointment("a1", "d1", "2025-06-16", "09:00"))
            .unwrap();
        assert_eq!(fmt(&available_slots(&store, "d1", &d("2025-06-16")).unwrap()), vec!["09:30"]);

        store
            .update_appointment_status("a1", crate::models::AppointmentStatus::Completed)
            .unwrap();
        assert_eq!(
            fmt(&available_slots(&store, "d1", &d("2025-06-16")).unwrap()),
            vec!["09:00", "09:30"]
        );
    }

    #[test]
    fn test_offers_slot() {
        let windows = [window(0, "09:00", "12:00")];
        let monday = d("2025-06-16");
        assert!(offers_slot(&windows, &monday, &t("11:30")));
        assert!(!offers_slot(&windows, &monday, &t("12:00")));
        assert!(!offers_slot(&windows, &monday, &t("09:15")));
        assert!(!offers_slot(&windows, &d("2025-06-17"), &t("09:00")));
    }

    #[test]
    fn test_upcoming_slots_spans_horizon() {
        let store = store_with(&[window(0, "09:00", "10:00"), window(2, "14:00", "15:00")]);
        store
            .insert_appointment_if_free(&contract::appointment("a1", "d1", "2025-06-18", "14:00"))
            .unwrap();

        // Sunday 2025-06-15 through Saturday 2025-06-21
        let slots = upcoming_slots(&store, "d1", d("2025-06-15"), 7).unwrap();
        let flat: Vec<(String, &str, String)> = slots
            .iter()
            .map(|s| (s.date.to_string(), s.day_name, s.slot_time.clone()))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("2025-06-16".to_string(), "Monday", "09:00".to_string()),
                ("2025-06-16".to_string(), "Monday", "09:30".to_string()),
                ("2025-06-18".to_string(), "Wednesday", "14:30".to_string()),
            ]
        );
    }

    #[test]
    fn test_upcoming_slots_zero_days() {
        let store = store_with(&[window(0, "09:00", "10:00")]);
        assert!(upcoming_slots(&store, "d1", d("2025-06-16"), 0).unwrap().is_empty());
    }
}
