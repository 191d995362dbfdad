//! Weekly availability published by a doctor.
//!
//! # Invariants
//! - Times per day are sorted and unique.
//! - Persisted as `{"Monday": ["09:00", "11:00"], ...}`; days without
//!   slots are omitted.

use crate::model::validation::{parse_time, ValidationError, ValidationResult, TIME_FORMAT};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Day name to `HH:MM` strings, as accepted from callers and stored on disk.
pub type RawSchedule = BTreeMap<String, Vec<String>>;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule", into = "RawSchedule")]
pub struct WeeklySchedule {
    // Indexed by `Weekday::num_days_from_monday`.
    days: [Vec<NaiveTime>; 7],
}

impl WeeklySchedule {
    /// Parses day names (`Mon`, `monday`, ...) and `HH:MM` times.
    pub fn parse(raw: &RawSchedule) -> ValidationResult<Self> {
        let mut schedule = Self::default();
        for (day, times) in raw {
            let weekday = parse_weekday(day)?;
            let slots = &mut schedule.days[slot(weekday)];
            for time in times {
                slots.push(parse_time("schedule", time)?);
            }
        }
        for slots in &mut schedule.days {
            slots.sort();
            slots.dedup();
        }
        Ok(schedule)
    }

    pub fn times_on(&self, day: Weekday) -> &[NaiveTime] {
        &self.days[slot(day)]
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Whether `at` falls exactly on a published slot.
    pub fn offers(&self, at: NaiveDateTime) -> bool {
        self.times_on(at.weekday()).contains(&at.time())
    }

    /// Days with at least one slot, Monday first.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[NaiveTime])> + '_ {
        WEEK.into_iter()
            .map(move |day| (day, self.times_on(day)))
            .filter(|(_, times)| !times.is_empty())
    }
}

impl TryFrom<RawSchedule> for WeeklySchedule {
    type Error = ValidationError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<WeeklySchedule> for RawSchedule {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule
            .days()
            .map(|(day, times)| {
                let times = times
                    .iter()
                    .map(|time| time.format(TIME_FORMAT).to_string())
                    .collect();
                (day_name(day).to_string(), times)
            })
            .collect()
    }
}

fn slot(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

fn parse_weekday(value: &str) -> ValidationResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| ValidationError::UnsupportedValue {
            field: "schedule",
            value: value.to_string(),
            expected: "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday",
        })
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::{RawSchedule, WeeklySchedule};
    use chrono::{NaiveDate, Weekday};

    fn raw(entries: &[(&str, &[&str])]) -> RawSchedule {
        entries
            .iter()
            .map(|(day, times)| {
                (
                    day.to_string(),
                    times.iter().map(|time| time.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn parse_sorts_dedups_and_merges_day_spellings() {
        let schedule = WeeklySchedule::parse(&raw(&[
            ("monday", &["14:00", "09:00"]),
            ("Mon", &["09:00"]),
        ]))
        .unwrap();
        let times = schedule
            .times_on(Weekday::Mon)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(times, vec!["09:00:00", "14:00:00"]);
        assert!(schedule.times_on(Weekday::Tue).is_empty());
    }

    #[test]
    fn parse_rejects_unknown_days_and_bad_times() {
        assert_eq!(
            WeeklySchedule::parse(&raw(&[("Someday", &["09:00"])]))
                .unwrap_err()
                .field(),
            "schedule"
        );
        assert!(WeeklySchedule::parse(&raw(&[("Tue", &["9am"])])).is_err());
    }

    #[test]
    fn serializes_as_day_name_map() {
        let schedule = WeeklySchedule::parse(&raw(&[("tue", &["10:00"]), ("Fri", &["15:30"])])).unwrap();
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Friday": ["15:30"], "Tuesday": ["10:00"]})
        );
        let decoded: WeeklySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, schedule);
    }

    #[test]
    fn offers_matches_exact_slots() {
        let schedule = WeeklySchedule::parse(&raw(&[("Wednesday", &["11:00"])])).unwrap();
        // 2030-01-02 is a Wednesday.
        let date = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        assert!(schedule.offers(date.and_hms_opt(11, 0, 0).unwrap()));
        assert!(!schedule.offers(date.and_hms_opt(11, 30, 0).unwrap()));
        assert!(WeeklySchedule::default().is_empty());
    }
}
