//! Schedule domain types.
//!
//! Two shapes flow through the system:
//!
//! - [`DateSchedule`] — what the model produces: calendar dates
//!   (`M/D/YYYY`) mapped to ordered task lists. Key order follows the model's
//!   output.
//! - [`WeekdaySchedule`] — what gets stored: the seven lowercase weekday
//!   names mapped to task lists.
//!
//! Times and dates keep their original text so a validated schedule
//! serializes back to exactly what the model wrote.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use regex_lite::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Lowercase weekday names, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0?[1-9]|1[0-2]):([0-5][0-9]) (AM|PM)$").expect("time pattern is valid")
});

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0?[1-9]|1[0-2])/(0?[1-9]|[12][0-9]|3[01])/([0-9]{4})$")
        .expect("date pattern is valid")
});

/// Lowercase name of a weekday (`Weekday::Mon` → `"monday"`).
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}

/// Parse a full weekday name, ignoring case.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name.trim()))
        .map(|i| WEEKDAYS[i])
}

// ── Time ──────────────────────────────────────────────────────────────────

/// A 12-hour wall-clock time such as `"9:00 AM"` or `"04:30 PM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleTime {
    raw: String,
    time: NaiveTime,
}

impl ScheduleTime {
    /// Parse `H:MM AM|PM` (hour 1–12, optional leading zero, uppercase
    /// meridiem). Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = TIME_PATTERN.captures(s)?;
        let hour12: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let hour = match (&caps[3], hour12) {
            ("AM", 12) => 0,
            ("AM", h) => h,
            ("PM", 12) => 12,
            (_, h) => h + 12,
        };
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(Self {
            raw: s.to_string(),
            time,
        })
    }

    /// The text exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed 24-hour time, used for ordering.
    pub fn time(&self) -> NaiveTime {
        self.time
    }
}

impl TryFrom<String> for ScheduleTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid time '{value}', expected HH:MM AM/PM"))
    }
}

impl From<ScheduleTime> for String {
    fn from(value: ScheduleTime) -> Self {
        value.raw
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Date ──────────────────────────────────────────────────────────────────

/// A calendar date key such as `"7/14/2025"` or `"07/04/2025"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDate {
    raw: String,
    date: NaiveDate,
}

impl ScheduleDate {
    /// Whether `s` has the `[M]M/[D]D/YYYY` shape (without checking that
    /// the day exists in that month).
    pub fn matches_pattern(s: &str) -> bool {
        DATE_PATTERN.is_match(s)
    }

    /// Parse a date key, zero-padded or not. Returns `None` when the shape
    /// is wrong or the day does not exist (e.g. `2/30/2025`).
    pub fn parse(s: &str) -> Option<Self> {
        let caps = DATE_PATTERN.captures(s)?;
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self {
            raw: s.to_string(),
            date,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

impl fmt::Display for ScheduleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Recurrence ────────────────────────────────────────────────────────────

/// How often a task repeats.
///
/// The accepted vocabulary is `daily`, `weekly`, `monthly`, `none` (any
/// case), or one or more full weekday names separated by commas
/// (`"Monday, Wednesday"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
    None,
    Weekdays(Vec<Weekday>),
}

impl Recurrence {
    /// Parse a recurrence value. Returns `None` for anything outside the
    /// accepted vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "daily" => return Some(Self::Daily),
            "weekly" => return Some(Self::Weekly),
            "monthly" => return Some(Self::Monthly),
            "none" => return Some(Self::None),
            _ => {}
        }

        let days = trimmed
            .split(',')
            .map(parse_weekday)
            .collect::<Option<Vec<_>>>()?;
        if days.is_empty() {
            return None;
        }
        Some(Self::Weekdays(days))
    }

    /// The storage form of a raw recurrence value: keywords lowercased,
    /// weekday names kept exactly as written, anything unrecognised → `none`.
    pub fn canonical(raw: &str) -> String {
        match Self::parse(raw) {
            Some(Self::Weekdays(_)) => raw.trim().to_string(),
            Some(other) => other.keyword().unwrap_or("none").to_string(),
            None => "none".to_string(),
        }
    }

    /// The lowercase keyword for non-weekday variants.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Daily => Some("daily"),
            Self::Weekly => Some("weekly"),
            Self::Monthly => Some("monthly"),
            Self::None => Some("none"),
            Self::Weekdays(_) => None,
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────

/// One scheduled activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_name: String,
    pub start_time: ScheduleTime,
    pub end_time: ScheduleTime,
    pub priority: bool,
    pub recurrence: String,
}

// ── DateSchedule ──────────────────────────────────────────────────────────

/// The tasks planned for one date key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDay {
    /// The date key as the model wrote it
    pub date: String,
    pub tasks: Vec<Task>,
}

/// A validated, date-keyed schedule. Days keep the order they appeared in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSchedule {
    days: Vec<ScheduledDay>,
}

impl DateSchedule {
    pub fn new(days: Vec<ScheduledDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[ScheduledDay] {
        &self.days
    }

    /// Tasks for an exact date key.
    pub fn get(&self, date: &str) -> Option<&[Task]> {
        self.days
            .iter()
            .find(|d| d.date == date)
            .map(|d| d.tasks.as_slice())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_tasks(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum()
    }
}

impl Serialize for DateSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for day in &self.days {
            map.serialize_entry(&day.date, &day.tasks)?;
        }
        map.end()
    }
}

// ── WeekdaySchedule ───────────────────────────────────────────────────────

/// The storage-facing schedule: one (possibly empty) task list per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySchedule {
    #[serde(default)]
    pub monday: Vec<Task>,
    #[serde(default)]
    pub tuesday: Vec<Task>,
    #[serde(default)]
    pub wednesday: Vec<Task>,
    #[serde(default)]
    pub thursday: Vec<Task>,
    #[serde(default)]
    pub friday: Vec<Task>,
    #[serde(default)]
    pub saturday: Vec<Task>,
    #[serde(default)]
    pub sunday: Vec<Task>,
}

impl WeekdaySchedule {
    pub fn get(&self, day: Weekday) -> &[Task] {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// Replace the task list for `day`.
    pub fn set(&mut self, day: Weekday, tasks: Vec<Task>) {
        let slot = match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = tasks;
    }

    /// `(name, tasks)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[Task])> {
        WEEKDAYS.iter().map(|d| (weekday_name(*d), self.get(*d)))
    }

    pub fn total_tasks(&self) -> usize {
        self.iter().map(|(_, tasks)| tasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str, start: &str, end: &str) -> Task {
        Task {
            task_name: name.into(),
            start_time: ScheduleTime::parse(start).unwrap(),
            end_time: ScheduleTime::parse(end).unwrap(),
            priority: false,
            recurrence: "none".into(),
        }
    }

    #[test]
    fn time_accepts_padded_and_unpadded_hours() {
        assert_eq!(
            ScheduleTime::parse("09:00 AM").unwrap().time(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            ScheduleTime::parse("9:05 PM").unwrap().time(),
            NaiveTime::from_hms_opt(21, 5, 0).unwrap()
        );
    }

    #[test]
    fn time_handles_noon_and_midnight() {
        assert_eq!(
            ScheduleTime::parse("12:00 AM").unwrap().time(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            ScheduleTime::parse("12:30 PM").unwrap().time(),
            NaiveTime::from_hms_opt(12, 30, 0).unwrap()
        );
    }

    #[test]
    fn time_rejects_bad_shapes() {
        for bad in [
            "25:00 AM", "13:00 PM", "0:30 AM", "9:5 AM", "09:00", "09:00 am", "9:00AM", " 9:00 AM",
        ] {
            assert!(ScheduleTime::parse(bad).is_none(), "{bad} should be rejected");
        }
    }

    #[test]
    fn time_serializes_as_written() {
        let t = ScheduleTime::parse("07:15 AM").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:15 AM\"");
        let back: ScheduleTime = serde_json::from_str("\"07:15 AM\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<ScheduleTime>("\"7.15\"").is_err());
    }

    #[test]
    fn date_parses_both_paddings() {
        let a = ScheduleDate::parse("7/14/2025").unwrap();
        let b = ScheduleDate::parse("07/14/2025").unwrap();
        assert_eq!(a.date(), b.date());
        assert_eq!(a.weekday(), Weekday::Mon);
        assert_eq!(b.as_str(), "07/14/2025");
    }

    #[test]
    fn date_pattern_vs_calendar() {
        assert!(ScheduleDate::matches_pattern("2/30/2025"));
        assert!(ScheduleDate::parse("2/30/2025").is_none());
        assert!(!ScheduleDate::matches_pattern("Monday"));
        assert!(!ScheduleDate::matches_pattern("2025-07-14"));
        assert!(!ScheduleDate::matches_pattern("13/01/2025"));
    }

    #[test]
    fn recurrence_keywords_any_case() {
        assert_eq!(Recurrence::parse("DAILY"), Some(Recurrence::Daily));
        assert_eq!(Recurrence::parse("Monthly"), Some(Recurrence::Monthly));
        assert_eq!(Recurrence::parse("none"), Some(Recurrence::None));
    }

    #[test]
    fn recurrence_weekday_lists() {
        assert_eq!(
            Recurrence::parse("Monday, Wednesday"),
            Some(Recurrence::Weekdays(vec![Weekday::Mon, Weekday::Wed]))
        );
        assert_eq!(
            Recurrence::parse("friday"),
            Some(Recurrence::Weekdays(vec![Weekday::Fri]))
        );
        assert!(Recurrence::parse("every other day").is_none());
        assert!(Recurrence::parse("Monday,").is_none());
        assert!(Recurrence::parse("").is_none());
    }

    #[test]
    fn recurrence_canonical_form() {
        assert_eq!(Recurrence::canonical("DAILY"), "daily");
        assert_eq!(Recurrence::canonical("Tuesday"), "Tuesday");
        assert_eq!(Recurrence::canonical("Monday, Friday"), "Monday, Friday");
        assert_eq!(Recurrence::canonical("biweekly"), "none");
    }

    #[test]
    fn date_schedule_serializes_in_key_order() {
        let schedule = DateSchedule::new(vec![
            ScheduledDay {
                date: "7/15/2025".into(),
                tasks: vec![task("Gym", "07:00 AM", "08:00 AM")],
            },
            ScheduledDay {
                date: "7/14/2025".into(),
                tasks: vec![task("Math", "09:00 AM", "10:00 AM")],
            },
        ]);
        let json = serde_json::to_string(&schedule).unwrap();
        assert!(json.find("7/15/2025").unwrap() < json.find("7/14/2025").unwrap());
        assert!(json.contains("\"start_time\":\"07:00 AM\""));
        assert_eq!(schedule.get("7/14/2025").unwrap()[0].task_name, "Math");
        assert_eq!(schedule.total_tasks(), 2);
    }

    #[test]
    fn weekday_schedule_has_all_seven_keys() {
        let mut week = WeekdaySchedule::default();
        week.set(Weekday::Wed, vec![task("Essay", "02:00 PM", "04:00 PM")]);
        let value = serde_json::to_value(&week).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        for name in WEEKDAY_NAMES {
            assert!(obj.contains_key(name));
        }
        assert_eq!(week.get(Weekday::Wed).len(), 1);
        assert_eq!(week.total_tasks(), 1);
    }

    #[test]
    fn weekday_schedule_tolerates_missing_days() {
        let week: WeekdaySchedule = serde_json::from_str(r#"{"friday": []}"#).unwrap();
        assert_eq!(week, WeekdaySchedule::default());
    }
}
