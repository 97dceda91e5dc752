//! Projection of a date-keyed schedule onto weekdays.

use plansmith_core::schedule::{
    DateSchedule, Recurrence, ScheduleDate, Task, WeekdaySchedule, weekday_name,
};
use tracing::{debug, warn};

/// Convert a validated [`DateSchedule`] into the storage-facing
/// [`WeekdaySchedule`].
///
/// Each date's tasks replace whatever its weekday held before, so when two
/// dates fall on the same weekday the later key wins. Dates that fail to
/// parse are logged and skipped. Recurrence values are rewritten with
/// [`Recurrence::canonical`].
pub fn normalize(schedule: &DateSchedule) -> WeekdaySchedule {
    let mut weekly = WeekdaySchedule::default();

    for day in schedule.days() {
        let Some(date) = ScheduleDate::parse(&day.date) else {
            warn!(date = %day.date, "Could not parse date, skipping");
            continue;
        };

        let weekday = date.weekday();
        if !weekly.get(weekday).is_empty() {
            warn!(
                date = %day.date,
                weekday = weekday_name(weekday),
                "Date falls on an already scheduled weekday, replacing its tasks"
            );
        }

        let tasks: Vec<Task> = day
            .tasks
            .iter()
            .map(|task| Task {
                recurrence: Recurrence::canonical(&task.recurrence),
                ..task.clone()
            })
            .collect();

        debug!(
            date = %day.date,
            weekday = weekday_name(weekday),
            tasks = tasks.len(),
            "Mapped date to weekday"
        );
        weekly.set(weekday, tasks);
    }

    weekly
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use plansmith_core::schedule::{ScheduleTime, ScheduledDay};

    fn task(name: &str, recurrence: &str) -> Task {
        Task {
            task_name: name.into(),
            start_time: ScheduleTime::parse("09:00 AM").unwrap(),
            end_time: ScheduleTime::parse("10:00 AM").unwrap(),
            priority: true,
            recurrence: recurrence.into(),
        }
    }

    fn day(date: &str, tasks: Vec<Task>) -> ScheduledDay {
        ScheduledDay {
            date: date.into(),
            tasks,
        }
    }

    #[test]
    fn maps_date_to_weekday_and_lowercases_recurrence() {
        let schedule = DateSchedule::new(vec![day("7/14/2025", vec![task("Math", "DAILY")])]);
        let weekly = normalize(&schedule);

        assert_eq!(weekly.monday.len(), 1);
        let expected = Task {
            recurrence: "daily".into(),
            ..task("Math", "DAILY")
        };
        assert_eq!(weekly.monday[0], expected);
        assert_eq!(weekly.total_tasks(), 1);
    }

    #[test]
    fn padded_dates_are_accepted() {
        let schedule = DateSchedule::new(vec![day("07/04/2025", vec![task("Fireworks", "none")])]);
        assert_eq!(normalize(&schedule).get(Weekday::Fri).len(), 1);
    }

    #[test]
    fn weekday_recurrence_is_kept_and_unknown_becomes_none() {
        let schedule = DateSchedule::new(vec![day(
            "7/15/2025",
            vec![task("A", "Monday"), task("B", "Monday, Thursday"), task("C", "fortnightly")],
        )]);
        let weekly = normalize(&schedule);
        let recurrences: Vec<&str> = weekly.tuesday.iter().map(|t| t.recurrence.as_str()).collect();
        assert_eq!(recurrences, vec!["Monday", "Monday, Thursday", "none"]);
    }

    #[test]
    fn colliding_weekdays_overwrite_with_later_key() {
        // 7/14 and 7/21/2025 are both Mondays.
        let schedule = DateSchedule::new(vec![
            day("7/14/2025", vec![task("First", "none"), task("Second", "none")]),
            day("7/21/2025", vec![task("Replacement", "none")]),
        ]);
        let weekly = normalize(&schedule);

        assert_eq!(weekly.monday.len(), 1);
        assert_eq!(weekly.monday[0].task_name, "Replacement");
    }

    #[test]
    fn unparseable_dates_are_skipped() {
        let schedule = DateSchedule::new(vec![
            day("Someday", vec![task("Lost", "none")]),
            day("7/16/2025", vec![task("Kept", "weekly")]),
        ]);
        let weekly = normalize(&schedule);

        assert_eq!(weekly.total_tasks(), 1);
        assert_eq!(weekly.wednesday[0].task_name, "Kept");
    }

    #[test]
    fn output_has_all_seven_weekday_keys() {
        let schedule = DateSchedule::new(vec![day("7/19/2025", vec![task("Game", "none")])]);
        let weekly = normalize(&schedule);
        let value = serde_json::to_value(&weekly).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"]
        );
        assert_eq!(value["saturday"][0]["task_name"], "Game");
    }
}
