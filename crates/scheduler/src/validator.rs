//! Schedule validation.
//!
//! Three stages:
//!
//! 1. **Parse**: the text must be JSON with an object at the top level.
//!    Failure here stops immediately with a single violation.
//! 2. **Schema**: date keys, non-empty task lists, and every task field.
//! 3. **Temporal**: per date, tasks sorted by start time must not overlap.
//!
//! Stages 2 and 3 accumulate every violation they find. A schedule is
//! returned only when none were found.

use std::fmt;

use plansmith_core::schedule::{
    DateSchedule, Recurrence, ScheduleDate, ScheduleTime, ScheduledDay, Task,
};
use serde_json::{Map, Value};

/// Which contract a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Not JSON, or not a JSON object
    MalformedOutput,
    /// A key, list, or task field breaks the schedule contract
    SchemaViolation,
    /// Two tasks on the same date overlap
    OverlapViolation,
}

/// One contract breach, with a message meant for the model to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::MalformedOutput,
            message: message.into(),
        }
    }

    fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::SchemaViolation,
            message: message.into(),
        }
    }

    fn overlap(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::OverlapViolation,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The ordered list of violations from one validation run. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.0.iter().filter(|v| v.kind == kind).count()
    }

    /// Corrective feedback for the next prompt.
    pub fn feedback(&self) -> String {
        let mut out =
            String::from("The schedule format is incorrect. Please fix the following issues:\n");
        for (i, violation) in self.0.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, violation.message));
        }
        out.push_str(
            "\nPlease ensure the output follows the exact format specified in the prompt.",
        );
        out
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|v| v.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate raw model output against the schedule contract.
pub fn validate(raw: &str) -> Result<DateSchedule, ValidationErrors> {
    let object = parse_object(raw).map_err(|v| ValidationErrors(vec![v]))?;

    let mut violations = Vec::new();
    let days = check_schema(&object, &mut violations);

    for day in &days {
        check_overlaps(day, &mut violations);
    }

    if violations.is_empty() {
        Ok(DateSchedule::new(days))
    } else {
        Err(ValidationErrors(violations))
    }
}

// ── Stage 1 ──────────────────────────────────────────────────────────────

fn parse_object(raw: &str) -> Result<Map<String, Value>, Violation> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| Violation::malformed(format!("Invalid JSON format: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Violation::malformed(format!(
            "Schedule must be a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Stage 2 ──────────────────────────────────────────────────────────────

/// Check keys and tasks. Returns the days whose keys are valid, holding the
/// tasks that passed every field check, for the overlap stage.
fn check_schema(
    object: &Map<String, Value>,
    violations: &mut Vec<Violation>,
) -> Vec<ScheduledDay> {
    if object.is_empty() {
        violations.push(Violation::schema("Schedule cannot be empty"));
        return Vec::new();
    }

    let mut days = Vec::with_capacity(object.len());

    for (date, value) in object {
        let date_ok = if !ScheduleDate::matches_pattern(date) {
            violations.push(Violation::schema(format!(
                "Invalid date format: '{date}'. Date keys must be MM/DD/YYYY, not weekday names"
            )));
            false
        } else if ScheduleDate::parse(date).is_none() {
            violations.push(Violation::schema(format!(
                "Invalid calendar date: '{date}' does not exist"
            )));
            false
        } else {
            true
        };

        let Value::Array(items) = value else {
            violations.push(Violation::schema(format!(
                "Tasks for {date} must be a list, got {}",
                json_type(value)
            )));
            continue;
        };

        if items.is_empty() {
            violations.push(Violation::schema(format!("No tasks found for date: {date}")));
            continue;
        }

        let tasks: Vec<Task> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| check_task(date, i + 1, item, violations))
            .collect();

        if date_ok {
            days.push(ScheduledDay {
                date: date.clone(),
                tasks,
            });
        }
    }

    days
}

fn check_task(
    date: &str,
    position: usize,
    item: &Value,
    violations: &mut Vec<Violation>,
) -> Option<Task> {
    let Value::Object(fields) = item else {
        violations.push(Violation::schema(format!(
            "{date} task {position}: must be an object, got {}",
            json_type(item)
        )));
        return None;
    };

    let before = violations.len();

    let task_name = match fields.get("task_name") {
        Some(Value::String(name)) if !name.trim().is_empty() => Some(name.trim().to_string()),
        Some(Value::String(_)) => {
            violations.push(Violation::schema(format!(
                "{date} task {position}: task_name cannot be empty or whitespace only"
            )));
            None
        }
        other => {
            violations.push(field_type_violation(
                date,
                position,
                "task_name",
                "a string",
                other,
            ));
            None
        }
    };

    // Name the task in later messages when we can.
    let label = match &task_name {
        Some(name) => format!("{date} task {position} ('{name}')"),
        None => format!("{date} task {position}"),
    };

    let start_time = check_time(&label, "start_time", fields.get("start_time"), violations);
    let end_time = check_time(&label, "end_time", fields.get("end_time"), violations);

    let priority = match fields.get("priority") {
        Some(Value::Bool(b)) => Some(*b),
        other => {
            violations.push(labeled_type_violation(&label, "priority", "a boolean", other));
            None
        }
    };

    let recurrence = match fields.get("recurrence") {
        Some(Value::String(r)) if Recurrence::parse(r).is_some() => Some(r.clone()),
        Some(Value::String(r)) => {
            violations.push(Violation::schema(format!(
                "{label}: invalid recurrence '{r}'. \
                 Must be \"daily\", \"weekly\", \"monthly\", \"none\", or weekday names"
            )));
            None
        }
        other => {
            violations.push(labeled_type_violation(&label, "recurrence", "a string", other));
            None
        }
    };

    if let (Some(start), Some(end)) = (&start_time, &end_time) {
        if end.time() <= start.time() {
            violations.push(Violation::schema(format!(
                "{label}: end_time {end} must be after start_time {start}"
            )));
        }
    }

    if violations.len() > before {
        return None;
    }

    Some(Task {
        task_name: task_name?,
        start_time: start_time?,
        end_time: end_time?,
        priority: priority?,
        recurrence: recurrence?,
    })
}

fn check_time(
    label: &str,
    field: &str,
    value: Option<&Value>,
    violations: &mut Vec<Violation>,
) -> Option<ScheduleTime> {
    match value {
        Some(Value::String(s)) => {
            let parsed = ScheduleTime::parse(s);
            if parsed.is_none() {
                violations.push(Violation::schema(format!(
                    "{label}: invalid {field} '{s}'. Must be in HH:MM AM/PM format"
                )));
            }
            parsed
        }
        other => {
            violations.push(labeled_type_violation(label, field, "a string", other));
            None
        }
    }
}

fn field_type_violation(
    date: &str,
    position: usize,
    field: &str,
    expected: &str,
    found: Option<&Value>,
) -> Violation {
    labeled_type_violation(&format!("{date} task {position}"), field, expected, found)
}

fn labeled_type_violation(
    label: &str,
    field: &str,
    expected: &str,
    found: Option<&Value>,
) -> Violation {
    match found {
        None => Violation::schema(format!("{label}: missing field '{field}'")),
        Some(value) => Violation::schema(format!(
            "{label}: {field} must be {expected}, got {}",
            json_type(value)
        )),
    }
}

// ── Stage 3 ──────────────────────────────────────────────────────────────

fn check_overlaps(day: &ScheduledDay, violations: &mut Vec<Violation>) {
    let mut sorted: Vec<&Task> = day.tasks.iter().collect();
    sorted.sort_by_key(|t| t.start_time.time());

    for pair in sorted.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        if earlier.end_time.time() > later.start_time.time() {
            violations.push(Violation::overlap(format!(
                "Task overlap detected on {}: '{}' ends at {} and '{}' starts at {}",
                day.date, earlier.task_name, earlier.end_time, later.task_name, later.start_time
            )));
        }
    }
}
