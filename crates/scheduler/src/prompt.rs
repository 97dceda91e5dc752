//! Prompt composition.
//!
//! [`compose`] is a pure function: the clock is an argument, so the same
//! request, context, feedback, and timestamp always produce the same text.

use chrono::NaiveDateTime;

const ROLE: &str = "\
You are a planning assistant that turns a person's goals, classes, \
appointments, and chores into a realistic, structured schedule. Schedule \
high-priority and deadline-bound work first, respect fixed commitments such \
as classes and appointments, leave breaks between sessions, and never let two \
tasks overlap on the same day.";

const FORMAT: &str = r#"OUTPUT FORMAT:
Return a single JSON object. Each key is a calendar date written as M/D/YYYY
(for example "7/13/2025" or "12/25/2025"). Each value is a non-empty list of
task objects with exactly these fields:
- task_name: string, not empty
- start_time: string formatted as "HH:MM AM/PM"
- end_time: string formatted as "HH:MM AM/PM", later than start_time
- priority: boolean, true for high-priority tasks
- recurrence: one of "daily", "weekly", "monthly", "none", or weekday names
  such as "Monday" or "Monday, Wednesday"

Example:
{
  "7/13/2025": [
    {"task_name": "Math Study", "start_time": "09:00 AM", "end_time": "10:00 AM",
     "priority": true, "recurrence": "weekly"},
    {"task_name": "Physics Review", "start_time": "10:15 AM", "end_time": "11:00 AM",
     "priority": false, "recurrence": "daily"}
  ],
  "7/14/2025": [
    {"task_name": "English Essay", "start_time": "02:00 PM", "end_time": "04:00 PM",
     "priority": true, "recurrence": "none"}
  ]
}

Never use weekday names as keys. {"Monday": [...]} is wrong; convert every
day reference to an actual date."#;

/// Build the full instruction text for one completion call.
///
/// `context` is embedded verbatim when non-empty. `prior_errors` is the
/// violation feedback from the previous attempt, or empty on the first.
pub fn compose(user_prompt: &str, context: &str, prior_errors: &str, now: NaiveDateTime) -> String {
    let today = now.format("%m/%d/%Y").to_string();
    let weekday = now.format("%A");
    let clock = now.format("%I:%M %p");

    let mut prompt = String::with_capacity(4096);
    prompt.push_str(ROLE);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "CURRENT DATE AND TIME:\n\
         - Today is {today} ({weekday})\n\
         - The time is {clock}\n\
         - Resolve relative dates from today: \"tomorrow\" is the next day, \
         \"next Friday\" is the next Friday after today, \"this Friday\" is this week's, \
         \"next week\" is 7 or more days out\n\
         - \"by <day>\" means the earliest slot before that deadline \
         and marks the task high priority\n\
         - Only use today or future dates\n\n"
    ));

    prompt.push_str(FORMAT);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "RULES:\n\
         1. Date keys are M/D/YYYY dates relative to today ({today}), never weekday names\n\
         2. Tasks on the same date must not overlap\n\
         3. Keep a single task on one day unless the request asks to split it\n\
         4. Use \"daily\" for every-day tasks, \"weekly\" for weekly ones, \
         \"monthly\" for monthly ones, \"none\" for one-off tasks\n\
         5. Make reasonable assumptions when the request is ambiguous\n\n"
    ));

    prompt.push_str("USER REQUEST:\n");
    prompt.push_str(user_prompt.trim());
    prompt.push_str("\n\n");

    if !context.trim().is_empty() {
        prompt.push_str("CONTEXT FROM THE USER'S DOCUMENTS:\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }

    if !prior_errors.trim().is_empty() {
        prompt.push_str("PREVIOUS ATTEMPT FAILED VALIDATION:\n");
        prompt.push_str(prior_errors);
        prompt.push_str("\n\nFix exactly these issues and return the corrected schedule.\n\n");
    }

    prompt.push_str("Respond with the schedule JSON object only.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn monday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 14)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    #[test]
    fn identical_inputs_give_identical_prompts() {
        let a = compose("Study for finals", "Exam on Friday", "1. overlap", monday_morning());
        let b = compose("Study for finals", "Exam on Friday", "1. overlap", monday_morning());
        assert_eq!(a, b);
    }

    #[test]
    fn injects_date_weekday_and_time() {
        let prompt = compose("Plan my week", "", "", monday_morning());
        assert!(prompt.contains("Today is 07/14/2025 (Monday)"));
        assert!(prompt.contains("The time is 09:05 AM"));
    }

    #[test]
    fn restates_output_contract() {
        let prompt = compose("Plan my week", "", "", monday_morning());
        for field in ["task_name", "start_time", "end_time", "priority", "recurrence"] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("HH:MM AM/PM"));
        assert!(prompt.contains("never weekday names"));
    }

    #[test]
    fn context_is_embedded_verbatim() {
        let context = "Chemistry lab Thursdays 1-3 PM\n\nPiano lesson Sunday";
        let prompt = compose("Plan my week", context, "", monday_morning());
        assert!(prompt.contains(&format!("CONTEXT FROM THE USER'S DOCUMENTS:\n{context}")));
    }

    #[test]
    fn empty_context_and_feedback_are_omitted() {
        let prompt = compose("Plan my week", "  ", "", monday_morning());
        assert!(!prompt.contains("CONTEXT FROM"));
        assert!(!prompt.contains("PREVIOUS ATTEMPT"));
    }

    #[test]
    fn feedback_is_appended_verbatim() {
        let feedback = "The schedule format is incorrect. Please fix the following issues:\n\
                        1. Task overlap detected";
        let prompt = compose("Plan my week", "", feedback, monday_morning());
        assert!(prompt.contains(feedback));
        assert!(prompt.contains("Fix exactly these issues"));
    }

    #[test]
    fn user_request_is_included() {
        let prompt = compose("  Soccer game on Saturday  ", "", "", monday_morning());
        assert!(prompt.contains("USER REQUEST:\nSoccer game on Saturday\n"));
    }
}
