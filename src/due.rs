//! Human-readable due dates, and overdue detection
//!
//! Every function here takes the reference "now" as a parameter, so that they can be used (and tested) with any clock and any time zone.

use std::error::Error;
use std::fmt::Display;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::task::{Due, DueKind, Task};

/// Format of the time-of-day part of human labels
const TIME_FORMAT: &str = "%H:%M";

/// Formats expected by the server for due dates
const FORM_DATE_FORMAT: &str = "%Y-%m-%d";
const FORM_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// The result of [`classify`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueStatus {
    pub label: String,
    pub overdue: bool,
}

/// What should be displayed next to a task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskDateLabel {
    /// The task is done, this is when it was completed
    Done { label: String },
    /// The task is not done yet, and has a due date
    Due { kind: DueKind, label: String, overdue: bool },
}

impl TaskDateLabel {
    pub fn label(&self) -> &str {
        match self {
            TaskDateLabel::Done { label } => label,
            TaskDateLabel::Due { label, .. } => label,
        }
    }

    pub fn is_overdue(&self) -> bool {
        match self {
            TaskDateLabel::Done { .. } => false,
            TaskDateLabel::Due { overdue, .. } => *overdue,
        }
    }
}

/// Classify a due date relative to `now`
pub fn classify<Tz: TimeZone>(when: &DateTime<Tz>, all_day: bool, now: &DateTime<Tz>) -> DueStatus
where
    Tz::Offset: Display,
{
    DueStatus {
        label: human_label(when, all_day, now),
        overdue: is_overdue(when, all_day, now),
    }
}

/// Whether a due date has passed.
///
/// All-day dates are only compared by calendar day: something due today is not overdue before tomorrow.
pub fn is_overdue<Tz: TimeZone>(when: &DateTime<Tz>, all_day: bool, now: &DateTime<Tz>) -> bool {
    if all_day {
        when.date_naive() < now.date_naive()
    } else {
        when < now
    }
}

/// A short label, relative to `now` (e.g. `Today`, `Tomorrow, 14:00` or `March 3, 2023`)
///
/// When `ignore_time` is set (e.g. for all-day dates), the time of day is never shown.
pub fn human_label<Tz: TimeZone>(when: &DateTime<Tz>, ignore_time: bool, now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let day = when.date_naive();
    let today = now.date_naive();
    let time = when.format(TIME_FORMAT).to_string();

    let relative = if day == today {
        Some("Today")
    } else if Some(day) == today.pred_opt() {
        Some("Yesterday")
    } else if Some(day) == today.succ_opt() {
        Some("Tomorrow")
    } else {
        None
    };

    match (relative, ignore_time) {
        (Some(name), true) => name.to_string(),
        // Timed dates of today only show the time
        (Some("Today"), false) => time,
        (Some(name), false) => format!("{}, {}", name, time),
        (None, _) => {
            let mut label = calendar_label(day, today);
            if ignore_time == false {
                label.push_str(", ");
                label.push_str(&time);
            }
            label
        },
    }
}

/// Month and day, plus the year if this is not the current year
fn calendar_label(day: NaiveDate, today: NaiveDate) -> String {
    if day.year() == today.year() {
        day.format("%B %-d").to_string()
    } else {
        day.format("%B %-d, %Y").to_string()
    }
}

/// The label to display next to a task, if any.
///
/// Done tasks display their completion date and are never checked for being overdue.
pub fn task_date_label(task: &Task, now: &DateTime<Local>) -> Option<TaskDateLabel> {
    if task.is_done() {
        let label = match task.done_on() {
            Some(done_on) => human_label(done_on, false, now),
            None => String::from("N/A"),
        };
        return Some(TaskDateLabel::Done { label });
    }

    task.due().map(|due| {
        let status = classify(due.when(), due.is_all_day(), now);
        TaskDateLabel::Due {
            kind: due.kind(),
            label: status.label,
            overdue: status.overdue,
        }
    })
}

/// A complete local date and time, e.g. for creation dates
pub fn format_timestamp(timestamp: Option<&DateTime<Local>>) -> String {
    match timestamp {
        None => String::from("N/A"),
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Format a due date the way the server expects it in requests
pub fn format_form_date(due: &Due) -> String {
    if due.is_all_day() {
        due.when().format(FORM_DATE_FORMAT).to_string()
    } else {
        due.when().format(FORM_DATE_TIME_FORMAT).to_string()
    }
}

/// Parse a user-provided date.
///
/// Accepts `YYYY-MM-DD` (all-day), `YYYY-MM-DDTHH:MM` (timed) or `today`. Returns the local timestamp, and whether it is all-day.
pub fn parse_form_date(text: &str, now: &DateTime<Local>) -> Result<(DateTime<Local>, bool), Box<dyn Error>> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("today") {
        return Ok((local_midnight(now.date_naive(), text)?, true));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, FORM_DATE_TIME_FORMAT) {
        return Ok((local_from_naive(naive, text)?, false));
    }

    match NaiveDate::parse_from_str(text, FORM_DATE_FORMAT) {
        Ok(date) => Ok((local_midnight(date, text)?, true)),
        Err(_) => Err(format!("Invalid date {:?} (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM)", text).into()),
    }
}

fn local_midnight(date: NaiveDate, original: &str) -> Result<DateTime<Local>, Box<dyn Error>> {
    let midnight = date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("Invalid date {:?}", original))?;
    local_from_naive(midnight, original)
}

fn local_from_naive(naive: NaiveDateTime, original: &str) -> Result<DateTime<Local>, Box<dyn Error>> {
    Local.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{:?} does not exist in the local time zone", original).into())
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::task::{CompletionStatus, TaskId};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn all_day_overdue_compares_days_only() {
        let now = utc(2024, 1, 2, 0, 30);
        assert!(is_overdue(&utc(2024, 1, 1, 0, 0), true, &now));
        // Due earlier today, but all day: not late yet
        assert!(is_overdue(&utc(2024, 1, 2, 0, 0), true, &now) == false);
        assert!(is_overdue(&utc(2024, 1, 3, 0, 0), true, &now) == false);
    }

    #[test]
    fn timed_overdue_compares_timestamps() {
        let due = utc(2024, 5, 17, 8, 0);
        assert!(is_overdue(&due, false, &utc(2024, 5, 17, 9, 0)));
        assert!(is_overdue(&due, false, &utc(2024, 5, 17, 7, 0)) == false);
        // Strictly before
        assert!(is_overdue(&due, false, &due) == false);
    }

    #[test]
    fn labels_relative_to_today() {
        let now = utc(2024, 5, 17, 10, 0);

        assert_eq!(human_label(&utc(2024, 5, 17, 0, 0), true, &now), "Today");
        assert_eq!(human_label(&utc(2024, 5, 17, 14, 30), false, &now), "14:30");
        assert_eq!(human_label(&utc(2024, 5, 16, 0, 0), true, &now), "Yesterday");
        assert_eq!(human_label(&utc(2024, 5, 16, 8, 5), false, &now), "Yesterday, 08:05");
        assert_eq!(human_label(&utc(2024, 5, 18, 0, 0), true, &now), "Tomorrow");
        assert_eq!(human_label(&utc(2024, 5, 18, 21, 0), false, &now), "Tomorrow, 21:00");
    }

    #[test]
    fn labels_for_other_days() {
        let now = utc(2024, 5, 17, 10, 0);

        assert_eq!(human_label(&utc(2024, 3, 3, 0, 0), true, &now), "March 3");
        assert_eq!(human_label(&utc(2024, 3, 3, 9, 15), false, &now), "March 3, 09:15");
        assert_eq!(human_label(&utc(2023, 12, 24, 0, 0), true, &now), "December 24, 2023");
        assert_eq!(human_label(&utc(2025, 1, 1, 18, 0), false, &now), "January 1, 2025, 18:00");
    }

    #[test]
    fn yesterday_across_a_year_boundary() {
        let now = utc(2024, 1, 1, 10, 0);
        assert_eq!(human_label(&utc(2023, 12, 31, 0, 0), true, &now), "Yesterday");
    }

    #[test]
    fn classification() {
        let now = utc(2024, 1, 2, 12, 0);
        let status = classify(&utc(2024, 1, 1, 0, 0), true, &now);
        assert_eq!(status, DueStatus { label: "Yesterday".to_string(), overdue: true });
    }

    #[test]
    fn done_tasks_show_their_completion_date() {
        let now = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let done_on = Local.with_ymd_and_hms(2024, 6, 10, 9, 45, 0).unwrap();
        let long_ago = Local.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();

        let mut task = Task::new(TaskId::from(3), "Water the plants", "home");
        task.set_due(Some(Due::on(long_ago, true)));
        task.set_completion_status(CompletionStatus::Completed(Some(done_on)));

        let label = task_date_label(&task, &now).unwrap();
        assert_eq!(label, TaskDateLabel::Done { label: "09:45".to_string() });
        assert!(label.is_overdue() == false);
    }

    #[test]
    fn open_tasks_show_their_due_date() {
        let now = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let due = Local.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap();

        let mut task = Task::new(TaskId::from(4), "Call the bank", "admin");
        assert_eq!(task_date_label(&task, &now), None);

        task.set_due(Some(Due::by(due, true)));
        assert_eq!(task_date_label(&task, &now), Some(TaskDateLabel::Due {
            kind: DueKind::By,
            label: "Yesterday".to_string(),
            overdue: true,
        }));
    }

    #[test]
    fn form_dates() {
        let when = Local.with_ymd_and_hms(2024, 2, 29, 7, 5, 0).unwrap();
        assert_eq!(format_form_date(&Due::on(when, true)), "2024-02-29");
        assert_eq!(format_form_date(&Due::on(when, false)), "2024-02-29T07:05");
    }

    #[test]
    fn parsing_form_dates() {
        let now = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();

        let (when, all_day) = parse_form_date("2024-07-01T18:30", &now).unwrap();
        assert!(all_day == false);
        assert_eq!(when, Local.with_ymd_and_hms(2024, 7, 1, 18, 30, 0).unwrap());

        let (when, all_day) = parse_form_date("2024-07-01", &now).unwrap();
        assert!(all_day);
        assert_eq!(when.date_naive(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());

        let (when, all_day) = parse_form_date("today", &now).unwrap();
        assert!(all_day);
        assert_eq!(when.date_naive(), now.date_naive());

        assert!(parse_form_date("next tuesday", &now).is_err());
        assert!(parse_form_date("2024-13-01", &now).is_err());
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(None), "N/A");
        let ts = Local.with_ymd_and_hms(2024, 6, 10, 8, 0, 3).unwrap();
        assert_eq!(format_timestamp(Some(&ts)), "2024-06-10 08:00:03");
    }
}
