//! To-do tasks

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The identifier the server gave to a task.
///
/// Clients should not assume anything about it, apart from its uniqueness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
impl FromStr for TaskId {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}
impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task is either done (with an optional completion date), or it is not.
///
/// The server sends a `done` flag and a `done_on` date. Having a completion date on a task that is not done makes no sense, this enum makes it impossible.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionStatus {
    Completed(Option<DateTime<Local>>),
    Uncompleted,
}
impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }

    pub fn completion_date(&self) -> Option<&DateTime<Local>> {
        match self {
            CompletionStatus::Completed(date) => date.as_ref(),
            CompletionStatus::Uncompleted => None,
        }
    }
}

/// What a due date means
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DueKind {
    /// The task has to be done on that very date
    On,
    /// The task has to be done before that date (a deadline)
    By,
}

impl Display for DueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DueKind::On => write!(f, "due on"),
            DueKind::By => write!(f, "due by"),
        }
    }
}

/// A due date.
///
/// Tasks without a due date have no `Due` at all, so that a "due type" can never exist without a date.
#[derive(Clone, Debug, PartialEq)]
pub struct Due {
    kind: DueKind,
    when: DateTime<Local>,
    /// The time-of-day part of `when` is meaningless for all-day dates
    all_day: bool,
}

impl Due {
    pub fn new(kind: DueKind, when: DateTime<Local>, all_day: bool) -> Self {
        Self { kind, when, all_day }
    }

    pub fn on(when: DateTime<Local>, all_day: bool) -> Self {
        Self::new(DueKind::On, when, all_day)
    }

    pub fn by(when: DateTime<Local>, all_day: bool) -> Self {
        Self::new(DueKind::By, when, all_day)
    }

    pub fn kind(&self) -> DueKind            { self.kind     }
    pub fn when(&self) -> &DateTime<Local>   { &self.when    }
    pub fn is_all_day(&self) -> bool         { self.all_day  }

    /// The local calendar day this is due
    pub fn day(&self) -> NaiveDate {
        self.when.date_naive()
    }

    /// Whether this date is in the past, compared to `now`.
    pub fn is_overdue_at(&self, now: &DateTime<Local>) -> bool {
        crate::due::is_overdue(&self.when, self.all_day, now)
    }
}


/// Task priority, from -2 (lowest) to 2 (highest)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Priority(i8);

impl Priority {
    pub const LOWEST: Priority = Priority(-2);
    pub const LOW: Priority = Priority(-1);
    pub const NORMAL: Priority = Priority(0);
    pub const HIGH: Priority = Priority(1);
    pub const HIGHEST: Priority = Priority(2);

    /// Out-of-range values are clamped
    pub fn new(value: i64) -> Self {
        Self(value.max(-2).min(2) as i8)
    }

    pub fn value(&self) -> i8 {
        self.0
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}
impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.0 as i64
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            -2 => "lowest",
            -1 => "low",
            0 => "normal",
            1 => "high",
            _ => "highest",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Either a level name (`low`, `high`...) or a number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lowest" => Ok(Self::LOWEST),
            "low" => Ok(Self::LOW),
            "normal" => Ok(Self::NORMAL),
            "high" => Ok(Self::HIGH),
            "highest" => Ok(Self::HIGHEST),
            other => other.parse::<i64>()
                .map(Self::new)
                .map_err(|_| format!("Invalid priority {:?}", s)),
        }
    }
}


/// A to-do task
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    id: TaskId,
    title: String,

    /// The name of the (real) list this task belongs to.
    /// Tasks can also be shown in filtered lists, this is still the name of their actual list.
    list: String,

    completion_status: CompletionStatus,
    due: Option<Due>,
    priority: Priority,

    /// The time this task was created (if the server told us)
    creation_date: Option<DateTime<Local>>,
}

impl Task {
    /// Create an undone, normal-priority task without due date
    pub fn new<S: ToString, T: ToString>(id: TaskId, title: S, list: T) -> Self {
        Self::new_with_parameters(id, title.to_string(), list.to_string(), CompletionStatus::Uncompleted, None, Priority::NORMAL, None)
    }

    pub fn new_with_parameters(id: TaskId, title: String, list: String,
                               completion_status: CompletionStatus,
                               due: Option<Due>, priority: Priority,
                               creation_date: Option<DateTime<Local>>,
                            ) -> Self
    {
        Self {
            id,
            title,
            list,
            completion_status,
            due,
            priority,
            creation_date,
        }
    }

    pub fn id(&self) -> TaskId          { self.id           }
    pub fn title(&self) -> &str         { &self.title       }
    pub fn list(&self) -> &str          { &self.list        }
    pub fn due(&self) -> Option<&Due>   { self.due.as_ref() }
    pub fn priority(&self) -> Priority  { self.priority     }
    pub fn is_done(&self) -> bool       { self.completion_status.is_completed() }
    pub fn has_due_date(&self) -> bool  { self.due.is_some() }
    pub fn done_on(&self) -> Option<&DateTime<Local>>        { self.completion_status.completion_date() }
    pub fn creation_date(&self) -> Option<&DateTime<Local>>  { self.creation_date.as_ref() }
    pub fn completion_status(&self) -> &CompletionStatus     { &self.completion_status }

    /// A task is overdue if it is not done and its due date has passed.
    pub fn is_overdue_at(&self, now: &DateTime<Local>) -> bool {
        if self.is_done() {
            return false;
        }
        match &self.due {
            None => false,
            Some(due) => due.is_overdue_at(now),
        }
    }

    pub fn set_title(&mut self, new_title: String) {
        self.title = new_title;
    }

    pub fn set_list(&mut self, new_list: String) {
        self.list = new_list;
    }

    pub fn set_completion_status(&mut self, new_completion_status: CompletionStatus) {
        self.completion_status = new_completion_status;
    }

    pub fn set_due(&mut self, new_due: Option<Due>) {
        self.due = new_due;
    }

    pub fn set_priority(&mut self, new_priority: Priority) {
        self.priority = new_priority;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn priority_is_clamped() {
        assert_eq!(Priority::new(7), Priority::HIGHEST);
        assert_eq!(Priority::new(-12), Priority::LOWEST);
        assert_eq!(Priority::new(1).value(), 1);
    }

    #[test]
    fn priority_from_str() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::HIGH);
        assert_eq!(" Lowest ".parse::<Priority>().unwrap(), Priority::LOWEST);
        assert_eq!("-1".parse::<Priority>().unwrap(), Priority::LOW);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn done_tasks_are_never_overdue() {
        let yesterday = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        let mut task = Task::new(TaskId::from(1), "Pay rent", "home");
        task.set_due(Some(Due::by(yesterday, true)));
        assert!(task.is_overdue_at(&now));

        task.set_completion_status(CompletionStatus::Completed(Some(now)));
        assert!(task.is_overdue_at(&now) == false);
        assert_eq!(task.done_on(), Some(&now));
    }

    #[test]
    fn tasks_without_due_date_are_never_overdue() {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let task = Task::new(TaskId::from(2), "Someday", "home");
        assert!(task.has_due_date() == false);
        assert!(task.is_overdue_at(&now) == false);
    }

    #[test]
    fn task_id_parsing() {
        assert_eq!("42".parse::<TaskId>().unwrap(), TaskId::from(42));
        assert!("abc".parse::<TaskId>().is_err());
        assert_eq!(TaskId::from(7).to_string(), "7");
    }
}
