//! JSON payloads exchanged with the server
//!
//! Responses are converted into [`Task`]s and [`List`]s as soon as they are received, so that the rest of the crate never deals with wire formats.

use std::convert::TryFrom;
use std::error::Error;

use chrono::{DateTime, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::due::format_form_date;
use crate::list::{List, ListIndex, Rgb};
use crate::task::{CompletionStatus, Due, DueKind, Priority, Task, TaskId};

/// The `due_type` field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DueType {
    #[serde(rename = "none", alias = "")]
    None,
    #[serde(rename = "due_on")]
    On,
    #[serde(rename = "due_by")]
    By,
}

impl Default for DueType {
    fn default() -> Self {
        DueType::None
    }
}

impl From<DueKind> for DueType {
    fn from(kind: DueKind) -> Self {
        match kind {
            DueKind::On => DueType::On,
            DueKind::By => DueType::By,
        }
    }
}

impl From<Option<&Due>> for DueType {
    fn from(due: Option<&Due>) -> Self {
        due.map(|d| DueType::from(d.kind())).unwrap_or(DueType::None)
    }
}


#[derive(Clone, Debug, Deserialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub list: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub due_type: DueType,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub done_on: Option<String>,
}

/// Parse an optional RFC 3339 timestamp. The server may omit it, or send an empty string.
fn parse_timestamp(field: &str, value: Option<&str>) -> Result<Option<DateTime<Local>>, Box<dyn Error>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(text)
                .map_err(|err| format!("Invalid {} timestamp {:?}: {}", field, text, err))?;
            Ok(Some(parsed.with_timezone(&Local)))
        },
    }
}

impl TryFrom<TaskResponse> for Task {
    type Error = Box<dyn Error>;

    fn try_from(response: TaskResponse) -> Result<Self, Self::Error> {
        let due_date = parse_timestamp("due", response.due.as_deref())?;
        let due = match (response.due_type, due_date) {
            (DueType::None, _) => None,
            (DueType::On, Some(when)) => Some(Due::on(when, response.all_day)),
            (DueType::By, Some(when)) => Some(Due::by(when, response.all_day)),
            (_, None) => {
                return Err(format!("Task {} has a due type but no due date", response.id).into());
            },
        };

        let completion_status = if response.done {
            CompletionStatus::Completed(parse_timestamp("done_on", response.done_on.as_deref())?)
        } else {
            if response.done_on.as_deref().map(|d| d.is_empty() == false).unwrap_or(false) {
                log::warn!("Task {} is not done but has a completion date. Ignoring it.", response.id);
            }
            CompletionStatus::Uncompleted
        };

        let creation_date = parse_timestamp("created", response.created.as_deref())?;

        Ok(Task::new_with_parameters(
            response.id,
            response.title,
            response.list,
            completion_status,
            due,
            Priority::new(response.priority),
            creation_date,
        ))
    }
}


#[derive(Clone, Debug, Deserialize)]
pub struct ListResponse {
    pub name: String,
    #[serde(default)]
    pub colour: Rgb,
    #[serde(default)]
    pub items: Option<Vec<TaskResponse>>,
    #[serde(default)]
    pub filtered: bool,
}

impl ListResponse {
    /// Convert this into a list. `filtered` overrides the flag carried by the list itself, when the envelope says so.
    pub fn into_list(self, filtered: bool) -> Result<List, Box<dyn Error>> {
        let tasks = self.items.unwrap_or_default()
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(List::new_with_tasks(self.name, self.colour, self.filtered || filtered, tasks))
    }
}

/// Reply to `GET /list`
#[derive(Clone, Debug, Deserialize)]
pub struct ListIndexResponse {
    #[serde(default)]
    pub lists: Vec<ListResponse>,
    #[serde(default)]
    pub filtered_lists: Vec<ListResponse>,
}

impl TryFrom<ListIndexResponse> for ListIndex {
    type Error = Box<dyn Error>;

    fn try_from(response: ListIndexResponse) -> Result<Self, Self::Error> {
        let lists = response.lists.into_iter()
            .map(|l| l.into_list(false))
            .collect::<Result<Vec<_>, _>>()?;
        let filtered_lists = response.filtered_lists.into_iter()
            .map(|l| l.into_list(true))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListIndex::new(lists, filtered_lists))
    }
}

/// Reply to requests about a single list
#[derive(Clone, Debug, Deserialize)]
pub struct ListEnvelope {
    pub list: ListResponse,
    #[serde(default)]
    pub filtered: bool,
}

/// Reply to requests about a single task
#[derive(Clone, Debug, Deserialize)]
pub struct TaskEnvelope {
    pub task: TaskResponse,
}

/// Body of every error reply
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}


/// Body of `POST /list` and `PATCH /list/{name}`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListAdd {
    pub name: String,
    pub colour: Rgb,
}

/// A task that does not exist yet
#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    pub due: Option<Due>,
}

impl NewTask {
    pub fn new<S: ToString>(title: S) -> Self {
        Self { title: title.to_string(), priority: Priority::NORMAL, due: None }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due(mut self, due: Option<Due>) -> Self {
        self.due = due;
        self
    }
}

/// Body of `POST /list/{name}`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskAdd {
    pub title: String,
    pub priority: Priority,
    pub all_day: bool,
    pub due_type: DueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl From<&NewTask> for TaskAdd {
    fn from(task: &NewTask) -> Self {
        Self {
            title: task.title.clone(),
            priority: task.priority,
            all_day: task.due.as_ref().map(|d| d.is_all_day()).unwrap_or(false),
            due_type: DueType::from(task.due.as_ref()),
            due: task.due.as_ref().map(format_form_date),
        }
    }
}


/// A partial update of a task (body of `PATCH /items/{id}`).
///
/// Only the fields that have been set are sent. Changing the due date always sends its type along, since the server requires it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskChange {
    title: Option<String>,
    list: Option<String>,
    done: Option<bool>,
    priority: Option<Priority>,
    /// `Some(None)` removes the due date
    due: Option<Option<Due>>,
}

impl TaskChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: ToString>(mut self, title: S) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Move the task into another list
    pub fn with_list<S: ToString>(mut self, list: S) -> Self {
        self.list = Some(list.to_string());
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due(mut self, due: Option<Due>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn title(&self) -> Option<&str>         { self.title.as_deref() }
    pub fn list(&self) -> Option<&str>          { self.list.as_deref()  }
    pub fn done(&self) -> Option<bool>          { self.done             }
    pub fn priority(&self) -> Option<Priority>  { self.priority         }
    pub fn due(&self) -> Option<Option<&Due>>   { self.due.as_ref().map(|d| d.as_ref()) }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Serialize for TaskChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(list) = &self.list {
            map.serialize_entry("list", list)?;
        }
        if let Some(done) = &self.done {
            map.serialize_entry("done", done)?;
        }
        if let Some(priority) = &self.priority {
            map.serialize_entry("priority", priority)?;
        }
        match &self.due {
            None => (),
            Some(None) => map.serialize_entry("due_type", &DueType::None)?,
            Some(Some(due)) => {
                map.serialize_entry("due_type", &DueType::from(due.kind()))?;
                map.serialize_entry("all_day", &due.is_all_day())?;
                map.serialize_entry("due", &format_form_date(due))?;
            },
        }
        map.end()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn task_from_json() {
        let text = r#"{
            "id": 12, "title": "Buy milk", "list": "groceries", "done": false, "priority": 1,
            "all_day": true, "due_type": "due_by", "due": "2024-03-01T00:00:00+01:00",
            "created": "2024-02-20T10:11:12.123456+01:00"
        }"#;
        let response: TaskResponse = serde_json::from_str(text).unwrap();
        let task = Task::try_from(response).unwrap();

        assert_eq!(task.id(), TaskId::from(12));
        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.list(), "groceries");
        assert!(task.is_done() == false);
        assert_eq!(task.priority(), Priority::HIGH);
        let due = task.due().unwrap();
        assert_eq!(due.kind(), DueKind::By);
        assert!(due.is_all_day());
        assert_eq!(due.when(), &DateTime::parse_from_rfc3339("2024-03-01T00:00:00+01:00").unwrap());
        assert!(task.creation_date().is_some());
    }

    #[test]
    fn done_task_from_json() {
        let text = r#"{"id": 3, "title": "Old", "done": true, "due_type": "", "done_on": "2024-01-05T18:00:00Z"}"#;
        let task = Task::try_from(serde_json::from_str::<TaskResponse>(text).unwrap()).unwrap();
        assert!(task.is_done());
        assert!(task.due().is_none());
        assert_eq!(task.done_on().unwrap(), &DateTime::parse_from_rfc3339("2024-01-05T18:00:00Z").unwrap());
    }

    #[test]
    fn due_type_without_due_date_is_rejected() {
        let text = r#"{"id": 4, "title": "Broken", "due_type": "due_on"}"#;
        let response: TaskResponse = serde_json::from_str(text).unwrap();
        assert!(Task::try_from(response).is_err());
    }

    #[test]
    fn list_from_json() {
        let text = r#"{"list": {"name": "Today", "colour": {"r": 0, "g": 0, "b": 0}, "items": null}, "filtered": true}"#;
        let envelope: ListEnvelope = serde_json::from_str(text).unwrap();
        let list = envelope.list.into_list(envelope.filtered).unwrap();
        assert_eq!(list.name(), "Today");
        assert!(list.is_filtered());
        assert!(list.is_empty());
    }

    #[test]
    fn index_from_json() {
        let text = r#"{
            "lists": [{"name": "home", "colour": {"r": 255, "g": 0, "b": 0}, "items": [{"id": 1, "title": "Sweep"}]}],
            "filtered_lists": [{"name": "Pending", "items": [], "filtered": true}]
        }"#;
        let response: ListIndexResponse = serde_json::from_str(text).unwrap();
        let index = ListIndex::try_from(response).unwrap();
        assert_eq!(index.lists().len(), 1);
        assert_eq!(index.lists()[0].colour(), Rgb::new(255, 0, 0));
        assert_eq!(index.lists()[0].tasks()[0].title(), "Sweep");
        assert!(index.filtered_lists()[0].is_filtered());
    }

    #[test]
    fn new_task_body() {
        let when = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let task = NewTask::new("Dentist").with_due(Some(Due::on(when, false))).with_priority(Priority::HIGH);
        let body = serde_json::to_value(TaskAdd::from(&task)).unwrap();
        assert_eq!(body, json!({
            "title": "Dentist", "priority": 1, "all_day": false,
            "due_type": "due_on", "due": "2024-03-01T09:30",
        }));

        let body = serde_json::to_value(TaskAdd::from(&NewTask::new("Whenever"))).unwrap();
        assert_eq!(body, json!({"title": "Whenever", "priority": 0, "all_day": false, "due_type": "none"}));
    }

    #[test]
    fn partial_changes_only_send_what_is_set() {
        let body = serde_json::to_value(TaskChange::new().with_done(true)).unwrap();
        assert_eq!(body, json!({"done": true}));

        let body = serde_json::to_value(TaskChange::new().with_title("Renamed").with_due(None)).unwrap();
        assert_eq!(body, json!({"title": "Renamed", "due_type": "none"}));

        let when = Local.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let body = serde_json::to_value(TaskChange::new().with_due(Some(Due::by(when, true)))).unwrap();
        assert_eq!(body, json!({"due_type": "due_by", "all_day": true, "due": "2024-03-01"}));

        assert!(TaskChange::new().is_empty());
    }

    #[test]
    fn error_bodies() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "list not found"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("list not found"));
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.error.is_none());
    }
}
