//! Client-side state: what has been fetched from a [`TodoSource`], and what should be shown
//!
//! A [`Store`] never patches its data locally. Every successful change is followed by a reload of what is displayed, so the server stays the only source of truth.

use std::collections::HashMap;
use std::error::Error;

use chrono::{DateTime, Local};

use crate::alert::{Alert, Alerts};
use crate::api::{NewTask, TaskChange};
use crate::due::{task_date_label, TaskDateLabel};
use crate::list::{List, ListIndex, Rgb};
use crate::sort::{sort_tasks, SortKey};
use crate::task::{Priority, Task, TaskId};
use crate::traits::TodoSource;

/// What should be displayed for a task
#[derive(Clone, Debug, PartialEq)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    /// The list this task actually belongs to (that may differ from the displayed one, for filtered lists)
    pub list: String,
    pub done: bool,
    pub priority: Priority,
    pub date: Option<TaskDateLabel>,
}

impl TaskView {
    pub fn from_task(task: &Task, now: &DateTime<Local>) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            list: task.list().to_string(),
            done: task.is_done(),
            priority: task.priority(),
            date: task_date_label(task, now),
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.date.as_ref().map(|d| d.is_overdue()).unwrap_or(false)
    }
}

/// What should be displayed for a list: its tasks, sorted, and ready to be looked up by their IDs
#[derive(Clone, Debug, PartialEq)]
pub struct ListView {
    pub name: String,
    pub colour: Rgb,
    pub filtered: bool,
    pub tasks: Vec<TaskView>,
    by_id: HashMap<TaskId, usize>,
}

impl ListView {
    pub fn new(list: &List, keys: &[SortKey], now: &DateTime<Local>) -> Self {
        let tasks: Vec<TaskView> = sort_tasks(list.tasks(), keys)
            .iter()
            .map(|t| TaskView::from_task(t, now))
            .collect();
        let by_id = tasks.iter()
            .enumerate()
            .map(|(index, t)| (t.id, index))
            .collect();

        Self {
            name: list.name().to_string(),
            colour: list.colour(),
            filtered: list.is_filtered(),
            tasks,
            by_id,
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskView> {
        self.by_id.get(&id).and_then(|index| self.tasks.get(*index))
    }
}


/// Holds a source, and the data that has been fetched from it
pub struct Store<S: TodoSource> {
    source: S,
    index: ListIndex,
    /// The list being displayed, if any
    current: Option<List>,
    alerts: Alerts,
}

impl<S: TodoSource> Store<S> {
    /// Create a store. Nothing is fetched until `refresh` or `open` is called.
    pub fn new(source: S) -> Self {
        Self::new_with_alerts(source, Alerts::default())
    }

    pub fn new_with_alerts(source: S, alerts: Alerts) -> Self {
        Self {
            source,
            index: ListIndex::default(),
            current: None,
            alerts,
        }
    }

    pub fn source(&self) -> &S                  { &self.source       }
    pub fn index(&self) -> &ListIndex           { &self.index        }
    pub fn current(&self) -> Option<&List>      { self.current.as_ref() }
    pub fn alerts(&self) -> &Alerts             { &self.alerts       }
    pub fn alerts_mut(&mut self) -> &mut Alerts { &mut self.alerts   }

    /// Fetch every list again
    pub async fn refresh(&mut self) -> Result<(), Box<dyn Error>> {
        let result = self.source.get_lists().await;
        self.index = self.check(result, "Failed to load lists")?;
        log::info!("Loaded {} lists and {} filtered lists", self.index.lists().len(), self.index.filtered_lists().len());
        Ok(())
    }

    /// Fetch a list, and make it the current one
    pub async fn open(&mut self, name: &str) -> Result<&List, Box<dyn Error>> {
        let result = self.source.get_list(name).await;
        let list = self.check(result, "Failed to load list")?;
        log::info!("Opened list {} ({} tasks)", list.name(), list.tasks().len());
        Ok(self.current.insert(list))
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    /// A displayable version of the current list
    pub fn view(&self, keys: &[SortKey], now: &DateTime<Local>) -> Option<ListView> {
        self.current.as_ref().map(|list| ListView::new(list, keys, now))
    }

    /// Look for a task in the current list, or in any known list
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.current.iter()
            .chain(self.index.all())
            .find_map(|list| list.task(id))
    }

    pub async fn create_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>> {
        let result = self.source.create_list(name, colour).await;
        let list = self.check(result, "Failed to create list")?;
        self.reload().await?;
        self.alerts.push(Alert::success("List created successfully"));
        Ok(list)
    }

    /// Change the colour of a list
    pub async fn edit_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>> {
        self.reject_filtered(name, "Failed to edit list")?;
        let result = self.source.edit_list(name, colour).await;
        let list = self.check(result, "Failed to edit list")?;
        self.reload().await?;
        self.alerts.push(Alert::success("List updated successfully"));
        Ok(list)
    }

    /// Delete a list.
    ///
    /// In case the list still contains tasks, `confirm` is called first, and nothing is deleted unless it returns `true`.
    /// Returns whether the list has actually been deleted.
    pub async fn delete_list<F>(&mut self, name: &str, confirm: F) -> Result<bool, Box<dyn Error>>
    where
        F: FnOnce(&List) -> bool,
    {
        self.reject_filtered(name, "Failed to delete list")?;

        let cached = self.current.iter()
            .chain(self.index.lists().iter())
            .find(|l| l.name() == name);
        if let Some(list) = cached {
            if list.is_empty() == false && confirm(list) == false {
                log::info!("Deletion of list {} cancelled", name);
                return Ok(false);
            }
        }

        let result = self.source.delete_list(name).await;
        self.check(result, "Failed to delete list")?;
        self.reload().await?;
        self.alerts.push(Alert::success("List deleted successfully"));
        Ok(true)
    }

    pub async fn create_task(&mut self, list: &str, task: &NewTask) -> Result<Task, Box<dyn Error>> {
        let result = self.source.create_task(list, task).await;
        let task = self.check(result, "Failed to add the task")?;
        self.reload().await?;
        self.alerts.push(Alert::success("Task added successfully"));
        Ok(task)
    }

    pub async fn update_task(&mut self, id: TaskId, change: &TaskChange) -> Result<Task, Box<dyn Error>> {
        let result = self.source.update_task(id, change).await;
        let task = self.check(result, "Failed to update the task")?;
        self.reload().await?;
        self.alerts.push(Alert::success("Task updated successfully"));
        Ok(task)
    }

    /// Mark a task as done (or not done)
    pub async fn set_done(&mut self, id: TaskId, done: bool) -> Result<Task, Box<dyn Error>> {
        let result = self.source.update_task(id, &TaskChange::new().with_done(done)).await;
        let task = self.check(result, "Failed to update the task")?;
        self.reload().await?;
        let message = if done { "Task marked as done" } else { "Task marked as not done" };
        self.alerts.push(Alert::success(message));
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: TaskId) -> Result<(), Box<dyn Error>> {
        let result = self.source.delete_task(id).await;
        self.check(result, "Failed to delete the task")?;
        self.reload().await?;
        self.alerts.push(Alert::success("Task deleted successfully"));
        Ok(())
    }

    /// Fetch again whatever is displayed
    async fn reload(&mut self) -> Result<(), Box<dyn Error>> {
        self.refresh().await?;

        let current_name = match &self.current {
            None => return Ok(()),
            Some(list) => list.name().to_string(),
        };
        if self.index.find(&current_name).is_some() {
            self.open(&current_name).await?;
        } else {
            log::info!("List {} does not exist anymore", current_name);
            self.current = None;
        }
        Ok(())
    }

    fn reject_filtered(&mut self, name: &str, context: &str) -> Result<(), Box<dyn Error>> {
        let is_filtered = self.index.find(name).map(|l| l.is_filtered()).unwrap_or(false)
            || self.current.as_ref().map(|l| l.name() == name && l.is_filtered()).unwrap_or(false);
        if is_filtered {
            let err: Box<dyn Error> = format!("{} is a filtered list and cannot be modified", name).into();
            return self.check(Err(err), context);
        }
        Ok(())
    }

    /// Log and display errors. The cached data is not touched.
    fn check<T>(&mut self, result: Result<T, Box<dyn Error>>, context: &str) -> Result<T, Box<dyn Error>> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                log::error!("{}: {}", context, err);
                self.alerts.push(Alert::danger(format!("{}: {}", context, err)));
                Err(err)
            },
        }
    }
}
