//! An in-memory [`TodoSource`], that behaves like the REST server. Useful for tests.
#![cfg(any(test, feature = "mock_source"))]

use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;

use crate::api::{NewTask, TaskChange};
use crate::client::ApiError;
use crate::list::{List, ListIndex, Rgb};
use crate::mock_behaviour::{MockBehaviour, Operation};
use crate::task::{CompletionStatus, Task, TaskId};
use crate::traits::TodoSource;

/// Decides whether a task shows up in a filtered list
pub type TaskFilter = fn(&Task) -> bool;

/// A source that keeps everything in memory
#[derive(Default)]
pub struct MockSource {
    lists: Vec<List>,
    filtered_lists: Vec<(String, TaskFilter)>,
    last_id: u64,

    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mock behaviour, so that every call may fail on purpose
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    /// Add a list without going through the "API"
    pub fn insert_list<S: ToString>(&mut self, name: S, colour: Rgb) {
        self.lists.push(List::new(name, colour));
    }

    /// Add a filtered list, that will contain every task matching `filter`
    pub fn insert_filtered_list<S: ToString>(&mut self, name: S, filter: TaskFilter) {
        self.filtered_lists.push((name.to_string(), filter));
    }

    /// Add a task without going through the "API"
    pub fn insert_task(&mut self, list: &str, task: NewTask) -> Result<TaskId, Box<dyn Error>> {
        let id = self.next_id();
        let list = self.list_mut(list)?;
        let new_task = Task::new_with_parameters(
            id, task.title, list.name().to_string(),
            CompletionStatus::Uncompleted, task.due, task.priority, Some(Local::now()));
        list.add_task(new_task);
        Ok(id)
    }

    /// How many tasks exist in every (real) list
    pub fn task_count(&self) -> usize {
        self.lists.iter().map(|l| l.tasks().len()).sum()
    }

    fn next_id(&mut self) -> TaskId {
        self.last_id += 1;
        TaskId::from(self.last_id)
    }

    fn check(&self, operation: Operation) -> Result<(), Box<dyn Error>> {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => {
                let mut behaviour = behaviour.lock().map_err(|_| "Mock behaviour is poisoned")?;
                behaviour.check(operation)
            },
        }
    }

    fn list_mut(&mut self, name: &str) -> Result<&mut List, Box<dyn Error>> {
        self.lists.iter_mut()
            .find(|l| l.name() == name)
            .ok_or_else(|| not_found(format!("list {:?} not found", name)))
    }

    fn build_filtered_list(&self, name: &str, filter: TaskFilter) -> List {
        let tasks = self.lists.iter()
            .flat_map(|l| l.tasks().iter())
            .filter(|t| filter(*t))
            .cloned()
            .collect();
        List::new_with_tasks(name.to_string(), Rgb::default(), true, tasks)
    }

    fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.lists.iter().find_map(|l| l.task(id))
    }
}

fn not_found(message: String) -> Box<dyn Error> {
    ApiError::Server { status: 400, message }.into()
}

#[async_trait]
impl TodoSource for MockSource {
    async fn get_lists(&self) -> Result<ListIndex, Box<dyn Error>> {
        self.check(Operation::GetLists)?;
        let filtered = self.filtered_lists.iter()
            .map(|(name, filter)| self.build_filtered_list(name, *filter))
            .collect();
        Ok(ListIndex::new(self.lists.clone(), filtered))
    }

    async fn get_list(&self, name: &str) -> Result<List, Box<dyn Error>> {
        self.check(Operation::GetList)?;
        if let Some(list) = self.lists.iter().find(|l| l.name() == name) {
            return Ok(list.clone());
        }
        match self.filtered_lists.iter().find(|(n, _)| n == name) {
            Some((name, filter)) => Ok(self.build_filtered_list(name, *filter)),
            None => Err(not_found(format!("list {:?} not found", name))),
        }
    }

    async fn create_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>> {
        self.check(Operation::CreateList)?;
        if name.trim().is_empty() {
            return Err(ApiError::Server { status: 400, message: "missing list name".to_string() }.into());
        }
        let exists = self.lists.iter().any(|l| l.name() == name)
            || self.filtered_lists.iter().any(|(n, _)| n == name);
        if exists {
            return Err(ApiError::Server { status: 400, message: format!("list {:?} already exists", name) }.into());
        }
        let list = List::new(name, colour);
        self.lists.push(list.clone());
        Ok(list)
    }

    async fn edit_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>> {
        self.check(Operation::EditList)?;
        let list = self.list_mut(name)?;
        list.set_colour(colour);
        Ok(list.clone())
    }

    async fn delete_list(&mut self, name: &str) -> Result<(), Box<dyn Error>> {
        self.check(Operation::DeleteList)?;
        let index = self.lists.iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| not_found(format!("list {:?} not found", name)))?;
        self.lists.remove(index);
        Ok(())
    }

    async fn create_task(&mut self, list: &str, task: &NewTask) -> Result<Task, Box<dyn Error>> {
        self.check(Operation::CreateTask)?;
        if task.title.trim().is_empty() {
            return Err(ApiError::Server { status: 400, message: "missing title".to_string() }.into());
        }
        let id = self.insert_task(list, task.clone())?;
        self.find_task(id)
            .cloned()
            .ok_or_else(|| not_found(format!("item {} not found", id)))
    }

    async fn update_task(&mut self, id: TaskId, change: &TaskChange) -> Result<Task, Box<dyn Error>> {
        self.check(Operation::UpdateTask)?;
        if let Some(target) = change.list() {
            if self.lists.iter().any(|l| l.name() == target) == false {
                return Err(not_found(format!("list {:?} not found", target)));
            }
        }

        let mut task = None;
        for list in self.lists.iter_mut() {
            if let Some(t) = list.remove_task(id) {
                task = Some(t);
                break;
            }
        }
        let mut task = task.ok_or_else(|| not_found(format!("item {} not found", id)))?;

        if let Some(title) = change.title() {
            task.set_title(title.to_string());
        }
        if let Some(done) = change.done() {
            if done != task.is_done() {
                task.set_completion_status(match done {
                    true => CompletionStatus::Completed(Some(Local::now())),
                    false => CompletionStatus::Uncompleted,
                });
            }
        }
        if let Some(priority) = change.priority() {
            task.set_priority(priority);
        }
        if let Some(due) = change.due() {
            task.set_due(due.cloned());
        }
        if let Some(target) = change.list() {
            task.set_list(target.to_string());
        }

        let list_name = task.list().to_string();
        self.list_mut(&list_name)?.add_task(task.clone());
        Ok(task)
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<(), Box<dyn Error>> {
        self.check(Operation::DeleteTask)?;
        for list in self.lists.iter_mut() {
            if list.remove_task(id).is_some() {
                return Ok(());
            }
        }
        Err(not_found(format!("item {} not found", id)))
    }
}
