use std::error::Error;

use async_trait::async_trait;

use crate::api::{NewTask, TaskChange};
use crate::list::{List, ListIndex, Rgb};
use crate::task::{Task, TaskId};

/// Something that stores to-do lists: usually a REST server, reached by a [`Client`](crate::client::Client).
///
/// Every call is a single round-trip. Nothing is cached at this level.
#[async_trait]
pub trait TodoSource {
    /// Returns every list (real and filtered), with their tasks
    async fn get_lists(&self) -> Result<ListIndex, Box<dyn Error>>;
    /// Returns a single list (that may be a filtered list)
    async fn get_list(&self, name: &str) -> Result<List, Box<dyn Error>>;

    async fn create_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>>;
    /// Change the colour of a list. Lists cannot be renamed.
    async fn edit_list(&mut self, name: &str, colour: Rgb) -> Result<List, Box<dyn Error>>;
    /// Delete a list, and the tasks it contains
    async fn delete_list(&mut self, name: &str) -> Result<(), Box<dyn Error>>;

    /// Add a task into a list
    async fn create_task(&mut self, list: &str, task: &NewTask) -> Result<Task, Box<dyn Error>>;
    /// Apply a partial change to a task, and return its new content
    async fn update_task(&mut self, id: TaskId, change: &TaskChange) -> Result<Task, Box<dyn Error>>;
    async fn delete_task(&mut self, id: TaskId) -> Result<(), Box<dyn Error>>;
}
