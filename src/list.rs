//! To-do lists

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

/// The colour of a list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse any CSS colour (`#ff8800`, `tomato`, `rgb(10, 20, 30)`...). Transparency is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colour = csscolorparser::parse(s.trim())
            .map_err(|err| format!("Invalid colour {:?}: {}", s, err))?;
        let (r, g, b, _a) = colour.rgba_u8();
        Ok(Self { r, g, b })
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}


/// A to-do list, and the tasks it contains
#[derive(Clone, Debug, PartialEq)]
pub struct List {
    name: String,
    colour: Rgb,
    /// Filtered lists are virtual: they show tasks that actually belong to other lists
    filtered: bool,

    tasks: Vec<Task>,
}

impl List {
    pub fn new<S: ToString>(name: S, colour: Rgb) -> Self {
        Self::new_with_tasks(name.to_string(), colour, false, Vec::new())
    }

    pub fn new_with_tasks(name: String, colour: Rgb, filtered: bool, tasks: Vec<Task>) -> Self {
        Self { name, colour, filtered, tasks }
    }

    pub fn name(&self) -> &str      { &self.name    }
    pub fn colour(&self) -> Rgb     { self.colour   }
    pub fn is_filtered(&self) -> bool { self.filtered }
    pub fn tasks(&self) -> &[Task]  { &self.tasks   }
    pub fn is_empty(&self) -> bool  { self.tasks.is_empty() }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// How many tasks are not done yet
    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_done() == false).count()
    }

    pub fn overdue_count(&self, now: &DateTime<Local>) -> usize {
        self.tasks.iter().filter(|t| t.is_overdue_at(now)).count()
    }

    pub fn set_colour(&mut self, colour: Rgb) {
        self.colour = colour;
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Remove a task from this list, and return it
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id() == id)?;
        Some(self.tasks.remove(index))
    }
}


/// Every list known by the server: the real ones, and the filtered ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListIndex {
    lists: Vec<List>,
    filtered_lists: Vec<List>,
}

impl ListIndex {
    pub fn new(lists: Vec<List>, filtered_lists: Vec<List>) -> Self {
        Self { lists, filtered_lists }
    }

    pub fn lists(&self) -> &[List]          { &self.lists }
    pub fn filtered_lists(&self) -> &[List] { &self.filtered_lists }

    /// Real lists first, then filtered ones
    pub fn all(&self) -> impl Iterator<Item = &List> {
        self.lists.iter().chain(self.filtered_lists.iter())
    }

    pub fn find(&self, name: &str) -> Option<&List> {
        self.all().find(|l| l.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.lists.iter().map(|l| l.name()).collect()
    }
}
