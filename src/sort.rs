//! Ordering of tasks
//!
//! Tasks are sorted by a chain of comparators: the first one that tells two tasks apart decides their order.
//! Sorts are stable, so tasks that no comparator tells apart keep their original relative order.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::task::{Due, Task};

/// A tie-break comparator between two tasks
pub type Comparator = fn(&Task, &Task) -> Ordering;

/// Incomplete tasks first, done tasks sink to the bottom
pub fn by_done(left: &Task, right: &Task) -> Ordering {
    left.is_done().cmp(&right.is_done())
}

/// Tasks with a due date first, soonest first
pub fn by_due_date(left: &Task, right: &Task) -> Ordering {
    match (left.due(), right.due()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => compare_due_dates(l, r),
    }
}

/// Compare calendar days first. On the same day, timed tasks come before all-day ones.
pub fn compare_due_dates(left: &Due, right: &Due) -> Ordering {
    left.day().cmp(&right.day())
        .then_with(|| match (left.is_all_day(), right.is_all_day()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => left.when().cmp(right.when()),
        })
}

/// Highest priority first
pub fn by_priority(left: &Task, right: &Task) -> Ordering {
    right.priority().cmp(&left.priority())
}

/// Alphabetical order of titles
pub fn by_title(left: &Task, right: &Task) -> Ordering {
    compare_titles(left.title(), right.title())
}

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Unicode collation (root locale, tertiary strength): accents and case only break ties, so "Éclair" comes before "zebra".
/// Strings that collate equal are ordered by their code points, so that the order stays total.
pub fn compare_titles(left: &str, right: &str) -> Ordering {
    COLLATOR.with(|collator| collator.borrow_mut().collate(left, right))
}

/// Chain comparators: the first one returning something else than `Equal` wins
pub fn compare_with(comparators: &[Comparator], left: &Task, right: &Task) -> Ordering {
    for comparator in comparators {
        let result = comparator(left, right);
        if result != Ordering::Equal {
            return result;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort using a chain of comparators
pub fn sort_with(tasks: &mut [Task], comparators: &[Comparator]) {
    tasks.sort_by(|l, r| compare_with(comparators, l, r));
}


/// The comparators that can be named in settings or on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Done,
    #[serde(alias = "due_date")]
    Due,
    Priority,
    Title,
}

/// Open tasks, by due date, then priority, then title
pub const DEFAULT_ORDER: [SortKey; 4] = [SortKey::Done, SortKey::Due, SortKey::Priority, SortKey::Title];
/// Open tasks by title, then done tasks by title
pub const TITLE_THEN_DONE: [SortKey; 2] = [SortKey::Done, SortKey::Title];

impl SortKey {
    pub fn comparator(self) -> Comparator {
        match self {
            SortKey::Done => by_done,
            SortKey::Due => by_due_date,
            SortKey::Priority => by_priority,
            SortKey::Title => by_title,
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortKey::Done => "done",
            SortKey::Due => "due",
            SortKey::Priority => "priority",
            SortKey::Title => "title",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "done" => Ok(SortKey::Done),
            "due" | "due_date" => Ok(SortKey::Due),
            "priority" => Ok(SortKey::Priority),
            "title" => Ok(SortKey::Title),
            _ => Err(format!("Unknown sort key {:?} (expected done, due, priority or title)", s)),
        }
    }
}

/// The comparators matching a sequence of sort keys
pub fn comparators(keys: &[SortKey]) -> Vec<Comparator> {
    keys.iter().map(|key| key.comparator()).collect()
}

/// Stable in-place sort
pub fn sort_tasks_in_place(tasks: &mut [Task], keys: &[SortKey]) {
    sort_with(tasks, &comparators(keys));
}

/// Return a sorted copy, the input is left untouched
pub fn sort_tasks(tasks: &[Task], keys: &[SortKey]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sort_tasks_in_place(&mut sorted, keys);
    sorted
}
