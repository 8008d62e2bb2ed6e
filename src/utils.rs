///! Some utility functions

use chrono::{DateTime, Local};

use crate::due::{format_timestamp, human_label, TaskDateLabel};
use crate::list::ListIndex;
use crate::store::{ListView, TaskView};
use crate::task::{DueKind, Task};

/// A one-line, human-readable version of a task
pub fn format_task_line(task: &TaskView) -> String {
    let completion = if task.done { "✓" } else { " " };
    let priority = match task.priority.value() {
        2 => "!!",
        1 => "! ",
        -1 => "- ",
        -2 => "--",
        _ => "  ",
    };
    let date = match &task.date {
        None => String::new(),
        Some(TaskDateLabel::Done { label }) => format!("  (done {})", label),
        Some(TaskDateLabel::Due { kind, label, overdue }) => {
            let late = if *overdue { " OVERDUE" } else { "" };
            format!("  ({} {}{})", kind, label, late)
        },
    };
    format!("[{}] {} {}{}\t#{}", completion, priority, task.title, date, task.id)
}

/// Every detail of a task, one per line
pub fn format_task_details(task: &Task, now: &DateTime<Local>) -> String {
    let mut lines = vec![
        format!("Title:    {}", task.title()),
        format!("List:     {}", task.list()),
        format!("Status:   {}", if task.is_done() { "Completed" } else { "Pending" }),
        format!("Priority: {}", task.priority()),
        format!("Created:  {}", format_timestamp(task.creation_date())),
    ];
    if let Some(due) = task.due() {
        let kind = match due.kind() {
            DueKind::On => "Due on:  ",
            DueKind::By => "Due by:  ",
        };
        let late = if task.is_overdue_at(now) { " (overdue)" } else { "" };
        lines.push(format!("All day:  {}", if due.is_all_day() { "Yes" } else { "No" }));
        lines.push(format!("{} {}{}", kind, human_label(due.when(), due.is_all_day(), now), late));
    }
    if task.is_done() {
        lines.push(format!("Done on:  {}", format_timestamp(task.done_on())));
    }
    lines.join("\n")
}

/// A debug utility that pretty-prints a list
pub fn print_list_view(view: &ListView) {
    let filtered = if view.filtered { " (filtered)" } else { "" };
    println!("LIST {}{} {}", view.name, filtered, view.colour);
    for task in &view.tasks {
        if view.filtered {
            println!("    {}\t[{}]", format_task_line(task), task.list);
        } else {
            println!("    {}", format_task_line(task));
        }
    }
}

/// A debug utility that pretty-prints every list, and how many tasks they contain
pub fn print_list_index(index: &ListIndex, now: &DateTime<Local>) {
    for list in index.lists() {
        let overdue = match list.overdue_count(now) {
            0 => String::new(),
            n => format!(", {} overdue", n),
        };
        println!("  {}\t{} pending{}\t{}", list.name(), list.pending_count(), overdue, list.colour());
    }
    for list in index.filtered_lists() {
        println!("  {}\t{} tasks (filtered)", list.name(), list.tasks().len());
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::task::{CompletionStatus, Due, Priority, TaskId};

    #[test]
    fn task_lines() {
        let mut task = TaskView {
            id: TaskId::from(7),
            title: "Pay rent".to_string(),
            list: "home".to_string(),
            done: false,
            priority: Priority::HIGH,
            date: Some(TaskDateLabel::Due { kind: DueKind::By, label: "Yesterday".to_string(), overdue: true }),
        };
        assert_eq!(format_task_line(&task), "[ ] !  Pay rent  (due by Yesterday OVERDUE)\t#7");

        task.done = true;
        task.priority = Priority::NORMAL;
        task.date = Some(TaskDateLabel::Done { label: "Today, 09:15".to_string() });
        assert_eq!(format_task_line(&task), "[✓]    Pay rent  (done Today, 09:15)\t#7");

        task.date = None;
        assert_eq!(format_task_line(&task), "[✓]    Pay rent\t#7");
    }

    #[test]
    fn task_details() {
        let now = Local.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let created = Local.with_ymd_and_hms(2024, 5, 28, 8, 30, 5).unwrap();
        let due = Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();

        let mut task = Task::new_with_parameters(
            TaskId::from(4), "Dentist".to_string(), "health".to_string(),
            CompletionStatus::Uncompleted, Some(Due::on(due, false)), Priority::HIGH, Some(created));
        assert_eq!(format_task_details(&task, &now), [
            "Title:    Dentist",
            "List:     health",
            "Status:   Pending",
            "Priority: high",
            "Created:  2024-05-28 08:30:05",
            "All day:  No",
            "Due on:   09:00 (overdue)",
        ].join("\n"));

        task.set_due(None);
        task.set_completion_status(CompletionStatus::Completed(Some(now)));
        let details = format_task_details(&task, &now);
        assert!(details.contains("Status:   Completed"));
        assert!(details.contains("Done on:  2024-06-03 10:00:00"));
        assert!(details.contains("Due") == false);
    }
}
