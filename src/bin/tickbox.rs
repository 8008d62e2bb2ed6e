use std::error::Error;
use std::io::{BufRead, Write};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};

use tickbox::api::{NewTask, TaskChange};
use tickbox::config::Settings;
use tickbox::due::parse_form_date;
use tickbox::list::{List, Rgb};
use tickbox::sort::SortKey;
use tickbox::task::{Due, Priority, TaskId};
use tickbox::utils::{format_task_details, print_list_index, print_list_view};
use tickbox::{Client, Store};

/// Manage to-do lists stored on a remote server
#[derive(Debug, Parser)]
#[command(name = "tickbox", version)]
struct Cli {
    /// Base URL of the REST API (overrides the settings file and TICKBOX_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, Subcommand)]
enum Commands {
    /// Show every list.
    Lists,
    /// Show the tasks of a list.
    Show {
        list: String,
        /// Sort keys, applied in order (done, due, priority, title)
        #[arg(long, value_delimiter = ',')]
        sort: Vec<SortKey>,
    },
    /// Create a list.
    AddList {
        name: String,
        #[arg(long, default_value = "#000000")]
        colour: Rgb,
    },
    /// Change the colour of a list.
    EditList {
        name: String,
        #[arg(long)]
        colour: Rgb,
    },
    /// Delete a list and its tasks.
    RmList {
        name: String,
        /// Do not ask for a confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Add a task to a list.
    Add {
        list: String,
        title: String,
        #[arg(long, default_value = "normal")]
        priority: Priority,
        /// YYYY-MM-DD, YYYY-MM-DDTHH:MM or "today"
        #[arg(long, conflicts_with = "due_by")]
        due_on: Option<String>,
        /// YYYY-MM-DD, YYYY-MM-DDTHH:MM or "today"
        #[arg(long)]
        due_by: Option<String>,
    },
    /// Show every detail of a task.
    Task { id: TaskId },
    /// Change the priority, due date or list of a task.
    Edit {
        id: TaskId,
        #[arg(long)]
        priority: Option<Priority>,
        /// YYYY-MM-DD, YYYY-MM-DDTHH:MM or "today"
        #[arg(long, conflicts_with = "due_by")]
        due_on: Option<String>,
        /// YYYY-MM-DD, YYYY-MM-DDTHH:MM or "today"
        #[arg(long)]
        due_by: Option<String>,
        /// Remove the due date
        #[arg(long, conflicts_with_all = ["due_on", "due_by"])]
        no_due: bool,
        /// Move the task into another list
        #[arg(long)]
        list: Option<String>,
    },
    /// Mark a task as done.
    Done { id: TaskId },
    /// Mark a task as not done.
    Undone { id: TaskId },
    /// Change the title of a task.
    Rename { id: TaskId, title: String },
    /// Delete a task.
    Rm { id: TaskId },
}


#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(url) = cli.url {
        settings.url = url;
    }
    log::debug!("Using server {}", settings.url);

    let client = Client::new(&settings.url)?;
    let mut store = Store::new(client);
    store.alerts_mut().set_lifetime(settings.alert_lifetime()?);

    let result = run(&mut store, cli.command, &settings).await;
    if let Some(alert) = store.alerts().last() {
        println!("{}", alert);
    }
    result
}

async fn run(store: &mut Store<Client>, command: Commands, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let now = Local::now();
    match command {
        Commands::Lists => {
            store.refresh().await?;
            print_list_index(store.index(), &now);
        },
        Commands::Show { list, sort } => {
            let keys = if sort.is_empty() { settings.sort.clone() } else { sort };
            store.open(&list).await?;
            if let Some(view) = store.view(&keys, &now) {
                print_list_view(&view);
            }
        },
        Commands::AddList { name, colour } => {
            store.create_list(&name, colour).await?;
        },
        Commands::EditList { name, colour } => {
            store.refresh().await?;
            store.edit_list(&name, colour).await?;
        },
        Commands::RmList { name, yes } => {
            store.refresh().await?;
            let deleted = store.delete_list(&name, |list| yes || confirm_deletion(list)).await?;
            if deleted == false {
                println!("Nothing deleted");
            }
        },
        Commands::Add { list, title, priority, due_on, due_by } => {
            let due = parse_due(due_on.as_deref(), due_by.as_deref(), &now)?;
            let task = NewTask::new(title).with_priority(priority).with_due(due);
            let created = store.create_task(&list, &task).await?;
            log::info!("Created task #{}", created.id());
        },
        Commands::Task { id } => {
            store.refresh().await?;
            match store.task(id) {
                Some(task) => println!("{}", format_task_details(task, &now)),
                None => return Err(format!("Task #{} not found", id).into()),
            }
        },
        Commands::Edit { id, priority, due_on, due_by, no_due, list } => {
            let change = task_change(priority, due_on.as_deref(), due_by.as_deref(), no_due, list, &now)?;
            if change.is_empty() {
                return Err("Nothing to change (see --help)".into());
            }
            store.update_task(id, &change).await?;
        },
        Commands::Done { id } => {
            store.set_done(id, true).await?;
        },
        Commands::Undone { id } => {
            store.set_done(id, false).await?;
        },
        Commands::Rename { id, title } => {
            store.update_task(id, &TaskChange::new().with_title(title)).await?;
        },
        Commands::Rm { id } => {
            store.delete_task(id).await?;
        },
    }
    Ok(())
}

/// At most one of `due_on` and `due_by` is expected
fn parse_due(due_on: Option<&str>, due_by: Option<&str>, now: &DateTime<Local>) -> Result<Option<Due>, Box<dyn Error>> {
    match (due_on, due_by) {
        (Some(text), _) => {
            let (when, all_day) = parse_form_date(text, now)?;
            Ok(Some(Due::on(when, all_day)))
        },
        (None, Some(text)) => {
            let (when, all_day) = parse_form_date(text, now)?;
            Ok(Some(Due::by(when, all_day)))
        },
        (None, None) => Ok(None),
    }
}

fn task_change(priority: Option<Priority>, due_on: Option<&str>, due_by: Option<&str>, no_due: bool, list: Option<String>, now: &DateTime<Local>) -> Result<TaskChange, Box<dyn Error>> {
    let mut change = TaskChange::new();
    if let Some(priority) = priority {
        change = change.with_priority(priority);
    }
    if no_due {
        change = change.with_due(None);
    } else if let Some(due) = parse_due(due_on, due_by, now)? {
        change = change.with_due(Some(due));
    }
    if let Some(list) = list {
        change = change.with_list(list);
    }
    Ok(change)
}

fn confirm_deletion(list: &List) -> bool {
    print!("List {} still contains {} tasks. Delete it anyway? [y/N] ", list.name(), list.tasks().len());
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(err) => {
            log::warn!("Unable to read the answer: {}", err);
            false
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use tickbox::task::DueKind;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_add() {
        let cli = Cli::try_parse_from(["tickbox", "add", "home", "Water plants", "--priority", "high", "--due-by", "2024-06-01"]).unwrap();
        match cli.command {
            Commands::Add { list, title, priority, due_on, due_by } => {
                assert_eq!(list, "home");
                assert_eq!(title, "Water plants");
                assert_eq!(priority, Priority::HIGH);
                assert!(due_on.is_none());
                assert_eq!(due_by.as_deref(), Some("2024-06-01"));
            },
            other => panic!("Unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["tickbox", "add", "home", "x", "--due-on", "today", "--due-by", "today"]).is_err());
    }

    #[test]
    fn parse_show_and_ids() {
        let cli = Cli::try_parse_from(["tickbox", "show", "work", "--sort", "done,title"]).unwrap();
        match cli.command {
            Commands::Show { list, sort } => {
                assert_eq!(list, "work");
                assert_eq!(sort, vec![SortKey::Done, SortKey::Title]);
            },
            other => panic!("Unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["tickbox", "--url", "http://example.com/api/", "done", "12"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("http://example.com/api/"));
        assert!(matches!(cli.command, Commands::Done { id } if id == TaskId::from(12)));

        let cli = Cli::try_parse_from(["tickbox", "task", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Task { id } if id == TaskId::from(3)));

        assert!(Cli::try_parse_from(["tickbox", "rm", "twelve"]).is_err());
        assert!(Cli::try_parse_from(["tickbox", "add-list", "garden", "--colour", "nope"]).is_err());
    }

    #[test]
    fn parse_edit() {
        let cli = Cli::try_parse_from(["tickbox", "edit", "8", "--priority", "low", "--due-on", "2024-06-01T09:30", "--list", "work"]).unwrap();
        match cli.command {
            Commands::Edit { id, priority, due_on, due_by, no_due, list } => {
                assert_eq!(id, TaskId::from(8));
                assert_eq!(priority, Some(Priority::LOW));
                assert_eq!(due_on.as_deref(), Some("2024-06-01T09:30"));
                assert!(due_by.is_none());
                assert!(no_due == false);
                assert_eq!(list.as_deref(), Some("work"));
            },
            other => panic!("Unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["tickbox", "edit", "8", "--no-due"]).unwrap();
        assert!(matches!(cli.command, Commands::Edit { no_due: true, priority: None, .. }));

        assert!(Cli::try_parse_from(["tickbox", "edit", "8", "--no-due", "--due-by", "today"]).is_err());
        assert!(Cli::try_parse_from(["tickbox", "edit", "8", "--due-on", "today", "--due-by", "today"]).is_err());
        assert!(Cli::try_parse_from(["tickbox", "edit", "8", "--priority", "urgent"]).is_err());
    }

    #[test]
    fn edits_become_partial_changes() {
        let now = Local::now();

        let change = task_change(Some(Priority::HIGHEST), None, None, false, None, &now).unwrap();
        assert_eq!(change.priority(), Some(Priority::HIGHEST));
        assert!(change.due().is_none());

        let change = task_change(None, None, None, true, None, &now).unwrap();
        assert_eq!(change.due(), Some(None));

        let change = task_change(None, None, Some("2024-06-01"), false, Some("work".to_string()), &now).unwrap();
        let due = change.due().unwrap().unwrap();
        assert_eq!(due.kind(), DueKind::By);
        assert!(due.is_all_day());
        assert_eq!(change.list(), Some("work"));

        assert!(task_change(None, None, None, false, None, &now).unwrap().is_empty());
        assert!(task_change(None, Some("someday"), None, false, None, &now).is_err());
    }
}
