use std::path::PathBuf;

use chrono::NaiveDate;
use structopt::StructOpt;

use crate::model::{Priority, Status};

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Create a new task.
    Add {
        /// The task title. Empty titles are allowed.
        #[structopt()]
        title: String,

        /// Who the task is for. Defaults to the configured user.
        #[structopt(short, long)]
        assignee: Option<String>,

        /// Client or company the task belongs to.
        #[structopt(short, long, default_value = "")]
        company: String,

        /// Category label (Admin, Sales, Logistics, Tech, ...).
        #[structopt(long, default_value = "")]
        category: String,

        /// Priority: low, medium or high.
        #[structopt(short, long, default_value = "medium")]
        priority: Priority,

        /// Planned date (YYYY-MM-DD). Defaults to today.
        #[structopt(long)]
        due: Option<NaiveDate>,

        /// Estimated hours.
        #[structopt(short, long, default_value = "1.0")]
        estimate: f64,
    },
    /// Start the timer on a task (three-state mode).
    Start {
        #[structopt()]
        id: i64,
    },
    /// Pause the timer, banking the elapsed time (three-state mode).
    Pause {
        #[structopt()]
        id: i64,
    },
    /// Stop the timer and mark the task done (three-state mode).
    Stop {
        #[structopt()]
        id: i64,
    },
    /// Start or stop the timer with a single command (toggle mode).
    Toggle {
        #[structopt()]
        id: i64,
    },
    /// Rate a done task from 1 to 5.
    Rate {
        #[structopt()]
        id: i64,

        #[structopt()]
        rating: u8,

        /// Free-form feedback stored with the rating.
        #[structopt(short, long)]
        feedback: Option<String>,
    },
    /// Overwrite a task's status, assignee and logged hours.
    Edit {
        #[structopt()]
        id: i64,

        /// New status: todo, in-progress or done.
        #[structopt()]
        status: Status,

        #[structopt()]
        assignee: String,

        /// New logged hours, replacing the accumulated total.
        #[structopt()]
        hours: f64,
    },
    /// List all tasks.
    List,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Titan",
    about = "Task tracking for the Titan Control ops dashboard."
)]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different task database file.
    #[structopt(parse(from_os_str), short, long)]
    pub db_file: Option<PathBuf>,

    /// Use a different config file.
    #[structopt(parse(from_os_str), long)]
    pub config: Option<PathBuf>,
}
