use std::path::PathBuf;

use anyhow::anyhow;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::Connection;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use titan::cli::{Command::*, CommandLineArgs};
use titan::store::NewTask;
use titan::{config, interface, Manager};

fn find_default_db_file() -> Option<PathBuf> {
    if let Some(base_dirs) = ProjectDirs::from("com", "titan", "titan") {
        let root_dir = base_dirs.data_dir();
        if !root_dir.exists() {
            std::fs::create_dir_all(root_dir).expect("Failed to create directory.");
        }
        let mut path = PathBuf::from(root_dir);
        path.push("tasks.sqlite");
        Some(path)
    } else {
        None
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let CommandLineArgs {
        action,
        db_file,
        config,
    } = CommandLineArgs::from_args();

    let config = config::load(config.as_deref())?;

    let db_file = db_file
        .or_else(find_default_db_file)
        .ok_or_else(|| anyhow!("Failed to find task database file."))?;
    let conn = Connection::open(&db_file)?;
    let mut mgr = Manager::new(conn, config.timer.mode)?;

    match action {
        Add {
            title,
            assignee,
            company,
            category,
            priority,
            due,
            estimate,
        } => interface::add_task(
            &mut mgr,
            &config,
            NewTask {
                title,
                assignee: assignee.unwrap_or_default(),
                company,
                category,
                priority,
                planned_date: due.unwrap_or_else(|| Utc::now().naive_utc().date()),
                estimated_hours: estimate,
            },
        ),
        Start { id } => interface::start(&mut mgr, id),
        Pause { id } => interface::pause(&mut mgr, id),
        Stop { id } => interface::stop(&mut mgr, id),
        Toggle { id } => interface::toggle(&mut mgr, id),
        Rate {
            id,
            rating,
            feedback,
        } => interface::rate(&mut mgr, &config, id, rating, feedback),
        Edit {
            id,
            status,
            assignee,
            hours,
        } => interface::edit(&mut mgr, id, status, assignee, hours),
        List => interface::list(&mgr),
    }?;
    Ok(())
}
