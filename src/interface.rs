use std::time::Duration as StdDuration;

use humantime::format_duration;
use prettytable::{row, Table};

use crate::clock::Clock;
use crate::config::Config;
use crate::lifecycle::Manager;
use crate::model::{Status, Task};
use crate::store::NewTask;

/// Create a task and echo it back. The configured user is the default
/// assignee.
pub fn add_task<C: Clock>(
    mgr: &mut Manager<C>,
    config: &Config,
    new: NewTask,
) -> anyhow::Result<()> {
    let mut new = new;
    if new.assignee.is_empty() {
        new.assignee = config.user.name.clone();
    }
    let id = mgr.create(&new)?;
    println!("{}. {} ({})", id, new.title, new.assignee);
    Ok(())
}

pub fn start<C: Clock>(mgr: &mut Manager<C>, id: i64) -> anyhow::Result<()> {
    mgr.start_timer(id)?;
    let task = mgr.task(id)?;
    match task.timer_start {
        Some(_) => println!("Timer running on task {}.", id),
        None => println!("Task {} has no running timer.", id),
    }
    Ok(())
}

pub fn pause<C: Clock>(mgr: &mut Manager<C>, id: i64) -> anyhow::Result<()> {
    mgr.pause_timer(id)?;
    let task = mgr.task(id)?;
    println!("Paused. {:.1}h logged on task {}.", task.accumulated_hours, id);
    Ok(())
}

pub fn stop<C: Clock>(mgr: &mut Manager<C>, id: i64) -> anyhow::Result<()> {
    mgr.stop_timer(id)?;
    let task = mgr.task(id)?;
    println!("Done. {:.1}h logged on task {}.", task.accumulated_hours, id);
    Ok(())
}

pub fn toggle<C: Clock>(mgr: &mut Manager<C>, id: i64) -> anyhow::Result<()> {
    mgr.toggle_timer(id)?;
    let task = mgr.task(id)?;
    if task.is_running() {
        println!("Timer running on task {}.", id);
    } else {
        println!("Done. {:.1}h logged on task {}.", task.accumulated_hours, id);
    }
    Ok(())
}

/// Rate a done task. Rating is an admin action; the manager itself does not
/// know about users, so the gate lives here.
pub fn rate<C: Clock>(
    mgr: &mut Manager<C>,
    config: &Config,
    id: i64,
    rating: u8,
    feedback: Option<String>,
) -> anyhow::Result<()> {
    if !config.user.admin {
        anyhow::bail!("Only admins can rate tasks.");
    }
    mgr.rate(id, rating, feedback.as_deref())?;
    println!("Task {} rated {}/5.", id, rating);
    Ok(())
}

pub fn edit<C: Clock>(
    mgr: &mut Manager<C>,
    id: i64,
    status: Status,
    assignee: String,
    hours: f64,
) -> anyhow::Result<()> {
    mgr.edit(id, status, &assignee, hours)?;
    println!("Task {} updated.", id);
    Ok(())
}

/// Print the master registry table.
pub fn list<C: Clock>(mgr: &Manager<C>) -> anyhow::Result<()> {
    let now = mgr.clock().now();
    let today = now.naive_utc().date();

    let mut table = Table::new();
    table.add_row(row![
        "id", "task", "status", "prio", "due", "assignee", "logged", "est.", "timer", "health",
        "rating"
    ]);

    for task in mgr.tasks()? {
        table.add_row(row![
            task.id,
            textwrap::fill(&task.title, 32),
            task.status,
            task.priority,
            task.planned_date,
            task.assignee,
            format!("{:.1}", task.accumulated_hours),
            format!("{:.1}", task.estimated_hours),
            fmt_timer(&task, now),
            task.health(today),
            fmt_rating(&task),
        ]);
    }

    table.printstd();
    Ok(())
}

fn fmt_timer(task: &Task, now: chrono::DateTime<chrono::Utc>) -> String {
    match task.timer_start {
        Some(start) => {
            let secs = (now - start).num_seconds().max(0) as u64;
            format!("running {}", format_duration(StdDuration::from_secs(secs)))
        }
        None => String::new(),
    }
}

fn fmt_rating(task: &Task) -> String {
    match task.rating {
        Some(r) => format!("{}/5", r),
        None => String::new(),
    }
}
