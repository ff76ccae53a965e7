use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{Priority, Status, Task};

const TASK_COLUMNS: &str = "id, title, assignee, company, category, priority, status, \
     planned_date, estimated_hours, accumulated_hours, timer_start, rating, feedback, created_at";

/// Fields supplied when inserting a new task. Lifecycle fields (status,
/// hours, timer) are owned by the manager and never passed in here.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub assignee: String,
    pub company: String,
    pub category: String,
    pub priority: Priority,
    pub planned_date: NaiveDate,
    pub estimated_hours: f64,
}

/// Initialize the task table, adding any columns an older database file is
/// missing. Ratings and companies arrived in later iterations of the
/// dashboard, so existing files may predate them.
pub fn init(db: &Connection) -> Result<()> {
    db.execute(
        "CREATE TABLE IF NOT EXISTS task (
                  id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                  title              TEXT NOT NULL,
                  assignee           TEXT NOT NULL,
                  company            TEXT NOT NULL DEFAULT '',
                  category           TEXT NOT NULL DEFAULT '',
                  priority           TEXT NOT NULL DEFAULT 'Medium',
                  status             TEXT NOT NULL,
                  planned_date       TEXT NOT NULL,
                  estimated_hours    REAL NOT NULL DEFAULT 1.0,
                  accumulated_hours  REAL NOT NULL DEFAULT 0.0,
                  timer_start        TEXT,
                  rating             INTEGER,
                  feedback           TEXT,
                  created_at         TEXT NOT NULL
                  )",
        [],
    )?;

    add_column_if_missing(db, "company", "TEXT NOT NULL DEFAULT ''")?;
    add_column_if_missing(db, "priority", "TEXT NOT NULL DEFAULT 'Medium'")?;
    add_column_if_missing(db, "rating", "INTEGER")?;
    add_column_if_missing(db, "feedback", "TEXT")?;

    Ok(())
}

fn add_column_if_missing(db: &Connection, name: &str, definition: &str) -> Result<()> {
    let mut stmt = db.prepare("SELECT name FROM pragma_table_info('task')")?;
    let existing = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if !existing.iter().any(|c| c == name) {
        db.execute(
            &format!("ALTER TABLE task ADD COLUMN {} {}", name, definition),
            [],
        )?;
    }
    Ok(())
}

/// Insert a new task in its initial lifecycle state and return its id.
pub fn insert_task(db: &Connection, new: &NewTask, created_at: DateTime<Utc>) -> Result<i64> {
    db.execute(
        "INSERT INTO task (title, assignee, company, category, priority, status, \
         planned_date, estimated_hours, accumulated_hours, timer_start, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0.0, NULL, ?9)",
        params![
            new.title,
            new.assignee,
            new.company,
            new.category,
            new.priority,
            Status::ToDo,
            new.planned_date,
            new.estimated_hours,
            created_at,
        ],
    )?;
    Ok(db.last_insert_rowid())
}

/// Fetch a task by id.
pub fn get_task(db: &Connection, id: i64) -> Result<Option<Task>> {
    let task = db
        .query_row(
            &format!("SELECT {} FROM task WHERE id = ?1", TASK_COLUMNS),
            params![id],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

/// All tasks, oldest first.
pub fn list_tasks(db: &Connection) -> Result<Vec<Task>> {
    let mut stmt = db.prepare(&format!("SELECT {} FROM task ORDER BY id", TASK_COLUMNS))?;
    let rows = stmt.query_map([], task_from_row)?;

    let mut tasks = Vec::new();
    for task in rows {
        tasks.push(task?);
    }
    Ok(tasks)
}

/// Write the (status, timer_start, accumulated_hours) triple. Used by every
/// timer transition.
pub fn update_timer_fields(
    db: &Connection,
    id: i64,
    status: Status,
    timer_start: Option<DateTime<Utc>>,
    accumulated_hours: f64,
) -> Result<()> {
    db.execute(
        "UPDATE task SET status = ?1, timer_start = ?2, accumulated_hours = ?3 WHERE id = ?4",
        params![status, timer_start, accumulated_hours, id],
    )?;
    Ok(())
}

/// Overwrite the rating and feedback. No history is kept.
pub fn update_rating(db: &Connection, id: i64, rating: u8, feedback: Option<&str>) -> Result<()> {
    db.execute(
        "UPDATE task SET rating = ?1, feedback = ?2 WHERE id = ?3",
        params![rating, feedback, id],
    )?;
    Ok(())
}

/// Bulk edit: overwrite status, assignee and logged hours wholesale. The
/// timer mark is deliberately left untouched, matching the dashboard's edit
/// form.
pub fn update_edit_fields(
    db: &Connection,
    id: i64,
    status: Status,
    assignee: &str,
    accumulated_hours: f64,
) -> Result<()> {
    db.execute(
        "UPDATE task SET status = ?1, assignee = ?2, accumulated_hours = ?3 WHERE id = ?4",
        params![status, assignee, accumulated_hours, id],
    )?;
    Ok(())
}

/// Map a row selected with [`TASK_COLUMNS`] to a [`Task`].
fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        assignee: row.get(2)?,
        company: row.get(3)?,
        category: row.get(4)?,
        priority: row.get(5)?,
        status: row.get(6)?,
        planned_date: row.get(7)?,
        estimated_hours: row.get(8)?,
        accumulated_hours: row.get(9)?,
        timer_start: row.get(10)?,
        rating: row.get(11)?,
        feedback: row.get(12)?,
        created_at: row.get(13)?,
    })
}
