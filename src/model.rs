use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::Deserialize;

/// A single task, saved as a row in the task table.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub assignee: String,
    pub company: String,
    pub category: String,
    pub priority: Priority,
    pub status: Status,
    pub planned_date: NaiveDate,
    pub estimated_hours: f64,
    /// Hours logged before and excluding any currently-running interval.
    pub accumulated_hours: f64,
    /// Set iff a timer is currently running for this task.
    pub timer_start: Option<DateTime<Utc>>,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_running(&self) -> bool {
        self.timer_start.is_some()
    }

    /// Classify the task for the list view. Done tasks are judged against
    /// their estimate, pending ones against their planned date.
    pub fn health(&self, today: NaiveDate) -> Health {
        if let Status::Done = self.status {
            if self.accumulated_hours <= self.estimated_hours {
                return Health::SuperStar;
            }
            return Health::TooSlow;
        }
        if self.planned_date < today {
            return Health::Overdue;
        }
        Health::OnTrack
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    ToDo,
    InProgress,
    Done,
}

impl Status {
    /// The label stored in the database and shown in the UI.
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', " ").as_str() {
            "to do" | "todo" => Ok(Status::ToDo),
            "in progress" | "inprogress" | "doing" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| Status::from_str(s).map_err(|e| FromSqlError::Other(e.into())))
    }
}

/// Priority of a task. Descriptive only, no lifecycle constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| Priority::from_str(s).map_err(|e| FromSqlError::Other(e.into())))
    }
}

/// How a task is doing, for the list view badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    SuperStar,
    TooSlow,
    Overdue,
    OnTrack,
}

impl Health {
    pub const fn as_str(self) -> &'static str {
        match self {
            Health::SuperStar => "Super Star",
            Health::TooSlow => "Too Slow",
            Health::Overdue => "Overdue",
            Health::OnTrack => "On Track",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
