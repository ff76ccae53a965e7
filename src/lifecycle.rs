use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::model::{Status, Task};
use crate::store::{self, NewTask};

/// Which timer state machine the manager exposes.
///
/// The dashboard shipped two over its iterations: an early two-state toggle
/// (running / not running, stopping marks the task done) and a later
/// three-state start/pause/stop. Neither was ever reconciled, so both are
/// kept and selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    /// Explicit start, pause and stop commands.
    ThreeState,
    /// A single toggle command that starts or stops the timer.
    Toggle,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::ThreeState
    }
}

/// Owns the correctness of each task's (status, timer_start,
/// accumulated_hours) triple. Every mutation is a single transaction, so a
/// timer transition is an atomic read-modify-write even though the store
/// executes it as separate statements.
///
/// Assumes at most one in-flight mutation per task at a time; the
/// transaction closes the read/write race between two sessions but not the
/// question of which of two simultaneous stops "wins."
pub struct Manager<C: Clock = SystemClock> {
    conn: Connection,
    clock: C,
    mode: TimerMode,
}

impl Manager<SystemClock> {
    /// Build a manager over an open database, initializing the schema.
    pub fn new(conn: Connection, mode: TimerMode) -> Result<Self> {
        Manager::with_clock(conn, mode, SystemClock)
    }
}

impl<C: Clock> Manager<C> {
    pub fn with_clock(conn: Connection, mode: TimerMode, clock: C) -> Result<Self> {
        store::init(&conn)?;
        Ok(Manager { conn, clock, mode })
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// The injected clock. Tests use this to advance a [`ManualClock`].
    ///
    /// [`ManualClock`]: crate::clock::ManualClock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert a new task in `To Do` with zero logged hours and no timer.
    /// Field content is not validated; the dashboard accepted empty titles
    /// and so do we.
    pub fn create(&mut self, new: &NewTask) -> Result<i64> {
        let now = self.clock.now();
        let tx = self.conn.transaction()?;
        let id = store::insert_task(&tx, new, now)?;
        tx.commit()?;
        debug!(id, title = %new.title, "task created");
        Ok(id)
    }

    /// Fetch one task.
    pub fn task(&self, id: i64) -> Result<Task> {
        store::get_task(&self.conn, id)?.ok_or(Error::NotFound(id))
    }

    /// All tasks, oldest first.
    pub fn tasks(&self) -> Result<Vec<Task>> {
        store::list_tasks(&self.conn)
    }

    /// Start the timer: set the start mark and move to `In Progress`.
    ///
    /// A redundant start while the timer is already running is ignored
    /// rather than overwriting the mark, which would silently lose the
    /// elapsed interval.
    pub fn start_timer(&mut self, id: i64) -> Result<()> {
        self.require_mode(TimerMode::ThreeState, id, "start is not available in toggle mode")?;
        let now = self.clock.now();
        let tx = self.conn.transaction()?;
        let task = store::get_task(&tx, id)?.ok_or(Error::NotFound(id))?;

        if task.timer_start.is_some() {
            warn!(id, "timer already running, ignoring redundant start");
            return Ok(());
        }
        if task.status == Status::Done {
            return Err(Error::InvalidState {
                task: id,
                reason: "task is already done",
            });
        }

        store::update_timer_fields(
            &tx,
            id,
            Status::InProgress,
            Some(now),
            task.accumulated_hours,
        )?;
        tx.commit()?;
        debug!(id, "timer started");
        Ok(())
    }

    /// Pause the timer: bank the elapsed interval, clear the start mark,
    /// stay `In Progress`.
    pub fn pause_timer(&mut self, id: i64) -> Result<()> {
        self.require_mode(TimerMode::ThreeState, id, "pause is not available in toggle mode")?;
        self.halt_timer(id, Status::InProgress)
    }

    /// Stop the timer: bank the elapsed interval and mark the task `Done`.
    /// This is the only timer path to `Done`.
    pub fn stop_timer(&mut self, id: i64) -> Result<()> {
        self.require_mode(TimerMode::ThreeState, id, "stop is not available in toggle mode")?;
        self.halt_timer(id, Status::Done)
    }

    /// Legacy two-state control: start the timer if it is not running,
    /// otherwise stop it and mark the task done. There is no pause.
    pub fn toggle_timer(&mut self, id: i64) -> Result<()> {
        self.require_mode(TimerMode::Toggle, id, "toggle is not available in three-state mode")?;
        let now = self.clock.now();
        let tx = self.conn.transaction()?;
        let task = store::get_task(&tx, id)?.ok_or(Error::NotFound(id))?;

        match task.timer_start {
            None => {
                if task.status == Status::Done {
                    return Err(Error::InvalidState {
                        task: id,
                        reason: "task is already done",
                    });
                }
                store::update_timer_fields(
                    &tx,
                    id,
                    Status::InProgress,
                    Some(now),
                    task.accumulated_hours,
                )?;
            }
            Some(start) => {
                let total = task.accumulated_hours + elapsed_hours(start, now);
                store::update_timer_fields(&tx, id, Status::Done, None, total)?;
            }
        }
        tx.commit()?;
        debug!(id, "timer toggled");
        Ok(())
    }

    /// Rate a finished task, overwriting any prior rating.
    pub fn rate(&mut self, id: i64, rating: u8, feedback: Option<&str>) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::Validation(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }
        let tx = self.conn.transaction()?;
        let task = store::get_task(&tx, id)?.ok_or(Error::NotFound(id))?;
        if task.status != Status::Done {
            return Err(Error::InvalidState {
                task: id,
                reason: "only done tasks can be rated",
            });
        }
        store::update_rating(&tx, id, rating, feedback)?;
        tx.commit()?;
        debug!(id, rating, "task rated");
        Ok(())
    }

    /// Bulk edit: overwrite status, assignee and logged hours wholesale,
    /// bypassing the timer math. The timer mark is left untouched, exactly
    /// as the dashboard's edit form behaved, so an edit to `Done` can leave
    /// a running timer behind.
    pub fn edit(&mut self, id: i64, status: Status, assignee: &str, hours: f64) -> Result<()> {
        if hours < 0.0 {
            return Err(Error::Validation(format!(
                "logged hours cannot be negative, got {}",
                hours
            )));
        }
        let tx = self.conn.transaction()?;
        store::get_task(&tx, id)?.ok_or(Error::NotFound(id))?;
        store::update_edit_fields(&tx, id, status, assignee, hours)?;
        tx.commit()?;
        debug!(id, %status, "task edited");
        Ok(())
    }

    /// Shared pause/stop path: both bank the running interval and clear the
    /// mark, differing only in the resulting status.
    fn halt_timer(&mut self, id: i64, status: Status) -> Result<()> {
        let now = self.clock.now();
        let tx = self.conn.transaction()?;
        let task = store::get_task(&tx, id)?.ok_or(Error::NotFound(id))?;

        let start = task.timer_start.ok_or(Error::InvalidState {
            task: id,
            reason: "no timer is running",
        })?;

        let total = task.accumulated_hours + elapsed_hours(start, now);
        store::update_timer_fields(&tx, id, status, None, total)?;
        tx.commit()?;
        debug!(id, %status, hours = total, "timer halted");
        Ok(())
    }

    fn require_mode(&self, mode: TimerMode, id: i64, reason: &'static str) -> Result<()> {
        if self.mode != mode {
            return Err(Error::InvalidState { task: id, reason });
        }
        Ok(())
    }
}

/// Wall-clock span from `start` to `now` in fractional hours. Clamped at
/// zero so a skewed clock can never shrink the accumulated total.
fn elapsed_hours(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - start).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
}
