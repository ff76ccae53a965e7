use thiserror::Error;

/// Errors produced by the task lifecycle manager. The original dashboard
/// silently no-opped on missing rows and absent timers; here every guard
/// clause surfaces as an explicit variant so caller bugs are visible.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation referenced a task id that does not exist.
    #[error("task {0} not found")]
    NotFound(i64),

    /// A timer or rating operation was attempted while the task was not in
    /// the required state.
    #[error("task {task}: {reason}")]
    InvalidState { task: i64, reason: &'static str },

    /// Input was rejected before touching the store.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
