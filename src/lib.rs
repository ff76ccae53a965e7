pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod interface;
pub mod lifecycle;
pub mod model;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use lifecycle::{Manager, TimerMode};
pub use model::{Health, Priority, Status, Task};
