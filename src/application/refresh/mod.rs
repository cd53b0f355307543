pub mod scheduler;
pub mod state;

pub use scheduler::{
    DEFAULT_REFRESH_INTERVAL, DEFAULT_WINDOW_DAYS, RefreshConfig, RefreshScheduler, ScheduleHandle,
};
pub use state::{RefreshFailure, RefreshState, RefreshStatus};
