// tasktrack - single-user task tracker persisted in a local JSON file

pub mod command;
pub mod error;
pub mod listing;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use command::{Command, Dispatch, Prompt, Report, Request, Requests, dispatch};
pub use error::TaskError;
pub use listing::Listing;
pub use models::{Task, TaskId, TaskStatus};
pub use store::{DEFAULT_FILE, Store};
