// Per-invocation command dispatch
//
// Exactly one operation runs per invocation. The caller hands over every
// operation it was asked for; the first one in priority order wins and the
// rest are ignored.

use crate::error::TaskError;
use crate::listing::Listing;
use crate::models::{TaskId, TaskStatus};
use crate::store::Store;
use eyre::Result;
use std::fmt;
use tracing::debug;

/// Candidate operations supplied by the front end, one slot per operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requests {
    pub add: Option<String>,
    pub update: Option<TaskId>,
    pub delete: Option<TaskId>,
    pub mark_done: Option<TaskId>,
    pub mark_in_progress: Option<TaskId>,
    pub list_done: bool,
    pub list_in_progress: bool,
    pub list_not_done: bool,
    pub list_all: bool,
}

/// The operation selected from a set of requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Add(String),
    Update(TaskId),
    Delete(TaskId),
    SetStatus(TaskId, TaskStatus),
    List(Option<TaskStatus>),
}

impl Requests {
    /// First requested operation in priority order
    pub fn first(self) -> Option<Request> {
        if let Some(text) = self.add {
            return Some(Request::Add(text));
        }
        if let Some(id) = self.update {
            return Some(Request::Update(id));
        }
        if let Some(id) = self.delete {
            return Some(Request::Delete(id));
        }
        if let Some(id) = self.mark_done {
            return Some(Request::SetStatus(id, TaskStatus::Done));
        }
        if let Some(id) = self.mark_in_progress {
            return Some(Request::SetStatus(id, TaskStatus::InProgress));
        }
        if self.list_done {
            return Some(Request::List(Some(TaskStatus::Done)));
        }
        if self.list_in_progress {
            return Some(Request::List(Some(TaskStatus::InProgress)));
        }
        if self.list_not_done {
            return Some(Request::List(Some(TaskStatus::NotDone)));
        }
        if self.list_all {
            return Some(Request::List(None));
        }
        None
    }
}

/// A fully specified operation the store can execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { text: String },
    Update { id: TaskId, text: String },
    Delete { id: TaskId },
    SetStatus { id: TaskId, status: TaskStatus },
    List { filter: Option<TaskStatus> },
}

impl Command {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::List { .. })
    }

    /// Run the command against the store
    pub fn execute(self, store: &mut Store) -> Result<Report, TaskError> {
        match self {
            Command::Add { text } => store.add(&text).map(Report::Added),
            Command::Update { id, text } => store.update(id, &text).map(|()| Report::Updated(id)),
            Command::Delete { id } => store.delete(id).map(|()| Report::Deleted(id)),
            Command::SetStatus { id, status } => store
                .set_status(id, status)
                .map(|()| Report::StatusChanged(id, status)),
            Command::List { filter } => Ok(Report::Listed(store.list(filter))),
        }
    }
}

/// Source of the replacement text for an update
pub trait Prompt {
    fn new_text(&mut self, id: TaskId) -> Result<String>;
}

/// Confirmation of a successful operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Added(TaskId),
    Updated(TaskId),
    Deleted(TaskId),
    StatusChanged(TaskId, TaskStatus),
    Listed(Listing),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Added(id) => write!(f, "Task added with ID {}", id),
            Report::Updated(id) => write!(f, "Task {} updated", id),
            Report::Deleted(id) => write!(f, "Task {} deleted", id),
            Report::StatusChanged(id, status) => write!(f, "Task {} marked as {}", id, status),
            Report::Listed(listing) => write!(f, "{}", listing),
        }
    }
}

/// What happened to a set of requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No operation was requested
    NotHandled,
    /// One operation ran, successfully or not
    Handled {
        mutating: bool,
        outcome: Result<Report, TaskError>,
    },
}

impl Dispatch {
    /// True when a mutating operation succeeded and the store must be saved
    pub fn mutated(&self) -> bool {
        matches!(self, Dispatch::Handled { mutating: true, outcome: Ok(_) })
    }
}

/// Run the first requested operation against the store
///
/// Infrastructure failures, such as the prompt failing to read input, are
/// returned as errors; rejected operations are reported in the `Dispatch`.
pub fn dispatch<P: Prompt>(store: &mut Store, requests: Requests, prompt: &mut P) -> Result<Dispatch> {
    let Some(request) = requests.first() else {
        debug!("No operation requested");
        return Ok(Dispatch::NotHandled);
    };
    debug!(?request, "Dispatching request");

    let command = match request {
        Request::Add(text) => Command::Add { text },
        Request::Update(id) => {
            // Do not prompt for a task that does not exist
            if let Err(e) = store.lookup(id) {
                return Ok(Dispatch::Handled {
                    mutating: true,
                    outcome: Err(e),
                });
            }
            let text = prompt.new_text(id)?;
            Command::Update { id, text }
        }
        Request::Delete(id) => Command::Delete { id },
        Request::SetStatus(id, status) => Command::SetStatus { id, status },
        Request::List(filter) => Command::List { filter },
    };

    let mutating = command.is_mutation();
    let outcome = command.execute(store);
    Ok(Dispatch::Handled { mutating, outcome })
}
