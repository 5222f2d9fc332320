// Read-only task listings

use crate::models::{Task, TaskId, TaskStatus};
use std::fmt;

const RULE_WIDTH: usize = 30;

/// Snapshot of the tasks matching a status filter, in store order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub filter: Option<TaskStatus>,
    /// Set when the store held no tasks at all, as opposed to none matching
    pub store_was_empty: bool,
    pub entries: Vec<(TaskId, Task)>,
}

impl Listing {
    pub fn title(&self) -> String {
        match self.filter {
            None => "All Tasks".to_string(),
            Some(status) => format!("{} Tasks", status.label()),
        }
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.store_was_empty {
            return write!(f, "No tasks found");
        }

        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f)?;
        writeln!(f, "{}:", self.title())?;
        write!(f, "{}", rule)?;

        for (id, task) in &self.entries {
            writeln!(f)?;
            writeln!(f, "ID: {}", id)?;
            writeln!(f, "Text: {}", task.text)?;
            writeln!(f, "Status: {}", task.status)?;
            writeln!(f, "Created: {}", task.created_at)?;
            if let Some(updated_at) = &task.updated_at {
                writeln!(f, "Updated: {}", updated_at)?;
            }
            write!(f, "{}", rule)?;
        }

        Ok(())
    }
}
