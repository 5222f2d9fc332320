// Errors reported by task operations

use crate::models::TaskId;
use thiserror::Error;

/// A rejected operation; the store is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task description cannot be empty")]
    Validation,

    #[error("Task ID {0} not found")]
    NotFound(TaskId),

    #[error("No task IDs left: the largest ID is already in use")]
    IdsExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(TaskError::Validation.to_string(), "Task description cannot be empty");
        assert_eq!(TaskError::NotFound(7).to_string(), "Task ID 7 not found");
        assert!(TaskError::IdsExhausted.to_string().starts_with("No task IDs left"));
    }
}
