// Data models for the task tracker

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a task; the key of the persisted mapping
pub type TaskId = u64;

/// A single trackable unit of work
///
/// The id is not part of the record: it is the key the task is stored under.
/// Timestamps are kept as the ISO-8601 text found in the file; only new ones
/// are produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Task {
    /// Create a task with status `not_done` and both timestamps set to now
    pub fn new(text: impl Into<String>) -> Self {
        let now = format_timestamp(now());
        Self {
            text: text.into(),
            status: TaskStatus::NotDone,
            created_at: now.clone(),
            updated_at: Some(now),
        }
    }

    /// Refresh `updated_at`, never moving it backwards
    ///
    /// A previous timestamp later than the clock (or an unreadable one that
    /// cannot be compared) is only replaced when it is older than now.
    pub fn touch(&mut self) {
        let now = now();
        let floor = [Some(self.created_at.as_str()), self.updated_at.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(parse_timestamp)
            .max();

        self.updated_at = match floor {
            Some(floor) if floor > now => Some(format_timestamp(floor)),
            _ => Some(format_timestamp(now)),
        };
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotDone,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotDone => "not_done",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Human-readable label used in listing titles
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotDone => "Not Done",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current local time, the timestamp every task field is stamped with
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Render a timestamp the way new tasks are written: `2024-05-01T09:30:12.123456`
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Read an ISO-8601-like timestamp
///
/// Accepts `T` or space separators, optional fractional seconds, and an
/// optional `Z` or `+hh:mm` offset (dropped, the wall-clock time is kept).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .or_else(|| DateTime::parse_from_str(s, fmt).ok().map(|ts| ts.naive_local()))
    })
}
