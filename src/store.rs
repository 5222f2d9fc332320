// Task store backed by a single pretty-printed JSON file

use crate::error::TaskError;
use crate::listing::Listing;
use crate::models::{Task, TaskId, TaskStatus};
use eyre::{Context, Result};
use indexmap::IndexMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default file name, relative to the working directory
pub const DEFAULT_FILE: &str = "tasks.json";

/// In-memory mapping of task ids to tasks, loaded from and saved to one file
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    tasks: IndexMap<TaskId, Task>,
}

/// Result of reading the persisted file
enum Loaded {
    Tasks(IndexMap<TaskId, Task>),
    NotAMapping,
    Missing,
    Corrupt(String),
}

impl Store {
    /// Load the store from `path`
    ///
    /// A missing or unparsable file is not an error: the store starts empty and
    /// a fresh `{}` file is written in its place. Valid JSON that is not an
    /// object is treated as an empty store and left on disk until the next save.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let tasks = match Self::read_tasks(&path)? {
            Loaded::Tasks(tasks) => {
                debug!(path = ?path, count = tasks.len(), "Loaded tasks");
                tasks
            }
            Loaded::NotAMapping => {
                warn!(path = ?path, "Task file does not contain a mapping, starting empty");
                IndexMap::new()
            }
            Loaded::Missing => {
                info!(path = ?path, "Task file not found, creating an empty one");
                Self::reset(&path)?
            }
            Loaded::Corrupt(reason) => {
                warn!(path = ?path, error = %reason, "Task file is corrupt, resetting to empty");
                Self::reset(&path)?
            }
        };

        Ok(Self { path, tasks })
    }

    /// Write the whole store back to its file
    ///
    /// The file is replaced atomically: contents go to a sibling temporary
    /// file which is then renamed over the target.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.tasks).context("Failed to serialize tasks")?;
        write_atomic(&self.path, &json)?;
        debug!(path = ?self.path, count = self.tasks.len(), "Saved tasks");
        Ok(())
    }

    fn read_tasks(path: &Path) -> Result<Loaded> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Loaded::Missing),
            Err(e) if e.kind() == ErrorKind::InvalidData => return Ok(Loaded::Corrupt(e.to_string())),
            Err(e) => return Err(e).wrap_err_with(|| format!("Failed to read task file {:?}", path)),
        };

        // Deserialize straight from text so the file's key order is kept
        match serde_json::from_str::<IndexMap<TaskId, Task>>(&content) {
            Ok(tasks) => Ok(Loaded::Tasks(tasks)),
            Err(err) => match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(value) if !value.is_object() => Ok(Loaded::NotAMapping),
                _ => Ok(Loaded::Corrupt(err.to_string())),
            },
        }
    }

    fn reset(path: &Path) -> Result<IndexMap<TaskId, Task>> {
        let tasks = IndexMap::new();
        let json = serde_json::to_string_pretty(&tasks).context("Failed to serialize tasks")?;
        write_atomic(path, &json)?;
        Ok(tasks)
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Add a task and return its id
    ///
    /// The id is one more than the largest id in the store, so ids freed by
    /// deleting the newest task are handed out again.
    pub fn add(&mut self, text: &str) -> Result<TaskId, TaskError> {
        let text = validate_text(text)?;
        let id = self.next_id().ok_or(TaskError::IdsExhausted)?;
        self.tasks.insert(id, Task::new(text));
        debug!(id, "Added task");
        Ok(id)
    }

    /// Look a task up by id
    pub fn lookup(&self, id: TaskId) -> Result<&Task, TaskError> {
        self.tasks.get(&id).ok_or(TaskError::NotFound(id))
    }

    /// Replace the text of a task
    pub fn update(&mut self, id: TaskId, text: &str) -> Result<(), TaskError> {
        self.lookup(id)?;
        let text = validate_text(text)?;

        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.text = text.to_string();
        task.touch();
        debug!(id, "Updated task text");
        Ok(())
    }

    /// Remove a task
    pub fn delete(&mut self, id: TaskId) -> Result<(), TaskError> {
        self.tasks.shift_remove(&id).ok_or(TaskError::NotFound(id))?;
        debug!(id, "Deleted task");
        Ok(())
    }

    /// Change the status of a task
    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> Result<(), TaskError> {
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.status = status;
        task.touch();
        debug!(id, status = %status, "Changed task status");
        Ok(())
    }

    /// Tasks with the given status, or all tasks, in store order
    pub fn list(&self, filter: Option<TaskStatus>) -> Listing {
        let entries = self
            .tasks
            .iter()
            .filter(|(_, task)| match filter {
                Some(status) => task.status == status,
                None => true,
            })
            .map(|(id, task)| (*id, task.clone()))
            .collect();

        Listing {
            filter,
            store_was_empty: self.tasks.is_empty(),
            entries,
        }
    }

    // ========================================================================
    // Read helpers
    // ========================================================================

    /// Id the next added task will receive, `None` once the largest id is taken
    pub fn next_id(&self) -> Option<TaskId> {
        self.tasks.keys().max().copied().unwrap_or(0).checked_add(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &Task)> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn validate_text(text: &str) -> Result<&str, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskError::Validation);
    }
    Ok(text)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).context("Failed to create task file directory")?;
        }
    }

    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_else(|| DEFAULT_FILE.into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = File::create(&tmp_path).context("Failed to create temporary task file")?;
    file.write_all(contents.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path).wrap_err_with(|| format!("Failed to replace task file {:?}", path))?;
    Ok(())
}
