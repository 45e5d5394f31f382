// Task store with write-through persistence to a single slot

use crate::clock::{Clock, SystemClock};
use crate::filter::Filter;
use crate::ids::{IdGenerator, UuidV7Ids};
use crate::slot::{FileSlot, Slot};
use crate::task::{Task, TaskId};
use eyre::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default slot name, matching the storage key of the web app
pub const DEFAULT_SLOT: &str = "tasks";

/// Remaining (not completed) and total task counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub remaining: usize,
    pub total: usize,
}

/// Ordered collection of tasks kept in sync with a persisted slot
///
/// Every mutation writes the whole collection back to the slot before
/// returning. If that write fails the mutation is undone, so the in-memory
/// tasks and the slot never disagree.
pub struct TaskStore {
    tasks: Vec<Task>,
    slot: Box<dyn Slot>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl TaskStore {
    /// Open the default slot in `dir` with UUIDv7 ids and the system clock
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let slot = FileSlot::new(dir, DEFAULT_SLOT)?;
        Ok(Self::load(slot))
    }

    /// Load tasks from `slot` with UUIDv7 ids and the system clock
    pub fn load(slot: impl Slot + 'static) -> Self {
        Self::load_with(slot, UuidV7Ids, SystemClock)
    }

    /// Load tasks from `slot`
    ///
    /// Never fails: a missing slot, an unreadable slot or unparsable content
    /// all yield an empty store. Individual malformed records, records with
    /// blank text and repeated ids are skipped.
    pub fn load_with(slot: impl Slot + 'static, mut ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        let tasks = match slot.read() {
            Ok(Some(raw)) => Self::decode(slot.name(), &raw),
            Ok(None) => {
                debug!(slot = slot.name(), "Slot is empty, starting with no tasks");
                Vec::new()
            }
            Err(e) => {
                warn!(slot = slot.name(), error = ?e, "Failed to read slot, starting with no tasks");
                Vec::new()
            }
        };

        for task in &tasks {
            ids.observe(&task.id);
        }

        Self {
            tasks,
            slot: Box::new(slot),
            ids: Box::new(ids),
            clock: Box::new(clock),
        }
    }

    fn decode(slot_name: &str, raw: &str) -> Vec<Task> {
        let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(slot = slot_name, error = ?e, "Persisted tasks are unparsable, starting with no tasks");
                return Vec::new();
            }
        };

        let mut tasks = Vec::with_capacity(values.len());
        let mut seen = HashSet::new();

        for (index, value) in values.into_iter().enumerate() {
            let task: Task = match serde_json::from_value(value) {
                Ok(task) => task,
                Err(e) => {
                    warn!(slot = slot_name, index, error = ?e, "Failed to parse task, skipping");
                    continue;
                }
            };

            if Task::is_blank(&task.text) {
                warn!(slot = slot_name, index, id = %task.id, "Task has blank text, skipping");
                continue;
            }

            if !seen.insert(task.id.clone()) {
                warn!(slot = slot_name, index, id = %task.id, "Duplicate task id, skipping");
                continue;
            }

            tasks.push(task);
        }

        info!(slot = slot_name, count = tasks.len(), "Loaded tasks");
        tasks
    }

    /// Write the current tasks to the slot
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.tasks).context("Failed to serialize tasks")?;
        self.slot
            .write(&json)
            .with_context(|| format!("Failed to persist tasks to slot {}", self.slot.name()))
    }

    /// Persist, undoing the in-memory change if the write fails
    fn commit(&mut self, undo: impl FnOnce(&mut Vec<Task>)) -> Result<()> {
        if let Err(e) = self.save() {
            undo(&mut self.tasks);
            warn!(slot = self.slot.name(), error = ?e, "Persist failed, mutation rolled back");
            return Err(e);
        }
        Ok(())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task
    ///
    /// Returns `None` without touching the store when `text` is blank.
    pub fn add(&mut self, text: &str) -> Result<Option<TaskId>> {
        if Task::is_blank(text) {
            debug!("add: blank text ignored");
            return Ok(None);
        }

        let id = self.fresh_id();
        let task = Task::new(id.clone(), text, self.clock.now());
        self.tasks.push(task);
        self.commit(|tasks| {
            tasks.pop();
        })?;

        debug!(id = %id, "add: task created");
        Ok(Some(id))
    }

    /// Flip `completed` on the task with `id`
    ///
    /// Returns false when no task matches.
    pub fn toggle(&mut self, id: &TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(id = %id, "toggle: no such task");
            return Ok(false);
        };

        self.tasks[index].completed = !self.tasks[index].completed;
        self.commit(|tasks| tasks[index].completed = !tasks[index].completed)?;

        debug!(id = %id, completed = self.tasks[index].completed, "toggle: task updated");
        Ok(true)
    }

    /// Remove the task with `id`, keeping the order of the rest
    ///
    /// Returns false when no task matches.
    pub fn remove(&mut self, id: &TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(id = %id, "remove: no such task");
            return Ok(false);
        };

        let removed = self.tasks.remove(index);
        self.commit(|tasks| tasks.insert(index, removed))?;

        debug!(id = %id, "remove: task deleted");
        Ok(true)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Tasks matching `filter`, in insertion order
    pub fn filtered_view(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    pub fn counts(&self) -> Counts {
        Counts {
            remaining: self.tasks.iter().filter(|task| !task.completed).count(),
            total: self.tasks.len(),
        }
    }

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn slot_name(&self) -> &str {
        self.slot.name()
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    /// Next generated id that no existing task uses
    fn fresh_id(&mut self) -> TaskId {
        loop {
            let id = self.ids.next_id();
            if self.position(&id).is_none() {
                return id;
            }
            debug!(id = %id, "Generated id already in use, drawing another");
        }
    }
}
