// Id generation for new tasks

use crate::task::TaskId;
use uuid::Uuid;

/// Source of ids for newly added tasks
///
/// The store re-draws when an id collides with an existing task, so a
/// generator only has to keep producing new values.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> TaskId;

    /// Called with every id loaded from the slot before the first `next_id`
    fn observe(&mut self, _id: &TaskId) {}
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> TaskId {
        (**self).next_id()
    }

    fn observe(&mut self, id: &TaskId) {
        (**self).observe(id)
    }
}

/// Time-ordered UUIDv7 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&mut self) -> TaskId {
        TaskId::new(Uuid::now_v7().to_string())
    }
}

/// Decimal counter ids: "1", "2", "3", ...
///
/// Observed numeric ids move the counter past them, so a reloaded store
/// continues above its highest live id.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> TaskId {
        let id = TaskId::new(self.next.to_string());
        self.next = self.next.wrapping_add(1);
        id
    }

    fn observe(&mut self, id: &TaskId) {
        if let Ok(n) = id.as_str().parse::<u64>() {
            if n >= self.next {
                self.next = n.saturating_add(1);
            }
        }
    }
}
