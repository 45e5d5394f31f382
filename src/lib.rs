// todostore - Ordered to-do list with write-through JSON persistence

pub mod clock;
pub mod config;
pub mod filter;
pub mod ids;
pub mod slot;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, IdScheme};
pub use filter::Filter;
pub use ids::{IdGenerator, SequentialIds, UuidV7Ids};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{Counts, DEFAULT_SLOT, TaskStore};
pub use task::{Task, TaskId};
