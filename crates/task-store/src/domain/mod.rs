//! Domain Layer
//!
//! Entities mirrored from the remote `tasks` and `subtasks` tables.

mod entity;
mod subtask;
mod task;

pub use entity::{Entity, SubtaskId, TaskId, TEMP_ID_PREFIX};
pub use subtask::{NewSubtask, Subtask};
pub use task::{NewTask, Priority, Task, TaskField, TaskPatch, TaskStatus};
