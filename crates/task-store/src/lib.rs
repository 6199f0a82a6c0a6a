//! Taskflow Core
//!
//! Layered like the app itself:
//! - domain: tasks, subtasks and their identifiers
//! - backend: the remote-service seam (data store, AI functions, search)
//! - store: optimistic task/subtask state shared by every view
//! - search / avatar: view-local rules that need no store

mod avatar;
mod backend;
mod domain;
mod error;
mod search;
mod store;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

pub use avatar::{avatar_path, cache_busted, validate_avatar, AVATAR_BUCKET, MAX_AVATAR_BYTES};
pub use backend::{
    DetachedTask, SemanticSearch, Spawner, TaskBackend, FN_GENERATE_EMBEDDING, FN_GENERATE_SUBTASKS,
    FN_SMART_SEARCH, SUBTASKS_TABLE, TASKS_TABLE,
};
pub use domain::{
    Entity, NewSubtask, NewTask, Priority, Subtask, SubtaskId, Task, TaskField, TaskId, TaskPatch,
    TaskStatus, TEMP_ID_PREFIX,
};
pub use error::{BackendError, BackendResult, UnknownVariant, UploadError};
pub use search::{filter_relevant, run_search, SearchPanel, SearchPhase, SearchResult, SIMILARITY_FLOOR};
pub use store::{ListenerId, StoreState, TaskFlags, TaskStore};
