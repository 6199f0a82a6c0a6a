//! Remote Service Seam
//!
//! Abstract interfaces for the backend-as-a-service platform. The browser build
//! implements them on top of the JS SDK; tests use an in-memory mock.
//!
//! The client runs on a single-threaded event loop, so futures are `?Send`.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::{NewSubtask, NewTask, Subtask, SubtaskId, Task, TaskId, TaskPatch};
use crate::error::BackendResult;
use crate::search::SearchResult;

/// Table names in the remote data store
pub const TASKS_TABLE: &str = "tasks";
pub const SUBTASKS_TABLE: &str = "subtasks";

/// Invokable remote function names
pub const FN_GENERATE_EMBEDDING: &str = "generate-embedding";
pub const FN_GENERATE_SUBTASKS: &str = "generate-subtasks";
pub const FN_SMART_SEARCH: &str = "smart-search";

/// Data and AI calls the task store depends on
#[async_trait(?Send)]
pub trait TaskBackend {
    /// All tasks of the current session, newest first
    async fn list_tasks(&self) -> BackendResult<Vec<Task>>;

    /// Insert a task and return the persisted row
    async fn create_task(&self, draft: &NewTask) -> BackendResult<Task>;

    /// Persist a partial update
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> BackendResult<()>;

    async fn delete_task(&self, id: &TaskId) -> BackendResult<()>;

    /// Subtasks of one task, oldest first
    async fn list_subtasks(&self, task_id: &TaskId) -> BackendResult<Vec<Subtask>>;

    /// Insert a batch of subtasks and return the persisted rows
    async fn create_subtasks(&self, drafts: &[NewSubtask]) -> BackendResult<Vec<Subtask>>;

    async fn set_subtask_completed(&self, id: &SubtaskId, is_completed: bool) -> BackendResult<()>;

    /// `generate-embedding`. `None` when the function returned no vector.
    async fn generate_embedding(&self, text: &str) -> BackendResult<Option<Vec<f32>>>;

    /// Store an embedding on a persisted task
    async fn attach_embedding(&self, id: &TaskId, embedding: &[f32]) -> BackendResult<()>;

    /// `generate-subtasks`: subtask titles proposed for a task title
    async fn generate_subtask_titles(&self, task_title: &str) -> BackendResult<Vec<String>>;
}

/// Semantic search over the user's tasks
#[async_trait(?Send)]
pub trait SemanticSearch {
    /// `smart-search`: ranked results, unfiltered
    async fn smart_search(&self, query: &str, user_id: Option<&str>) -> BackendResult<Vec<SearchResult>>;
}

/// A detached unit of work whose outcome nobody awaits
pub type DetachedTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Runs detached work on the host executor
pub trait Spawner {
    fn spawn_detached(&self, task: DetachedTask);
}

impl<F> Spawner for F
where
    F: Fn(DetachedTask),
{
    fn spawn_detached(&self, task: DetachedTask) {
        self(task)
    }
}
