//! Supabase Backend
//!
//! Implements the task store's remote seam on top of the SDK commands.

use async_trait::async_trait;
use task_store::{
    BackendResult, NewSubtask, NewTask, SearchResult, SemanticSearch, Subtask, SubtaskId, Task,
    TaskBackend, TaskId, TaskPatch,
};

use crate::commands;

#[derive(Clone, Copy, Debug, Default)]
pub struct SupabaseBackend;

#[async_trait(?Send)]
impl TaskBackend for SupabaseBackend {
    async fn list_tasks(&self) -> BackendResult<Vec<Task>> {
        commands::list_tasks().await
    }

    async fn create_task(&self, draft: &NewTask) -> BackendResult<Task> {
        commands::create_task(draft).await
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> BackendResult<()> {
        commands::update_task(id, patch).await
    }

    async fn delete_task(&self, id: &TaskId) -> BackendResult<()> {
        commands::delete_task(id).await
    }

    async fn list_subtasks(&self, task_id: &TaskId) -> BackendResult<Vec<Subtask>> {
        commands::list_subtasks(task_id).await
    }

    async fn create_subtasks(&self, drafts: &[NewSubtask]) -> BackendResult<Vec<Subtask>> {
        commands::create_subtasks(drafts).await
    }

    async fn set_subtask_completed(&self, id: &SubtaskId, is_completed: bool) -> BackendResult<()> {
        commands::set_subtask_completed(id, is_completed).await
    }

    async fn generate_embedding(&self, text: &str) -> BackendResult<Option<Vec<f32>>> {
        commands::generate_embedding(text).await
    }

    async fn attach_embedding(&self, id: &TaskId, embedding: &[f32]) -> BackendResult<()> {
        commands::attach_embedding(id, embedding).await
    }

    async fn generate_subtask_titles(&self, task_title: &str) -> BackendResult<Vec<String>> {
        commands::generate_subtasks(task_title).await
    }
}

#[async_trait(?Send)]
impl SemanticSearch for SupabaseBackend {
    async fn smart_search(&self, query: &str, user_id: Option<&str>) -> BackendResult<Vec<SearchResult>> {
        commands::smart_search(query, user_id).await
    }
}
