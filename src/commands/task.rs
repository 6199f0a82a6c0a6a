//! Task and Subtask Commands
//!
//! Table queries against `tasks` and `subtasks`.

use serde::Serialize;
use task_store::{
    BackendError, NewSubtask, NewTask, Priority, Subtask, SubtaskId, Task, TaskId, TaskPatch,
    TaskStatus, SUBTASKS_TABLE, TASKS_TABLE,
};

use super::{client, current_user_id, decode, encode, settle};

const TASK_COLUMNS: &str = "id,title,status,priority,created_at";
const SUBTASK_COLUMNS: &str = "id,task_id,title,is_completed,created_at";

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct OrderArgs {
    ascending: bool,
}

#[derive(Serialize)]
struct InsertTaskArgs<'a> {
    user_id: &'a str,
    title: &'a str,
    status: TaskStatus,
    priority: Priority,
}

#[derive(Serialize)]
struct EmbeddingArgs<'a> {
    embedding: &'a [f32],
}

#[derive(Serialize)]
struct CompletedArgs {
    is_completed: bool,
}

// ========================
// Task Commands
// ========================

pub async fn list_tasks() -> Result<Vec<Task>, BackendError> {
    let order = encode(&OrderArgs { ascending: false })?;
    let query = client()?.from_table(TASKS_TABLE).select(TASK_COLUMNS).order("created_at", &order);
    decode(settle(&query).await?)
}

pub async fn create_task(draft: &NewTask) -> Result<Task, BackendError> {
    let user_id = current_user_id().await?;
    let row = encode(&InsertTaskArgs {
        user_id: &user_id,
        title: &draft.title,
        status: draft.status,
        priority: draft.priority,
    })?;
    let query = client()?.from_table(TASKS_TABLE).insert(&row).select(TASK_COLUMNS).single();
    decode(settle(&query).await?)
}

pub async fn update_task(id: &TaskId, patch: &TaskPatch) -> Result<(), BackendError> {
    let values = encode(patch)?;
    let query = client()?.from_table(TASKS_TABLE).update(&values).eq("id", id.as_str());
    settle(&query).await?;
    Ok(())
}

pub async fn delete_task(id: &TaskId) -> Result<(), BackendError> {
    let query = client()?.from_table(TASKS_TABLE).delete().eq("id", id.as_str());
    settle(&query).await?;
    Ok(())
}

pub async fn attach_embedding(id: &TaskId, embedding: &[f32]) -> Result<(), BackendError> {
    let values = encode(&EmbeddingArgs { embedding })?;
    let query = client()?.from_table(TASKS_TABLE).update(&values).eq("id", id.as_str());
    settle(&query).await?;
    Ok(())
}

// ========================
// Subtask Commands
// ========================

pub async fn list_subtasks(task_id: &TaskId) -> Result<Vec<Subtask>, BackendError> {
    let order = encode(&OrderArgs { ascending: true })?;
    let query = client()?
        .from_table(SUBTASKS_TABLE)
        .select(SUBTASK_COLUMNS)
        .eq("task_id", task_id.as_str())
        .order("created_at", &order);
    decode(settle(&query).await?)
}

pub async fn create_subtasks(drafts: &[NewSubtask]) -> Result<Vec<Subtask>, BackendError> {
    let rows = encode(drafts)?;
    let query = client()?.from_table(SUBTASKS_TABLE).insert(&rows).select(SUBTASK_COLUMNS);
    decode(settle(&query).await?)
}

pub async fn set_subtask_completed(id: &SubtaskId, is_completed: bool) -> Result<(), BackendError> {
    let values = encode(&CompletedArgs { is_completed })?;
    let query = client()?.from_table(SUBTASKS_TABLE).update(&values).eq("id", id.as_str());
    settle(&query).await?;
    Ok(())
}
