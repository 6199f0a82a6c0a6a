//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The task store owns
//! the data; this module mirrors each of its snapshots into signals the views
//! read.

use std::collections::HashMap;

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use task_store::{DetachedTask, StoreState, Subtask, Task, TaskFlags, TaskId, TaskStore};

use crate::backend::SupabaseBackend;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Newest first
    pub tasks: Vec<Task>,
    /// Fetched subtask buckets by task
    pub subtasks: HashMap<TaskId, Vec<Subtask>>,
    /// Generating / loading flags by task
    pub flags: HashMap<TaskId, TaskFlags>,
    /// A full task fetch is running
    pub loading: bool,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// The task store as wired in the browser
pub type Tasks = TaskStore<SupabaseBackend>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

/// Build the task store and keep `app_store` in sync with it
pub fn create_task_store(app_store: AppStore) -> Tasks {
    let tasks = TaskStore::new(SupabaseBackend, |task: DetachedTask| spawn_local(task));
    tasks.subscribe(move |state| store_sync(&app_store, state));
    tasks
}

// ========================
// Store Helper Functions
// ========================

/// Copy a snapshot into the reactive fields, touching only those that changed
fn store_sync(store: &AppStore, state: &StoreState) {
    if store.tasks().with_untracked(|tasks| tasks != &state.tasks) {
        *store.tasks().write() = state.tasks.clone();
    }
    if store.subtasks().with_untracked(|subtasks| subtasks != &state.subtasks) {
        *store.subtasks().write() = state.subtasks.clone();
    }
    if store.flags().with_untracked(|flags| flags != &state.flags) {
        *store.flags().write() = state.flags.clone();
    }
    if store.loading().get_untracked() != state.loading {
        store.loading().set(state.loading);
    }
}

/// Subtasks of a task; `None` until fetched
pub fn store_subtasks(store: &AppStore, task_id: &TaskId) -> Option<Vec<Subtask>> {
    store.subtasks().with(|buckets| buckets.get(task_id).cloned())
}

pub fn store_flags(store: &AppStore, task_id: &TaskId) -> TaskFlags {
    store.flags().with(|flags| flags.get(task_id).copied().unwrap_or_default())
}
