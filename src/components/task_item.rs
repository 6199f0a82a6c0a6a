//! Task Item Component
//!
//! One row of the task list: status, priority, title, delete, and an
//! expandable subtask checklist.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::{TaskId, TaskPatch, TaskStatus};

use crate::components::{ConfirmButton, SubtaskList};
use crate::context::use_app_context;
use crate::store::{store_subtasks, use_app_store, AppStateStoreFields};

#[component]
pub fn TaskItem(task_id: TaskId) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (expanded, set_expanded) = signal(false);

    // Rows for unconfirmed tasks are read-only
    let pending = task_id.is_temporary();

    let task = {
        let task_id = task_id.clone();
        Memo::new(move |_| store.tasks().with(|tasks| tasks.iter().find(|t| t.id == task_id).cloned()))
    };

    let on_status_change = {
        let task_id = task_id.clone();
        move |ev: web_sys::Event| {
            let Ok(status) = event_target_value(&ev).parse::<TaskStatus>() else {
                return;
            };
            let tasks = ctx.tasks();
            let task_id = task_id.clone();
            spawn_local(async move { tasks.update_task(&task_id, TaskPatch::status(status)).await });
        }
    };

    let on_delete = {
        let task_id = task_id.clone();
        move |_: ()| {
            let tasks = ctx.tasks();
            let task_id = task_id.clone();
            spawn_local(async move { tasks.delete_task(&task_id).await });
        }
    };

    let toggle_expanded = {
        let task_id = task_id.clone();
        move |_| {
            let opening = !expanded.get_untracked();
            set_expanded.set(opening);
            // Fetch only the first time; later opens reuse the bucket
            if opening && store_subtasks(&store, &task_id).is_none() {
                let tasks = ctx.tasks();
                let task_id = task_id.clone();
                spawn_local(async move { tasks.fetch_subtasks(&task_id).await });
            }
        }
    };

    let status_of = move || task.with(|t| t.as_ref().map(|t| t.status).unwrap_or_default());
    let priority_of = move || task.with(|t| t.as_ref().map(|t| t.priority).unwrap_or_default());

    view! {
        <div class="task-item" class:pending=pending class:done=move || status_of() == TaskStatus::Done>
            <div class="task-row">
                <button
                    class="expand-btn"
                    disabled=pending
                    on:click=toggle_expanded
                >
                    {move || if expanded.get() { "▾" } else { "▸" }}
                </button>
                <select class="status-select" disabled=pending on:change=on_status_change>
                    {TaskStatus::ALL.iter().map(|s| {
                        let s = *s;
                        view! {
                            <option value=s.as_str() selected=move || status_of() == s>{s.as_str()}</option>
                        }
                    }).collect_view()}
                </select>
                <span class=move || format!("priority-badge priority-{}", priority_of().as_str().to_lowercase())>
                    {move || priority_of().as_str()}
                </span>
                <span class="task-title">
                    {move || task.with(|t| t.as_ref().map(|t| t.title.clone()).unwrap_or_default())}
                </span>
                <Show when=move || !pending>
                    <ConfirmButton
                        button_class="delete-btn"
                        label="×"
                        prompt="Delete task?"
                        on_confirm=on_delete.clone()
                    />
                </Show>
            </div>
            <Show when=move || expanded.get()>
                <SubtaskList
                    task_id=task_id.clone()
                    task_title=Signal::derive(move || task.with(|t| t.as_ref().map(|t| t.title.clone()).unwrap_or_default()))
                />
            </Show>
        </div>
    }
}
