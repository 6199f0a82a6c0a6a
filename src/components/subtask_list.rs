//! Subtask List Component
//!
//! Checklist for one task, with AI generation and manual add.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::{SubtaskId, TaskId};

use crate::context::use_app_context;
use crate::store::{store_flags, store_subtasks, use_app_store, AppStateStoreFields};

#[component]
pub fn SubtaskList(task_id: TaskId, #[prop(into)] task_title: Signal<String>) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (new_title, set_new_title) = signal(String::new());

    let subtasks = {
        let task_id = task_id.clone();
        move || store_subtasks(&store, &task_id)
    };
    let generating = {
        let task_id = task_id.clone();
        move || store_flags(&store, &task_id).generating
    };
    let loading = {
        let task_id = task_id.clone();
        move || store_flags(&store, &task_id).loading_subtasks
    };
    // Local appends need a fetched bucket; until then new rows would hide the server's
    let ready = {
        let task_id = task_id.clone();
        let loading = loading.clone();
        move || !loading() && store.subtasks().with(|buckets| buckets.contains_key(&task_id))
    };

    let generate = {
        let task_id = task_id.clone();
        let ready = ready.clone();
        move |_| {
            if !ready() {
                return;
            }
            let tasks = ctx.tasks();
            let task_id = task_id.clone();
            let title = task_title.get_untracked();
            spawn_local(async move {
                let added = tasks.generate_subtasks(&task_id, &title).await;
                log::debug!("[UI] generated {} subtasks for {}", added, task_id);
            });
        }
    };

    let add_subtask = {
        let task_id = task_id.clone();
        let ready = ready.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let title = new_title.get_untracked();
            if title.trim().is_empty() || !ready() {
                return;
            }
            set_new_title.set(String::new());
            let tasks = ctx.tasks();
            let task_id = task_id.clone();
            spawn_local(async move {
                tasks.add_subtask(&task_id, &title).await;
            });
        }
    };

    let toggle = move |id: SubtaskId, is_completed: bool| {
        let tasks = ctx.tasks();
        spawn_local(async move { tasks.toggle_subtask(&id, is_completed).await });
    };

    let generating_label = generating.clone();
    let subtasks_empty = subtasks.clone();
    let generate_disabled = {
        let ready = ready.clone();
        move || generating() || !ready()
    };

    view! {
        <div class="subtask-list">
            <div class="subtask-toolbar">
                <button class="generate-btn" disabled=generate_disabled on:click=generate>
                    {move || if generating_label() { "Generating..." } else { "Generate subtasks" }}
                </button>
            </div>

            <Show when=loading>
                <p class="subtask-status">"Loading subtasks..."</p>
            </Show>
            <Show when=move || subtasks_empty().is_some_and(|s| s.is_empty())>
                <p class="subtask-status">"No subtasks yet."</p>
            </Show>

            <ul>
                <For
                    each=move || subtasks().unwrap_or_default()
                    key=|st| (st.id.clone(), st.title.clone(), st.is_completed)
                    let:subtask
                >
                    {
                        let id = subtask.id.clone();
                        let checked = subtask.is_completed;
                        view! {
                            <li class="subtask-item" class:completed=checked class:pending=subtask.id.is_temporary()>
                                <label>
                                    <input
                                        type="checkbox"
                                        prop:checked=checked
                                        disabled=subtask.id.is_temporary()
                                        on:change=move |ev| toggle(id.clone(), event_target_checked(&ev))
                                    />
                                    <span>{subtask.title.clone()}</span>
                                </label>
                            </li>
                        }
                    }
                </For>
            </ul>

            <form class="subtask-add" on:submit=add_subtask>
                <input
                    type="text"
                    placeholder="Add a subtask..."
                    prop:value=new_title
                    on:input=move |ev| set_new_title.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || !ready()>"Add"</button>
            </form>
        </div>
    }
}
