//! Task Input Component
//!
//! Title field plus priority selector for creating tasks.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::Priority;

use crate::context::use_app_context;

#[component]
pub fn TaskInput() -> impl IntoView {
    let ctx = use_app_context();

    let (title, set_title) = signal(String::new());
    let (priority, set_priority) = signal(Priority::default());

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get_untracked();
        if text.trim().is_empty() {
            return;
        }
        let selected = priority.get_untracked();
        // Clear right away; the placeholder row is already visible
        set_title.set(String::new());

        let tasks = ctx.tasks();
        spawn_local(async move {
            if tasks.add_task(&text, selected).await.is_none() {
                log::warn!("[UI] task was not created");
            }
        });
    };

    view! {
        <form class="task-input" on:submit=create_task>
            <input
                type="text"
                placeholder="Add a new task..."
                prop:value=title
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <select
                class="priority-select"
                on:change=move |ev| {
                    if let Ok(p) = event_target_value(&ev).parse::<Priority>() {
                        set_priority.set(p);
                    }
                }
            >
                {Priority::ALL.iter().map(|p| {
                    let p = *p;
                    view! {
                        <option value=p.as_str() selected=move || priority.get() == p>
                            {p.as_str()}
                        </option>
                    }
                }).collect_view()}
            </select>
            <button type="submit" class="primary-btn">"Add"</button>
        </form>
    }
}
