//! Task List Component

use leptos::prelude::*;

use crate::components::TaskItem;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn TaskList() -> impl IntoView {
    let store = use_app_store();

    view! {
        <section class="task-list">
            <Show when=move || store.loading().get() && store.tasks().with(Vec::is_empty)>
                <p class="task-list-status">"Loading tasks..."</p>
            </Show>
            <Show when=move || !store.loading().get() && store.tasks().with(Vec::is_empty)>
                <p class="empty-state">"No tasks yet. Add one below!"</p>
            </Show>
            <For
                each=move || store.tasks().with(|tasks| tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>())
                key=|id| id.clone()
                let:task_id
            >
                <TaskItem task_id=task_id />
            </For>
        </section>
    }
}
