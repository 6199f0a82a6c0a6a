//! Dashboard Page
//!
//! Search, task list and task input for the signed-in user.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{ConfirmButton, Footer, Header, SmartSearch, TaskInput, TaskList};
use crate::context::use_app_context;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = use_app_context();

    // Load tasks on mount
    Effect::new(move |_| {
        let tasks = ctx.tasks();
        spawn_local(async move { tasks.fetch_tasks().await });
    });

    view! {
        <div class="dashboard">
            <Header />
            <main class="main-content">
                <SmartSearch />
                <TaskList />
                <TaskInput />
                <div class="dashboard-actions">
                    <ConfirmButton
                        button_class="link-btn"
                        label="Sign Out"
                        prompt="Sign out?"
                        on_confirm=move |_: ()| ctx.sign_out()
                    />
                </div>
            </main>
            <Footer />
        </div>
    }
}
