//! Footer Component

use leptos::prelude::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="app-footer">
            <p>"© 2024 Task Manager Pro. All rights reserved."</p>
        </footer>
    }
}
