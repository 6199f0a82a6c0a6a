//! Header Component

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::pages::load_avatar;
use crate::routes::Route;

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app_context();

    if ctx.avatar_url.get_untracked().is_none() {
        load_avatar(ctx);
    }

    view! {
        <header class="app-header">
            <h2 class="app-title">"Task Manager"</h2>
            <div class="header-actions">
                <button class="primary-btn" on:click=move |_| ctx.navigate(Route::Profile)>
                    "Profile"
                </button>
                {move || match ctx.avatar_url.get() {
                    Some(url) => view! { <img class="header-avatar" src=url alt="Profile" /> }.into_any(),
                    None => view! { <span class="header-avatar empty"></span> }.into_any(),
                }}
            </div>
        </header>
    }
}
