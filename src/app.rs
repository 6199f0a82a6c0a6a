//! Taskflow Frontend App
//!
//! Root component: connects the SDK, tracks the session, and switches pages.

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::commands;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::pages::{AuthPage, DashboardPage, ProfilePage};
use crate::routes::{self, Route};
use crate::store::{create_task_store, AppState, AppStore};

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let missing = config.missing();
    if !missing.is_empty() {
        log::error!("[APP] missing configuration: {}", missing.join(", "));
        return view! { <ConfigError missing=missing /> }.into_any();
    }
    if let Err(e) = commands::connect(&config.supabase_url, &config.supabase_anon_key) {
        log::error!("[APP] failed to create client: {}", e);
        return view! { <div class="config-error">{e.to_string()}</div> }.into_any();
    }

    let app_store: AppStore = Store::new(AppState::default());
    provide_context(app_store);
    let ctx = AppContext::new(create_task_store(app_store));
    provide_context(ctx);

    // Initial session check
    spawn_local(async move {
        match commands::get_session().await {
            Ok(session) => ctx.session.set(session),
            Err(e) => log::error!("[AUTH] session lookup failed: {}", e),
        }
        ctx.session_checked.set(true);
    });

    // Keep the session current
    if let Err(e) = commands::on_auth_state_change(move |session| {
        ctx.session.set(session);
        ctx.session_checked.set(true);
    }) {
        log::error!("[AUTH] could not subscribe to auth changes: {}", e);
    }

    // Back/forward buttons
    let _ = window_event_listener(ev::popstate, move |_| {
        ctx.route.set(routes::current_route());
    });

    // Forget the previous user's data whenever the signed-in user changes
    Effect::new(move |previous: Option<Option<String>>| {
        let user_id = ctx.user_id();
        if let Some(previous) = previous {
            if previous != user_id {
                log::info!("[APP] session user changed, clearing task store");
                ctx.tasks().clear();
                ctx.avatar_url.set(None);
            }
        }
        user_id
    });

    // Route gating
    Effect::new(move |_| {
        if !ctx.session_checked.get() {
            return;
        }
        let requested = ctx.route.get();
        let signed_in = ctx.session.with(Option::is_some);
        let resolved = routes::resolve(requested, signed_in);
        if resolved != requested {
            routes::replace_history(resolved);
            ctx.route.set(resolved);
        }
    });

    view! {
        <Show
            when=move || ctx.session_checked.get()
            fallback=|| view! { <div class="loading-screen">"Loading..."</div> }
        >
            {move || {
                let signed_in = ctx.session.with(Option::is_some);
                match routes::resolve(ctx.route.get(), signed_in) {
                    Route::Login => view! { <AuthPage /> }.into_any(),
                    Route::Profile => view! { <ProfilePage /> }.into_any(),
                    Route::Dashboard => view! { <DashboardPage /> }.into_any(),
                }
            }}
        </Show>
    }
    .into_any()
}

/// Shown instead of the app when the client cannot be configured
#[component]
fn ConfigError(missing: Vec<&'static str>) -> impl IntoView {
    view! {
        <div class="config-error">
            <h1>"Taskflow is not configured"</h1>
            <p>"Missing settings: " {missing.join(", ")}</p>
        </div>
    }
}
