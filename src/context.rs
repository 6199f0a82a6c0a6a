//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands::{self, Session};
use crate::routes::{self, Route};
use crate::store::Tasks;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// The task store (single-threaded, so stored locally)
    tasks: StoredValue<Tasks, LocalStorage>,
    /// Current auth session
    pub session: RwSignal<Option<Session>>,
    /// Initial session lookup has finished
    pub session_checked: RwSignal<bool>,
    /// Page requested by the URL
    pub route: RwSignal<Route>,
    /// Cache-busted profile picture URL, when one exists
    pub avatar_url: RwSignal<Option<String>>,
}

impl AppContext {
    pub fn new(tasks: Tasks) -> Self {
        Self {
            tasks: StoredValue::new_local(tasks),
            session: RwSignal::new(None),
            session_checked: RwSignal::new(false),
            route: RwSignal::new(routes::current_route()),
            avatar_url: RwSignal::new(None),
        }
    }

    /// Clone of the task store handle, for use in async blocks
    pub fn tasks(&self) -> Tasks {
        self.tasks.get_value()
    }

    /// Switch page and record it in history
    pub fn navigate(&self, route: Route) {
        if self.route.get_untracked() != route {
            routes::push_history(route);
            self.route.set(route);
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.session.with(|s| s.as_ref().map(|s| s.user.id.clone()))
    }

    pub fn user_email(&self) -> Option<String> {
        self.session.with(|s| s.as_ref().and_then(|s| s.user.email.clone()))
    }

    /// End the session, drop its data and return to the login page
    pub fn sign_out(self) {
        spawn_local(async move {
            if let Err(e) = commands::sign_out().await {
                log::error!("[AUTH] sign out failed: {}", e);
            }
            self.tasks().clear();
            self.avatar_url.set(None);
            self.session.set(None);
            self.navigate(Route::Login);
        });
    }
}

/// Get the app context
pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
