//! Client-Side Routes
//!
//! Three pages driven by the history API. `/profile` and `/` need a session;
//! `/login` is only for signed-out visitors.

/// Page selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Profile,
    Dashboard,
}

impl Route {
    /// Unknown paths land on the dashboard
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Route::Login,
            "/profile" => Route::Profile,
            _ => Route::Dashboard,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Profile => "/profile",
            Route::Dashboard => "/",
        }
    }

    pub fn is_private(self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Where a visitor actually ends up
pub fn resolve(route: Route, signed_in: bool) -> Route {
    match (route, signed_in) {
        (r, false) if r.is_private() => Route::Login,
        (Route::Login, true) => Route::Dashboard,
        (r, _) => r,
    }
}

pub fn current_route() -> Route {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .map(|p| Route::from_path(&p))
        .unwrap_or(Route::Dashboard)
}

pub fn push_history(route: Route) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(route.path())) {
            log::warn!("[ROUTE] pushState failed: {:?}", e);
        }
    }
}

pub fn replace_history(route: Route) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(route.path())) {
            log::warn!("[ROUTE] replaceState failed: {:?}", e);
        }
    }
}
