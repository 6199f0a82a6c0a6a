//! Auth Page
//!
//! Email/password sign-in with a toggle to sign-up.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::use_app_context;
use crate::routes::Route;

const SIGN_UP_NOTICE: &str = "Check your email for the login link!";

#[component]
pub fn AuthPage() -> impl IntoView {
    let ctx = use_app_context();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_login, set_is_login) = signal(true);
    let (busy, set_busy) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let (notice, set_notice) = signal::<Option<String>>(None);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let email = email.get_untracked().trim().to_string();
        let password = password.get_untracked();
        if email.is_empty() || password.is_empty() {
            set_error.set(Some("Email and password are required".to_string()));
            return;
        }
        let signing_in = is_login.get_untracked();
        set_busy.set(true);
        set_error.set(None);
        set_notice.set(None);

        spawn_local(async move {
            let result = if signing_in {
                commands::sign_in(&email, &password).await
            } else {
                commands::sign_up(&email, &password).await
            };
            set_busy.set(false);
            match result {
                Ok(()) if signing_in => {
                    log::info!("[AUTH] signed in");
                    if let Ok(session) = commands::get_session().await {
                        ctx.session.set(session);
                    }
                    ctx.navigate(Route::Dashboard);
                }
                Ok(()) => set_notice.set(Some(SIGN_UP_NOTICE.to_string())),
                Err(e) => {
                    log::warn!("[AUTH] {} failed: {}", if signing_in { "sign in" } else { "sign up" }, e);
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>{move || if is_login.get() { "Welcome Back" } else { "Create Account" }}</h1>
                <p class="auth-subtitle">
                    {move || if is_login.get() { "Sign in to access your tasks" } else { "Sign up to get started" }}
                </p>

                {move || error.get().map(|msg| view! { <div class="auth-error">{msg}</div> })}
                {move || notice.get().map(|msg| view! { <div class="auth-notice">{msg}</div> })}

                <form class="auth-form" on:submit=submit>
                    <label>
                        "Email"
                        <input
                            type="email"
                            placeholder="you@example.com"
                            required
                            prop:value=email
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                    </label>
                    <label>
                        "Password"
                        <input
                            type="password"
                            placeholder="••••••••"
                            required
                            prop:value=password
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                    </label>
                    <button type="submit" class="primary-btn" disabled=busy>
                        {move || match (busy.get(), is_login.get()) {
                            (true, _) => "Processing...",
                            (false, true) => "Sign In",
                            (false, false) => "Sign Up",
                        }}
                    </button>
                </form>

                <button
                    class="link-btn"
                    on:click=move |_| {
                        set_is_login.update(|v| *v = !*v);
                        set_error.set(None);
                        set_notice.set(None);
                    }
                >
                    {move || if is_login.get() {
                        "Don't have an account? Sign Up"
                    } else {
                        "Already have an account? Sign In"
                    }}
                </button>
            </div>
        </div>
    }
}
