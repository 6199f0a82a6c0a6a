//! Profile Page
//!
//! Account info, sign-out, and the profile picture uploader.

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::{cache_busted, validate_avatar};

use crate::commands;
use crate::context::{use_app_context, AppContext};
use crate::routes::Route;

/// Resolve the avatar URL if an image has been uploaded before
pub fn load_avatar(ctx: AppContext) {
    let Some(user_id) = ctx.user_id() else {
        return;
    };
    spawn_local(async move {
        let url = match commands::avatar_public_url(&user_id) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("[AVATAR] no public URL: {}", e);
                return;
            }
        };
        if commands::url_exists(&url).await {
            ctx.avatar_url.set(Some(cache_busted(&url, now_millis())));
        } else {
            log::debug!("[AVATAR] no profile picture yet");
        }
    });
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let ctx = use_app_context();
    let (uploading, set_uploading) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);
    let file_input: NodeRef<html::Input> = NodeRef::new();

    if ctx.avatar_url.get_untracked().is_none() {
        load_avatar(ctx);
    }

    let on_file_selected = move |ev: web_sys::Event| {
        let file = event_target::<web_sys::HtmlInputElement>(&ev)
            .files()
            .and_then(|files| files.get(0));
        let (Some(file), Some(user_id)) = (file, ctx.user_id()) else {
            return;
        };
        if let Err(e) = validate_avatar(&file.type_(), file.size() as u64) {
            set_error.set(Some(e.to_string()));
            return;
        }
        set_uploading.set(true);
        set_error.set(None);

        spawn_local(async move {
            let result = match commands::upload_avatar(&user_id, &file).await {
                Ok(()) => commands::avatar_public_url(&user_id),
                Err(e) => Err(e),
            };
            match result {
                Ok(url) => {
                    log::info!("[AVATAR] uploaded profile picture");
                    ctx.avatar_url.set(Some(cache_busted(&url, now_millis())));
                }
                Err(e) => {
                    log::error!("[AVATAR] upload failed: {}", e);
                    set_error.set(Some(e.to_string()));
                }
            }
            set_uploading.set(false);
        });
    };

    view! {
        <div class="profile-page">
            <div class="profile-card">
                <div class="profile-header">
                    <button class="link-btn" on:click=move |_| ctx.navigate(Route::Dashboard)>
                        "← Back to tasks"
                    </button>
                    <h1>"Profile"</h1>
                </div>

                <div class="avatar-section">
                    <div class="avatar-preview">
                        {move || match ctx.avatar_url.get() {
                            Some(url) => view! { <img src=url alt="Profile" /> }.into_any(),
                            None => view! { <span class="avatar-placeholder">"?"</span> }.into_any(),
                        }}
                        <Show when=move || uploading.get()>
                            <div class="avatar-overlay">"…"</div>
                        </Show>
                    </div>

                    <input
                        node_ref=file_input
                        type="file"
                        accept="image/*"
                        class="hidden"
                        on:change=on_file_selected
                    />
                    <button
                        class="primary-btn"
                        disabled=uploading
                        on:click=move |_| {
                            if let Some(input) = file_input.get() {
                                input.click();
                            }
                        }
                    >
                        {move || if uploading.get() { "Uploading..." } else { "Upload Profile Picture" }}
                    </button>

                    {move || error.get().map(|msg| view! { <p class="form-error">{msg}</p> })}
                </div>

                <div class="account-info">
                    <span class="label">"Email"</span>
                    <span>{move || ctx.user_email().unwrap_or_default()}</span>
                </div>

                <button class="danger-btn" on:click=move |_| ctx.sign_out()>
                    "Sign Out"
                </button>
            </div>
        </div>
    }
}
