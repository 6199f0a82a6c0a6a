//! Smart Search Component
//!
//! Semantic search box over the user's tasks. Results live only in this panel.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::{SearchPanel, SearchPhase, SearchResult, SemanticSearch};

use crate::backend::SupabaseBackend;
use crate::context::use_app_context;

/// How long a search error stays on screen
const ERROR_DISPLAY_MS: u32 = 5_000;

#[component]
pub fn SmartSearch() -> impl IntoView {
    let ctx = use_app_context();
    let panel = RwSignal::new(SearchPanel::default());
    let (query, set_query) = signal(String::new());

    let search = move || {
        let Some(query) = panel.try_update(|p| p.begin(&query.get_untracked())).flatten() else {
            return;
        };
        let user_id = ctx.user_id();
        spawn_local(async move {
            let outcome = SupabaseBackend.smart_search(&query, user_id.as_deref()).await;
            panel.update(|p| p.finish(outcome));

            if let Some(message) = panel.with_untracked(|p| p.error.clone()) {
                TimeoutFuture::new(ERROR_DISPLAY_MS).await;
                panel.update(|p| {
                    if p.error.as_ref() == Some(&message) {
                        p.error = None;
                    }
                });
            }
        });
    };

    let searching = move || panel.with(SearchPanel::is_searching);

    view! {
        <section class="smart-search">
            <h3>"Smart Search"</h3>
            <div class="search-row">
                <input
                    type="text"
                    placeholder="Search tasks semantically..."
                    prop:value=query
                    on:input=move |ev| set_query.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        if ev.key() == "Enter" {
                            search();
                        }
                    }
                />
                <button
                    class="primary-btn"
                    disabled=move || searching() || query.with(|q| q.trim().is_empty())
                    on:click=move |_| search()
                >
                    {move || if searching() { "Searching..." } else { "Search" }}
                </button>
            </div>

            {move || panel.with(|p| p.error.clone()).map(|msg| view! { <p class="search-error">{msg}</p> })}

            {move || match panel.with(|p| p.phase.clone()) {
                SearchPhase::Idle | SearchPhase::Searching => ().into_any(),
                SearchPhase::Results(results) if results.is_empty() => view! {
                    <p class="search-empty">"No similar tasks found. Try a different search term."</p>
                }.into_any(),
                SearchPhase::Results(results) => view! { <SearchResults results=results /> }.into_any(),
            }}
        </section>
    }
}

#[component]
fn SearchResults(results: Vec<SearchResult>) -> impl IntoView {
    let count = results.len();
    view! {
        <div class="search-results">
            <p class="search-count">
                {format!("Found {} similar task{}:", count, if count == 1 { "" } else { "s" })}
            </p>
            {results.into_iter().map(|result| view! {
                <div class="search-result">
                    <span class="result-title">{result.title.clone()}</span>
                    <span class=format!("status-badge status-{}", result.status.as_str().to_lowercase())>
                        {result.status.as_str()}
                    </span>
                    <span class="result-match">{format!("{}% match", result.match_percent())}</span>
                </div>
            }).collect_view()}
        </div>
    }
}
