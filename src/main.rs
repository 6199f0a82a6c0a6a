//! Taskflow Frontend Entry Point

mod app;
mod backend;
mod commands;
mod components;
mod config;
mod context;
mod logging;
mod pages;
mod routes;
mod store;

use app::App;
use config::AppConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::load();
    logging::init(config.log_level());
    log::info!("[APP] starting");
    mount_to_body(move || view! { <App config=config.clone() /> });
}
