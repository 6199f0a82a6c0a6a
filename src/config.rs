//! App Configuration
//!
//! Values baked in at build time (`SUPABASE_URL`, `SUPABASE_ANON_KEY`,
//! `TASKFLOW_LOG_LEVEL`), optionally overridden at runtime by a
//! `window.__TASKFLOW_CONFIG__` object set before the wasm bundle loads.

use log::LevelFilter;
use serde::Deserialize;
use wasm_bindgen::JsValue;

const WINDOW_CONFIG_KEY: &str = "__TASKFLOW_CONFIG__";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub log_level: String,
}

/// Runtime override; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn load() -> Self {
        let mut config = Self::from_build_env();
        if let Some(overrides) = read_window_override() {
            config.apply(overrides);
        }
        config
    }

    fn from_build_env() -> Self {
        Self {
            supabase_url: option_env!("SUPABASE_URL").unwrap_or_default().to_string(),
            supabase_anon_key: option_env!("SUPABASE_ANON_KEY").unwrap_or_default().to_string(),
            log_level: option_env!("TASKFLOW_LOG_LEVEL").unwrap_or("info").to_string(),
        }
    }

    pub fn apply(&mut self, overrides: ConfigOverride) {
        if let Some(url) = overrides.supabase_url.filter(|v| !v.trim().is_empty()) {
            self.supabase_url = url;
        }
        if let Some(key) = overrides.supabase_anon_key.filter(|v| !v.trim().is_empty()) {
            self.supabase_anon_key = key;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    /// Names of required settings that are unset
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supabase_url.trim().is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.supabase_anon_key.trim().is_empty() {
            missing.push("SUPABASE_ANON_KEY");
        }
        missing
    }

    /// Unknown levels fall back to `info`
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.trim().parse().unwrap_or(LevelFilter::Info)
    }
}

fn read_window_override() -> Option<ConfigOverride> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(WINDOW_CONFIG_KEY)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    match serde_wasm_bindgen::from_value(value) {
        Ok(overrides) => Some(overrides),
        Err(e) => {
            web_sys::console::warn_1(&format!("[CONFIG] ignoring {}: {}", WINDOW_CONFIG_KEY, e).into());
            None
        }
    }
}
