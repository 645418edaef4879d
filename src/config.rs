/// Runtime configuration shared by the page and the offline cache worker

use serde::Deserialize;
use url::Url;
use wasm_bindgen::JsValue;

/// Name of the optional global object that overrides the defaults below
pub const CONFIG_GLOBAL: &str = "INSTA_GRAB_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the extraction backend; empty means same origin
    pub api_base: String,
    pub ping_path: String,
    pub extract_path: String,
    pub cache_name: String,
    /// Shell resources stored at worker install time
    pub shell_assets: Vec<String>,
    pub service_worker_path: String,
    pub theme_key: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base: String::new(),
            ping_path: "/api/ping".to_string(),
            extract_path: "/api/extract".to_string(),
            cache_name: "insta-cache".to_string(),
            shell_assets: vec![
                "/".to_string(),
                "/static/css/style.css".to_string(),
                "/pkg/insta_grab.js".to_string(),
                "/pkg/insta_grab_bg.wasm".to_string(),
            ],
            service_worker_path: "/sw.js".to_string(),
            theme_key: "theme".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read the override from the current global scope, either an object or
    /// a JSON string.
    ///
    /// Works from both the window and the worker global. Anything missing or
    /// malformed falls back to the defaults.
    pub fn load() -> Self {
        let global = js_sys::global();
        let value = match js_sys::Reflect::get(&global, &JsValue::from_str(CONFIG_GLOBAL)) {
            Ok(value) if !value.is_undefined() && !value.is_null() => value,
            _ => return AppConfig::default(),
        };

        let parsed = match value.as_string() {
            Some(json) => AppConfig::from_json(&json).map_err(|e| e.to_string()),
            None => serde_wasm_bindgen::from_value(value).map_err(|e| e.to_string()),
        };
        parsed.unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {}", CONFIG_GLOBAL, e);
            AppConfig::default()
        })
    }

    /// Parse a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn ping_url(&self) -> String {
        self.endpoint(&self.ping_path)
    }

    pub fn extract_url(&self) -> String {
        self.endpoint(&self.extract_path)
    }

    /// Resolve an endpoint path against `api_base`.
    ///
    /// An empty or unparseable base leaves the path relative to the page origin.
    pub fn endpoint(&self, path: &str) -> String {
        if self.api_base.is_empty() {
            return path.to_string();
        }

        match Url::parse(&self.api_base).and_then(|base| base.join(path)) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::warn!("Invalid api_base {:?}: {}", self.api_base, e);
                path.to_string()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
