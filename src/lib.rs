/// Insta Grab - paste a post link, preview and download its media
/// Built with Rust + WASM + Yew

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod media;
pub mod offline_cache;
pub mod theme;
pub mod ui;

use config::AppConfig;
use offline_cache::BrowserShellCache;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

// Runs in both the page and the service worker
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::load();
    wasm_logger::init(wasm_logger::Config::new(config.log_level()));
}

// Mount the page
#[wasm_bindgen]
pub fn start_app() {
    let config = Rc::new(AppConfig::load());
    yew::Renderer::<ui::app::App>::with_props(ui::app::AppProps { config }).render();
}

// Service worker `install` hook; the returned promise goes to waitUntil
#[wasm_bindgen]
pub fn on_install() -> js_sys::Promise {
    future_to_promise(async move {
        let config = AppConfig::load();
        let store = BrowserShellCache::from_global(&config.cache_name)?;
        offline_cache::install(&store, &config.shell_assets).await?;
        Ok(JsValue::UNDEFINED)
    })
}

// Service worker `fetch` hook; the returned promise goes to respondWith
#[wasm_bindgen]
pub fn on_fetch(request: web_sys::Request) -> js_sys::Promise {
    future_to_promise(async move {
        let config = AppConfig::load();
        let store = BrowserShellCache::from_global(&config.cache_name)?;
        let response = offline_cache::respond(&store, &request).await?;
        Ok(response.into())
    })
}
