/// Offline shell cache run inside the service worker.
///
/// The cache is written once, at install time, with a fixed list of shell
/// assets. Every later fetch is answered from that cache when it holds an
/// exact match and from the network otherwise. Network responses are never
/// written back, so shell assets stay as installed until `cache_name` changes.

use crate::error::describe_js;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, CacheStorage, Request, Response, ServiceWorkerGlobalScope};

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("not running inside a service worker")]
    NotWorker,

    #[error("failed to open cache {name:?}: {reason}")]
    Open { name: String, reason: String },

    #[error("failed to store shell assets: {0}")]
    Populate(String),

    #[error("cache lookup failed: {0}")]
    Lookup(String),

    #[error("network fetch failed: {0}")]
    Network(String),
}

impl From<CacheError> for JsValue {
    fn from(e: CacheError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

/// Storage and network access the worker needs
#[allow(async_fn_in_trait)]
pub trait ShellStore {
    type Request;
    type Response;

    /// Store every path or none of them
    async fn populate(&self, paths: &[String]) -> Result<(), CacheError>;

    /// Exact-match lookup
    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>, CacheError>;

    async fn fetch_network(&self, request: &Self::Request) -> Result<Self::Response, CacheError>;
}

/// Handle the worker `install` event. An error here keeps this worker
/// version from activating.
pub async fn install<S: ShellStore>(store: &S, assets: &[String]) -> Result<(), CacheError> {
    log::info!("Caching {} shell assets", assets.len());
    store.populate(assets).await.inspect_err(|e| {
        log::error!("Shell cache install failed: {}", e);
    })
}

/// Handle one worker `fetch` event: cache first, then network.
pub async fn respond<S: ShellStore>(
    store: &S,
    request: &S::Request,
) -> Result<S::Response, CacheError> {
    if let Some(cached) = store.lookup(request).await? {
        return Ok(cached);
    }
    store.fetch_network(request).await
}

/// `ShellStore` over the Cache API of the running service worker
pub struct BrowserShellCache {
    scope: ServiceWorkerGlobalScope,
    cache_name: String,
}

impl BrowserShellCache {
    pub fn from_global(cache_name: &str) -> Result<Self, CacheError> {
        let scope = js_sys::global()
            .dyn_into::<ServiceWorkerGlobalScope>()
            .map_err(|_| CacheError::NotWorker)?;

        Ok(BrowserShellCache {
            scope,
            cache_name: cache_name.to_string(),
        })
    }

    fn storage(&self) -> Result<CacheStorage, CacheError> {
        self.scope.caches().map_err(|e| self.open_error(&e))
    }

    async fn open(&self) -> Result<Cache, CacheError> {
        JsFuture::from(self.storage()?.open(&self.cache_name))
            .await
            .map_err(|e| self.open_error(&e))?
            .dyn_into::<Cache>()
            .map_err(|e| self.open_error(&e))
    }

    fn open_error(&self, e: &JsValue) -> CacheError {
        CacheError::Open {
            name: self.cache_name.clone(),
            reason: describe_js(e),
        }
    }
}

impl ShellStore for BrowserShellCache {
    type Request = Request;
    type Response = Response;

    async fn populate(&self, paths: &[String]) -> Result<(), CacheError> {
        let cache = self.open().await?;
        let list: js_sys::Array = paths.iter().map(|p| JsValue::from_str(p)).collect();

        // addAll rejects, and stores nothing, if any single fetch fails
        JsFuture::from(cache.add_all_with_str_sequence(&list))
            .await
            .map_err(|e| CacheError::Populate(describe_js(&e)))?;
        Ok(())
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let found = JsFuture::from(self.storage()?.match_with_request(request))
            .await
            .map_err(|e| CacheError::Lookup(describe_js(&e)))?;

        if found.is_undefined() || found.is_null() {
            return Ok(None);
        }
        found
            .dyn_into::<Response>()
            .map(Some)
            .map_err(|e| CacheError::Lookup(describe_js(&e)))
    }

    async fn fetch_network(&self, request: &Request) -> Result<Response, CacheError> {
        JsFuture::from(self.scope.fetch_with_request(request))
            .await
            .map_err(|e| CacheError::Network(describe_js(&e)))?
            .dyn_into::<Response>()
            .map_err(|e| CacheError::Network(describe_js(&e)))
    }
}
