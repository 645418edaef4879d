/// Client for the extraction backend

use crate::config::AppConfig;
use crate::error::{REJECTED_FALLBACK_MESSAGE, REQUEST_FALLBACK_MESSAGE, describe_js};
use crate::media::{ExtractionResponse, MediaDescriptor};
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Non-ok reply carrying a server-supplied `error` message
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("backend reported status {0:?}")]
    Unhealthy(Option<String>),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(message) => message.clone(),
            ApiError::Status(_) => REJECTED_FALLBACK_MESSAGE.to_string(),
            ApiError::Unhealthy(_) | ApiError::Decode(_) | ApiError::Network(_) => {
                REQUEST_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Deserialize)]
struct PingResponse {
    status: Option<String>,
}

/// A finished HTTP exchange, before interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub ok: bool,
    pub status: u16,
    pub body: String,
}

/// The two calls the page makes against the backend
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Liveness probe; `Ok` only for an ok reply with `{"status": "ok"}`
    async fn ping(&self) -> Result<(), ApiError>;

    /// Submit one link and return the extracted items
    async fn extract(&self, url: &str) -> Result<Vec<MediaDescriptor>, ApiError>;
}

pub fn extract_body(url: &str) -> Result<String, ApiError> {
    Ok(serde_json::to_string(&ExtractRequest { url })?)
}

pub fn interpret_ping(reply: &HttpReply) -> Result<(), ApiError> {
    if !reply.ok {
        return Err(ApiError::Status(reply.status));
    }

    let ping: PingResponse = serde_json::from_str(&reply.body)?;
    match ping.status.as_deref() {
        Some("ok") => Ok(()),
        _ => Err(ApiError::Unhealthy(ping.status)),
    }
}

pub fn interpret_extract(reply: &HttpReply) -> Result<Vec<MediaDescriptor>, ApiError> {
    if reply.ok {
        let response: ExtractionResponse = serde_json::from_str(&reply.body)?;
        return Ok(response.into_items());
    }

    let body: serde_json::Value = serde_json::from_str(&reply.body)?;
    match body
        .get("error")
        .and_then(serde_json::Value::as_str)
        .filter(|message| !message.is_empty())
    {
        Some(message) => Err(ApiError::Rejected(message.to_string())),
        None => Err(ApiError::Status(reply.status)),
    }
}

/// `Backend` over the browser's `fetch`
#[derive(Debug, Clone, PartialEq)]
pub struct FetchBackend {
    ping_url: String,
    extract_url: String,
}

impl FetchBackend {
    pub fn new(config: &AppConfig) -> Self {
        FetchBackend {
            ping_url: config.ping_url(),
            extract_url: config.extract_url(),
        }
    }

    async fn send(&self, request: &Request) -> Result<HttpReply, ApiError> {
        let window =
            web_sys::window().ok_or_else(|| ApiError::Network("no window".to_string()))?;

        let response: Response = JsFuture::from(window.fetch_with_request(request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;

        let body = JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?;

        Ok(HttpReply {
            ok: response.ok(),
            status: response.status(),
            body: body.as_string().unwrap_or_default(),
        })
    }
}

impl Backend for FetchBackend {
    async fn ping(&self) -> Result<(), ApiError> {
        let request = Request::new_with_str(&self.ping_url).map_err(network)?;
        let reply = self.send(&request).await?;
        interpret_ping(&reply)
    }

    async fn extract(&self, url: &str) -> Result<Vec<MediaDescriptor>, ApiError> {
        let headers = Headers::new().map_err(network)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(network)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&extract_body(url)?));

        let request = Request::new_with_str_and_init(&self.extract_url, &init).map_err(network)?;
        let reply = self.send(&request).await?;
        interpret_extract(&reply)
    }
}

fn network(e: JsValue) -> ApiError {
    ApiError::Network(describe_js(&e))
}
