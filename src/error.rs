/// Error taxonomy and the user-facing messages attached to it

use crate::api::ApiError;
use wasm_bindgen::JsValue;

pub const EMPTY_INPUT_MESSAGE: &str = "Please paste an Instagram post link or ID.";
pub const BACKEND_DOWN_MESSAGE: &str = "Backend not reachable. Try restarting the server.";
pub const REJECTED_FALLBACK_MESSAGE: &str = "Failed to download.";
pub const REQUEST_FALLBACK_MESSAGE: &str =
    "Failed to download. Please check the link and try again.";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("empty input")]
    EmptyInput,

    #[error("backend unavailable: {0}")]
    BackendUnavailable(ApiError),

    #[error("request error: {0}")]
    Api(#[from] ApiError),

    #[error("browser API unavailable: {0}")]
    Environment(String),
}

impl AppError {
    /// Message shown inline for this error
    pub fn user_message(&self) -> String {
        match self {
            AppError::EmptyInput => EMPTY_INPUT_MESSAGE.to_string(),
            AppError::BackendUnavailable(_) => BACKEND_DOWN_MESSAGE.to_string(),
            AppError::Api(e) => e.user_message(),
            AppError::Environment(_) => REQUEST_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Render a thrown JS value for logs and error payloads
pub fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
