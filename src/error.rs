/// Error kinds shared by every extension context
use thiserror::Error;

use crate::crop::CropError;

#[derive(Debug, Error)]
pub enum NodeShotError {
    #[error("The target element is not visible, scroll it into view and try again")]
    ElementNotVisible,

    #[error("Tab capture failed: {0}")]
    Capture(String),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error("Download failed: {0}")]
    Download(String),

    /// The receiving context is missing, usually a tab opened before install
    #[error("Cannot connect to the page, please refresh the page and try again ({0})")]
    Messaging(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid message: {0}")]
    Protocol(String),

    /// An error raised in another extension context, already formatted there
    #[error("{0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, NodeShotError>;

/// Render a JS exception or rejected promise value
pub fn js_error_text(value: &wasm_bindgen::JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
