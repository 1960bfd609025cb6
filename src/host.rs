/// Bindings to the chrome.* bridge and typed wrappers around them

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::error::{NodeShotError, Result, js_error_text};
use crate::history::{HISTORY_KEY, HistoryLog};
use crate::messages::{Request, Response};
use crate::settings::{SETTINGS_KEY, Settings};

// Import JS bridge functions
#[wasm_bindgen(module = "/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(area: &str, key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(area: &str, key: &str, value: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(area: &str, key: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn captureVisibleTab(format: &str, quality: u8) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn downloadFile(
        url: &str,
        filename: &str,
        save_as: bool,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openOptionsPage() -> std::result::Result<(), JsValue>;

    fn onRuntimeMessage(handler: &js_sys::Function);

    fn onInstalled(handler: &js_sys::Function);

    fn createContextMenu(id: &str, title: &str);

    fn onContextMenuClicked(handler: &js_sys::Function);

    fn onActionClicked(handler: &js_sys::Function);

    fn onDownloadComplete(handler: &js_sys::Function);
}

/// chrome.storage areas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Sync,
    Local,
}

impl StorageArea {
    fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

/// The tab the popup was opened over
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ActiveTab {
    pub id: i32,
    pub url: Option<String>,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| NodeShotError::Protocol(format!("Failed to serialize: {:?}", e)))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| NodeShotError::Protocol(format!("Failed to parse: {:?}", e)))
}

fn storage_error(verb: &str, key: &str, error: &JsValue) -> NodeShotError {
    NodeShotError::Storage(format!("Failed to {} {}: {}", verb, key, js_error_text(error)))
}

async fn storage_get<T: DeserializeOwned>(area: StorageArea, key: &str) -> Result<Option<T>> {
    let value = getStorage(area.as_str(), key)
        .await
        .map_err(|e| storage_error("get", key, &e))?;

    if value.is_null() || value.is_undefined() {
        Ok(None)
    } else {
        from_js(value).map(Some)
    }
}

async fn storage_set<T: Serialize>(area: StorageArea, key: &str, value: &T) -> Result<()> {
    let value = to_js(value)?;
    setStorage(area.as_str(), key, value)
        .await
        .map_err(|e| storage_error("save", key, &e))
}

async fn storage_remove(area: StorageArea, key: &str) -> Result<()> {
    removeStorage(area.as_str(), key)
        .await
        .map_err(|e| storage_error("clear", key, &e))
}

/// Settings persisted in chrome.storage.sync
pub struct PreferencesStore;

impl PreferencesStore {
    /// Stored settings, or the defaults when nothing is stored
    pub async fn get() -> Result<Settings> {
        let stored = storage_get::<serde_json::Value>(StorageArea::Sync, SETTINGS_KEY).await?;
        Settings::from_stored(stored)
            .map_err(|e| NodeShotError::Storage(format!("Failed to parse settings: {}", e)))
    }

    /// Whether anything has been stored yet
    pub async fn exists() -> Result<bool> {
        storage_get::<serde_json::Value>(StorageArea::Sync, SETTINGS_KEY)
            .await
            .map(|stored| stored.is_some())
    }

    pub async fn set(settings: &Settings) -> Result<()> {
        storage_set(StorageArea::Sync, SETTINGS_KEY, &settings.clone().normalized()).await
    }

    pub async fn reset() -> Result<()> {
        storage_remove(StorageArea::Sync, SETTINGS_KEY).await
    }
}

pub async fn load_history() -> Result<HistoryLog> {
    storage_get(StorageArea::Local, HISTORY_KEY)
        .await
        .map(Option::unwrap_or_default)
}

pub async fn save_history(log: &HistoryLog) -> Result<()> {
    storage_set(StorageArea::Local, HISTORY_KEY, log).await
}

fn parse_response(value: JsValue) -> Result<Response> {
    if value.is_null() || value.is_undefined() {
        return Err(NodeShotError::Messaging("no response".to_string()));
    }
    from_js(value)
}

/// Send a request to the background worker
pub async fn send_to_background(request: &Request) -> Result<Response> {
    let value = sendRuntimeMessage(to_js(request)?)
        .await
        .map_err(|e| NodeShotError::Messaging(js_error_text(&e)))?;
    parse_response(value)
}

/// Send a request to the content script of a tab
pub async fn send_to_tab(tab_id: i32, request: &Request) -> Result<Response> {
    let value = sendTabMessage(tab_id, to_js(request)?)
        .await
        .map_err(|e| NodeShotError::Messaging(js_error_text(&e)))?;
    parse_response(value)
}

/// Capture the visible area of the current tab as a PNG data URL
pub async fn capture_visible_tab(quality: u8) -> Result<String> {
    let value = captureVisibleTab("png", quality)
        .await
        .map_err(|e| NodeShotError::Capture(js_error_text(&e)))?;
    value
        .as_string()
        .ok_or_else(|| NodeShotError::Capture("capture returned no image".to_string()))
}

/// Save a data URL into the downloads folder without prompting
pub async fn download(url: &str, path: &str) -> Result<i32> {
    let value = downloadFile(url, path, false)
        .await
        .map_err(|e| NodeShotError::Download(js_error_text(&e)))?;
    value
        .as_f64()
        .map(|id| id as i32)
        .ok_or_else(|| NodeShotError::Download("no download id returned".to_string()))
}

pub async fn active_tab() -> Result<Option<ActiveTab>> {
    let value = getActiveTab()
        .await
        .map_err(|e| NodeShotError::Messaging(js_error_text(&e)))?;
    if value.is_null() || value.is_undefined() {
        Ok(None)
    } else {
        from_js(value).map(Some)
    }
}

pub async fn open_options_page() -> Result<()> {
    openOptionsPage()
        .await
        .map_err(|e| NodeShotError::Messaging(js_error_text(&e)))
}

/// Current time as an ISO-8601 string
pub fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

/// Listener registration. Closures are leaked; they live as long as the page.
pub mod events {
    use super::*;

    /// `handler(request, sender_tab_id)` returns a response or a Promise of one
    pub fn on_message(handler: impl Fn(JsValue, Option<i32>) -> JsValue + 'static) {
        let closure = Closure::wrap(Box::new(move |request: JsValue, tab_id: JsValue| {
            let tab_id = tab_id.as_f64().map(|id| id as i32);
            handler(request, tab_id)
        }) as Box<dyn Fn(JsValue, JsValue) -> JsValue>);
        onRuntimeMessage(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn on_installed(handler: impl Fn() + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn()>);
        onInstalled(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn create_context_menu(id: &str, title: &str) {
        createContextMenu(id, title);
    }

    pub fn on_context_menu_clicked(handler: impl Fn(String) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(String)>);
        onContextMenuClicked(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn on_action_clicked(handler: impl Fn(i32) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(i32)>);
        onActionClicked(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn on_download_complete(handler: impl Fn(i32) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(i32)>);
        onDownloadComplete(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
