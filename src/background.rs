/// Background service worker: settings defaults, message routing, capture

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::element::ElementInfo;
use crate::error::{NodeShotError, Result};
use crate::history::HistoryLog;
use crate::host::{self, PreferencesStore, events};
use crate::messages::{Request, Response};
use crate::pipeline::{CaptureHost, run_capture};
use crate::settings::Settings;

const OPTIONS_MENU_ID: &str = "nodeshot-options";

/// chrome.* backed host for one sender tab
struct ChromeHost {
    tab_id: i32,
}

impl CaptureHost for ChromeHost {
    async fn settings(&self) -> Result<Settings> {
        PreferencesStore::get().await
    }

    async fn capture_visible_tab(&self, quality: u8) -> Result<String> {
        host::capture_visible_tab(quality).await
    }

    async fn crop_in_page(&self, data_url: String, info: &ElementInfo) -> Result<String> {
        let request = Request::CropImage {
            data_url,
            element_info: info.clone(),
        };
        let response = host::send_to_tab(self.tab_id, &request)
            .await?
            .into_result()?;

        response
            .cropped_data_url
            .ok_or_else(|| NodeShotError::Protocol("crop response without image".to_string()))
    }

    async fn download(&self, url: &str, path: &str) -> Result<i32> {
        host::download(url, path).await
    }

    async fn load_history(&self) -> Result<HistoryLog> {
        host::load_history().await
    }

    async fn save_history(&self, log: &HistoryLog) -> Result<()> {
        host::save_history(log).await
    }

    fn now_iso(&self) -> String {
        host::now_iso()
    }
}

/// Register every background listener
pub fn start() {
    events::on_installed(|| {
        spawn_local(async {
            if let Err(e) = install_defaults().await {
                log::error!("Failed to store default settings: {}", e);
            }
        });
        events::create_context_menu(OPTIONS_MENU_ID, "Options");
    });

    events::on_context_menu_clicked(|menu_id| {
        if menu_id == OPTIONS_MENU_ID {
            spawn_local(async {
                if let Err(e) = host::open_options_page().await {
                    log::error!("Failed to open options: {}", e);
                }
            });
        }
    });

    // Toolbar click goes straight into selection mode
    events::on_action_clicked(|tab_id| {
        spawn_local(relay(tab_id, Request::Activate));
    });

    events::on_download_complete(|download_id| {
        spawn_local(async move {
            match host::load_history().await {
                Ok(history) => match history.find(download_id) {
                    Some(record) => log::info!("Screenshot saved: {}", record.filename),
                    None => log::debug!("Download {} finished", download_id),
                },
                Err(e) => log::warn!("Failed to read history: {}", e),
            }
        });
    });

    events::on_message(handle_message);

    log::info!("NodeShot background started");
}

async fn install_defaults() -> Result<()> {
    if !PreferencesStore::exists().await? {
        PreferencesStore::set(&Settings::default()).await?;
        log::info!("Stored default settings");
    }
    Ok(())
}

async fn relay(tab_id: i32, request: Request) {
    if let Err(e) = host::send_to_tab(tab_id, &request).await {
        log::warn!("Could not reach tab {}: {}", tab_id, e);
    }
}

fn respond(response: Response) -> JsValue {
    serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::UNDEFINED)
}

/// Answer one runtime message. Async requests return a Promise.
fn handle_message(request: JsValue, sender_tab: Option<i32>) -> JsValue {
    let request: Request = match host::from_js(request) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Ignoring message: {}", e);
            return respond(Response::failure(e));
        }
    };

    match request {
        Request::Activate | Request::Deactivate => {
            if let Some(tab_id) = sender_tab {
                spawn_local(relay(tab_id, request));
            }
            respond(Response::ok())
        }
        Request::Capture { element_info } => {
            let Some(tab_id) = sender_tab else {
                return respond(Response::failure("capture must come from a tab"));
            };
            promise(async move {
                let response = match run_capture(&ChromeHost { tab_id }, &element_info).await {
                    Ok(filename) => Response::with_filename(filename),
                    Err(e) => {
                        log::error!("Capture failed: {}", e);
                        Response::failure(e)
                    }
                };
                Ok(respond(response))
            })
        }
        Request::GetSettings => promise(async {
            let response = match PreferencesStore::get().await {
                Ok(settings) => Response::with_settings(settings),
                Err(e) => Response::failure(e),
            };
            Ok(respond(response))
        }),
        // Crop requests are for content scripts
        Request::CropImage { .. } => JsValue::UNDEFINED,
    }
}

fn promise<F>(future: F) -> JsValue
where
    F: std::future::Future<Output = std::result::Result<JsValue, JsValue>> + 'static,
{
    future_to_promise(future).into()
}
