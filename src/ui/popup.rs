/// Popup UI: start a capture, open settings, show help

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::host::{self, ActiveTab};
use crate::messages::Request;
use crate::restricted::{NO_PAGE_REASON, check_page};
use crate::ui::components::{Flash, FlashKind, use_flash};

/// Whether the tab under the popup can be captured
#[derive(Clone, Debug, PartialEq)]
pub enum PageStatus {
    Checking,
    Ready(i32),
    Unsupported(&'static str),
}

impl PageStatus {
    pub fn for_tab(tab: Option<&ActiveTab>) -> PageStatus {
        match tab {
            None => PageStatus::Unsupported(NO_PAGE_REASON),
            Some(tab) => match check_page(tab.url.as_deref()) {
                Ok(()) => PageStatus::Ready(tab.id),
                Err(reason) => PageStatus::Unsupported(reason),
            },
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let status = use_state(|| PageStatus::Checking);
    let show_help = use_state(|| false);
    let busy = use_state(|| false);
    let (error, show_error) = use_flash();

    // Check the active tab on mount
    {
        let status = status.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let tab = match host::active_tab().await {
                    Ok(tab) => tab,
                    Err(e) => {
                        log::warn!("Failed to query the active tab: {}", e);
                        None
                    }
                };
                status.set(PageStatus::for_tab(tab.as_ref()));
            });
            || ()
        });
    }

    let on_capture = {
        let status = status.clone();
        let busy = busy.clone();

        Callback::from(move |_| {
            let PageStatus::Ready(tab_id) = *status else {
                return;
            };

            let busy = busy.clone();
            let show_error = show_error.clone();
            busy.set(true);

            spawn_local(async move {
                match host::send_to_tab(tab_id, &Request::Activate).await {
                    Ok(_) => {
                        if let Some(window) = web_sys::window() {
                            let _ = window.close();
                        }
                    }
                    Err(e) => {
                        log::error!("Activation failed: {}", e);
                        show_error.emit(e.to_string());
                        busy.set(false);
                    }
                }
            });
        })
    };

    let on_settings = Callback::from(|_| {
        spawn_local(async {
            if let Err(e) = host::open_options_page().await {
                log::error!("Failed to open options: {}", e);
            }
        });
    });

    let on_help = {
        let show_help = show_help.clone();
        Callback::from(move |_| show_help.set(!*show_help))
    };

    let unsupported = match &*status {
        PageStatus::Unsupported(reason) => Some(*reason),
        _ => None,
    };
    let capture_disabled = *busy || !matches!(*status, PageStatus::Ready(_));

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"NodeShot"}</h1>

            if *show_help {
                <div class="help-content">
                    <p>{"Click \"Capture element\", then move the mouse over the page."}</p>
                    <p>{"The highlighted element is saved as a PNG when you click it."}</p>
                    <p>{"Press S to scroll the highlighted element into view."}</p>
                    <p>{"Press Esc to leave selection mode."}</p>
                </div>
            } else {
                <div class="flex-column-gap">
                    <Button
                        onclick={on_capture}
                        disabled={capture_disabled}
                        variant={ButtonVariant::Primary}
                        block={true}
                    >
                        {"📸 Capture element"}
                    </Button>

                    if let Some(reason) = unsupported {
                        <div class="warning" title={reason}>{reason}</div>
                    }
                </div>
            }

            <Flash message={error} kind={FlashKind::Error} />

            <div class="flex-row-gap">
                <Button onclick={on_settings} variant={ButtonVariant::Secondary}>
                    {"Settings"}
                </Button>
                <Button onclick={on_help} variant={ButtonVariant::Secondary}>
                    {if *show_help { "Back" } else { "Help" }}
                </Button>
            </div>

            <p class="footer-popup">
                {"NodeShot v0.1.0"}
            </p>
        </div>
    }
}
