/// Content script: element selection, highlighting and in-page cropping

mod dom;
mod listeners;
mod overlay;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Element, Event, KeyboardEvent, MutationRecord, Node};
use yew::platform::time::sleep;

use crate::crop::crop_data_url;
use crate::error::js_error_text;
use crate::element::{ElementInfo, overlay_rect};
use crate::host::{self, events};
use crate::messages::{Request, Response};
use crate::selection::{
    ClickAction, KeyAction, REFRESH_DEBOUNCE, SCROLL_RETRY_DELAY, SCROLL_SETTLE_DELAY, Selection,
};
use crate::settings::Settings;

pub use listeners::Subscriptions;
pub use overlay::{NOTIFICATION_ID, NoticeKind, OVERLAY_ID};

const ACTIVE_NOTICE: &str =
    "NodeShot active: move the mouse to pick an element, click to capture, Esc to exit";
const EXIT_NOTICE: &str = "NodeShot exited";
const OFFSCREEN_NOTICE: &str =
    "The element is outside the visible area, scroll the page to reveal it";
const SCROLLING_NOTICE: &str = "Scrolling to the target element...";
const SCROLLED_NOTICE: &str = "Scrolled to the target element";
const LOST_TARGET_NOTICE: &str = "Cannot locate the target element, scroll manually and try again";

/// Page-side selection mode. One per document.
pub struct Interactor {
    selection: RefCell<Selection<Element>>,
    subscriptions: RefCell<Subscriptions>,
    settings: RefCell<Settings>,
    overlay: overlay::Overlay,
    notifier: overlay::Notifier,
    redraws: Cell<u32>,
    this: Weak<Interactor>,
}

impl Interactor {
    pub fn new() -> Result<Rc<Interactor>, JsValue> {
        let overlay = overlay::Overlay::create()?;
        let notifier = overlay::Notifier::create()?;

        Ok(Rc::new_cyclic(|this| Interactor {
            selection: RefCell::new(Selection::new()),
            subscriptions: RefCell::new(Subscriptions::default()),
            settings: RefCell::new(Settings::default()),
            overlay,
            notifier,
            redraws: Cell::new(0),
            this: this.clone(),
        }))
    }

    pub fn is_active(&self) -> bool {
        self.selection.borrow().is_active()
    }

    /// Number of live DOM listeners and observers
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// How many times the highlight has been recomputed
    pub fn redraw_count(&self) -> u32 {
        self.redraws.get()
    }

    /// Enter selection mode. No-op when already active.
    pub fn activate(&self) {
        if !self.selection.borrow_mut().activate() {
            return;
        }

        match self.subscribe() {
            Ok(subscriptions) => *self.subscriptions.borrow_mut() = subscriptions,
            Err(e) => {
                log::error!("Failed to attach listeners: {}", js_error_text(&e));
                self.selection.borrow_mut().deactivate();
                let message = format!("NodeShot failed to start: {}", js_error_text(&e));
                self.notify(&message, NoticeKind::Error);
                return;
            }
        }

        dom::set_body_cursor("crosshair");
        self.load_settings();
        self.notify(ACTIVE_NOTICE, NoticeKind::Info);
        log::info!("Selection mode on");
    }

    /// Leave selection mode. No-op when already inactive.
    pub fn deactivate(&self) {
        if !self.selection.borrow_mut().deactivate() {
            return;
        }
        self.teardown();
        self.notify(EXIT_NOTICE, NoticeKind::Info);
    }

    /// Release every listener and hide the overlay
    fn teardown(&self) {
        let released = std::mem::take(&mut *self.subscriptions.borrow_mut());
        if !released.is_empty() {
            log::debug!("Releasing {} listeners", released.len());
        }
        drop(released);
        dom::set_body_cursor("");
        self.overlay.hide();
        log::info!("Selection mode off");
    }

    fn subscribe(&self) -> Result<Subscriptions, JsValue> {
        let document = dom::document();
        let window = dom::window();
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        Subscriptions::acquire(|subs| {
            subs.listen(&document, "mouseover", true, self.handler(Interactor::on_mouse_over))?;
            subs.listen(&document, "click", true, self.handler(Interactor::on_click))?;
            subs.listen(&document, "keydown", true, self.handler(Interactor::on_key_down))?;
            subs.listen(&window, "scroll", true, self.handler(|this, _| this.schedule_refresh()))?;
            subs.listen(&window, "resize", true, self.handler(|this, _| this.schedule_refresh()))?;

            let weak = self.this.clone();
            subs.watch(&body, move |records| {
                if let Some(this) = weak.upgrade() {
                    this.on_mutations(&records);
                }
            })
        })
    }

    /// Wrap a method as a DOM callback without keeping `self` alive
    fn handler(
        &self,
        method: impl Fn(&Interactor, Event) + 'static,
    ) -> impl FnMut(Event) + 'static {
        let weak = self.this.clone();
        move |event| {
            if let Some(this) = weak.upgrade() {
                method(&this, event);
            }
        }
    }

    fn notify(&self, message: &str, kind: NoticeKind) {
        // Errors and results are always shown; hints can be switched off
        if kind == NoticeKind::Info && !self.settings.borrow().show_notification {
            return;
        }
        self.notifier.show(message, kind);
    }

    fn load_settings(&self) {
        let weak = self.this.clone();
        spawn_local(async move {
            let result = host::send_to_background(&Request::GetSettings)
                .await
                .map(|response| response.settings);
            match (weak.upgrade(), result) {
                (Some(this), Ok(Some(settings))) => *this.settings.borrow_mut() = settings,
                (_, Err(e)) => log::warn!("Using default settings: {}", e),
                _ => {}
            }
        });
    }

    fn current_target(&self) -> Option<Element> {
        self.selection.borrow().target().cloned()
    }

    fn on_mouse_over(&self, event: Event) {
        if !self.is_active() {
            return;
        }
        event.stop_propagation();

        let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if overlay::is_own_element(&element) {
            return;
        }

        // The target is frozen and our UI stays hidden while a capture runs
        if !self.selection.borrow_mut().hover(element.clone()) {
            return;
        }
        self.show_highlight(&element);
    }

    fn show_highlight(&self, element: &Element) {
        self.redraws.set(self.redraws.get() + 1);
        if !dom::is_visible(element) {
            self.overlay.hide();
            self.notify(OFFSCREEN_NOTICE, NoticeKind::Info);
            return;
        }

        let rect = overlay_rect(&dom::client_rect(element), &dom::viewport());
        self.overlay.place(&rect);
    }

    /// Redraw the overlay once a burst of scroll/resize/mutation events settles
    fn schedule_refresh(&self) {
        let ticket = {
            let mut selection = self.selection.borrow_mut();
            if !selection.is_active() || selection.target().is_none() || selection.is_capturing() {
                return;
            }
            selection.refresh.schedule()
        };

        let weak = self.this.clone();
        spawn_local(async move {
            sleep(REFRESH_DEBOUNCE).await;
            let Some(this) = weak.upgrade() else { return };
            if !this.selection.borrow().refresh.is_current(ticket) {
                return;
            }
            if let Some(target) = this.current_target() {
                this.show_highlight(&target);
            }
        });
    }

    fn on_mutations(&self, records: &[MutationRecord]) {
        let Some(target) = self.current_target() else {
            return;
        };
        let target_node: &Node = target.as_ref();

        let relevant = records
            .iter()
            .filter(|record| !record.target().is_some_and(|node| overlay::is_own_node(&node)))
            .any(|record| match record.type_().as_str() {
                "childList" => true,
                "attributes" => record
                    .target()
                    .map(|node| node.contains(Some(target_node)))
                    .unwrap_or(false),
                _ => false,
            });

        if relevant {
            self.schedule_refresh();
        }
    }

    fn on_click(&self, event: Event) {
        if !self.is_active() {
            return;
        }
        event.prevent_default();
        event.stop_propagation();

        let Some(target) = self.current_target() else {
            return;
        };

        let action = self.selection.borrow().click(dom::is_visible(&target));
        match action {
            ClickAction::Ignore => {}
            ClickAction::CaptureNow => self.spawn_capture(target),
            ClickAction::ScrollThenRetry => {
                self.notify(SCROLLING_NOTICE, NoticeKind::Info);
                self.scroll_to(&target);

                let weak = self.this.clone();
                spawn_local(async move {
                    sleep(SCROLL_RETRY_DELAY).await;
                    let Some(this) = weak.upgrade() else { return };
                    let still_selected =
                        this.is_active() && this.current_target().as_ref() == Some(&target);
                    if still_selected && dom::is_visible(&target) {
                        this.spawn_capture(target);
                    } else {
                        this.notify(LOST_TARGET_NOTICE, NoticeKind::Error);
                    }
                });
            }
        }
    }

    fn on_key_down(&self, event: Event) {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };

        let action = self.selection.borrow().key(&event.key());
        match action {
            KeyAction::Ignore => {}
            KeyAction::Exit => {
                event.prevent_default();
                self.deactivate();
            }
            KeyAction::ScrollToTarget => {
                event.prevent_default();
                if let Some(target) = self.current_target() {
                    self.scroll_to(&target);
                    self.notify(SCROLLED_NOTICE, NoticeKind::Info);
                }
            }
        }
    }

    /// Centre the element if it is not visible, then redraw once scrolling settles
    fn scroll_to(&self, element: &Element) {
        if dom::is_visible(element) {
            return;
        }
        dom::scroll_into_center(element);

        let weak = self.this.clone();
        let element = element.clone();
        spawn_local(async move {
            sleep(SCROLL_SETTLE_DELAY).await;
            let Some(this) = weak.upgrade() else { return };
            let capturing = this.selection.borrow().is_capturing();
            if this.is_active() && !capturing && this.current_target().as_ref() == Some(&element) {
                this.show_highlight(&element);
            }
        });
    }

    fn spawn_capture(&self, element: Element) {
        if !self.selection.borrow_mut().begin_capture() {
            return;
        }

        let weak = self.this.clone();
        spawn_local(async move {
            if let Some(this) = weak.upgrade() {
                this.capture(element).await;
            }
        });
    }

    async fn capture(&self, element: Element) {
        // Keep our own UI out of the screenshot
        self.overlay.hide();
        self.notifier.suppress();

        let delay = Duration::from_millis(self.settings.borrow().capture_delay as u64);
        sleep(delay).await;

        let element_info = dom::measure(&element);
        log::info!(
            "Capturing <{}> at {:?}",
            element_info.tag_name,
            element_info.viewport_rect()
        );

        let result = host::send_to_background(&Request::Capture { element_info })
            .await
            .and_then(Response::into_result);

        self.notifier.restore();

        match result {
            Ok(response) => {
                let filename = response.filename.unwrap_or_default();
                if self.selection.borrow_mut().finish_capture(true) {
                    self.teardown();
                }
                self.notify(&format!("Screenshot saved: {}", filename), NoticeKind::Success);
            }
            Err(e) => {
                log::error!("Capture failed: {}", e);
                self.selection.borrow_mut().finish_capture(false);
                if self.is_active() {
                    self.show_highlight(&element);
                }
                self.notify(&format!("Screenshot failed: {}", e), NoticeKind::Error);
            }
        }
    }
}

/// Crop a captured tab image for the background worker
fn crop_image(data_url: &str, element_info: &ElementInfo) -> Response {
    match crop_data_url(data_url, element_info, dom::device_pixel_ratio()) {
        Ok(cropped) => Response::with_cropped(cropped),
        Err(e) => {
            log::error!("Crop failed: {}", e);
            Response::failure(e)
        }
    }
}

fn respond(response: Response) -> JsValue {
    serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::UNDEFINED)
}

/// Create the interactor and listen for background requests
pub fn start() {
    let interactor = match Interactor::new() {
        Ok(interactor) => interactor,
        Err(e) => {
            log::error!("NodeShot could not start on this page: {}", js_error_text(&e));
            return;
        }
    };

    events::on_message(move |request, _| {
        let request: Request = match host::from_js(request) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Ignoring message: {}", e);
                return JsValue::UNDEFINED;
            }
        };

        match request {
            Request::Activate => {
                interactor.activate();
                respond(Response::ok())
            }
            Request::Deactivate => {
                interactor.deactivate();
                respond(Response::ok())
            }
            Request::CropImage {
                data_url,
                element_info,
            } => future_to_promise(async move {
                Ok(respond(crop_image(&data_url, &element_info)))
            })
            .into(),
            Request::Capture { .. } | Request::GetSettings => JsValue::UNDEFINED,
        }
    });
}
