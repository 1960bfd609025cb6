/// Highlight box and notice banner injected into the page
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, Node};

use super::dom::document;
use crate::element::Rect;

pub const OVERLAY_ID: &str = "nodeshot-overlay";
pub const NOTIFICATION_ID: &str = "nodeshot-notification";

const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

const OVERLAY_STYLE: &str = "position: absolute; pointer-events: none; z-index: 999999; \
    border: 2px solid #4285F4; background: rgba(66, 133, 244, 0.1); display: none; \
    box-sizing: border-box; transition: all 0.1s ease;";

const NOTIFICATION_STYLE: &str = "position: fixed; top: 20px; right: 20px; color: white; \
    padding: 12px 16px; border-radius: 6px; font-size: 14px; \
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
    z-index: 1000001; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.2); max-width: 300px; \
    word-wrap: break-word; pointer-events: none; display: none;";

fn create_div(id: &str, css: &str) -> Result<HtmlElement, JsValue> {
    let document = document();
    let div: HtmlElement = document.create_element("div")?.dyn_into()?;
    div.set_id(id);
    div.style().set_css_text(css);

    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&div)?;
    Ok(div)
}

/// Whether an element is one of ours and must never become a target
pub fn is_own_element(element: &Element) -> bool {
    let id = element.id();
    id == OVERLAY_ID || id == NOTIFICATION_ID
}

/// Whether a mutation happened inside our overlay or notice banner
pub fn is_own_node(node: &Node) -> bool {
    if node.dyn_ref::<Element>().is_some_and(is_own_element) {
        return true;
    }
    node.parent_element()
        .is_some_and(|parent| is_own_element(&parent))
}

/// The rectangle drawn over the hovered element
pub struct Overlay {
    element: HtmlElement,
}

impl Overlay {
    pub fn create() -> Result<Overlay, JsValue> {
        Ok(Overlay {
            element: create_div(OVERLAY_ID, OVERLAY_STYLE)?,
        })
    }

    /// Show at a page-space rectangle
    pub fn place(&self, rect: &Rect) {
        let style = self.element.style();
        let _ = style.set_property("left", &format!("{}px", rect.left));
        let _ = style.set_property("top", &format!("{}px", rect.top));
        let _ = style.set_property("width", &format!("{}px", rect.width));
        let _ = style.set_property("height", &format!("{}px", rect.height));
        let _ = style.set_property("display", "block");
    }

    pub fn hide(&self) {
        let _ = self.element.style().set_property("display", "none");
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.element.remove();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    fn color(&self) -> &'static str {
        match self {
            NoticeKind::Info => "#4285F4",
            NoticeKind::Success => "#34A853",
            NoticeKind::Error => "#EA4335",
        }
    }
}

/// A single reusable notice banner. Each notice hides itself after a few
/// seconds unless a newer one replaced it.
pub struct Notifier {
    element: HtmlElement,
    generation: Rc<Cell<u64>>,
    shown: Rc<Cell<bool>>,
}

impl Notifier {
    pub fn create() -> Result<Notifier, JsValue> {
        Ok(Notifier {
            element: create_div(NOTIFICATION_ID, NOTIFICATION_STYLE)?,
            generation: Rc::new(Cell::new(0)),
            shown: Rc::new(Cell::new(false)),
        })
    }

    pub fn show(&self, message: &str, kind: NoticeKind) {
        self.element.set_text_content(Some(message));
        let style = self.element.style();
        let _ = style.set_property("background", kind.color());
        let _ = style.set_property("display", "block");
        self.shown.set(true);

        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let current = self.generation.clone();
        let shown = self.shown.clone();
        let element = self.element.clone();
        spawn_local(async move {
            yew::platform::time::sleep(NOTICE_LIFETIME).await;
            if current.get() == generation {
                shown.set(false);
                let _ = element.style().set_property("display", "none");
            }
        });
    }

    /// Take the banner off screen without forgetting it, e.g. during capture
    pub fn suppress(&self) {
        let _ = self.element.style().set_property("display", "none");
    }

    pub fn restore(&self) {
        if self.shown.get() {
            let _ = self.element.style().set_property("display", "block");
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.element.remove();
    }
}
