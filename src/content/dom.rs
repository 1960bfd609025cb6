/// Measuring the live document
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, ScrollBehavior, ScrollToOptions, Window};

use crate::element::{self, ElementInfo, Rect, StyleVisibility, Viewport};

pub fn window() -> Window {
    web_sys::window().expect_throw("content script without a window")
}

pub fn document() -> Document {
    window().document().expect_throw("content script without a document")
}

pub fn device_pixel_ratio() -> f64 {
    let ratio = window().device_pixel_ratio();
    if ratio > 0.0 { ratio } else { 1.0 }
}

pub fn viewport() -> Viewport {
    let window = window();
    let root = window.document().and_then(|doc| doc.document_element());

    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .or_else(|| root.as_ref().map(|el| el.client_width() as f64))
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .or_else(|| root.as_ref().map(|el| el.client_height() as f64))
        .unwrap_or(0.0);

    Viewport {
        width,
        height,
        scroll_x: window.scroll_x().unwrap_or(0.0),
        scroll_y: window.scroll_y().unwrap_or(0.0),
    }
}

pub fn client_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

fn style_visibility(element: &Element) -> StyleVisibility {
    let style = match window().get_computed_style(element) {
        Ok(Some(style)) => style,
        _ => return StyleVisibility::default(),
    };
    let read = |name: &str| style.get_property_value(name).unwrap_or_default();

    StyleVisibility {
        display: read("display"),
        visibility: read("visibility"),
        opacity: read("opacity"),
    }
}

/// Inside the viewport and not hidden by display, visibility or opacity
pub fn is_visible(element: &Element) -> bool {
    element::is_visible(&client_rect(element), &viewport(), &style_visibility(element))
}

pub fn measure(element: &Element) -> ElementInfo {
    ElementInfo::measure(
        &client_rect(element),
        &viewport(),
        element.tag_name(),
        element.get_attribute("class").unwrap_or_default(),
        element.id(),
    )
}

/// Smooth-scroll so the element sits in the middle of the viewport
pub fn scroll_into_center(element: &Element) {
    let (left, top) = element::centered_scroll(&client_rect(element), &viewport());

    let options = ScrollToOptions::new();
    options.set_left(left);
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window().scroll_to_with_scroll_to_options(&options);
}

pub fn set_body_cursor(cursor: &str) {
    if let Some(body) = document().body() {
        let _ = body.style().set_property("cursor", cursor);
    }
}
