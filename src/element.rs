/// Element geometry, visibility and identification
use serde::{Deserialize, Serialize};

/// A rectangle in CSS pixels, as returned by getBoundingClientRect
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Rect {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Viewport size and scroll offsets at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// The computed style properties that can hide an element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleVisibility {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

impl StyleVisibility {
    pub fn is_shown(&self) -> bool {
        self.display != "none" && self.visibility != "hidden" && !is_zero_opacity(&self.opacity)
    }
}

fn is_zero_opacity(opacity: &str) -> bool {
    opacity
        .trim()
        .parse::<f64>()
        .map(|value| value == 0.0)
        .unwrap_or(false)
}

/// Whether a client rect intersects the viewport with a non-empty area
pub fn intersects_viewport(rect: &Rect, viewport: &Viewport) -> bool {
    rect.top < viewport.height
        && rect.bottom() > 0.0
        && rect.left < viewport.width
        && rect.right() > 0.0
        && rect.width > 0.0
        && rect.height > 0.0
}

pub fn is_visible(rect: &Rect, viewport: &Viewport, style: &StyleVisibility) -> bool {
    intersects_viewport(rect, viewport) && style.is_shown()
}

/// Page-space position of the overlay for a client rect
pub fn overlay_rect(rect: &Rect, viewport: &Viewport) -> Rect {
    Rect::new(
        rect.left + viewport.scroll_x,
        rect.top + viewport.scroll_y,
        rect.width,
        rect.height,
    )
}

/// Scroll offsets that centre `rect` in the viewport, clamped at the origin
pub fn centered_scroll(rect: &Rect, viewport: &Viewport) -> (f64, f64) {
    let x = viewport.scroll_x + rect.left - viewport.width / 2.0 + rect.width / 2.0;
    let y = viewport.scroll_y + rect.top - viewport.height / 2.0 + rect.height / 2.0;
    (x.max(0.0), y.max(0.0))
}

/// Geometry and identity of the element picked by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    /// Page-space left edge in CSS pixels
    pub x: f64,
    /// Page-space top edge in CSS pixels
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl ElementInfo {
    /// Build from a client rect measured against `viewport`
    pub fn measure(
        rect: &Rect,
        viewport: &Viewport,
        tag_name: String,
        class_name: String,
        id: String,
    ) -> ElementInfo {
        let page = overlay_rect(rect, viewport);
        ElementInfo {
            x: page.left,
            y: page.top,
            width: page.width,
            height: page.height,
            tag_name,
            class_name,
            id,
            scroll_x: viewport.scroll_x,
            scroll_y: viewport.scroll_y,
        }
    }

    /// Rectangle relative to the visible viewport at selection time
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(
            self.x - self.scroll_x,
            self.y - self.scroll_y,
            self.width,
            self.height,
        )
    }

    /// Identifier used for `{elementId}`: id, then class, then tag name
    pub fn label(&self) -> &str {
        [&self.id, &self.class_name, &self.tag_name]
            .into_iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or("element")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    fn shown() -> StyleVisibility {
        StyleVisibility {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }

    #[test]
    fn test_visible_inside_viewport() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(is_visible(&rect, &viewport(), &shown()));
    }

    #[test]
    fn test_partially_visible_counts() {
        let rect = Rect::new(-50.0, 780.0, 100.0, 50.0);
        assert!(intersects_viewport(&rect, &viewport()));
    }

    #[test]
    fn test_above_viewport_not_visible() {
        let rect = Rect::new(10.0, -300.0, 100.0, 200.0);
        assert!(!is_visible(&rect, &viewport(), &shown()));
    }

    #[test]
    fn test_zero_size_not_visible() {
        let rect = Rect::new(10.0, 10.0, 0.0, 50.0);
        assert!(!intersects_viewport(&rect, &viewport()));
    }

    #[test]
    fn test_hidden_styles() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);

        let mut style = shown();
        style.display = "none".to_string();
        assert!(!is_visible(&rect, &viewport(), &style));

        let mut style = shown();
        style.visibility = "hidden".to_string();
        assert!(!is_visible(&rect, &viewport(), &style));

        let mut style = shown();
        style.opacity = "0".to_string();
        assert!(!is_visible(&rect, &viewport(), &style));

        let mut style = shown();
        style.opacity = "0.5".to_string();
        assert!(is_visible(&rect, &viewport(), &style));
    }

    #[test]
    fn test_overlay_adds_scroll() {
        let vp = Viewport {
            scroll_x: 20.0,
            scroll_y: 400.0,
            ..viewport()
        };
        let rect = Rect::new(10.0, 30.0, 100.0, 50.0);

        assert_eq!(overlay_rect(&rect, &vp), Rect::new(30.0, 430.0, 100.0, 50.0));
    }

    #[test]
    fn test_centered_scroll() {
        let vp = Viewport {
            scroll_y: 1000.0,
            ..viewport()
        };
        let rect = Rect::new(0.0, 1200.0, 100.0, 100.0);

        let (x, y) = centered_scroll(&rect, &vp);

        assert_eq!(x, 0.0);
        assert_eq!(y, 1000.0 + 1200.0 - 400.0 + 50.0);
    }

    #[test]
    fn test_centered_scroll_clamps_at_zero() {
        let rect = Rect::new(10.0, -300.0, 100.0, 100.0);
        assert_eq!(centered_scroll(&rect, &viewport()), (0.0, 0.0));
    }

    #[test]
    fn test_measure_and_viewport_rect() {
        let vp = Viewport {
            scroll_x: 5.0,
            scroll_y: 250.0,
            ..viewport()
        };
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);

        let info = ElementInfo::measure(&rect, &vp, "DIV".into(), String::new(), "hero".into());

        assert_eq!(info.x, 15.0);
        assert_eq!(info.y, 270.0);
        assert_eq!(info.viewport_rect(), rect);
    }

    #[test]
    fn test_label_fallbacks() {
        let mut info = ElementInfo {
            tag_name: "SECTION".to_string(),
            class_name: "card wide".to_string(),
            id: "hero".to_string(),
            ..ElementInfo::default()
        };
        assert_eq!(info.label(), "hero");

        info.id.clear();
        assert_eq!(info.label(), "card wide");

        info.class_name.clear();
        assert_eq!(info.label(), "SECTION");

        info.tag_name.clear();
        assert_eq!(info.label(), "element");
    }

    #[test]
    fn test_deserialize_without_scroll() {
        let json = r#"{"x":1,"y":2,"width":3,"height":4,"tagName":"P","className":"","id":""}"#;
        let info: ElementInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.scroll_x, 0.0);
        assert_eq!(info.tag_name, "P");
    }
}
