/// Selection mode state machine, independent of the DOM
use std::time::Duration;

/// Delay before a scroll/resize/mutation burst refreshes the overlay
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(50);

/// Wait after an automatic scroll before checking visibility again
pub const SCROLL_RETRY_DELAY: Duration = Duration::from_millis(600);

/// Wait after a manual scroll-to-target before redrawing the overlay
pub const SCROLL_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Inactive,
    Active,
}

/// What a click should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Ignore,
    CaptureNow,
    /// Scroll the target into view and retry once after `SCROLL_RETRY_DELAY`
    ScrollThenRetry,
}

/// What a key press should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Ignore,
    Exit,
    ScrollToTarget,
}

/// Hands out tickets; only the most recent one is honoured
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
}

impl Debouncer {
    pub fn schedule(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.generation
    }

    /// Invalidate every outstanding ticket
    pub fn cancel(&mut self) {
        self.generation += 1;
    }
}

/// Interaction state for one document. `T` is the element handle type.
#[derive(Debug)]
pub struct Selection<T> {
    mode: Mode,
    target: Option<T>,
    capturing: bool,
    pub refresh: Debouncer,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection {
            mode: Mode::Inactive,
            target: None,
            capturing: false,
            refresh: Debouncer::default(),
        }
    }
}

impl<T> Selection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.mode == Mode::Active
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Returns false when already active
    pub fn activate(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.mode = Mode::Active;
        true
    }

    /// Returns false when already inactive
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.mode = Mode::Inactive;
        self.target = None;
        self.capturing = false;
        self.refresh.cancel();
        true
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Record the hovered element; ignored while inactive or capturing
    pub fn hover(&mut self, element: T) -> bool {
        if !self.is_active() || self.capturing {
            return false;
        }
        self.target = Some(element);
        true
    }

    pub fn click(&self, target_visible: bool) -> ClickAction {
        if !self.is_active() || self.capturing || self.target.is_none() {
            ClickAction::Ignore
        } else if target_visible {
            ClickAction::CaptureNow
        } else {
            ClickAction::ScrollThenRetry
        }
    }

    pub fn key(&self, key: &str) -> KeyAction {
        if !self.is_active() {
            return KeyAction::Ignore;
        }
        if key == "Escape" {
            KeyAction::Exit
        } else if key.eq_ignore_ascii_case("s") && self.target.is_some() {
            KeyAction::ScrollToTarget
        } else {
            KeyAction::Ignore
        }
    }

    /// Mark a capture in flight; returns false if one already is
    pub fn begin_capture(&mut self) -> bool {
        if !self.is_active() || self.capturing {
            return false;
        }
        self.capturing = true;
        true
    }

    /// Clear the in-flight flag; a successful capture also ends selection
    pub fn finish_capture(&mut self, success: bool) -> bool {
        self.capturing = false;
        success && self.deactivate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_is_idempotent() {
        let mut selection: Selection<u32> = Selection::new();

        assert!(selection.activate());
        assert!(!selection.activate());
        assert!(selection.is_active());
    }

    #[test]
    fn test_deactivate_while_inactive_is_noop() {
        let mut selection: Selection<u32> = Selection::new();

        assert!(!selection.deactivate());
        assert!(!selection.is_active());
    }

    #[test]
    fn test_hover_only_while_active() {
        let mut selection = Selection::new();

        assert!(!selection.hover(1));
        assert!(selection.target().is_none());

        selection.activate();
        assert!(selection.hover(2));
        assert_eq!(selection.target(), Some(&2));
    }

    #[test]
    fn test_hover_frozen_while_capturing() {
        let mut selection = Selection::new();
        selection.activate();
        selection.hover(1);
        assert!(selection.begin_capture());

        assert!(!selection.hover(2));
        assert_eq!(selection.target(), Some(&1));

        selection.finish_capture(false);
        assert!(selection.hover(2));
        assert_eq!(selection.target(), Some(&2));
    }

    #[test]
    fn test_deactivate_clears_target() {
        let mut selection = Selection::new();
        selection.activate();
        selection.hover(7);

        selection.deactivate();

        assert!(selection.target().is_none());
    }

    #[test]
    fn test_click_actions() {
        let mut selection = Selection::new();
        assert_eq!(selection.click(true), ClickAction::Ignore);

        selection.activate();
        assert_eq!(selection.click(true), ClickAction::Ignore);

        selection.hover(1);
        assert_eq!(selection.click(true), ClickAction::CaptureNow);
        assert_eq!(selection.click(false), ClickAction::ScrollThenRetry);
    }

    #[test]
    fn test_click_ignored_while_capturing() {
        let mut selection = Selection::new();
        selection.activate();
        selection.hover(1);

        assert!(selection.begin_capture());
        assert!(!selection.begin_capture());
        assert_eq!(selection.click(true), ClickAction::Ignore);
    }

    #[test]
    fn test_key_actions() {
        let mut selection = Selection::new();
        assert_eq!(selection.key("Escape"), KeyAction::Ignore);

        selection.activate();
        assert_eq!(selection.key("Escape"), KeyAction::Exit);
        assert_eq!(selection.key("s"), KeyAction::Ignore);

        selection.hover(1);
        assert_eq!(selection.key("s"), KeyAction::ScrollToTarget);
        assert_eq!(selection.key("S"), KeyAction::ScrollToTarget);
        assert_eq!(selection.key("x"), KeyAction::Ignore);
    }

    #[test]
    fn test_successful_capture_deactivates() {
        let mut selection = Selection::new();
        selection.activate();
        selection.hover(1);
        selection.begin_capture();

        assert!(selection.finish_capture(true));
        assert!(!selection.is_active());
        assert!(!selection.is_capturing());
    }

    #[test]
    fn test_failed_capture_stays_active() {
        let mut selection = Selection::new();
        selection.activate();
        selection.hover(1);
        selection.begin_capture();

        assert!(!selection.finish_capture(false));
        assert!(selection.is_active());
        assert_eq!(selection.click(true), ClickAction::CaptureNow);
    }

    #[test]
    fn test_debouncer_honours_latest_ticket() {
        let mut debouncer = Debouncer::default();

        let first = debouncer.schedule();
        let second = debouncer.schedule();

        assert!(!debouncer.is_current(first));
        assert!(debouncer.is_current(second));

        debouncer.cancel();
        assert!(!debouncer.is_current(second));
    }

    #[test]
    fn test_deactivate_cancels_pending_refresh() {
        let mut selection: Selection<u32> = Selection::new();
        selection.activate();
        let ticket = selection.refresh.schedule();

        selection.deactivate();

        assert!(!selection.refresh.is_current(ticket));
    }
}
