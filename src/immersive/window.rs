//! Window host seam.
//!
//! The controller never renders anything itself. It asks a [`BrowserWindow`]
//! for its screen bounds, tells it which chrome elements to show, and registers
//! interest in the window's destruction so it can tear itself down first.

use super::ui_element::UiElement;
use crate::geometry::Rect;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// The window an immersive controller is bound to.
pub trait BrowserWindow: Send {
    /// Window bounds in screen coordinates.
    fn bounds_in_screen(&self) -> Rect;

    /// Shows or hides one element. Hosts without the element ignore the call.
    fn set_element_visible(&mut self, element: UiElement, visible: bool);

    /// Starts delivering the window-destroying notification to the controller.
    fn watch_destruction(&mut self);

    /// Stops delivering the window-destroying notification.
    fn unwatch_destruction(&mut self);
}

/// Owns the controller's window and keeps track of destruction observation.
///
/// Dropping a guard that is still watching unregisters from the window, so a
/// controller that is dropped without going through teardown never leaves a
/// dangling observer behind.
pub struct WatchedWindow {
    inner: Box<dyn BrowserWindow>,
    watched: bool,
}

impl WatchedWindow {
    pub fn new(inner: Box<dyn BrowserWindow>) -> Self {
        Self {
            inner,
            watched: false,
        }
    }

    pub fn bounds_in_screen(&self) -> Rect {
        self.inner.bounds_in_screen()
    }

    pub fn set_element_visible(&mut self, element: UiElement, visible: bool) {
        self.inner.set_element_visible(element, visible);
    }

    pub fn watch(&mut self) {
        if !self.watched {
            self.inner.watch_destruction();
            self.watched = true;
        }
    }

    pub fn unwatch(&mut self) {
        if self.watched {
            self.inner.unwatch_destruction();
            self.watched = false;
        }
    }

    /// Hands the window back, unregistering first if still watching.
    pub fn release(mut self) -> Box<dyn BrowserWindow> {
        self.unwatch();
        std::mem::replace(&mut self.inner, Box::new(ReleasedWindow))
    }
}

impl Drop for WatchedWindow {
    fn drop(&mut self) {
        if self.watched {
            debug!("Window guard dropped while watching, unregistering");
            self.inner.unwatch_destruction();
        }
    }
}

// Left behind in a guard whose window was handed back.
struct ReleasedWindow;

impl BrowserWindow for ReleasedWindow {
    fn bounds_in_screen(&self) -> Rect {
        Rect::default()
    }

    fn set_element_visible(&mut self, _element: UiElement, _visible: bool) {}

    fn watch_destruction(&mut self) {}

    fn unwatch_destruction(&mut self) {}
}

#[derive(Debug, Default)]
struct HeadlessState {
    visible: HashMap<UiElement, bool>,
    calls: Vec<(UiElement, bool)>,
    destruction_watched: bool,
}

/// A window without a screen: fixed bounds, recorded element visibility.
///
/// Clones share the same state, so a host can hand one clone to a
/// controller and keep another for inspection.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    bounds: Rect,
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessWindow {
    /// All elements start visible.
    pub fn new(bounds: Rect) -> Self {
        let visible = UiElement::ALL.iter().map(|element| (*element, true)).collect();
        Self {
            bounds,
            state: Arc::new(Mutex::new(HeadlessState {
                visible,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_element_visible(&self, element: UiElement) -> bool {
        self.lock().visible.get(&element).copied().unwrap_or(false)
    }

    /// True when every auto-managed element has the given visibility.
    pub fn auto_managed_visible(&self, visible: bool) -> bool {
        let state = self.lock();
        UiElement::AUTO_MANAGED
            .iter()
            .all(|element| state.visible.get(element).copied() == Some(visible))
    }

    /// Every `set_element_visible` call so far, in order.
    pub fn visibility_calls(&self) -> Vec<(UiElement, bool)> {
        self.lock().calls.clone()
    }

    pub fn is_destruction_watched(&self) -> bool {
        self.lock().destruction_watched
    }
}

impl BrowserWindow for HeadlessWindow {
    fn bounds_in_screen(&self) -> Rect {
        self.bounds
    }

    fn set_element_visible(&mut self, element: UiElement, visible: bool) {
        debug!("Setting {} visible={}", element, visible);
        let mut state = self.lock();
        state.visible.insert(element, visible);
        state.calls.push((element, visible));
    }

    fn watch_destruction(&mut self) {
        self.lock().destruction_watched = true;
    }

    fn unwatch_destruction(&mut self) {
        self.lock().destruction_watched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let window = HeadlessWindow::new(Rect::new(0, 0, 1200, 800));
        let mut handle = window.clone();

        handle.set_element_visible(UiElement::Toolbar, false);
        handle.watch_destruction();

        assert!(!window.is_element_visible(UiElement::Toolbar));
        assert!(window.is_element_visible(UiElement::DownloadShelf));
        assert!(window.is_destruction_watched());
        assert_eq!(window.visibility_calls(), vec![(UiElement::Toolbar, false)]);
    }

    #[test]
    fn auto_managed_visible_checks_all_three() {
        let mut window = HeadlessWindow::new(Rect::new(0, 0, 100, 100));
        assert!(window.auto_managed_visible(true));

        window.set_element_visible(UiElement::Toolbar, false);
        window.set_element_visible(UiElement::TabStrip, false);
        assert!(!window.auto_managed_visible(false));

        window.set_element_visible(UiElement::BookmarksBar, false);
        assert!(window.auto_managed_visible(false));
    }

    #[test]
    fn dropping_a_watching_guard_unregisters() {
        let window = HeadlessWindow::new(Rect::new(0, 0, 100, 100));
        {
            let mut guard = WatchedWindow::new(Box::new(window.clone()));
            guard.watch();
            assert!(window.is_destruction_watched());
        }
        assert!(!window.is_destruction_watched());
    }

    #[test]
    fn released_window_is_no_longer_watched() {
        let window = HeadlessWindow::new(Rect::new(0, 0, 100, 100));
        let mut guard = WatchedWindow::new(Box::new(window.clone()));
        guard.watch();

        let released = guard.release();

        assert!(!window.is_destruction_watched());
        assert_eq!(released.bounds_in_screen(), Rect::new(0, 0, 100, 100));
    }
}
