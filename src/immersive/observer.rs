//! Observer fan-out for immersive events.
//!
//! The controller holds observers weakly: registering does not keep an
//! observer alive, and observers that have been dropped are pruned on the
//! next notification.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

/// Events emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmersiveEvent {
    /// Chrome became visible (`true`) or hidden (`false`).
    UiVisibilityChanged(bool),
    /// Immersive mode was switched on or off.
    ModeToggled(bool),
    /// The pointer entered or left the top-edge hot zone.
    HoverChanged(bool),
}

/// Receives immersive events. Every method defaults to a no-op.
pub trait ImmersiveObserver: Send + Sync {
    fn on_ui_visibility_changed(&self, _visible: bool) {}

    fn on_mode_toggled(&self, _enabled: bool) {}

    fn on_hover_changed(&self, _hovering_top_edge: bool) {}
}

/// Registered observers, notified in registration order.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Weak<dyn ImmersiveObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer; adding the same observer twice has no effect.
    pub fn add(&mut self, observer: &Arc<dyn ImmersiveObserver>) {
        let weak = Arc::downgrade(observer);
        if self.observers.iter().any(|existing| existing.ptr_eq(&weak)) {
            debug!("Observer already registered");
            return;
        }
        self.observers.push(weak);
    }

    pub fn remove(&mut self, observer: &Arc<dyn ImmersiveObserver>) {
        let weak = Arc::downgrade(observer);
        self.observers.retain(|existing| !existing.ptr_eq(&weak));
    }

    /// Number of registered observers that are still alive.
    pub fn len(&self) -> usize {
        self.observers
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&mut self, event: ImmersiveEvent) {
        self.observers.retain(|observer| observer.strong_count() > 0);

        for observer in &self.observers {
            let Some(observer) = observer.upgrade() else {
                continue;
            };
            match event {
                ImmersiveEvent::UiVisibilityChanged(visible) => {
                    observer.on_ui_visibility_changed(visible)
                }
                ImmersiveEvent::ModeToggled(enabled) => observer.on_mode_toggled(enabled),
                ImmersiveEvent::HoverChanged(hovering) => observer.on_hover_changed(hovering),
            }
        }
    }
}

/// Observer that keeps every event it receives, in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<ImmersiveEvent>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: ImmersiveEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<ImmersiveEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events equal to `event`.
    pub fn count(&self, event: ImmersiveEvent) -> usize {
        self.events()
            .into_iter()
            .filter(|recorded| *recorded == event)
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ImmersiveObserver for EventRecorder {
    fn on_ui_visibility_changed(&self, visible: bool) {
        self.push(ImmersiveEvent::UiVisibilityChanged(visible));
    }

    fn on_mode_toggled(&self, enabled: bool) {
        self.push(ImmersiveEvent::ModeToggled(enabled));
    }

    fn on_hover_changed(&self, hovering_top_edge: bool) {
        self.push(ImmersiveEvent::HoverChanged(hovering_top_edge));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_each_observer_once_in_order() {
        let first = EventRecorder::new();
        let second = EventRecorder::new();
        let first_dyn: Arc<dyn ImmersiveObserver> = first.clone();
        let second_dyn: Arc<dyn ImmersiveObserver> = second.clone();

        let mut list = ObserverList::new();
        list.add(&first_dyn);
        list.add(&second_dyn);
        list.add(&first_dyn);
        assert_eq!(list.len(), 2);

        list.notify(ImmersiveEvent::ModeToggled(true));

        assert_eq!(first.events(), vec![ImmersiveEvent::ModeToggled(true)]);
        assert_eq!(second.events(), vec![ImmersiveEvent::ModeToggled(true)]);
    }

    #[test]
    fn removed_observer_is_not_notified() {
        let recorder = EventRecorder::new();
        let observer: Arc<dyn ImmersiveObserver> = recorder.clone();

        let mut list = ObserverList::new();
        list.add(&observer);
        list.remove(&observer);
        list.notify(ImmersiveEvent::HoverChanged(true));

        assert!(recorder.events().is_empty());
        assert!(list.is_empty());
    }

    #[test]
    fn dropped_observer_is_pruned() {
        let mut list = ObserverList::new();
        {
            let observer: Arc<dyn ImmersiveObserver> = EventRecorder::new();
            list.add(&observer);
            assert_eq!(list.len(), 1);
        }

        list.notify(ImmersiveEvent::UiVisibilityChanged(true));
        assert!(list.is_empty());
    }
}
