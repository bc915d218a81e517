//! Immersive visibility controller with a statum lifecycle.
//!
//! Two state machines live here. The runtime one decides whether chrome is
//! visible:
//!
//! ```text
//!             set_enabled(true)             reveal / hover / focus
//! Disabled ───────────────────► Enabled ─────────────────────────► Revealed
//!    ▲                           ▲   │                              │  ▲
//!    │ set_enabled(false)        │   │ pin_ui                pin_ui │  │ unpin_ui
//!    │ (from any state)          │   ▼                              ▼  │
//!    │                           │  Pinned ◄────────────────────────────┘
//!    │                           │
//!    │                           └──── auto-hide timer / hide_ui_immediately
//! ```
//!
//! The compile-time one orders construction and teardown:
//!
//! ```text
//! Initializing ──attach──► Active ──shutdown──► Quiesced ──detach──► Detached
//! ```
//!
//! Only an `Active` controller accepts events. Teardown stops the timer and
//! the animation before letting go of the window's destruction notification,
//! and there is no way to write it the other way round. A controller dropped
//! at any stage still unregisters from the window.
//!
//! The auto-hide timer and the slide animation are plain data owned by the
//! controller. Neither can call back on its own; time only moves forward
//! through [`ImmersiveController::advance`], so cancelling a pending hide is
//! always atomic with the state change that wanted it cancelled.

use super::animation::{AnimationState, AnimationTick, SlideAnimation};
use super::observer::{ImmersiveEvent, ImmersiveObserver, ObserverList};
use super::timer::AutoHideTimer;
use super::ui_element::UiElement;
use super::window::{BrowserWindow, WatchedWindow};
use crate::geometry::Point;
use crate::prefs::{keys, ImmersiveSettings, PrefStore};
use statum::{machine, state};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Progress above which elements count as shown while animating.
const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Animation value when chrome is fully shown.
const FULLY_SHOWN: f64 = 1.0;

/// Where the immersive state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImmersiveState {
    /// Not fullscreen, or immersive mode switched off
    #[default]
    Disabled,
    /// Immersive with chrome hidden
    Enabled,
    /// Immersive with chrome temporarily shown
    Revealed,
    /// Immersive with chrome held visible until unpinned
    Pinned,
}

impl ImmersiveState {
    pub fn is_enabled(&self) -> bool {
        *self != ImmersiveState::Disabled
    }

    pub fn is_ui_visible(&self) -> bool {
        matches!(self, ImmersiveState::Revealed | ImmersiveState::Pinned)
    }
}

impl fmt::Display for ImmersiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImmersiveState::Disabled => write!(f, "Disabled"),
            ImmersiveState::Enabled => write!(f, "Enabled"),
            ImmersiveState::Revealed => write!(f, "Revealed"),
            ImmersiveState::Pinned => write!(f, "Pinned"),
        }
    }
}

/// Point-in-time view of a controller, for hosts that poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImmersiveStatus {
    pub state: ImmersiveState,
    pub ui_visible: bool,
    pub hovering_top_edge: bool,
    pub address_bar_focused: bool,
    pub animation: AnimationState,
    pub auto_hide_pending: bool,
}

#[derive(Debug, Default)]
struct VisibilityState {
    state: ImmersiveState,
    animation_state: AnimationState,
    // Pointer is inside the hot zone
    should_show_ui: bool,
    address_bar_focused: bool,
    // Last hover result, kept to detect edges
    mouse_in_top_edge: bool,
    // What the auto-managed elements were last set to
    elements_visible: Option<bool>,
}

/// Lifecycle stages of a controller.
#[state]
#[derive(Debug, Clone)]
pub enum ImmersiveLifecycle {
    Initializing, // Settings loaded, not yet bound to the window
    Active,       // Observing the window and handling events
    Quiesced,     // Timer and animation stopped
    Detached,     // No longer observing the window
}

/// Drives chrome visibility for one fullscreen window.
#[machine]
pub struct ImmersiveController<S: ImmersiveLifecycle> {
    window: WatchedWindow,
    prefs: Box<dyn PrefStore>,
    settings: ImmersiveSettings,
    visibility: VisibilityState,
    timer: AutoHideTimer,
    animation: SlideAnimation,
    observers: ObserverList,
}

impl<S: ImmersiveLifecycle> ImmersiveController<S> {
    pub fn state(&self) -> ImmersiveState {
        self.visibility.state
    }

    pub fn is_enabled(&self) -> bool {
        self.visibility.state.is_enabled()
    }

    pub fn is_ui_visible(&self) -> bool {
        self.visibility.state.is_ui_visible()
    }

    pub fn animation_state(&self) -> AnimationState {
        self.visibility.animation_state
    }

    pub fn is_hovering_top_edge(&self) -> bool {
        self.visibility.mouse_in_top_edge
    }

    pub fn is_address_bar_focused(&self) -> bool {
        self.visibility.address_bar_focused
    }

    pub fn is_auto_hide_scheduled(&self) -> bool {
        self.timer.is_running()
    }

    /// Current animation progress, 0 hidden to 1 shown.
    pub fn animation_value(&self) -> f64 {
        self.animation.value()
    }

    pub fn settings(&self) -> &ImmersiveSettings {
        &self.settings
    }

    pub fn prefs(&self) -> &dyn PrefStore {
        self.prefs.as_ref()
    }

    pub fn status(&self) -> ImmersiveStatus {
        ImmersiveStatus {
            state: self.visibility.state,
            ui_visible: self.is_ui_visible(),
            hovering_top_edge: self.visibility.mouse_in_top_edge,
            address_bar_focused: self.visibility.address_bar_focused,
            animation: self.visibility.animation_state,
            auto_hide_pending: self.timer.is_running(),
        }
    }
}

impl ImmersiveController<Initializing> {
    /// Builds a controller for `window`, snapshotting settings from `prefs`.
    pub fn create(window: Box<dyn BrowserWindow>, prefs: Box<dyn PrefStore>) -> Self {
        let settings = ImmersiveSettings::load(prefs.as_ref());
        info!(
            "Creating immersive controller: delay={:?}, animation={:?}, sensitivity={}px",
            settings.auto_hide_delay, settings.animation_duration, settings.top_edge_sensitivity_px
        );

        let timer = AutoHideTimer::new(settings.auto_hide_delay);
        // Chrome is fully shown while immersive mode is off.
        let animation = SlideAnimation::new(settings.animation_duration, FULLY_SHOWN);
        let visibility = VisibilityState {
            elements_visible: Some(true),
            ..Default::default()
        };

        Self::new(
            WatchedWindow::new(window),
            prefs,
            settings,
            visibility,
            timer,
            animation,
            ObserverList::new(),
        )
    }

    /// Starts observing the window's destruction.
    pub fn attach(mut self) -> ImmersiveController<Active> {
        self.window.watch();
        debug!("Immersive controller attached to window");
        self.transition()
    }
}

impl ImmersiveController<Active> {
    /// `create` followed by `attach`.
    pub fn attach_to(window: Box<dyn BrowserWindow>, prefs: Box<dyn PrefStore>) -> Self {
        ImmersiveController::<Initializing>::create(window, prefs).attach()
    }

    /// Turns immersive mode on or off.
    ///
    /// Enabling is silently refused while the legacy fullscreen-toolbar
    /// preference vetoes it. Repeating the current mode does nothing.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.is_enabled() {
            return;
        }

        if enabled && self.should_disable_immersive_mode() {
            info!("Immersive mode vetoed by legacy fullscreen toolbar preference");
            return;
        }

        let now = Instant::now();

        if enabled {
            self.visibility.state = ImmersiveState::Enabled;
            self.mark_introduction_seen();

            if self.visibility.should_show_ui || self.visibility.address_bar_focused {
                self.reveal(now);
            } else {
                self.animate_hide_ui(now);
            }
        } else {
            self.visibility.state = ImmersiveState::Disabled;

            self.timer.stop();
            self.complete_animation();

            self.set_all_ui_elements_visible(true);
            self.animation.reset(FULLY_SHOWN);
        }

        info!("Immersive mode toggled: enabled={}", enabled);
        self.notify(ImmersiveEvent::ModeToggled(enabled));
    }

    /// Shows chrome until something hides it again.
    pub fn reveal_ui(&mut self) {
        self.reveal(Instant::now());
    }

    /// Arms the auto-hide timer unless something keeps chrome up.
    pub fn hide_ui_after_delay(&mut self) {
        self.hide_after_delay(Instant::now());
    }

    /// Hides chrome now. Ignored while disabled or pinned.
    pub fn hide_ui_immediately(&mut self) {
        self.hide_immediately(Instant::now());
    }

    /// Keeps chrome visible until [`unpin_ui`](Self::unpin_ui).
    pub fn pin_ui(&mut self) {
        if self.visibility.state == ImmersiveState::Disabled {
            return;
        }

        self.timer.stop();

        let was_visible = self.is_ui_visible();
        self.visibility.state = ImmersiveState::Pinned;
        debug!("Chrome pinned");

        if !was_visible {
            self.animate_show_ui(Instant::now());
            self.notify(ImmersiveEvent::UiVisibilityChanged(true));
        }
    }

    pub fn unpin_ui(&mut self) {
        if self.visibility.state != ImmersiveState::Pinned {
            return;
        }

        self.visibility.state = ImmersiveState::Revealed;
        debug!("Chrome unpinned");

        if !self.visibility.should_show_ui && !self.visibility.address_bar_focused {
            self.hide_after_delay(Instant::now());
        }
    }

    /// Pointer moved, in screen coordinates.
    ///
    /// Cheap enough for every pointer event: without a hot-zone edge it only
    /// refreshes the cached hover flag.
    pub fn on_mouse_moved(&mut self, location_in_screen: Point) {
        if self.visibility.state == ImmersiveState::Disabled {
            return;
        }

        let was_in_top_edge = self.visibility.mouse_in_top_edge;
        let in_top_edge = self.is_mouse_in_top_edge(location_in_screen);
        self.visibility.mouse_in_top_edge = in_top_edge;

        if in_top_edge != was_in_top_edge {
            debug!("Top edge hover changed: {}", in_top_edge);
            self.notify(ImmersiveEvent::HoverChanged(in_top_edge));
        }

        let old_should_show = self.visibility.should_show_ui;
        self.visibility.should_show_ui = in_top_edge;

        if in_top_edge && !old_should_show {
            self.reveal(Instant::now());
        } else if !in_top_edge && old_should_show && !self.visibility.address_bar_focused {
            self.hide_after_delay(Instant::now());
        }
    }

    pub fn on_address_bar_focused(&mut self) {
        self.visibility.address_bar_focused = true;

        if self.settings.show_on_address_bar_focus && self.is_enabled() {
            self.reveal(Instant::now());
        }
    }

    pub fn on_address_bar_blurred(&mut self) {
        self.visibility.address_bar_focused = false;

        if self.is_enabled()
            && self.visibility.state != ImmersiveState::Pinned
            && !self.visibility.should_show_ui
        {
            self.hide_after_delay(Instant::now());
        }
    }

    /// A key was pressed. Reveals without keeping chrome up afterwards.
    pub fn on_keyboard_activity(&mut self) {
        if self.settings.show_on_keyboard_activity && self.is_enabled() {
            self.reveal(Instant::now());
        }
    }

    /// Entering fullscreen enables immersive mode when the preference allows
    /// it; leaving fullscreen always disables it.
    pub fn on_fullscreen_state_changed(&mut self, is_fullscreen: bool) {
        debug!("Fullscreen state changed: {}", is_fullscreen);

        if is_fullscreen {
            if self.prefs.get_bool(keys::IMMERSIVE_FULLSCREEN_ENABLED) {
                self.set_enabled(true);
            } else {
                debug!("Immersive fullscreen disabled by preference");
            }
        } else {
            self.set_enabled(false);
        }
    }

    /// Briefly shows chrome on every tab switch.
    pub fn on_active_tab_changed(&mut self) {
        if self.visibility.state == ImmersiveState::Disabled {
            return;
        }

        let now = Instant::now();
        self.reveal(now);
        if self.visibility.state != ImmersiveState::Pinned {
            self.hide_after_delay(now);
        }
    }

    pub fn add_observer(&mut self, observer: &Arc<dyn ImmersiveObserver>) {
        self.observers.add(observer);
    }

    pub fn remove_observer(&mut self, observer: &Arc<dyn ImmersiveObserver>) {
        self.observers.remove(observer);
    }

    /// Moves time forward: steps the animation and fires a due auto-hide.
    pub fn advance(&mut self, now: Instant) {
        if self.animation.is_animating() {
            let tick = self.animation.step(now);
            self.apply_animation_tick(tick);
        }

        if self.timer.fire_if_due(now) {
            debug!("Auto-hide timer fired");
            self.on_auto_hide_timer(now);
        }
    }

    /// Earliest instant at which [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.timer.deadline(), self.animation.next_frame_at()]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.settings.animation_duration = duration;
        self.animation.set_duration(duration);
    }

    pub fn set_auto_hide_delay(&mut self, delay: Duration) {
        self.settings.auto_hide_delay = delay;
        self.timer.set_delay(delay);
    }

    /// Runs the auto-hide path now, whether or not the timer is armed.
    pub fn fire_auto_hide_timer(&mut self) {
        self.timer.stop();
        self.on_auto_hide_timer(Instant::now());
    }

    /// First teardown phase: stop the timer and the animation.
    pub fn shutdown(mut self) -> ImmersiveController<Quiesced> {
        info!("Shutting down immersive controller");

        self.timer.stop();
        self.animation.end();
        self.visibility.animation_state = AnimationState::None;

        self.transition()
    }

    /// The window is going away: both teardown phases, in order.
    pub fn on_window_destroying(self) -> ImmersiveController<Detached> {
        self.shutdown().detach()
    }

    fn reveal(&mut self, now: Instant) {
        if self.visibility.state == ImmersiveState::Disabled {
            return;
        }

        let was_visible = self.is_ui_visible();

        if self.visibility.state == ImmersiveState::Enabled {
            self.visibility.state = ImmersiveState::Revealed;
        }

        self.timer.stop();
        self.animate_show_ui(now);

        if !was_visible {
            debug!("Revealing chrome");
            self.notify(ImmersiveEvent::UiVisibilityChanged(true));
        }
    }

    fn hide_after_delay(&mut self, now: Instant) {
        if matches!(
            self.visibility.state,
            ImmersiveState::Disabled | ImmersiveState::Pinned
        ) {
            return;
        }

        if self.visibility.should_show_ui || self.visibility.address_bar_focused {
            return;
        }

        debug!("Scheduling auto-hide in {:?}", self.timer.delay());
        self.timer.start(now);
    }

    fn hide_immediately(&mut self, now: Instant) {
        if matches!(
            self.visibility.state,
            ImmersiveState::Disabled | ImmersiveState::Pinned
        ) {
            return;
        }

        self.timer.stop();

        let was_visible = self.is_ui_visible();
        self.visibility.state = ImmersiveState::Enabled;

        self.animate_hide_ui(now);

        if was_visible {
            debug!("Hiding chrome");
            self.notify(ImmersiveEvent::UiVisibilityChanged(false));
        }
    }

    fn on_auto_hide_timer(&mut self, now: Instant) {
        self.hide_immediately(now);
    }

    fn animate_show_ui(&mut self, now: Instant) {
        if self.visibility.animation_state == AnimationState::ShowingUi {
            return;
        }
        self.visibility.animation_state = AnimationState::ShowingUi;

        if let AnimationTick::Ended(_) = self.animation.show(now) {
            self.on_animation_completed();
        }
    }

    fn animate_hide_ui(&mut self, now: Instant) {
        if self.visibility.animation_state == AnimationState::HidingUi {
            return;
        }
        self.visibility.animation_state = AnimationState::HidingUi;

        if let AnimationTick::Ended(_) = self.animation.hide(now) {
            self.on_animation_completed();
        }
    }

    fn complete_animation(&mut self) {
        if self.visibility.animation_state == AnimationState::None {
            return;
        }

        self.animation.end();
        self.visibility.animation_state = AnimationState::None;
    }

    fn apply_animation_tick(&mut self, tick: AnimationTick) {
        match tick {
            AnimationTick::Idle => {}
            AnimationTick::Progressed(value) => self.on_animation_progressed(value),
            AnimationTick::Ended(_) => self.on_animation_completed(),
        }
    }

    fn on_animation_progressed(&mut self, value: f64) {
        if self.visibility.state == ImmersiveState::Disabled {
            return;
        }

        let visible = value > VISIBILITY_THRESHOLD;
        if self.visibility.elements_visible != Some(visible) {
            self.set_all_ui_elements_visible(visible);
        }
    }

    fn on_animation_completed(&mut self) {
        self.visibility.animation_state = AnimationState::None;

        if self.visibility.state == ImmersiveState::Disabled {
            return;
        }

        // The state may have moved on while the animation ran.
        let visible = self.is_ui_visible();
        self.set_all_ui_elements_visible(visible);
    }

    fn is_mouse_in_top_edge(&self, location_in_screen: Point) -> bool {
        self.window
            .bounds_in_screen()
            .top_strip(self.settings.top_edge_sensitivity_px)
            .contains(location_in_screen)
    }

    fn should_disable_immersive_mode(&self) -> bool {
        self.prefs.get_bool(keys::RESPECT_LEGACY_FULLSCREEN_PREF)
            && self.prefs.get_bool(keys::SHOW_FULLSCREEN_TOOLBAR)
    }

    fn mark_introduction_seen(&mut self) {
        if self.prefs.get_bool(keys::HAS_SEEN_INTRODUCTION) {
            return;
        }

        match self.prefs.set_bool(keys::HAS_SEEN_INTRODUCTION, true) {
            Ok(()) => info!("First immersive fullscreen session"),
            Err(e) => warn!("Failed to record immersive introduction: {}", e),
        }
    }

    fn set_all_ui_elements_visible(&mut self, visible: bool) {
        for element in UiElement::AUTO_MANAGED {
            self.window.set_element_visible(element, visible);
        }
        self.visibility.elements_visible = Some(visible);
    }

    fn notify(&mut self, event: ImmersiveEvent) {
        self.observers.notify(event);
    }
}

impl ImmersiveController<Quiesced> {
    /// Second teardown phase: stop observing the window.
    pub fn detach(mut self) -> ImmersiveController<Detached> {
        self.window.unwatch();
        debug!("Immersive controller detached from window");
        self.transition()
    }
}

impl ImmersiveController<Detached> {
    /// Hands back the window and the preference store.
    pub fn into_parts(self) -> (Box<dyn BrowserWindow>, Box<dyn PrefStore>) {
        (self.window.release(), self.prefs)
    }
}
