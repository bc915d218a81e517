//! # Immersive Mode
//!
//! Decides when the auto-managed chrome of a fullscreen window is shown.
//!
//! ## Components
//!
//! - [`ImmersiveController`]: the visibility state machine, wrapped in a
//!   statum lifecycle (`Initializing -> Active -> Quiesced -> Detached`)
//! - [`SlideAnimation`]: show/hide progress, switched at the midpoint
//! - [`AutoHideTimer`]: single pending hide deadline
//! - [`ObserverList`]: weak fan-out of [`ImmersiveEvent`]s
//! - [`ImmersiveHandle`]: runs an active controller in a tokio task
//!
//! ## Data Flow
//!
//! ```text
//! pointer / focus / keys / tabs ──► ImmersiveController ──► BrowserWindow
//!                                        │
//!                                        ├──► ImmersiveObserver
//!                                        │
//!                  advance(now) ◄────────┘ next_deadline()
//! ```

pub mod animation;
pub mod controller;
pub mod immersive_handle;
pub mod observer;
pub mod timer;
pub mod ui_element;
pub mod window;

pub use animation::{AnimationState, SlideAnimation};
pub use controller::{
    Active, Detached, ImmersiveController, ImmersiveLifecycle, ImmersiveState, ImmersiveStatus,
    Initializing, Quiesced,
};
pub use immersive_handle::{
    ChannelObserver, HandleError, ImmersiveCommand, ImmersiveHandle, ImmersiveNotification,
};
pub use observer::{EventRecorder, ImmersiveEvent, ImmersiveObserver, ObserverList};
pub use timer::AutoHideTimer;
pub use ui_element::UiElement;
pub use window::{BrowserWindow, HeadlessWindow};
