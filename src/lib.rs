//! Immersive fullscreen: auto-hide and reveal of browser chrome (toolbar,
//! tab strip, bookmarks bar) while a window is fullscreen.
//!
//! ```text
//! PrefStore ──► ImmersiveSettings ──► ImmersiveController ──► BrowserWindow
//!                                        │        ▲
//!                         SlideAnimation ┤        │ ImmersiveCommand
//!                          AutoHideTimer ┘        │
//!                                        ▼        │
//!                              ImmersiveObserver  ImmersiveHandle (tokio)
//! ```

pub mod geometry;
pub mod immersive;
pub mod prefs;

pub use geometry::{Point, Rect};
pub use immersive::{
    ImmersiveController, ImmersiveEvent, ImmersiveHandle, ImmersiveObserver, ImmersiveState,
    UiElement,
};
pub use prefs::{ImmersiveSettings, PrefStore};
