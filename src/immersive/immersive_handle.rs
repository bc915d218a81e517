//! Immersive Handle - runs a controller in a tokio task
//!
//! The controller itself is synchronous and owns its timer and animation as
//! plain data. This handle gives it a clock: one task receives commands,
//! sleeps until the controller's next deadline and calls `advance` when it
//! passes.
//!
//! ```text
//! ImmersiveCommand ──► [run_controller_loop] ──► ImmersiveNotification
//!   (mpsc, 100)              │    ▲                (caller's mpsc)
//!                            │    │ sleep_until(next_deadline)
//!                            ▼
//!                  watch::Receiver<ImmersiveStatus>
//! ```

use super::controller::{Active, Detached, ImmersiveController, ImmersiveStatus};
use super::observer::{ImmersiveEvent, ImmersiveObserver};
use crate::geometry::Point;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Inbound calls forwarded to a running controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImmersiveCommand {
    MouseMoved(Point),
    AddressBarFocused,
    AddressBarBlurred,
    KeyboardActivity,
    FullscreenChanged(bool),
    ActiveTabChanged,
    RevealUi,
    HideUiAfterDelay,
    HideUiImmediately,
    PinUi,
    UnpinUi,
    SetEnabled(bool),
    /// Ends the loop and tears the controller down.
    WindowDestroying,
}

/// An observer event with the wall-clock time it was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmersiveNotification {
    pub event: ImmersiveEvent,
    pub at: DateTime<Local>,
}

/// Forwards observer events into an mpsc channel.
///
/// Never blocks the controller: when the channel is full or closed the event
/// is dropped with a warning.
pub struct ChannelObserver {
    sender: mpsc::Sender<ImmersiveNotification>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::Sender<ImmersiveNotification>) -> Arc<Self> {
        Arc::new(Self { sender })
    }

    fn forward(&self, event: ImmersiveEvent) {
        let notification = ImmersiveNotification {
            event,
            at: Local::now(),
        };
        if let Err(e) = self.sender.try_send(notification) {
            warn!("Failed to forward immersive notification: {}", e);
        }
    }
}

impl ImmersiveObserver for ChannelObserver {
    fn on_ui_visibility_changed(&self, visible: bool) {
        self.forward(ImmersiveEvent::UiVisibilityChanged(visible));
    }

    fn on_mode_toggled(&self, enabled: bool) {
        self.forward(ImmersiveEvent::ModeToggled(enabled));
    }

    fn on_hover_changed(&self, hovering_top_edge: bool) {
        self.forward(ImmersiveEvent::HoverChanged(hovering_top_edge));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// The controller task is gone and no longer takes commands.
    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Controller task failed: {0}")]
    TaskError(String),

    #[error("Controller already shut down")]
    AlreadyShutDown,
}

/// Owns the task running an active controller.
pub struct ImmersiveHandle {
    command_tx: mpsc::Sender<ImmersiveCommand>,
    status_rx: watch::Receiver<ImmersiveStatus>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<ImmersiveController<Detached>>>,
}

impl ImmersiveHandle {
    /// Moves `controller` into a new task. Observer events are sent to
    /// `notification_tx` in emission order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        mut controller: ImmersiveController<Active>,
        notification_tx: mpsc::Sender<ImmersiveNotification>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (status_tx, status_rx) = watch::channel(controller.status());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        // The controller only holds observers weakly; the task keeps this one alive.
        let observer: Arc<dyn ImmersiveObserver> = ChannelObserver::new(notification_tx);
        controller.add_observer(&observer);

        let task_handle = tokio::spawn(async move {
            info!("Spawning immersive controller task");
            let detached =
                run_controller_loop(controller, command_rx, shutdown_rx, status_tx).await;
            drop(observer);
            detached
        });

        Self {
            command_tx,
            status_rx,
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
        }
    }

    /// A sender for hosts that feed commands from several places.
    pub fn sender(&self) -> mpsc::Sender<ImmersiveCommand> {
        self.command_tx.clone()
    }

    pub async fn send(&self, command: ImmersiveCommand) -> Result<(), HandleError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| HandleError::ChannelError(format!("Failed to send command: {}", e)))
    }

    /// Status updates, published after every loop turn.
    pub fn subscribe(&self) -> watch::Receiver<ImmersiveStatus> {
        self.status_rx.clone()
    }

    /// Latest published status.
    pub fn status(&self) -> ImmersiveStatus {
        *self.status_rx.borrow()
    }

    /// Stops the loop and waits for teardown to finish.
    pub async fn shutdown(&mut self) -> Result<ImmersiveController<Detached>, HandleError> {
        debug!("Sending shutdown signal to immersive controller");

        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Immersive controller task already terminated");
            }
        }

        match self.task_handle.take() {
            Some(handle) => match handle.await {
                Ok(detached) => {
                    debug!("Immersive controller task completed");
                    Ok(detached)
                }
                Err(e) => {
                    error!("Immersive controller task panicked: {}", e);
                    Err(HandleError::TaskError(e.to_string()))
                }
            },
            None => Err(HandleError::AlreadyShutDown),
        }
    }
}

/// Main loop: commands, shutdown and the controller's own deadlines.
///
/// Ends on the shutdown signal, a `WindowDestroying` command, or when every
/// command sender is gone, then performs both teardown phases.
async fn run_controller_loop(
    mut controller: ImmersiveController<Active>,
    mut command_rx: mpsc::Receiver<ImmersiveCommand>,
    mut shutdown_rx: oneshot::Receiver<()>,
    status_tx: watch::Sender<ImmersiveStatus>,
) -> ImmersiveController<Detached> {
    info!("Starting immersive controller loop");

    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received for immersive controller");
                break;
            }

            command = command_rx.recv() => match command {
                Some(ImmersiveCommand::WindowDestroying) => {
                    info!("Window destroying, stopping immersive controller");
                    break;
                }
                Some(command) => {
                    debug!("Applying command: {:?}", command);
                    apply_command(&mut controller, command);
                }
                None => {
                    info!("Command channel closed, stopping immersive controller");
                    break;
                }
            },

            _ = sleep_until_deadline(deadline) => {
                controller.advance(Instant::now());
            }
        }

        status_tx.send_replace(controller.status());
    }

    let detached = controller.on_window_destroying();
    status_tx.send_replace(detached.status());
    detached
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
        }
        None => std::future::pending().await,
    }
}

fn apply_command(controller: &mut ImmersiveController<Active>, command: ImmersiveCommand) {
    match command {
        ImmersiveCommand::MouseMoved(point) => controller.on_mouse_moved(point),
        ImmersiveCommand::AddressBarFocused => controller.on_address_bar_focused(),
        ImmersiveCommand::AddressBarBlurred => controller.on_address_bar_blurred(),
        ImmersiveCommand::KeyboardActivity => controller.on_keyboard_activity(),
        ImmersiveCommand::FullscreenChanged(on) => controller.on_fullscreen_state_changed(on),
        ImmersiveCommand::ActiveTabChanged => controller.on_active_tab_changed(),
        ImmersiveCommand::RevealUi => controller.reveal_ui(),
        ImmersiveCommand::HideUiAfterDelay => controller.hide_ui_after_delay(),
        ImmersiveCommand::HideUiImmediately => controller.hide_ui_immediately(),
        ImmersiveCommand::PinUi => controller.pin_ui(),
        ImmersiveCommand::UnpinUi => controller.unpin_ui(),
        ImmersiveCommand::SetEnabled(enabled) => controller.set_enabled(enabled),
        // Handled by the loop.
        ImmersiveCommand::WindowDestroying => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::immersive::animation::AnimationState;
    use crate::immersive::controller::ImmersiveState;
    use crate::immersive::window::HeadlessWindow;
    use crate::prefs::MemoryPrefStore;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    fn spawn_handle() -> (
        ImmersiveHandle,
        mpsc::Receiver<ImmersiveNotification>,
        HeadlessWindow,
    ) {
        let window = HeadlessWindow::new(Rect::new(0, 0, 1200, 800));
        let mut controller = ImmersiveController::attach_to(
            Box::new(window.clone()),
            Box::new(MemoryPrefStore::new()),
        );
        controller.set_animation_duration(Duration::from_millis(30));
        controller.set_auto_hide_delay(Duration::from_millis(40));

        let (notification_tx, notification_rx) = mpsc::channel(100);
        let handle = ImmersiveHandle::spawn(controller, notification_tx);
        (handle, notification_rx, window)
    }

    async fn next_event(rx: &mut mpsc::Receiver<ImmersiveNotification>) -> ImmersiveEvent {
        timeout(WAIT, rx.recv())
            .await
            .expect("notification in time")
            .expect("channel open")
            .event
    }

    #[tokio::test]
    async fn hover_reveals_and_timer_hides() {
        let (mut handle, mut notifications, window) = spawn_handle();
        let mut status = handle.subscribe();

        handle.send(ImmersiveCommand::SetEnabled(true)).await.unwrap();
        assert_eq!(
            next_event(&mut notifications).await,
            ImmersiveEvent::ModeToggled(true)
        );

        handle
            .send(ImmersiveCommand::MouseMoved(Point::new(600, 1)))
            .await
            .unwrap();
        assert_eq!(
            next_event(&mut notifications).await,
            ImmersiveEvent::HoverChanged(true)
        );
        assert_eq!(
            next_event(&mut notifications).await,
            ImmersiveEvent::UiVisibilityChanged(true)
        );

        handle
            .send(ImmersiveCommand::MouseMoved(Point::new(600, 400)))
            .await
            .unwrap();
        assert_eq!(
            next_event(&mut notifications).await,
            ImmersiveEvent::HoverChanged(false)
        );
        assert_eq!(
            next_event(&mut notifications).await,
            ImmersiveEvent::UiVisibilityChanged(false)
        );

        let hidden = status.wait_for(|s| {
            s.state == ImmersiveState::Enabled && s.animation == AnimationState::None
        });
        timeout(WAIT, hidden)
            .await
            .expect("hidden in time")
            .unwrap();
        assert!(window.auto_managed_visible(false));

        let detached = handle.shutdown().await.unwrap();
        assert_eq!(detached.state(), ImmersiveState::Enabled);
        assert!(!window.is_destruction_watched());
    }

    #[tokio::test]
    async fn window_destroying_ends_the_task() {
        let (mut handle, _notifications, window) = spawn_handle();
        assert!(window.is_destruction_watched());

        handle.send(ImmersiveCommand::WindowDestroying).await.unwrap();
        let detached = timeout(WAIT, handle.shutdown())
            .await
            .expect("task ended")
            .unwrap();

        assert!(!window.is_destruction_watched());
        assert_eq!(detached.state(), ImmersiveState::Disabled);
        assert!(handle.send(ImmersiveCommand::RevealUi).await.is_err());
    }

    #[tokio::test]
    async fn cloned_sender_drives_the_controller() {
        let (mut handle, mut notifications, window) = spawn_handle();
        let commands = handle.sender();
        let mut status = handle.subscribe();

        commands
            .send(ImmersiveCommand::SetEnabled(true))
            .await
            .unwrap();
        assert_eq!(
            next_event(&mut notifications).await,
            ImmersiveEvent::ModeToggled(true)
        );
        timeout(WAIT, status.wait_for(|s| s.state == ImmersiveState::Enabled))
            .await
            .expect("enabled in time")
            .unwrap();

        drop(commands);
        let detached = handle.shutdown().await.unwrap();
        assert!(detached.is_enabled());
        assert!(!window.is_destruction_watched());
    }

    #[tokio::test]
    async fn shutdown_twice_is_an_error() {
        let (mut handle, _notifications, _window) = spawn_handle();

        handle.shutdown().await.unwrap();

        assert!(matches!(
            handle.shutdown().await,
            Err(HandleError::AlreadyShutDown)
        ));
    }
}
