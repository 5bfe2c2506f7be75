use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, Weak,
    },
    time::Duration,
};

use gateway::CommandGateway;
use shared::{
    domain::{DeviceId, FavoriteSelector},
    error::OperationFailed,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    notifier::HideTimer,
    state::{ErrorNotification, PanelEvent, PanelView},
    DEFAULT_HIDE_DELAY,
};

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Operation(#[from] OperationFailed),
    #[error("panel is already initialized")]
    AlreadyInitialized,
    #[error("panel has been torn down")]
    TornDown,
}

/// Result of a single user action. Gateway failures end here: they are shown
/// in the notification and never re-raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Failed(OperationFailed),
    /// Input was refused before reaching the gateway.
    Rejected(String),
    /// The panel was torn down while the call was in flight.
    Discarded,
}

struct PanelState {
    alive: bool,
    favorites: Vec<FavoriteSelector>,
    device_input: String,
    notification: ErrorNotification,
    hide_timer: HideTimer,
}

pub struct PanelController {
    gateway: CommandGateway,
    hide_delay: Duration,
    initialized: AtomicBool,
    state: Mutex<PanelState>,
    events: broadcast::Sender<PanelEvent>,
}

impl PanelController {
    /// Must be called from within a Tokio runtime; the hide timer is spawned
    /// on it.
    pub fn new(gateway: CommandGateway) -> Arc<Self> {
        Self::with_hide_delay(gateway, DEFAULT_HIDE_DELAY)
    }

    pub fn with_hide_delay(gateway: CommandGateway, hide_delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            gateway,
            hide_delay,
            initialized: AtomicBool::new(false),
            state: Mutex::new(PanelState {
                alive: true,
                favorites: Vec::new(),
                device_input: String::new(),
                notification: ErrorNotification::default(),
                hide_timer: HideTimer::default(),
            }),
            events,
        })
    }

    pub fn hide_delay(&self) -> Duration {
        self.hide_delay
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub fn view(&self) -> PanelView {
        let state = self.lock_state();
        PanelView {
            favorites: state.favorites.clone(),
            device_input: state.device_input.clone(),
            notification: state.notification.clone(),
        }
    }

    pub fn favorites(&self) -> Vec<FavoriteSelector> {
        self.lock_state().favorites.clone()
    }

    /// Labels of the one-click favorite actions, in list order.
    pub fn favorite_actions(&self) -> Vec<String> {
        self.lock_state()
            .favorites
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn notification(&self) -> ErrorNotification {
        self.lock_state().notification.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_alive(&self) -> bool {
        self.lock_state().alive
    }

    /// Loads the favorites list. Only the first call reaches the gateway.
    ///
    /// A failure is shown in the notification and also returned, so whoever
    /// drives startup can tell it went wrong. The favorites stay empty.
    pub async fn initialize(self: &Arc<Self>) -> Result<Vec<FavoriteSelector>, PanelError> {
        if !self.is_alive() {
            return Err(PanelError::TornDown);
        }
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(PanelError::AlreadyInitialized);
        }

        match self.gateway.list_favorites().await {
            Ok(favorites) => {
                {
                    let mut state = self.lock_state();
                    if !state.alive {
                        debug!("discarding favorites loaded after teardown");
                        return Err(PanelError::TornDown);
                    }
                    state.favorites = favorites.clone();
                }
                info!(count = favorites.len(), "loaded favorites");
                let _ = self.events.send(PanelEvent::FavoritesLoaded(favorites.clone()));
                Ok(favorites)
            }
            Err(failure) => {
                if !self.show_error(failure.reason()) {
                    return Err(PanelError::TornDown);
                }
                Err(PanelError::Operation(failure))
            }
        }
    }

    /// Records the uncommitted text of the device id field.
    pub fn set_device_input(&self, text: impl Into<String>) {
        self.lock_state().device_input = text.into();
    }

    /// Submits whatever is currently in the device id field. The field keeps
    /// its contents regardless of the outcome.
    pub async fn submit_device_input(self: &Arc<Self>) -> ActionOutcome {
        let raw = self.lock_state().device_input.clone();
        self.submit_switch(&raw).await
    }

    /// Parses `raw_text` as a device id and asks the gateway to switch to it.
    /// Text that is not a non-negative integer is refused locally and shown
    /// as an error without contacting the gateway.
    pub async fn submit_switch(self: &Arc<Self>, raw_text: &str) -> ActionOutcome {
        if !self.is_alive() {
            return ActionOutcome::Discarded;
        }
        let device_id = match DeviceId::parse(raw_text) {
            Ok(device_id) => device_id,
            Err(error) => {
                let reason = error.to_string();
                if !self.show_error(&reason) {
                    return ActionOutcome::Discarded;
                }
                return ActionOutcome::Rejected(reason);
            }
        };

        match self.gateway.switch_device(device_id).await {
            Ok(()) => self.complete(|| info!(%device_id, "switched devbox")),
            Err(failure) => self.fail(failure),
        }
    }

    pub async fn activate_favorite(
        self: &Arc<Self>,
        selector: &FavoriteSelector,
    ) -> ActionOutcome {
        if !self.is_alive() {
            return ActionOutcome::Discarded;
        }
        match self.gateway.activate_favorite(selector).await {
            Ok(()) => self.complete(|| info!(%selector, "switched to favorite")),
            Err(failure) => self.fail(failure),
        }
    }

    /// Stops the panel: the hide timer is cancelled and results of calls
    /// still in flight are dropped.
    pub fn teardown(&self) {
        let mut state = self.lock_state();
        if !state.alive {
            return;
        }
        state.alive = false;
        state.hide_timer.cancel();
        info!("panel torn down");
    }

    fn complete(&self, log: impl FnOnce()) -> ActionOutcome {
        if !self.is_alive() {
            return ActionOutcome::Discarded;
        }
        log();
        ActionOutcome::Completed
    }

    fn fail(self: &Arc<Self>, failure: OperationFailed) -> ActionOutcome {
        if !self.show_error(failure.reason()) {
            return ActionOutcome::Discarded;
        }
        ActionOutcome::Failed(failure)
    }

    /// Shows `message` and (re)arms the hide timer from now. Returns false if
    /// the panel is already torn down.
    fn show_error(self: &Arc<Self>, message: &str) -> bool {
        {
            let mut state = self.lock_state();
            if !state.alive {
                debug!(reason = message, "dropping error after teardown");
                return false;
            }
            state.notification = ErrorNotification {
                message: message.to_string(),
                visible: true,
            };

            let panel = Arc::downgrade(self);
            let delay = self.hide_delay;
            state
                .hide_timer
                .rearm(|generation| tokio::spawn(hide_after(panel, delay, generation)));
        }
        warn!(reason = message, "showing error notification");
        let _ = self
            .events
            .send(PanelEvent::NotificationShown(message.to_string()));
        true
    }

    fn hide_if_current(&self, generation: u64) {
        {
            let mut state = self.lock_state();
            if !state.alive || !state.hide_timer.fire(generation) {
                return;
            }
            state.notification.visible = false;
        }
        debug!("error notification hidden");
        let _ = self.events.send(PanelEvent::NotificationHidden);
    }

    fn lock_state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PanelController {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.hide_timer.cancel();
    }
}

async fn hide_after(panel: Weak<PanelController>, delay: Duration, generation: u64) {
    tokio::time::sleep(delay).await;
    if let Some(panel) = panel.upgrade() {
        panel.hide_if_current(generation);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
