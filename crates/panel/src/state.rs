//! Snapshot types handed to whatever renders the panel.

use shared::domain::FavoriteSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Hidden,
    Visible,
}

/// Transient error text. The message is kept after hiding; renderers should
/// only show it while `visible` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorNotification {
    pub message: String,
    pub visible: bool,
}

impl ErrorNotification {
    pub fn state(&self) -> NotificationState {
        if self.visible {
            NotificationState::Visible
        } else {
            NotificationState::Hidden
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelView {
    pub favorites: Vec<FavoriteSelector>,
    pub device_input: String,
    pub notification: ErrorNotification,
}

impl PanelView {
    pub fn visible_error(&self) -> Option<&str> {
        self.notification
            .visible
            .then_some(self.notification.message.as_str())
    }
}

/// Changes a renderer must react to without having caused them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    FavoritesLoaded(Vec<FavoriteSelector>),
    NotificationShown(String),
    NotificationHidden,
}
