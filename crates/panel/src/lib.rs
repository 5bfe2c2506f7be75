//! Panel controller for the devbox switcher.
//!
//! Owns the visible panel state (favorites, device id input, error
//! notification) and turns user actions into gateway calls. Failures surface
//! as a transient notification that hides itself after [`DEFAULT_HIDE_DELAY`].

use std::time::Duration;

mod controller;
mod notifier;
pub mod state;

pub use controller::{ActionOutcome, PanelController, PanelError};
pub use state::{ErrorNotification, NotificationState, PanelEvent, PanelView};

pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(2000);
