use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatshell_core::{Autostart, MenuState, WindowController};
use tracing::warn;

use crate::host::TauriWindowFactory;

pub type Controller = WindowController<TauriWindowFactory>;

pub struct ShellState {
    pub controller: Mutex<Controller>,
    pub autostart: Arc<dyn Autostart>,
}

impl ShellState {
    pub fn new(controller: Controller, autostart: Arc<dyn Autostart>) -> Self {
        Self {
            controller: Mutex::new(controller),
            autostart,
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Controller> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Freshly derived from disk and the OS; never cached.
    pub fn menu_state(&self) -> MenuState {
        let proxy_enabled = self.lock().store().load_proxy_config().use_proxy;
        let autostart_enabled = self.autostart.is_enabled().unwrap_or_else(|err| {
            warn!(error = %err, "failed to query autostart state");
            false
        });
        MenuState {
            proxy_enabled,
            autostart_enabled,
        }
    }
}
