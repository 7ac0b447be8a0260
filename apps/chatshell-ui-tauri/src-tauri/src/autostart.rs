use chatshell_core::{Autostart, CoreError, CoreResult};
use tauri::AppHandle;
use tauri_plugin_autostart::ManagerExt;

/// Login-item registration through the autostart plugin, which registers the
/// executable with the launch arguments given at plugin init.
pub struct PluginAutostart {
    app: AppHandle,
}

impl PluginAutostart {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

fn plugin_err(err: tauri_plugin_autostart::Error) -> CoreError {
    CoreError::Autostart(err.to_string())
}

impl Autostart for PluginAutostart {
    fn enable(&self) -> CoreResult<()> {
        self.app.autolaunch().enable().map_err(plugin_err)
    }

    fn disable(&self) -> CoreResult<()> {
        self.app.autolaunch().disable().map_err(plugin_err)
    }

    fn is_enabled(&self) -> CoreResult<bool> {
        self.app.autolaunch().is_enabled().map_err(plugin_err)
    }
}
