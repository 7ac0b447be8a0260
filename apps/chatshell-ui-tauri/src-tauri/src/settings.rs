use chatshell_core::{ProxyConfig, ProxyRule};
use tauri::{AppHandle, Manager, State, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tracing::info;

use crate::error_handling::{log_error, result_to_string};
use crate::host::defer_to_main;
use crate::menu::refresh_menu_in_background;
use crate::state::ShellState;

pub const SETTINGS_LABEL: &str = "proxy-settings";

/// Must run on the main thread outside any IPC or menu callback.
pub fn open_proxy_settings(app: &AppHandle) {
    if let Some(existing) = app.get_webview_window(SETTINGS_LABEL) {
        if let Err(err) = existing.show() {
            log_error("show proxy settings", &err);
        }
        if let Err(err) = existing.set_focus() {
            log_error("focus proxy settings", &err);
        }
        return;
    }

    let parent = match app.try_state::<ShellState>() {
        Some(shell) => {
            let controller = shell.lock();
            controller.window().map(|window| window.webview_window().clone())
        }
        None => None,
    };

    let mut builder = WebviewWindowBuilder::new(app, SETTINGS_LABEL, WebviewUrl::App("proxy-settings.html".into()))
        .title("Proxy Settings")
        .inner_size(350.0, 290.0)
        .resizable(false)
        .minimizable(false)
        .maximizable(false);
    if let Some(parent) = &parent {
        builder = match builder.parent(parent) {
            Ok(builder) => builder,
            Err(err) => {
                log_error("attach settings to main window", &err);
                return;
            }
        };
    }
    if let Err(err) = builder.build() {
        log_error("open proxy settings", &err);
    }
}

#[tauri::command]
pub fn load_proxy_config(state: State<'_, ShellState>) -> ProxyConfig {
    state.lock().store().load_proxy_config()
}

/// Validates here so the form can show the error; the webview rebuild a proxy
/// change needs happens later on the main thread.
#[tauri::command]
pub async fn save_proxy_config(
    app: AppHandle,
    window: WebviewWindow,
    config: ProxyConfig,
) -> Result<(), String> {
    info!(use_proxy = config.use_proxy, server = %config.proxy_server, "proxy settings submitted");
    result_to_string(ProxyRule::from_config(&config))?;

    let from_settings = window.label() == SETTINGS_LABEL;
    defer_to_main(&app, "apply proxy settings", move |app| {
        let Some(shell) = app.try_state::<ShellState>() else {
            return;
        };
        let applied = shell.lock().apply_proxy_settings(&config);
        match applied {
            Ok(rule) => {
                info!(proxy = ?rule.server().map(|url| url.as_str()), "proxy settings applied");
                if from_settings {
                    if let Err(err) = window.close() {
                        log_error("close proxy settings", &err);
                    }
                }
            }
            Err(err) => log_error("apply proxy settings", &err),
        }
        refresh_menu_in_background(app);
    });
    Ok(())
}
