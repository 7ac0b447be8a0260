#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod autostart;
mod error_handling;
mod host;
mod logging;
mod menu;
mod settings;
mod state;

use std::sync::Arc;

use chatshell_core::{
    CloseOutcome, ConfigStore, LaunchOptions, NavigationGate, ShellProfile, WindowController,
    MINIMIZED_FLAG,
};
use log::LevelFilter;
use tauri::{App, AppHandle, Manager, RunEvent, Window, WindowEvent};
use tauri_plugin_autostart::MacosLauncher;
use tracing::{error, info, warn};

use crate::autostart::PluginAutostart;
use crate::error_handling::log_error;
use crate::host::{is_main_label, TauriOpener, TauriSession, TauriWindowFactory};
use crate::menu::{handle_menu_event, refresh_menu_in_background};
use crate::state::ShellState;

fn build_state(app: &App, profile: ShellProfile) -> ShellState {
    let handle = app.handle().clone();

    let config_dir = app.path().app_config_dir().unwrap_or_else(|err| {
        let fallback = std::env::temp_dir().join(&profile.app_name);
        warn!(error = %err, fallback = %fallback.display(), "no config directory");
        fallback
    });
    let store = ConfigStore::new(config_dir, &profile);

    let data_dir = app
        .path()
        .app_data_dir()
        .map(|dir| dir.join("webview"))
        .ok();
    let session = TauriSession::new(data_dir);

    let gate = NavigationGate::new(
        profile.allowlist.clone(),
        Arc::new(TauriOpener::new(handle.clone())),
    );
    let autostart = Arc::new(PluginAutostart::new(handle.clone()));
    let factory = TauriWindowFactory::new(handle, gate.clone());

    let controller = WindowController::new(profile, store, gate, factory, session);
    ShellState::new(controller, autostart)
}

fn on_window_event(window: &Window, event: &WindowEvent) {
    if !is_main_label(window.label()) {
        return;
    }
    let Some(shell) = window.try_state::<ShellState>() else {
        return;
    };

    match event {
        WindowEvent::CloseRequested { api, .. } => {
            // Busy means we are inside a controller call; keep the window.
            let outcome = match shell.controller.try_lock() {
                Ok(mut controller) => controller.on_close_requested(),
                Err(_) => CloseOutcome::Prevent,
            };
            match outcome {
                CloseOutcome::Prevent => api.prevent_close(),
                // The settings window may outlive its parent on some platforms.
                CloseOutcome::Exit => window.app_handle().exit(0),
            }
        }
        WindowEvent::Resized(_) => {
            if let Ok(mut controller) = shell.controller.try_lock() {
                controller.on_resized();
                controller.sync_visibility();
            }
        }
        WindowEvent::Moved(_) => {
            if let Ok(mut controller) = shell.controller.try_lock() {
                controller.on_moved();
            }
        }
        WindowEvent::Focused(_) => {
            if let Ok(mut controller) = shell.controller.try_lock() {
                controller.sync_visibility();
            }
        }
        _ => {}
    }
}

fn on_second_instance(app: &AppHandle, args: Vec<String>, _cwd: String) {
    if let Some(shell) = app.try_state::<ShellState>() {
        shell.lock().on_second_instance(&args);
    }
}

fn on_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        RunEvent::ExitRequested { api, code, .. } => {
            // The main window is rebuilt on proxy changes; only Exit may end the process.
            let quitting = app
                .try_state::<ShellState>()
                .map(|shell| {
                    let quitting = match shell.controller.try_lock() {
                        Ok(controller) => controller.state().is_terminal(),
                        Err(_) => false,
                    };
                    quitting
                })
                .unwrap_or(true);
            if code.is_none() && !quitting {
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            if let Some(shell) = app.try_state::<ShellState>() {
                if let Err(err) = shell.lock().activate() {
                    log_error("reactivate", &err);
                }
            }
        }
        RunEvent::Exit => info!("exiting"),
        _ => {}
    }
}

fn main() {
    let context = tauri::generate_context!();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(on_second_instance))
        .plugin(tauri_plugin_autostart::init(
            MacosLauncher::LaunchAgent,
            Some(vec![MINIMIZED_FLAG]),
        ))
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(LevelFilter::Info)
                .build(),
        )
        .setup(|app| {
            match logging::init_logging(app) {
                Ok(path) => info!("log file at {}", path.display()),
                Err(err) => {
                    chatshell_core::logging::init_logging();
                    error!("file logging unavailable: {err:#}");
                }
            }

            let state = build_state(app, ShellProfile::default());
            app.manage(state);
            app.on_menu_event(|app, event| handle_menu_event(app, event.id().as_ref()));

            let options = LaunchOptions::from_args(std::env::args());
            let launched = app.state::<ShellState>().lock().launch(options);
            if let Err(err) = launched {
                log_error("startup", &err);
            }

            refresh_menu_in_background(app.handle());
            Ok(())
        })
        .on_window_event(on_window_event)
        .invoke_handler(tauri::generate_handler![
            settings::load_proxy_config,
            settings::save_proxy_config
        ])
        .build(context);

    match app {
        Ok(app) => app.run(on_run_event),
        Err(err) => {
            error!("tauri build error: {err}");
            eprintln!("tauri build error: {err}");
        }
    }
}
