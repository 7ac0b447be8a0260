use chatshell_core::autostart::toggle;
use chatshell_core::menu::{MenuEntry, Predefined};
use chatshell_core::{build_menu, MenuAction, MenuSpec};
use tauri::menu::{CheckMenuItemBuilder, Menu, MenuBuilder, MenuItemBuilder, SubmenuBuilder};
use tauri::{AppHandle, Manager, Wry};
use tracing::{error, info};

use crate::error_handling::log_error;
use crate::host::defer_to_main;
use crate::settings::open_proxy_settings;
use crate::state::ShellState;

fn render(app: &AppHandle, spec: &MenuSpec) -> tauri::Result<Menu<Wry>> {
    let mut menu = MenuBuilder::new(app);
    for submenu_spec in &spec.submenus {
        let mut submenu = SubmenuBuilder::new(app, submenu_spec.label);
        for entry in &submenu_spec.entries {
            submenu = match entry {
                MenuEntry::Action {
                    action,
                    label,
                    accelerator,
                } => {
                    let mut item = MenuItemBuilder::with_id(action.id(), *label);
                    if let Some(accelerator) = accelerator {
                        item = item.accelerator(*accelerator);
                    }
                    submenu.item(&item.build(app)?)
                }
                MenuEntry::Check {
                    action,
                    label,
                    checked,
                } => submenu.item(
                    &CheckMenuItemBuilder::with_id(action.id(), *label)
                        .checked(*checked)
                        .build(app)?,
                ),
                MenuEntry::Predefined(kind) => match kind {
                    Predefined::Undo => submenu.undo(),
                    Predefined::Redo => submenu.redo(),
                    Predefined::Cut => submenu.cut(),
                    Predefined::Copy => submenu.copy(),
                    Predefined::Paste => submenu.paste(),
                    Predefined::SelectAll => submenu.select_all(),
                    Predefined::Fullscreen => submenu.fullscreen(),
                },
                MenuEntry::Separator => submenu.separator(),
            };
        }
        menu = menu.item(&submenu.build()?);
    }
    menu.build()
}

/// Re-derives the menu from current state and installs it.
pub fn refresh_menu(app: &AppHandle) {
    let Some(shell) = app.try_state::<ShellState>() else {
        return;
    };
    let spec = build_menu(&shell.menu_state());
    match render(app, &spec) {
        Ok(menu) => {
            if let Err(err) = app.set_menu(menu) {
                log_error("set menu", &err);
            }
        }
        Err(err) => log_error("build menu", &err),
    }
}

/// Autostart queries touch the registry or launch agents; keep them off the event loop.
pub fn refresh_menu_in_background(app: &AppHandle) {
    let app = app.clone();
    tauri::async_runtime::spawn_blocking(move || refresh_menu(&app));
}

pub fn handle_menu_event(app: &AppHandle, id: &str) {
    let Some(action) = MenuAction::from_id(id) else {
        return;
    };
    let Some(shell) = app.try_state::<ShellState>() else {
        return;
    };
    info!(?action, "menu action");

    match action {
        MenuAction::OpenProxySettings => defer_to_main(app, "open proxy settings", open_proxy_settings),
        MenuAction::ToggleProxy => defer_to_main(app, "toggle proxy", |app| {
            if let Some(shell) = app.try_state::<ShellState>() {
                let mut controller = shell.lock();
                let mut config = controller.store().load_proxy_config();
                config.use_proxy = !config.use_proxy;
                if let Err(err) = controller.apply_proxy_settings(&config) {
                    log_error("toggle proxy", &err);
                }
            }
            refresh_menu_in_background(app);
        }),
        MenuAction::ToggleAutoLaunch => {
            let autostart = shell.autostart.clone();
            let app = app.clone();
            tauri::async_runtime::spawn_blocking(move || {
                if let Err(err) = toggle(&*autostart) {
                    log_error("toggle auto launch", &err);
                }
                refresh_menu(&app);
            });
        }
        MenuAction::Exit => {
            let has_window = {
                let mut controller = shell.lock();
                controller.request_exit();
                controller.has_window()
            };
            if !has_window {
                app.exit(0);
            }
        }
        MenuAction::BackToMain => {
            if let Err(err) = shell.lock().go_home() {
                log_error("back to main page", &err);
            }
        }
        MenuAction::Reload => defer_to_main(app, "reload", |app| {
            if let Some(shell) = app.try_state::<ShellState>() {
                if let Err(err) = shell.lock().reload() {
                    error!(error = %err, "reload failed");
                };
            }
        }),
    }
}
