//! Application menu as plain data, rebuilt from [`MenuState`] on every change.

pub const PROXY_SETTINGS_ID: &str = "proxy-settings";
pub const USE_PROXY_ID: &str = "use-proxy";
pub const AUTO_LAUNCH_ID: &str = "auto-launch";
pub const EXIT_ID: &str = "exit";
pub const HOME_ID: &str = "back-to-main";
pub const RELOAD_ID: &str = "reload";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    pub proxy_enabled: bool,
    pub autostart_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenProxySettings,
    ToggleProxy,
    ToggleAutoLaunch,
    Exit,
    BackToMain,
    Reload,
}

impl MenuAction {
    pub fn id(self) -> &'static str {
        match self {
            MenuAction::OpenProxySettings => PROXY_SETTINGS_ID,
            MenuAction::ToggleProxy => USE_PROXY_ID,
            MenuAction::ToggleAutoLaunch => AUTO_LAUNCH_ID,
            MenuAction::Exit => EXIT_ID,
            MenuAction::BackToMain => HOME_ID,
            MenuAction::Reload => RELOAD_ID,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            PROXY_SETTINGS_ID => Some(MenuAction::OpenProxySettings),
            USE_PROXY_ID => Some(MenuAction::ToggleProxy),
            AUTO_LAUNCH_ID => Some(MenuAction::ToggleAutoLaunch),
            EXIT_ID => Some(MenuAction::Exit),
            HOME_ID => Some(MenuAction::BackToMain),
            RELOAD_ID => Some(MenuAction::Reload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predefined {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Fullscreen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Action {
        action: MenuAction,
        label: &'static str,
        accelerator: Option<&'static str>,
    },
    Check {
        action: MenuAction,
        label: &'static str,
        checked: bool,
    },
    Predefined(Predefined),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmenuSpec {
    pub label: &'static str,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSpec {
    pub submenus: Vec<SubmenuSpec>,
}

impl MenuSpec {
    pub fn find(&self, action: MenuAction) -> Option<&MenuEntry> {
        self.submenus
            .iter()
            .flat_map(|submenu| submenu.entries.iter())
            .find(|entry| match entry {
                MenuEntry::Action { action: a, .. } | MenuEntry::Check { action: a, .. } => *a == action,
                _ => false,
            })
    }
}

pub fn build_menu(state: &MenuState) -> MenuSpec {
    let file = SubmenuSpec {
        label: "File",
        entries: vec![
            MenuEntry::Action {
                action: MenuAction::OpenProxySettings,
                label: "Proxy Settings",
                accelerator: Some("CmdOrCtrl+P"),
            },
            MenuEntry::Check {
                action: MenuAction::ToggleProxy,
                label: "Use Proxy",
                checked: state.proxy_enabled,
            },
            MenuEntry::Check {
                action: MenuAction::ToggleAutoLaunch,
                label: "Auto Launch",
                checked: state.autostart_enabled,
            },
            MenuEntry::Separator,
            MenuEntry::Action {
                action: MenuAction::Exit,
                label: "Exit",
                accelerator: None,
            },
        ],
    };

    let edit = SubmenuSpec {
        label: "Edit",
        entries: vec![
            MenuEntry::Predefined(Predefined::Undo),
            MenuEntry::Predefined(Predefined::Redo),
            MenuEntry::Separator,
            MenuEntry::Predefined(Predefined::Cut),
            MenuEntry::Predefined(Predefined::Copy),
            MenuEntry::Predefined(Predefined::Paste),
            MenuEntry::Predefined(Predefined::SelectAll),
        ],
    };

    let view = SubmenuSpec {
        label: "View",
        entries: vec![
            MenuEntry::Action {
                action: MenuAction::BackToMain,
                label: "Back to Main Page",
                accelerator: Some("CmdOrCtrl+H"),
            },
            MenuEntry::Action {
                action: MenuAction::Reload,
                label: "Reload",
                accelerator: Some("CmdOrCtrl+R"),
            },
            MenuEntry::Separator,
            MenuEntry::Predefined(Predefined::Fullscreen),
        ],
    };

    MenuSpec {
        submenus: vec![file, edit, view],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(spec: &MenuSpec, action: MenuAction) -> bool {
        match spec.find(action) {
            Some(MenuEntry::Check { checked, .. }) => *checked,
            other => panic!("{action:?} is not a check item: {other:?}"),
        }
    }

    #[test]
    fn check_items_follow_state() {
        let off = build_menu(&MenuState::default());
        assert!(!checked(&off, MenuAction::ToggleProxy));
        assert!(!checked(&off, MenuAction::ToggleAutoLaunch));

        let on = build_menu(&MenuState {
            proxy_enabled: true,
            autostart_enabled: true,
        });
        assert!(checked(&on, MenuAction::ToggleProxy));
        assert!(checked(&on, MenuAction::ToggleAutoLaunch));
    }

    #[test]
    fn file_menu_comes_first_with_exit_last() {
        let spec = build_menu(&MenuState::default());
        let labels: Vec<_> = spec.submenus.iter().map(|s| s.label).collect();
        assert_eq!(labels, ["File", "Edit", "View"]);
        assert!(matches!(
            spec.submenus[0].entries.last(),
            Some(MenuEntry::Action {
                action: MenuAction::Exit,
                ..
            })
        ));
    }

    #[test]
    fn every_action_id_round_trips() {
        for action in [
            MenuAction::OpenProxySettings,
            MenuAction::ToggleProxy,
            MenuAction::ToggleAutoLaunch,
            MenuAction::Exit,
            MenuAction::BackToMain,
            MenuAction::Reload,
        ] {
            assert_eq!(MenuAction::from_id(action.id()), Some(action));
            assert!(build_menu(&MenuState::default()).find(action).is_some());
        }
        assert_eq!(MenuAction::from_id("quit"), None);
    }

    #[test]
    fn file_and_view_shortcuts() {
        let spec = build_menu(&MenuState::default());
        assert!(matches!(
            spec.find(MenuAction::OpenProxySettings),
            Some(MenuEntry::Action {
                accelerator: Some("CmdOrCtrl+P"),
                ..
            })
        ));
        assert!(matches!(
            spec.find(MenuAction::BackToMain),
            Some(MenuEntry::Action {
                accelerator: Some("CmdOrCtrl+H"),
                ..
            })
        ));
    }
}
