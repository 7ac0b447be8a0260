pub mod allowlist;
pub mod autostart;
pub mod config;
pub mod error;
pub mod launch;
pub mod lifecycle;
pub mod logging;
pub mod menu;
pub mod proxy;
pub mod store;

pub use allowlist::{
    decide, Allowlist, Decision, ExternalOpener, NavigationGate, NavigationKind, NavigationOutcome,
    NavigationRequest,
};
pub use autostart::Autostart;
pub use config::{ProxyConfig, ShellProfile, WindowConfig};
pub use error::{CoreError, CoreResult};
pub use launch::{LaunchOptions, MINIMIZED_FLAG};
pub use lifecycle::{
    CloseOutcome, LifecycleState, WindowBounds, WindowController, WindowFactory, WindowHost,
    WindowSpec,
};
pub use menu::{build_menu, MenuAction, MenuSpec, MenuState};
pub use proxy::{BrowsingSession, ProxyRule, ProxySessionManager};
pub use store::ConfigStore;
