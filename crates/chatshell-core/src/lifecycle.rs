use tracing::{debug, info, warn};
use url::Url;

use crate::allowlist::{decide, Decision, NavigationGate, NavigationOutcome, NavigationRequest};
use crate::config::{ProxyConfig, ShellProfile, WindowConfig};
use crate::error::{CoreError, CoreResult};
use crate::launch::LaunchOptions;
use crate::proxy::{BrowsingSession, ProxyRule, ProxySessionManager};
use crate::store::ConfigStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Loading,
    Visible,
    Minimized,
    Hidden,
    Quitting,
    Terminated,
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Quitting | LifecycleState::Terminated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Keep the window alive; it was minimized instead.
    Prevent,
    /// Let the window go and end the process, even if other windows remain.
    Exit,
}

/// Outer placement in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Everything the factory needs to build the main window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub url: Url,
    pub width: u32,
    pub height: u32,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub user_agent: String,
    pub background: (u8, u8, u8),
}

pub trait WindowHost {
    type Session: BrowsingSession;

    fn show(&self) -> CoreResult<()>;
    fn minimize(&self) -> CoreResult<()>;
    fn restore(&self) -> CoreResult<()>;
    fn focus(&self) -> CoreResult<()>;
    fn is_minimized(&self) -> CoreResult<bool>;
    fn is_visible(&self) -> CoreResult<bool>;
    fn bounds(&self) -> CoreResult<WindowBounds>;
    fn current_url(&self) -> CoreResult<String>;
    fn load_url(&self, url: &Url) -> CoreResult<()>;
    /// Reloads the page; picks up the session's current proxy rule.
    fn reload(&mut self, session: &Self::Session) -> CoreResult<()>;
    fn close(&self) -> CoreResult<()>;
}

pub trait WindowFactory {
    type Window: WindowHost;

    fn create(
        &mut self,
        spec: &WindowSpec,
        session: &<Self::Window as WindowHost>::Session,
    ) -> CoreResult<Self::Window>;
}

pub type SessionOf<F> = <<F as WindowFactory>::Window as WindowHost>::Session;

/// Owns the single window and its browsing session.
pub struct WindowController<F: WindowFactory> {
    profile: ShellProfile,
    store: ConfigStore,
    gate: NavigationGate,
    factory: F,
    session: SessionOf<F>,
    window: Option<F::Window>,
    state: LifecycleState,
}

impl<F: WindowFactory> WindowController<F> {
    pub fn new(
        profile: ShellProfile,
        store: ConfigStore,
        gate: NavigationGate,
        factory: F,
        session: SessionOf<F>,
    ) -> Self {
        Self {
            profile,
            store,
            gate,
            factory,
            session,
            window: None,
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn session(&self) -> &SessionOf<F> {
        &self.session
    }

    pub fn window(&self) -> Option<&F::Window> {
        self.window.as_ref()
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    pub fn launch(&mut self, options: LaunchOptions) -> CoreResult<()> {
        if self.window.is_some() || self.state.is_terminal() {
            debug!(state = ?self.state, "launch ignored");
            return Ok(());
        }
        self.state = LifecycleState::Loading;

        let config = self.store.load_window_config();
        let proxy = self.store.load_proxy_config();
        ProxySessionManager::configure_or_direct(&mut self.session, &proxy);

        let spec = match self.window_spec(&config) {
            Ok(spec) => spec,
            Err(err) => {
                self.state = LifecycleState::Uninitialized;
                return Err(err);
            }
        };
        info!(url = %spec.url, minimized = options.start_minimized, "creating main window");
        let window = match self.factory.create(&spec, &self.session) {
            Ok(window) => window,
            Err(err) => {
                self.state = LifecycleState::Uninitialized;
                return Err(err);
            }
        };

        if options.start_minimized {
            log_host("minimize", window.minimize());
            self.state = LifecycleState::Minimized;
        } else {
            log_host("show", window.show());
            log_host("focus", window.focus());
            self.state = LifecycleState::Visible;
        }
        self.window = Some(window);
        Ok(())
    }

    fn window_spec(&self, config: &WindowConfig) -> CoreResult<WindowSpec> {
        Ok(WindowSpec {
            title: self.profile.app_name.clone(),
            url: self.start_url(&config.last_url)?,
            width: config.width,
            height: config.height,
            x: config.x,
            y: config.y,
            user_agent: self.profile.user_agent.clone(),
            background: self.profile.background,
        })
    }

    /// The saved URL when it is still on the allowlist, else the home page.
    fn start_url(&self, last_url: &str) -> CoreResult<Url> {
        if last_url.trim().is_empty() || decide(last_url, &self.profile.allowlist) != Decision::Allow {
            return self.default_url();
        }
        match Url::parse(last_url) {
            Ok(url) => Ok(url),
            Err(err) => {
                warn!(url = last_url, error = %err, "unusable start url");
                self.default_url()
            }
        }
    }

    fn default_url(&self) -> CoreResult<Url> {
        Ok(Url::parse(&self.profile.default_url)?)
    }

    pub fn route_navigation(&self, request: &NavigationRequest) -> NavigationOutcome {
        if self.state == LifecycleState::Terminated {
            return NavigationOutcome::Cancel;
        }
        self.gate.route(request)
    }

    pub fn on_resized(&mut self) {
        self.persist_window();
    }

    pub fn on_moved(&mut self) {
        self.persist_window();
    }

    pub fn on_navigated(&mut self, url: &str) {
        debug!(url, "navigated");
        self.persist_window();
    }

    /// Re-reads minimized/visible from the host after focus changes, which is
    /// the only signal the host gives for app-level hide and restore.
    pub fn sync_visibility(&mut self) {
        if !matches!(
            self.state,
            LifecycleState::Visible | LifecycleState::Minimized | LifecycleState::Hidden
        ) {
            return;
        }
        let Some(window) = &self.window else {
            return;
        };
        let (Ok(minimized), Ok(visible)) = (window.is_minimized(), window.is_visible()) else {
            return;
        };
        self.state = if minimized {
            LifecycleState::Minimized
        } else if !visible {
            LifecycleState::Hidden
        } else {
            LifecycleState::Visible
        };
    }

    pub fn on_close_requested(&mut self) -> CloseOutcome {
        self.persist_window();
        match self.state {
            LifecycleState::Quitting | LifecycleState::Terminated => {
                self.state = LifecycleState::Terminated;
                self.window = None;
                CloseOutcome::Exit
            }
            _ => {
                if let Some(window) = &self.window {
                    log_host("minimize", window.minimize());
                    self.state = LifecycleState::Minimized;
                }
                CloseOutcome::Prevent
            }
        }
    }

    /// The Exit action; the only way into `Quitting`.
    pub fn request_exit(&mut self) {
        info!("exit requested");
        self.persist_window();
        self.state = LifecycleState::Quitting;
        if let Some(window) = &self.window {
            log_host("close", window.close());
        }
    }

    pub fn activate(&mut self) -> CoreResult<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let Some(window) = &self.window else {
            return self.launch(LaunchOptions::default());
        };
        if window.is_minimized().unwrap_or(false) {
            log_host("restore", window.restore());
            log_host("focus", window.focus());
        } else if !window.is_visible().unwrap_or(true) {
            log_host("show", window.show());
        } else {
            log_host("focus", window.focus());
        }
        self.state = LifecycleState::Visible;
        Ok(())
    }

    /// Restores a minimized window, otherwise minimizes it.
    pub fn on_second_instance(&mut self, args: &[String]) {
        debug!(?args, "second instance launched");
        if self.state.is_terminal() {
            return;
        }
        let Some(window) = &self.window else {
            return;
        };
        if window.is_minimized().unwrap_or(false) {
            log_host("restore", window.restore());
            log_host("show", window.show());
            log_host("focus", window.focus());
            self.state = LifecycleState::Visible;
        } else {
            log_host("minimize", window.minimize());
            self.state = LifecycleState::Minimized;
        }
    }

    pub fn go_home(&self) -> CoreResult<()> {
        let window = self.window.as_ref().ok_or(CoreError::NoWindow)?;
        window.load_url(&self.default_url()?)
    }

    pub fn reload(&mut self) -> CoreResult<()> {
        let window = self.window.as_mut().ok_or(CoreError::NoWindow)?;
        window.reload(&self.session)
    }

    /// Persists, reconfigures the session and reloads the page.
    pub fn apply_proxy_settings(&mut self, config: &ProxyConfig) -> CoreResult<ProxyRule> {
        ProxyRule::from_config(config)?;
        if let Err(err) = self.store.save_proxy_config(config) {
            warn!(error = %err, "failed to persist proxy config");
        }
        let rule = ProxySessionManager::configure(&mut self.session, config)?;
        if let Some(window) = self.window.as_mut() {
            window.reload(&self.session)?;
        }
        Ok(rule)
    }

    fn persist_window(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let bounds = match window.bounds() {
            Ok(bounds) => bounds,
            Err(err) => {
                debug!(error = %err, "window bounds unavailable, skipping save");
                return;
            }
        };
        let last_url = window
            .current_url()
            .unwrap_or_else(|_| self.profile.default_url.clone());
        let config = WindowConfig {
            width: bounds.width,
            height: bounds.height,
            x: Some(bounds.x),
            y: Some(bounds.y),
            last_url,
        };
        if let Err(err) = self.store.save_window_config(&config) {
            warn!(error = %err, "failed to persist window config");
        }
    }
}

fn log_host(op: &str, result: CoreResult<()>) {
    if let Err(err) = result {
        warn!(op, error = %err, "window operation failed");
    }
}
