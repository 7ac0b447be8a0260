use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use chatshell_core::{
    BrowsingSession, CoreError, CoreResult, ExternalOpener, NavigationGate, NavigationKind,
    NavigationOutcome, NavigationRequest, ProxyRule, WindowBounds, WindowFactory, WindowHost,
    WindowSpec,
};
use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::window::Color;
use tauri::{AppHandle, LogicalPosition, Manager, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;
use tracing::{debug, info, warn};

use crate::error_handling::log_error;
use crate::state::ShellState;

pub const MAIN_LABEL: &str = "main";

static GENERATION: AtomicU32 = AtomicU32::new(0);

pub fn is_main_label(label: &str) -> bool {
    label == MAIN_LABEL || label.starts_with("main-")
}

fn next_label() -> String {
    match GENERATION.fetch_add(1, Ordering::SeqCst) {
        0 => MAIN_LABEL.to_string(),
        n => format!("{MAIN_LABEL}-{n}"),
    }
}

/// Runs `f` on the main thread from a fresh task, outside the IPC or menu
/// callback that asked for it. WebView2 deadlocks when a webview is built
/// inside such a callback.
pub fn defer_to_main<F>(app: &AppHandle, what: &'static str, f: F)
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let handle = app.clone();
        if let Err(err) = app.run_on_main_thread(move || f(&handle)) {
            log_error(what, &err);
        }
    });
}

fn host_err(err: tauri::Error) -> CoreError {
    CoreError::Host(err.to_string())
}

pub struct TauriOpener {
    app: AppHandle,
}

impl TauriOpener {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl ExternalOpener for TauriOpener {
    fn open_external(&self, url: &str) -> CoreResult<()> {
        self.app
            .opener()
            .open_url(url, None::<&str>)
            .map_err(|err| CoreError::Host(err.to_string()))
    }
}

/// Proxy rule plus the on-disk profile shared by every rebuild of the webview.
#[derive(Debug, Clone, Default)]
pub struct TauriSession {
    rule: ProxyRule,
    data_dir: Option<PathBuf>,
}

impl TauriSession {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self {
            rule: ProxyRule::Direct,
            data_dir,
        }
    }
}

impl BrowsingSession for TauriSession {
    fn apply_proxy(&mut self, rule: &ProxyRule) -> CoreResult<()> {
        self.rule = rule.clone();
        Ok(())
    }

    fn proxy_rule(&self) -> &ProxyRule {
        &self.rule
    }
}

pub struct TauriWindowFactory {
    app: AppHandle,
    gate: NavigationGate,
}

impl TauriWindowFactory {
    pub fn new(app: AppHandle, gate: NavigationGate) -> Self {
        Self { app, gate }
    }
}

impl WindowFactory for TauriWindowFactory {
    type Window = TauriWindow;

    fn create(&mut self, spec: &WindowSpec, session: &TauriSession) -> CoreResult<TauriWindow> {
        let window = build_main_window(&self.app, spec, session, &self.gate)?;
        Ok(TauriWindow {
            app: self.app.clone(),
            gate: self.gate.clone(),
            spec: spec.clone(),
            built_with: session.rule.clone(),
            window,
        })
    }
}

fn route(app: &AppHandle, gate: &NavigationGate, request: NavigationRequest) -> NavigationOutcome {
    let Some(shell) = app.try_state::<ShellState>() else {
        return gate.route(&request);
    };
    // The lock is already held when the controller itself started the navigation.
    let outcome = match shell.controller.try_lock() {
        Ok(controller) => controller.route_navigation(&request),
        Err(_) => gate.route(&request),
    };
    outcome
}

fn build_main_window(
    app: &AppHandle,
    spec: &WindowSpec,
    session: &TauriSession,
    gate: &NavigationGate,
) -> CoreResult<WebviewWindow> {
    let label = next_label();
    let (r, g, b) = spec.background;

    let nav_app = app.clone();
    let nav_gate = gate.clone();
    let popup_app = app.clone();
    let popup_gate = gate.clone();

    let mut builder = WebviewWindowBuilder::new(app, &label, WebviewUrl::External(spec.url.clone()))
        .title(&spec.title)
        .inner_size(spec.width as f64, spec.height as f64)
        .user_agent(&spec.user_agent)
        .background_color(Color(r, g, b, 255))
        .visible(false)
        .on_navigation(move |url| {
            let request = NavigationRequest::new(url.as_str(), NavigationKind::InPlace);
            route(&nav_app, &nav_gate, request) == NavigationOutcome::Proceed
        })
        .on_new_window(move |url, _features| {
            let request = NavigationRequest::new(url.as_str(), NavigationKind::NewWindow);
            match route(&popup_app, &popup_gate, request) {
                NavigationOutcome::Proceed => NewWindowResponse::Allow,
                NavigationOutcome::Cancel => NewWindowResponse::Deny,
            }
        })
        .on_page_load(|window, payload| {
            if !matches!(payload.event(), PageLoadEvent::Finished) {
                return;
            }
            let Some(shell) = window.try_state::<ShellState>() else {
                return;
            };
            if let Ok(mut controller) = shell.controller.try_lock() {
                controller.on_navigated(payload.url().as_str());
            };
        });

    if let (Some(x), Some(y)) = (spec.x, spec.y) {
        builder = builder.position(x as f64, y as f64);
    }
    if let Some(dir) = &session.data_dir {
        builder = builder.data_directory(dir.clone());
    }
    if let Some(server) = session.rule.server() {
        builder = builder.proxy_url(server.clone());
    }

    let window = builder.build().map_err(host_err)?;
    info!(label = %label, proxy = ?session.rule.server().map(Url::as_str), "main window built");
    Ok(window)
}

/// The live main window.
pub struct TauriWindow {
    app: AppHandle,
    gate: NavigationGate,
    spec: WindowSpec,
    built_with: ProxyRule,
    window: WebviewWindow,
}

impl TauriWindow {
    pub fn webview_window(&self) -> &WebviewWindow {
        &self.window
    }

    /// The webview takes its proxy at creation, so a new rule needs a new window.
    fn rebuild(&mut self, session: &TauriSession) -> CoreResult<()> {
        let was_minimized = self.window.is_minimized().unwrap_or(false);
        let was_visible = self.window.is_visible().unwrap_or(true);

        let mut spec = self.spec.clone();
        if let Ok(url) = self.window.url() {
            spec.url = url;
        }
        if let Ok(bounds) = self.bounds() {
            spec.width = bounds.width;
            spec.height = bounds.height;
            spec.x = Some(bounds.x);
            spec.y = Some(bounds.y);
        }

        // WebView2 refuses a second environment with different proxy args on the same profile.
        self.window.destroy().map_err(host_err)?;
        let window = build_main_window(&self.app, &spec, session, &self.gate)?;

        if was_minimized {
            window.show().map_err(host_err)?;
            window.minimize().map_err(host_err)?;
        } else if was_visible {
            window.show().map_err(host_err)?;
            window.set_focus().map_err(host_err)?;
        }
        self.window = window;
        self.spec = spec;
        self.built_with = session.rule.clone();
        Ok(())
    }
}

impl WindowHost for TauriWindow {
    type Session = TauriSession;

    fn show(&self) -> CoreResult<()> {
        self.window.show().map_err(host_err)
    }

    fn minimize(&self) -> CoreResult<()> {
        self.window.minimize().map_err(host_err)
    }

    fn restore(&self) -> CoreResult<()> {
        self.window.unminimize().map_err(host_err)
    }

    fn focus(&self) -> CoreResult<()> {
        self.window.set_focus().map_err(host_err)
    }

    fn is_minimized(&self) -> CoreResult<bool> {
        self.window.is_minimized().map_err(host_err)
    }

    fn is_visible(&self) -> CoreResult<bool> {
        self.window.is_visible().map_err(host_err)
    }

    fn bounds(&self) -> CoreResult<WindowBounds> {
        let scale = self.window.scale_factor().map_err(host_err)?;
        let position: LogicalPosition<i32> =
            self.window.outer_position().map_err(host_err)?.to_logical(scale);
        let size = self.window.inner_size().map_err(host_err)?.to_logical::<u32>(scale);
        if size.width == 0 || size.height == 0 {
            return Err(CoreError::Host("window has no size (minimized?)".to_string()));
        }
        Ok(WindowBounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn current_url(&self) -> CoreResult<String> {
        self.window
            .url()
            .map(|url| url.to_string())
            .map_err(host_err)
    }

    fn load_url(&self, url: &Url) -> CoreResult<()> {
        self.window.navigate(url.clone()).map_err(host_err)
    }

    fn reload(&mut self, session: &TauriSession) -> CoreResult<()> {
        if session.rule != self.built_with {
            debug!("proxy rule changed, rebuilding webview");
            return self.rebuild(session);
        }
        self.window.reload().map_err(host_err)
    }

    fn close(&self) -> CoreResult<()> {
        // Closing on the main thread re-enters the close handler synchronously.
        let window = self.window.clone();
        tauri::async_runtime::spawn(async move {
            if let Err(err) = window.close() {
                warn!(error = %err, "failed to close main window");
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::is_main_label;

    #[test]
    fn main_labels_cover_rebuilds_only() {
        assert!(is_main_label("main"));
        assert!(is_main_label("main-3"));
        assert!(!is_main_label("proxy-settings"));
        assert!(!is_main_label("mainframe"));
    }
}
