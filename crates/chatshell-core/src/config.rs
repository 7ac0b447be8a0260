use serde::{Deserialize, Serialize};

use crate::allowlist::Allowlist;

pub const DEFAULT_URL: &str = "https://chatgpt.com";
pub const DEFAULT_PROXY: &str = "socks5://127.0.0.1:1080";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
pub const DEFAULT_BACKGROUND: (u8, u8, u8) = (0x21, 0x21, 0x21);
pub const APP_NAME: &str = "ChatGPT";
pub const ALLOWED_DOMAINS: &[&str] = &["openai.com", "chatgpt.com"];

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Build-time description of the wrapped site.
#[derive(Debug, Clone)]
pub struct ShellProfile {
    pub app_name: String,
    pub default_url: String,
    pub default_proxy: String,
    pub user_agent: String,
    pub background: (u8, u8, u8),
    pub allowlist: Allowlist,
}

impl Default for ShellProfile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            default_url: DEFAULT_URL.to_string(),
            default_proxy: DEFAULT_PROXY.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            background: DEFAULT_BACKGROUND,
            allowlist: Allowlist::builtin(),
        }
    }
}

impl ShellProfile {
    pub fn default_window_config(&self) -> WindowConfig {
        WindowConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x: None,
            y: None,
            last_url: self.default_url.clone(),
        }
    }

    pub fn default_proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            use_proxy: false,
            proxy_server: self.default_proxy.clone(),
        }
    }
}

/// Last known placement and page of the main window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    pub last_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub use_proxy: bool,
    pub proxy_server: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_config_uses_camel_case_and_null_position() {
        let cfg = ShellProfile::default().default_window_config();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "width": 800,
                "height": 600,
                "x": null,
                "y": null,
                "lastUrl": "https://chatgpt.com"
            })
        );
    }

    #[test]
    fn window_config_accepts_missing_position() {
        let cfg: WindowConfig =
            serde_json::from_str(r#"{"width":1024,"height":700,"lastUrl":"https://chatgpt.com/c/1"}"#)
                .unwrap();
        assert_eq!(cfg.x, None);
        assert_eq!(cfg.y, None);
        assert_eq!(cfg.width, 1024);
    }

    #[test]
    fn proxy_config_wire_names() {
        let cfg: ProxyConfig =
            serde_json::from_str(r#"{"useProxy":true,"proxyServer":"http://10.0.0.1:8080"}"#).unwrap();
        assert!(cfg.use_proxy);
        assert_eq!(cfg.proxy_server, "http://10.0.0.1:8080");
    }
}
