use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ProxyConfig, ShellProfile, WindowConfig};
use crate::error::CoreResult;

pub const WINDOW_CONFIG_FILE: &str = "window-config.json";
pub const PROXY_CONFIG_FILE: &str = "proxy-config.json";

/// Reads and writes the two JSON documents under the app's config directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    window_fallback: WindowConfig,
    proxy_fallback: ProxyConfig,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>, profile: &ShellProfile) -> Self {
        Self {
            dir: dir.into(),
            window_fallback: profile.default_window_config(),
            proxy_fallback: profile.default_proxy_config(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn window_config_path(&self) -> PathBuf {
        self.dir.join(WINDOW_CONFIG_FILE)
    }

    pub fn proxy_config_path(&self) -> PathBuf {
        self.dir.join(PROXY_CONFIG_FILE)
    }

    pub fn load_window_config(&self) -> WindowConfig {
        read_json(&self.window_config_path()).unwrap_or_else(|| self.window_fallback.clone())
    }

    pub fn save_window_config(&self, config: &WindowConfig) -> CoreResult<()> {
        self.write_json(&self.window_config_path(), config)
    }

    pub fn load_proxy_config(&self) -> ProxyConfig {
        read_json(&self.proxy_config_path()).unwrap_or_else(|| self.proxy_fallback.clone())
    }

    pub fn save_proxy_config(&self, config: &ProxyConfig) -> CoreResult<()> {
        self.write_json(&self.proxy_config_path(), config)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> CoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_vec(value)?;
        fs::write(path, data)?;
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "config not readable, using defaults");
            return None;
        }
    };
    match serde_json::from_slice(&data) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "config not parsable, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> ConfigStore {
        ConfigStore::new(dir.join("ChatGPT"), &ShellProfile::default())
    }

    #[test]
    fn missing_files_yield_documented_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        assert_eq!(
            store.load_window_config(),
            WindowConfig {
                width: 800,
                height: 600,
                x: None,
                y: None,
                last_url: "https://chatgpt.com".to_string(),
            }
        );
        assert_eq!(
            store.load_proxy_config(),
            ProxyConfig {
                use_proxy: false,
                proxy_server: "socks5://127.0.0.1:1080".to_string(),
            }
        );
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let window = WindowConfig {
            width: 1280,
            height: 900,
            x: Some(-40),
            y: Some(12),
            last_url: "https://chatgpt.com/c/42".to_string(),
        };
        let proxy = ProxyConfig {
            use_proxy: true,
            proxy_server: "http://127.0.0.1:7890".to_string(),
        };

        store.save_window_config(&window).unwrap();
        store.save_proxy_config(&proxy).unwrap();

        assert!(store.dir().is_dir());
        assert_eq!(store.load_window_config(), window);
        assert_eq!(store.load_proxy_config(), proxy);
    }

    #[test]
    fn corrupt_files_fall_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.window_config_path(), b"{ not json").unwrap();
        fs::write(store.proxy_config_path(), br#"{"useProxy":"yes"}"#).unwrap();

        let profile = ShellProfile::default();
        assert_eq!(store.load_window_config(), profile.default_window_config());
        assert_eq!(store.load_proxy_config(), profile.default_proxy_config());
    }

    #[test]
    fn write_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocked");
        fs::write(&blocker, b"file, not a directory").unwrap();
        let store = ConfigStore::new(&blocker, &ShellProfile::default());
        let err = store.save_proxy_config(&ShellProfile::default().default_proxy_config());
        assert!(err.is_err());
    }
}
