use tracing::{info, warn};
use url::Url;

use crate::config::ProxyConfig;
use crate::error::{CoreError, CoreResult};

const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Routing applied to every request of a browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProxyRule {
    #[default]
    Direct,
    Server(Url),
}

impl ProxyRule {
    pub fn from_config(config: &ProxyConfig) -> CoreResult<Self> {
        if !config.use_proxy {
            return Ok(ProxyRule::Direct);
        }
        parse_proxy_server(&config.proxy_server).map(ProxyRule::Server)
    }

    pub fn server(&self) -> Option<&Url> {
        match self {
            ProxyRule::Direct => None,
            ProxyRule::Server(url) => Some(url),
        }
    }
}

pub fn parse_proxy_server(raw: &str) -> CoreResult<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| CoreError::InvalidProxy(format!("'{trimmed}': {err}")))?;
    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(CoreError::InvalidProxy(format!(
            "unsupported scheme '{}', expected one of {}",
            url.scheme(),
            PROXY_SCHEMES.join(", ")
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(CoreError::InvalidProxy(format!("'{trimmed}' has no host")));
    }
    Ok(url)
}

/// Cookie/cache/proxy context that the window navigates with.
pub trait BrowsingSession {
    fn apply_proxy(&mut self, rule: &ProxyRule) -> CoreResult<()>;
    fn proxy_rule(&self) -> &ProxyRule;
}

pub struct ProxySessionManager;

impl ProxySessionManager {
    /// Applying the same config twice leaves the session as it was.
    pub fn configure<S: BrowsingSession>(
        session: &mut S,
        config: &ProxyConfig,
    ) -> CoreResult<ProxyRule> {
        let rule = ProxyRule::from_config(config)?;
        if session.proxy_rule() != &rule {
            session.apply_proxy(&rule)?;
            match rule.server() {
                Some(server) => info!(proxy = %server, "proxy enabled"),
                None => info!("proxy disabled, using direct connection"),
            }
        }
        Ok(rule)
    }

    /// Startup variant: a bad persisted value means direct routing.
    pub fn configure_or_direct<S: BrowsingSession>(session: &mut S, config: &ProxyConfig) -> ProxyRule {
        match Self::configure(session, config) {
            Ok(rule) => rule,
            Err(err) => {
                warn!(error = %err, "ignoring stored proxy settings");
                if session.proxy_rule() != &ProxyRule::Direct {
                    if let Err(err) = session.apply_proxy(&ProxyRule::Direct) {
                        warn!(error = %err, "failed to clear proxy rule");
                    }
                }
                session.proxy_rule().clone()
            }
        }
    }
}
