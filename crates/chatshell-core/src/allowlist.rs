use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::config::ALLOWED_DOMAINS;
use crate::error::{CoreError, CoreResult};

/// Domains permitted to load inside the embedded browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    domains: Vec<String>,
}

impl Allowlist {
    pub fn new<I, S>(domains: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = Vec::new();
        for raw in domains {
            let domain = raw.as_ref().trim().to_ascii_lowercase();
            if !is_bare_domain(&domain) {
                return Err(CoreError::InvalidAllowlist(format!(
                    "'{}' is not a bare domain",
                    raw.as_ref()
                )));
            }
            if !items.contains(&domain) {
                items.push(domain);
            }
        }
        if items.is_empty() {
            return Err(CoreError::InvalidAllowlist("allowlist is empty".to_string()));
        }
        Ok(Self { domains: items })
    }

    pub fn builtin() -> Self {
        Self {
            domains: ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn permits_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || (host.len() > domain.len()
                    && host.ends_with(domain.as_str())
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
        })
    }
}

fn is_bare_domain(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('.')
        && !value.ends_with('.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectExternal,
}

/// Malformed or host-less URLs are never allowed in-app.
pub fn decide(url: &str, allowlist: &Allowlist) -> Decision {
    let Ok(parsed) = Url::parse(url) else {
        return Decision::RedirectExternal;
    };
    match parsed.host_str() {
        Some(host) if allowlist.permits_host(host) => Decision::Allow,
        _ => Decision::RedirectExternal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    NewWindow,
    InPlace,
    LegacyNewWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: String,
    pub kind: NavigationKind,
}

impl NavigationRequest {
    pub fn new(url: impl Into<String>, kind: NavigationKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// What the runtime should do with the navigation it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Proceed,
    Cancel,
}

/// Hands a URL to the system's default browser.
pub trait ExternalOpener: Send + Sync {
    fn open_external(&self, url: &str) -> CoreResult<()>;
}

#[derive(Clone)]
pub struct NavigationGate {
    allowlist: Allowlist,
    opener: Arc<dyn ExternalOpener>,
}

impl NavigationGate {
    pub fn new(allowlist: Allowlist, opener: Arc<dyn ExternalOpener>) -> Self {
        Self { allowlist, opener }
    }

    pub fn route(&self, request: &NavigationRequest) -> NavigationOutcome {
        match decide(&request.url, &self.allowlist) {
            Decision::Allow => NavigationOutcome::Proceed,
            Decision::RedirectExternal => {
                debug!(url = %request.url, kind = ?request.kind, "redirecting to system browser");
                if let Err(err) = self.opener.open_external(&request.url) {
                    warn!(url = %request.url, error = %err, "failed to open external browser");
                }
                NavigationOutcome::Cancel
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ExternalOpener for RecordingOpener {
        fn open_external(&self, url: &str) -> CoreResult<()> {
            self.opened.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(CoreError::Host("no browser".to_string()));
            }
            Ok(())
        }
    }

    fn list(domains: &[&str]) -> Allowlist {
        Allowlist::new(domains.iter().copied()).unwrap()
    }

    #[test]
    fn exact_and_subdomain_hosts_are_allowed() {
        let allow = list(&["openai.com", "chatgpt.com"]);
        assert_eq!(decide("https://chatgpt.com/", &allow), Decision::Allow);
        assert_eq!(decide("https://chat.openai.com", &allow), Decision::Allow);
        assert_eq!(decide("https://a.b.openai.com/x?y=1", &allow), Decision::Allow);
        assert_eq!(decide("https://CHATGPT.com/c/abc", &allow), Decision::Allow);
    }

    #[test]
    fn lookalike_hosts_are_redirected() {
        let allow = list(&["chatgpt.com"]);
        assert_eq!(decide("https://notchatgpt.com/x", &allow), Decision::RedirectExternal);
        assert_eq!(decide("https://chatgpt.com.evil.io", &allow), Decision::RedirectExternal);
        assert_eq!(decide("https://evil.io/chatgpt.com", &allow), Decision::RedirectExternal);
        assert_eq!(decide("https://com/", &allow), Decision::RedirectExternal);
    }

    #[test]
    fn malformed_or_hostless_urls_are_redirected() {
        let allow = list(&["chatgpt.com"]);
        assert_eq!(decide("not a url", &allow), Decision::RedirectExternal);
        assert_eq!(decide("", &allow), Decision::RedirectExternal);
        assert_eq!(decide("mailto:someone@chatgpt.com", &allow), Decision::RedirectExternal);
        assert_eq!(decide("about:blank", &allow), Decision::RedirectExternal);
    }

    #[test]
    fn allowlist_rejects_non_domains() {
        assert!(Allowlist::new(Vec::<String>::new()).is_err());
        assert!(Allowlist::new(["https://chatgpt.com"]).is_err());
        assert!(Allowlist::new(["chatgpt.com/path"]).is_err());
        assert!(Allowlist::new(["chatgpt.com:443"]).is_err());
        assert!(Allowlist::new([".chatgpt.com"]).is_err());
        assert!(Allowlist::new([" "]).is_err());
    }

    #[test]
    fn allowlist_normalizes_and_dedups() {
        let allow = Allowlist::new(["OpenAI.com", "openai.com", "chatgpt.com"]).unwrap();
        assert_eq!(allow.domains(), &["openai.com".to_string(), "chatgpt.com".to_string()]);
        assert_eq!(Allowlist::builtin(), allow);
    }

    #[test]
    fn gate_opens_redirects_externally() {
        let opener = Arc::new(RecordingOpener::default());
        let gate = NavigationGate::new(list(&["chatgpt.com"]), opener.clone());

        let stay = NavigationRequest::new("https://chatgpt.com/c/1", NavigationKind::InPlace);
        assert_eq!(gate.route(&stay), NavigationOutcome::Proceed);

        for kind in [
            NavigationKind::NewWindow,
            NavigationKind::InPlace,
            NavigationKind::LegacyNewWindow,
        ] {
            let away = NavigationRequest::new("https://example.com/", kind);
            assert_eq!(gate.route(&away), NavigationOutcome::Cancel);
        }
        assert_eq!(opener.opened.lock().unwrap().len(), 3);
    }

    #[test]
    fn gate_cancels_even_when_opener_fails() {
        let opener = Arc::new(RecordingOpener {
            fail: true,
            ..Default::default()
        });
        let gate = NavigationGate::new(list(&["chatgpt.com"]), opener.clone());
        let away = NavigationRequest::new("https://example.com/", NavigationKind::NewWindow);
        assert_eq!(gate.route(&away), NavigationOutcome::Cancel);
        assert_eq!(opener.opened.lock().unwrap().as_slice(), ["https://example.com/"]);
    }
}
