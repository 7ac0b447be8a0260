use tracing::info;

use crate::error::CoreResult;

/// Launch-at-login registration for the current user.
pub trait Autostart: Send + Sync {
    fn enable(&self) -> CoreResult<()>;
    fn disable(&self) -> CoreResult<()>;
    fn is_enabled(&self) -> CoreResult<bool>;
}

/// Flips the registration and returns what the OS reports afterwards.
pub fn toggle(autostart: &dyn Autostart) -> CoreResult<bool> {
    if autostart.is_enabled()? {
        autostart.disable()?;
    } else {
        autostart.enable()?;
    }
    let enabled = autostart.is_enabled()?;
    info!(enabled, "auto launch toggled");
    Ok(enabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Registry {
        enabled: Mutex<bool>,
        refuse_enable: bool,
    }

    impl Autostart for Registry {
        fn enable(&self) -> CoreResult<()> {
            if self.refuse_enable {
                return Err(CoreError::Autostart("access denied".to_string()));
            }
            *self.enabled.lock().unwrap() = true;
            Ok(())
        }

        fn disable(&self) -> CoreResult<()> {
            *self.enabled.lock().unwrap() = false;
            Ok(())
        }

        fn is_enabled(&self) -> CoreResult<bool> {
            Ok(*self.enabled.lock().unwrap())
        }
    }

    #[test]
    fn toggle_flips_and_reports_registration() {
        let registry = Registry::default();
        assert!(toggle(&registry).unwrap());
        assert!(registry.is_enabled().unwrap());
        assert!(!toggle(&registry).unwrap());
        assert!(!registry.is_enabled().unwrap());
    }

    #[test]
    fn failed_enable_leaves_registration_off() {
        let registry = Registry {
            refuse_enable: true,
            ..Registry::default()
        };
        assert!(matches!(toggle(&registry), Err(CoreError::Autostart(_))));
        assert!(!registry.is_enabled().unwrap());
    }
}
