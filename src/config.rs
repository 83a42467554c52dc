//! Settings resolved once at the edge (binary or caller) and injected into components.
//!
//! Environment:
//! - DOCKHAND_DOCKER: explicit docker binary path (else discovered on PATH)
//! - DOCKHAND_REGISTRY: default registry host
//! - DOCKHAND_POLL_INTERVAL / DOCKHAND_WAIT_TIMEOUT: waiter cadence and deadline ("0" = none)
//! - DOCKHAND_EXEC_TIMEOUT / DOCKHAND_REGISTRY_TIMEOUT: per-request limits
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{LifecycleError, Result};

pub const ENV_DOCKER: &str = "DOCKHAND_DOCKER";
pub const ENV_REGISTRY: &str = "DOCKHAND_REGISTRY";
pub const ENV_POLL_INTERVAL: &str = "DOCKHAND_POLL_INTERVAL";
pub const ENV_WAIT_TIMEOUT: &str = "DOCKHAND_WAIT_TIMEOUT";
pub const ENV_EXEC_TIMEOUT: &str = "DOCKHAND_EXEC_TIMEOUT";
pub const ENV_REGISTRY_TIMEOUT: &str = "DOCKHAND_REGISTRY_TIMEOUT";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub docker: Option<PathBuf>,
    pub registry: Option<String>,
    pub poll_interval: Duration,
    pub wait_timeout: Option<Duration>,
    pub exec_timeout: Duration,
    pub registry_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker: None,
            registry: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: None,
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Read settings through an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut s = Settings::default();
        if let Some(p) = get(ENV_DOCKER) {
            s.docker = Some(PathBuf::from(p));
        }
        s.registry = get(ENV_REGISTRY);
        if let Some(v) = get(ENV_POLL_INTERVAL) {
            let d = parse_duration(ENV_POLL_INTERVAL, &v)?;
            if d.is_zero() {
                return Err(LifecycleError::Configuration(format!(
                    "{ENV_POLL_INTERVAL} must be greater than zero"
                )));
            }
            s.poll_interval = d;
        }
        if let Some(v) = get(ENV_WAIT_TIMEOUT) {
            let d = parse_duration(ENV_WAIT_TIMEOUT, &v)?;
            s.wait_timeout = (!d.is_zero()).then_some(d);
        }
        if let Some(v) = get(ENV_EXEC_TIMEOUT) {
            s.exec_timeout = parse_duration(ENV_EXEC_TIMEOUT, &v)?;
        }
        if let Some(v) = get(ENV_REGISTRY_TIMEOUT) {
            s.registry_timeout = parse_duration(ENV_REGISTRY_TIMEOUT, &v)?;
        }
        Ok(s)
    }
}

/// Accepts humantime strings ("500ms", "2m 30s") and bare integers as seconds.
pub fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(value)
        .map_err(|e| LifecycleError::Configuration(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.poll_interval, Duration::from_secs(1));
        assert!(s.wait_timeout.is_none());
    }

    #[test]
    fn test_parses_humantime_and_seconds() {
        let s = settings(&[
            (ENV_POLL_INTERVAL, "250ms"),
            (ENV_WAIT_TIMEOUT, "2m"),
            (ENV_EXEC_TIMEOUT, "45"),
            (ENV_REGISTRY, " reg.local:5000/ "),
        ])
        .unwrap();
        assert_eq!(s.poll_interval, Duration::from_millis(250));
        assert_eq!(s.wait_timeout, Some(Duration::from_secs(120)));
        assert_eq!(s.exec_timeout, Duration::from_secs(45));
        assert_eq!(s.registry.as_deref(), Some("reg.local:5000/"));
    }

    #[test]
    fn test_zero_wait_timeout_means_none() {
        let s = settings(&[(ENV_WAIT_TIMEOUT, "0")]).unwrap();
        assert!(s.wait_timeout.is_none());
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        let err = settings(&[(ENV_EXEC_TIMEOUT, "soon")]).unwrap_err();
        assert!(matches!(err, LifecycleError::Configuration(ref m) if m.contains(ENV_EXEC_TIMEOUT)));
        let err = settings(&[(ENV_POLL_INTERVAL, "0s")]).unwrap_err();
        assert!(matches!(err, LifecycleError::Configuration(_)));
    }
}
