//! Engine-neutral request and response types.

use std::collections::BTreeMap;
use std::fmt;

/// Opaque container identifier returned by the engine on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContainerHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContainerHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What to run: image, process and its environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    pub image: String,
    pub cmd: Vec<String>,
    pub entrypoint: Vec<String>,
    pub env: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub working_dir: Option<String>,
    pub user: Option<String>,
    pub exposed_ports: Vec<String>,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn with_cmd<I, S>(mut self, cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmd = cmd.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push(format!("{key}={value}"));
        self
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }
}

/// How the engine hosts the container: mounts, networking, privileges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConfig {
    /// `host:container[:mode]`
    pub binds: Vec<String>,
    pub network_mode: Option<String>,
    /// `[ip:]host:container[/proto]`
    pub port_bindings: Vec<String>,
    /// `host:ip`
    pub extra_hosts: Vec<String>,
    pub auto_remove: bool,
    pub privileged: bool,
    pub security_opt: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerState {
    pub status: String,
    pub running: bool,
    pub exit_code: i64,
    pub error: String,
    pub started_at: String,
    pub finished_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetail {
    pub id: String,
    pub name: String,
    pub image: String,
    pub created: String,
    pub state: ContainerState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub id: String,
    pub repository: String,
    pub tag: String,
    pub created_at: String,
    pub size: String,
}

impl ImageSummary {
    /// `repository:tag`, or None for dangling images.
    pub fn repo_tag(&self) -> Option<String> {
        if self.repository.is_empty() || self.repository == "<none>" {
            return None;
        }
        if self.tag.is_empty() || self.tag == "<none>" {
            return Some(self.repository.clone());
        }
        Some(format!("{}:{}", self.repository, self.tag))
    }
}

/// One entry of an image removal report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionRecord {
    Untagged(String),
    Deleted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_tag() {
        let mut s = ImageSummary {
            repository: "test_1".into(),
            tag: "latest".into(),
            ..Default::default()
        };
        assert_eq!(s.repo_tag().as_deref(), Some("test_1:latest"));
        s.tag = "<none>".into();
        assert_eq!(s.repo_tag().as_deref(), Some("test_1"));
        s.repository = "<none>".into();
        assert_eq!(s.repo_tag(), None);
    }

    #[test]
    fn test_config_builders() {
        let c = ContainerConfig::new("busybox")
            .with_cmd(["true"])
            .with_env("A", "1")
            .with_label("team", "ci");
        assert_eq!(c.image, "busybox");
        assert_eq!(c.cmd, vec!["true"]);
        assert_eq!(c.env, vec!["A=1"]);
        assert_eq!(c.labels.get("team").map(String::as_str), Some("ci"));
    }
}
