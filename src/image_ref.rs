//! Image references: a bare image name plus an optional registry host.

use std::fmt;

/// An image name with an optional registry host.
///
/// The name may embed a tag (`name:tag`). Registry hosts are normalized so the fully qualified
/// reference always has exactly one `/` between host and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    name: String,
    registry: Option<String>,
}

impl ImageReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: None,
        }
    }

    /// Empty or whitespace-only hosts are treated as "no registry".
    pub fn with_registry(name: impl Into<String>, registry: impl Into<String>) -> Self {
        let registry = registry.into();
        let registry = if registry.trim().is_empty() {
            None
        } else {
            Some(registry.trim().to_string())
        };
        Self {
            name: name.into(),
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Registry host without trailing slashes, if any.
    pub fn registry_host(&self) -> Option<&str> {
        self.registry
            .as_deref()
            .map(|r| r.trim_end_matches('/'))
            .filter(|r| !r.is_empty())
    }

    /// `host/name` when a registry is set, else `name`.
    pub fn full_name(&self) -> String {
        match self.registry_host() {
            Some(host) => format!("{host}/{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Name without its tag.
    pub fn bare_name(&self) -> &str {
        bare_name(&self.name)
    }

    /// Tag portion of the name; the whole name when no tag is embedded.
    pub fn bare_tag(&self) -> &str {
        bare_tag(&self.name)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Part of `name` before the first `:`. A leading `:` does not count as a separator.
pub fn bare_name(name: &str) -> &str {
    match name.find(':') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Part of `name` between the first and second `:`; the whole name when there is no tag.
pub fn bare_tag(name: &str) -> &str {
    match name.find(':') {
        Some(idx) if idx > 0 => {
            let rest = &name[idx + 1..];
            rest.split(':').next().unwrap_or(rest)
        }
        _ => name,
    }
}
