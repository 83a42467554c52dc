#![allow(clippy::module_name_repetitions)]
//! Registry tag lookup: does `name:tag` already exist on the image's registry?
//!
//! Endpoint: `GET http://{host}/{api}/{bare name}/tags/list` returning `{"tags": [...]}`.
//! The host is normalized so exactly one `/` separates it from the path. No credentials are
//! sent.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::errors::{LifecycleError, Result};
use crate::image_ref::ImageReference;

/// API segment used by the tag-listing endpoint.
pub const DEFAULT_TAG_API: &str = "2";

const TAG_OP: &str = "list registry tags";

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct RegistryTagChecker {
    client: Client,
    api: String,
}

impl RegistryTagChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LifecycleError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            client,
            api: DEFAULT_TAG_API.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.registry_timeout)
    }

    /// Override the API segment (e.g. `v2` for registries speaking the distribution API path).
    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = api.into().trim_matches('/').to_string();
        self
    }

    /// Tag-listing URL for `reference`; fails when the reference has no registry.
    pub fn tags_url(&self, reference: &ImageReference) -> Result<Url> {
        let host = reference.registry_host().ok_or_else(|| {
            LifecycleError::Configuration(format!(
                "a registry is required to query tags for {}",
                reference.name()
            ))
        })?;
        let raw = format!(
            "http://{host}/{}/{}/tags/list",
            self.api,
            reference.bare_name()
        );
        Url::parse(&raw)
            .map_err(|e| LifecycleError::Configuration(format!("invalid tag list url {raw}: {e}")))
    }

    /// True when the registry lists the reference's tag (case-insensitive).
    pub fn tag_exists(&self, reference: &ImageReference) -> Result<bool> {
        let url = self.tags_url(reference)?;
        debug!(%url, "querying registry tags");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| LifecycleError::network(TAG_OP, format!("{url}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| LifecycleError::network(TAG_OP, format!("{url}: reading body: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            debug!(%url, "registry does not know the repository");
            return Ok(false);
        }
        if !status.is_success() {
            return Err(LifecycleError::engine(
                TAG_OP,
                format!("{url}: HTTP {status}: {}", body.trim()),
            ));
        }

        let wanted = reference.bare_tag();
        tags_contain(&body, wanted)
    }
}

/// Decode a tag listing and test membership case-insensitively.
pub fn tags_contain(body: &str, wanted: &str) -> Result<bool> {
    let list: TagList =
        serde_json::from_str(body).map_err(|e| LifecycleError::protocol(TAG_OP, e.to_string()))?;
    Ok(list
        .tags
        .unwrap_or_default()
        .iter()
        .any(|t| t.eq_ignore_ascii_case(wanted)))
}
