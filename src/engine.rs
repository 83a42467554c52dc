#![allow(clippy::module_name_repetitions)]
//! The container engine collaborator.
//!
//! Components never talk to the engine's wire protocol; they call this trait. `DockerCli` is the
//! shipped binding. Implementations must be safe to share across threads: the waiter polls from
//! a worker while other operations may be in flight.

mod docker_cli;
mod model;
mod runtime;

pub use docker_cli::DockerCli;
pub use model::{
    ContainerConfig, ContainerDetail, ContainerHandle, ContainerState, DeletionRecord,
    HostConfig, ImageSummary,
};
pub use runtime::container_runtime_path;

use crate::errors::Result;

pub trait Engine: Send + Sync {
    fn list_images(&self) -> Result<Vec<ImageSummary>>;

    /// Build from a tar archive containing `recipe`; returns the drained response text.
    fn build_image(&self, context: &[u8], recipe: &str, tag: &str) -> Result<String>;

    fn tag_image(&self, source: &str, target: &str) -> Result<()>;

    /// Returns only once the pull has completed; the text is the drained progress stream.
    fn pull_image(&self, reference: &str) -> Result<String>;

    /// Same contract as `pull_image`. No registry credentials are attached.
    fn push_image(&self, reference: &str) -> Result<String>;

    fn remove_image(&self, reference: &str, force: bool) -> Result<Vec<DeletionRecord>>;

    /// Single attempt; no pulls or removals on the engine side.
    fn create_container(
        &self,
        name: &str,
        config: &ContainerConfig,
        host: Option<&HostConfig>,
    ) -> Result<ContainerHandle>;

    fn start_container(&self, id: &str) -> Result<()>;

    fn inspect_container(&self, id: &str) -> Result<ContainerDetail>;

    /// `id` may also be a container name.
    fn remove_container(&self, id: &str, force: bool) -> Result<()>;

    /// stdout followed by stderr, fully materialized.
    fn container_logs(&self, id: &str) -> Result<Vec<u8>>;
}
