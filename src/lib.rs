//! dockhand: image and container lifecycle on a single container engine.
//!
//! Components (all stateless apart from the injected engine handle):
//! - `ImageReference`: name + optional registry, fully qualified reference.
//! - `RegistryTagChecker`: does a tag already exist on the registry?
//! - `ImageLifecycle`: build (with context packaging), tag, pull, push, list, delete.
//! - `ContainerLifecycle`: self-healing create, start, inspect, remove, logs.
//! - `ContainerWaiter`: blocking wait for a terminal status with deadline and cancellation.
//!
//! The engine is reached through the `Engine` trait; `DockerCli` drives the docker client.
//!
//! ```no_run
//! use std::sync::Arc;
//! use dockhand::{ContainerConfig, ContainerLifecycle, ContainerWaiter, DockerCli, Engine,
//!                ImageReference, Settings};
//!
//! # fn main() -> dockhand::Result<()> {
//! let settings = Settings::from_env()?;
//! let engine: Arc<dyn Engine> = Arc::new(DockerCli::from_settings(&settings)?);
//! let containers = ContainerLifecycle::new(Arc::clone(&engine));
//! let image = ImageReference::new("busybox:latest");
//! let handle = containers.run(&image, "probe", &ContainerConfig::default().with_cmd(["true"]), None)?;
//! ContainerWaiter::new(engine).wait_until_done(&handle)?;
//! println!("{}", containers.fetch_logs(&handle)?);
//! containers.remove_one(handle.as_str())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod containers;
pub mod context;
pub mod engine;
pub mod errors;
pub mod fault;
pub mod image_ref;
pub mod images;
pub mod registry;
pub mod telemetry;
pub mod util;
pub mod waiter;

pub use config::Settings;
pub use containers::ContainerLifecycle;
pub use context::RECIPE_FILE;
pub use engine::{
    container_runtime_path, ContainerConfig, ContainerDetail, ContainerHandle, ContainerState,
    DeletionRecord, DockerCli, Engine, HostConfig, ImageSummary,
};
pub use errors::{exit_code_for_lifecycle_error, LifecycleError, Result};
pub use fault::{CreateFault, DockerMessageClassifier, FaultClassifier, Recovery, RecoveryBudget};
pub use image_ref::ImageReference;
pub use images::ImageLifecycle;
pub use registry::RegistryTagChecker;
pub use waiter::{is_terminal_status, CancelToken, ContainerWaiter, WaitOptions};
