#![allow(clippy::module_name_repetitions)]
//! Container lifecycle: self-healing create, start, inspect, remove, logs.
//!
//! `create` retries after two recoverable faults:
//! - image missing locally -> pull the image, then retry
//! - name already in use   -> force-remove the holder of the name, then retry
//!
//! Each corrective action completes before the retry is issued. A failed corrective action is
//! returned as-is (never mapped back to the create failure). The number of corrective actions
//! per call is bounded by `RecoveryBudget`; once spent, the create failure is returned.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::engine::{ContainerConfig, ContainerDetail, ContainerHandle, Engine, HostConfig};
use crate::errors::Result;
use crate::fault::{
    plan_recovery, CreateFault, DockerMessageClassifier, FaultClassifier, Recovery, RecoveryBudget,
};
use crate::image_ref::ImageReference;
use crate::images::ImageLifecycle;

#[derive(Clone)]
pub struct ContainerLifecycle {
    engine: Arc<dyn Engine>,
    images: ImageLifecycle,
    classifier: Arc<dyn FaultClassifier>,
    budget: RecoveryBudget,
}

impl ContainerLifecycle {
    /// Docker message classifier and the default budget (one pull, one removal).
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            images: ImageLifecycle::new(Arc::clone(&engine)),
            engine,
            classifier: Arc::new(DockerMessageClassifier),
            budget: RecoveryBudget::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FaultClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_budget(mut self, budget: RecoveryBudget) -> Self {
        self.budget = budget;
        self
    }

    #[instrument(level = "debug", skip(self, config, host), fields(image = %config.image))]
    pub fn create(
        &self,
        name: &str,
        config: &ContainerConfig,
        host: Option<&HostConfig>,
    ) -> Result<ContainerHandle> {
        let mut budget = self.budget;
        loop {
            let err = match self.engine.create_container(name, config, host) {
                Ok(handle) => {
                    debug!(container = %handle, "create container done");
                    return Ok(handle);
                }
                Err(e) => e,
            };
            error!(container = name, "create container error: {err}");

            let fault = self.classifier.classify(&err);
            match plan_recovery(fault, name, &config.image, &mut budget) {
                Recovery::Pull(image) => {
                    info!(%image, "image missing locally; pulling before retry");
                    self.images.pull(&image)?;
                }
                Recovery::RemoveContainer(holder) => {
                    info!(container = %holder, "name in use; removing before retry");
                    self.remove_one(&holder)?;
                }
                Recovery::GiveUp => {
                    if !matches!(fault, CreateFault::Unrecognized) {
                        warn!(?fault, "recovery budget exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Create (with recovery) and start a container running `image`.
    ///
    /// `config.image` is replaced by the reference's full name. When start fails the created
    /// container is left in place for the caller to inspect or remove.
    pub fn run(
        &self,
        image: &ImageReference,
        name: &str,
        config: &ContainerConfig,
        host: Option<&HostConfig>,
    ) -> Result<ContainerHandle> {
        let mut config = config.clone();
        config.image = image.full_name();
        let handle = self.create(name, &config, host)?;
        self.start(&handle)?;
        debug!(container = %handle, "start container done");
        Ok(handle)
    }

    pub fn start(&self, handle: &ContainerHandle) -> Result<()> {
        self.engine
            .start_container(handle.as_str())
            .inspect_err(|e| error!(container = %handle, "start container error: {e}"))
    }

    pub fn inspect(&self, handle: &ContainerHandle) -> Result<ContainerDetail> {
        let detail = self
            .engine
            .inspect_container(handle.as_str())
            .inspect_err(|e| error!(container = %handle, "inspect container error: {e}"))?;
        debug!(container = %handle, status = %detail.state.status, "inspect container");
        Ok(detail)
    }

    pub fn status(&self, handle: &ContainerHandle) -> Result<String> {
        Ok(self.inspect(handle)?.state.status)
    }

    /// Force-remove by id or name.
    pub fn remove_one(&self, id_or_name: &str) -> Result<()> {
        self.engine
            .remove_container(id_or_name, true)
            .inspect_err(|e| error!(container = id_or_name, "remove container error: {e}"))
    }

    /// Force-remove in order; stops at the first failure and leaves the rest untouched.
    pub fn remove_many<S: AsRef<str>>(&self, ids: &[S]) -> Result<()> {
        for id in ids {
            self.remove_one(id.as_ref())?;
        }
        Ok(())
    }

    /// Combined stdout and stderr.
    pub fn fetch_logs(&self, handle: &ContainerHandle) -> Result<String> {
        let bytes = self
            .engine
            .container_logs(handle.as_str())
            .inspect_err(|e| error!(container = %handle, "container logs error: {e}"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
