#![allow(clippy::module_name_repetitions)]
//! Image lifecycle: build, tag, pull, push, list, delete.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::context::{package_context, write_recipe, RECIPE_FILE};
use crate::engine::{DeletionRecord, Engine, ImageSummary};
use crate::errors::Result;

#[derive(Clone)]
pub struct ImageLifecycle {
    engine: Arc<dyn Engine>,
}

impl ImageLifecycle {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Write the recipe into `context_dir`, package the directory and build it as `tag`.
    ///
    /// Success is the absence of an engine error; the response text is only logged.
    #[instrument(level = "debug", skip(self, recipe), fields(context = %context_dir.display()))]
    pub fn build(&self, recipe: &str, context_dir: &Path, tag: &str) -> Result<()> {
        write_recipe(context_dir, recipe)?;
        let archive = package_context(context_dir)?;
        let body = self
            .engine
            .build_image(&archive, RECIPE_FILE, tag)
            .inspect_err(|e| error!(tag, "build image failed: {e}"))?;
        debug!(tag, response = %body, "build image response");
        Ok(())
    }

    pub fn tag(&self, source: &str, target: &str) -> Result<()> {
        self.engine.tag_image(source, target)
    }

    /// Returns after the pull has fully completed.
    pub fn pull(&self, reference: &str) -> Result<()> {
        let body = self
            .engine
            .pull_image(reference)
            .inspect_err(|e| error!(image = reference, "pull image failed: {e}"))?;
        debug!(image = reference, response = %body, "pull image response");
        Ok(())
    }

    /// Pushes without registry credentials.
    pub fn push(&self, reference: &str) -> Result<()> {
        let body = self
            .engine
            .push_image(reference)
            .inspect_err(|e| error!(image = reference, "push image failed: {e}"))?;
        debug!(image = reference, response = %body, "push image response");
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<ImageSummary>> {
        let images = self.engine.list_images()?;
        for summary in &images {
            debug!(id = %summary.id, repo_tag = ?summary.repo_tag(), "image");
        }
        Ok(images)
    }

    /// Force-delete `reference`.
    pub fn delete(&self, reference: &str) -> Result<Vec<DeletionRecord>> {
        let records = self.engine.remove_image(reference, true)?;
        debug!(image = reference, ?records, "delete image response");
        Ok(records)
    }
}
