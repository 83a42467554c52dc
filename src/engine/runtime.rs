#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::io;
use std::path::{Path, PathBuf};

use which::which;

use crate::errors::{LifecycleError, Result};

/// Resolve the docker binary: an explicit path (or bare program name) wins, else PATH lookup.
pub fn container_runtime_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
        if let Ok(found) = which(p) {
            return Ok(found);
        }
        return Err(LifecycleError::io(
            format!("docker runtime {}", p.display()),
            io::Error::new(io::ErrorKind::NotFound, "configured docker binary does not exist"),
        ));
    }

    if let Ok(p) = which("docker") {
        return Ok(p);
    }
    Err(LifecycleError::io(
        "docker runtime",
        io::Error::new(
            io::ErrorKind::NotFound,
            "Docker is required but was not found in PATH.",
        ),
    ))
}
