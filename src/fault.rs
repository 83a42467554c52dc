//! Classification of container-create failures and the recovery each one calls for.
//!
//! The engine reports create failures as free text. `DockerMessageClassifier` is the only place
//! in the crate that inspects that text; it is coupled to the message wording of the Docker
//! daemon and must be revisited when targeting another engine.

use crate::errors::LifecycleError;

/// Create-failure kinds the lifecycle knows how to recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateFault {
    /// The referenced image is not present locally.
    ImageMissing,
    /// Another container already holds the requested name.
    NameConflict,
    Unrecognized,
}

/// Corrective action to run before retrying a create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    Pull(String),
    RemoveContainer(String),
    GiveUp,
}

pub trait FaultClassifier: Send + Sync {
    fn classify(&self, err: &LifecycleError) -> CreateFault;
}

/// Only engine verdicts are classified; transport and decoding failures stay unrecognized.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerMessageClassifier;

const IMAGE_MISSING_MARKERS: &[&str] = &["no such image", "unable to find image"];
const NAME_CONFLICT_MARKERS: &[&str] = &["is already in use by container"];

impl FaultClassifier for DockerMessageClassifier {
    fn classify(&self, err: &LifecycleError) -> CreateFault {
        match err {
            LifecycleError::Engine { message, .. } => classify_message(message),
            _ => CreateFault::Unrecognized,
        }
    }
}

/// Case-insensitive substring match against the daemon's wording.
pub fn classify_message(message: &str) -> CreateFault {
    let lower = message.to_ascii_lowercase();
    if IMAGE_MISSING_MARKERS.iter().any(|m| lower.contains(m)) {
        CreateFault::ImageMissing
    } else if NAME_CONFLICT_MARKERS.iter().any(|m| lower.contains(m)) {
        CreateFault::NameConflict
    } else {
        CreateFault::Unrecognized
    }
}

/// How many corrective actions of each kind one `create` call may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryBudget {
    pub pulls: u32,
    pub removals: u32,
}

impl Default for RecoveryBudget {
    fn default() -> Self {
        Self {
            pulls: 1,
            removals: 1,
        }
    }
}

impl RecoveryBudget {
    pub fn none() -> Self {
        Self {
            pulls: 0,
            removals: 0,
        }
    }
}

/// Pure decision: given a fault, the create arguments, and the remaining budget, pick the
/// recovery. Consumes budget for the chosen action.
pub fn plan_recovery(
    fault: CreateFault,
    container_name: &str,
    image: &str,
    budget: &mut RecoveryBudget,
) -> Recovery {
    match fault {
        CreateFault::ImageMissing if budget.pulls > 0 && !image.is_empty() => {
            budget.pulls -= 1;
            Recovery::Pull(image.to_string())
        }
        CreateFault::NameConflict if budget.removals > 0 && !container_name.is_empty() => {
            budget.removals -= 1;
            Recovery::RemoveContainer(container_name.to_string())
        }
        _ => Recovery::GiveUp,
    }
}
