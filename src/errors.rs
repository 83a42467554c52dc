//! Error taxonomy for every lifecycle operation.
//!
//! Mapping guide:
//! - Remote failures carry the operation name and the engine/registry message verbatim.
//! - Spawn failures and exec timeouts are transport problems (`Network`), not engine verdicts.
//! - Map a missing docker binary to exit code 127, configuration problems to 2, all others to 1.
use std::io;
use std::time::Duration;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A required setting is missing or malformed (e.g. tag query without a registry).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local filesystem failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Build context archive could not be assembled.
    #[error("packaging build context {path}: {message}")]
    Packaging { path: String, message: String },

    /// The engine or registry could not be reached.
    #[error("{op}: transport failure: {message}")]
    Network { op: String, message: String },

    /// The response body could not be decoded.
    #[error("{op}: malformed response: {message}")]
    Protocol { op: String, message: String },

    /// The engine or registry accepted the request and reported a failure.
    #[error("{op}: {message}")]
    Engine { op: String, message: String },

    #[error("{op}: gave up after {after:?}")]
    Timeout { op: String, after: Duration },

    #[error("{op}: cancelled")]
    Cancelled { op: String },
}

impl LifecycleError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        LifecycleError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn network(op: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::Network {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn protocol(op: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::Protocol {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn engine(op: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::Engine {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Underlying message as reported by the engine, registry or OS, without the op prefix.
    pub fn message(&self) -> String {
        match self {
            LifecycleError::Configuration(m) => m.clone(),
            LifecycleError::Io { source, .. } => source.to_string(),
            LifecycleError::Packaging { message, .. }
            | LifecycleError::Network { message, .. }
            | LifecycleError::Protocol { message, .. }
            | LifecycleError::Engine { message, .. } => message.clone(),
            LifecycleError::Timeout { after, .. } => format!("timed out after {after:?}"),
            LifecycleError::Cancelled { .. } => "cancelled".to_string(),
        }
    }

    /// Name of the remote call that failed, when there was one.
    pub fn op(&self) -> Option<&str> {
        match self {
            LifecycleError::Network { op, .. }
            | LifecycleError::Protocol { op, .. }
            | LifecycleError::Engine { op, .. }
            | LifecycleError::Timeout { op, .. }
            | LifecycleError::Cancelled { op } => Some(op),
            _ => None,
        }
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert a LifecycleError to the exit code reported by the binary.
pub fn exit_code_for_lifecycle_error(e: &LifecycleError) -> u8 {
    match e {
        LifecycleError::Configuration(_) => 2,
        LifecycleError::Io { source, .. } => exit_code_for_io_error(source),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_op_prefix() {
        let e = LifecycleError::engine("create container", "No such image: foo:latest");
        assert_eq!(e.message(), "No such image: foo:latest");
        assert_eq!(e.op(), Some("create container"));
        assert_eq!(e.to_string(), "create container: No such image: foo:latest");
    }

    #[test]
    fn test_exit_codes() {
        let not_found = LifecycleError::io("docker", io::Error::new(io::ErrorKind::NotFound, "x"));
        assert_eq!(exit_code_for_lifecycle_error(&not_found), 127);
        let cfg = LifecycleError::Configuration("registry required".into());
        assert_eq!(exit_code_for_lifecycle_error(&cfg), 2);
        let eng = LifecycleError::engine("pull image", "denied");
        assert_eq!(exit_code_for_lifecycle_error(&eng), 1);
    }
}
