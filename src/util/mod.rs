#![allow(clippy::module_name_repetitions)]
//! Small utilities: subprocess execution and shell-style rendering for diagnostics.

pub mod exec;

pub use exec::{ExecOutput, ExecRequest, ExecService};

/// Render an argv as a copy-pasteable shell line (diagnostics only; never executed).
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}
