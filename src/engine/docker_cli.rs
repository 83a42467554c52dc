#![allow(clippy::module_name_repetitions)]
//! `Engine` implemented by driving the `docker` command-line client.
//!
//! Each request is one `docker` invocation through `ExecService`. Failure mapping:
//! - spawn failure, exec timeout, or an unreachable daemon -> `Network`
//! - any other non-zero exit -> `Engine` with the trimmed stderr
//! - JSON that does not decode -> `Protocol`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::model::{
    ContainerConfig, ContainerDetail, ContainerHandle, ContainerState, DeletionRecord,
    HostConfig, ImageSummary,
};
use super::runtime::container_runtime_path;
use super::Engine;
use crate::config::Settings;
use crate::errors::{LifecycleError, Result};
use crate::util::{shell_join, ExecOutput, ExecRequest, ExecService};

/// Daemon-unreachable markers printed by the docker client.
const UNREACHABLE_MARKERS: &[&str] = &[
    "cannot connect to the docker daemon",
    "error during connect",
    "is the docker daemon running",
];

#[derive(Debug, Clone)]
pub struct DockerCli {
    runtime: PathBuf,
    exec: ExecService,
}

impl DockerCli {
    pub fn new(runtime: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runtime: runtime.into(),
            exec: ExecService::new(timeout),
        }
    }

    /// Locate docker per `settings.docker` (or PATH) and use `settings.exec_timeout`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let runtime = container_runtime_path(settings.docker.as_deref())?;
        Ok(Self::new(runtime, settings.exec_timeout))
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    fn run(&self, op: &str, args: Vec<String>, stdin: Option<Vec<u8>>) -> Result<ExecOutput> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut preview = vec!["docker".to_string()];
            preview.extend(args.iter().cloned());
            debug!(op, command = %shell_join(&preview), "docker invocation");
        }
        let mut req = ExecRequest::new(&self.runtime).args(args);
        if let Some(payload) = stdin {
            req = req.stdin(payload);
        }
        let out = self
            .exec
            .run(req)
            .map_err(|e| LifecycleError::network(op, format!("{e:#}")))?;
        debug!(op, status = ?out.status.code(), elapsed = ?out.duration, "docker finished");
        if out.status.success() {
            Ok(out)
        } else {
            Err(failure(op, &out))
        }
    }
}

fn failure(op: &str, out: &ExecOutput) -> LifecycleError {
    let stderr = out.stderr_lossy();
    let mut message = stderr.trim().to_string();
    if message.is_empty() {
        message = out.stdout_lossy().trim().to_string();
    }
    if message.is_empty() {
        message = format!("docker exited with {:?}", out.status.code());
    }
    let lower = message.to_ascii_lowercase();
    if UNREACHABLE_MARKERS.iter().any(|m| lower.contains(m)) {
        LifecycleError::network(op, message)
    } else {
        LifecycleError::engine(op, message)
    }
}

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Argument vector for `docker create`. Never pulls implicitly, so a missing image surfaces as
/// an error the caller can classify.
pub(crate) fn create_args(
    name: &str,
    config: &ContainerConfig,
    host: Option<&HostConfig>,
) -> Vec<String> {
    let mut args = strs(&["create", "--pull=never"]);
    if !name.is_empty() {
        args.push("--name".into());
        args.push(name.into());
    }

    // docker accepts a single entrypoint executable; remaining words lead the command
    let mut cmd: Vec<String> = Vec::new();
    if let Some((first, rest)) = config.entrypoint.split_first() {
        args.push("--entrypoint".into());
        args.push(first.clone());
        cmd.extend(rest.iter().cloned());
    }
    cmd.extend(config.cmd.iter().cloned());

    for e in &config.env {
        args.push("--env".into());
        args.push(e.clone());
    }
    for (k, v) in &config.labels {
        args.push("--label".into());
        args.push(format!("{k}={v}"));
    }
    if let Some(ref wd) = config.working_dir {
        args.push("--workdir".into());
        args.push(wd.clone());
    }
    if let Some(ref user) = config.user {
        args.push("--user".into());
        args.push(user.clone());
    }
    for p in &config.exposed_ports {
        args.push("--expose".into());
        args.push(p.clone());
    }

    if let Some(h) = host {
        for b in &h.binds {
            args.push("--volume".into());
            args.push(b.clone());
        }
        if let Some(ref net) = h.network_mode {
            args.push("--network".into());
            args.push(net.clone());
        }
        for p in &h.port_bindings {
            args.push("--publish".into());
            args.push(p.clone());
        }
        for x in &h.extra_hosts {
            args.push("--add-host".into());
            args.push(x.clone());
        }
        if h.auto_remove {
            args.push("--rm".into());
        }
        if h.privileged {
            args.push("--privileged".into());
        }
        for s in &h.security_opt {
            args.push("--security-opt".into());
            args.push(s.clone());
        }
    }

    args.push(config.image.clone());
    args.extend(cmd);
    args
}

/// One JSON object per line, as printed by `docker image ls --format {{json .}}`.
pub(crate) fn parse_image_lines(op: &str, text: &str) -> Result<Vec<ImageSummary>> {
    #[derive(Deserialize)]
    struct Line {
        #[serde(rename = "ID", default)]
        id: String,
        #[serde(rename = "Repository", default)]
        repository: String,
        #[serde(rename = "Tag", default)]
        tag: String,
        #[serde(rename = "CreatedAt", default)]
        created_at: String,
        #[serde(rename = "Size", default)]
        size: String,
    }

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            let line: Line = serde_json::from_str(l)
                .map_err(|e| LifecycleError::protocol(op, format!("{e}: {l}")))?;
            Ok(ImageSummary {
                id: line.id,
                repository: line.repository,
                tag: line.tag,
                created_at: line.created_at,
                size: line.size,
            })
        })
        .collect()
}

/// `docker container inspect --format {{json .}}` output.
pub(crate) fn parse_inspect(op: &str, text: &str) -> Result<ContainerDetail> {
    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct State {
        #[serde(rename = "Status")]
        status: String,
        #[serde(rename = "Running")]
        running: bool,
        #[serde(rename = "ExitCode")]
        exit_code: i64,
        #[serde(rename = "Error")]
        error: String,
        #[serde(rename = "StartedAt")]
        started_at: String,
        #[serde(rename = "FinishedAt")]
        finished_at: String,
    }
    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct Config {
        #[serde(rename = "Image")]
        image: String,
    }
    #[derive(Deserialize)]
    struct Inspect {
        #[serde(rename = "Id")]
        id: String,
        #[serde(rename = "Name", default)]
        name: String,
        #[serde(rename = "Created", default)]
        created: String,
        #[serde(rename = "State", default)]
        state: State,
        #[serde(rename = "Config", default)]
        config: Option<Config>,
    }

    // Without --format docker prints a one-element array; accept both shapes.
    let trimmed = text.trim();
    let raw: Inspect = if trimmed.starts_with('[') {
        let mut all: Vec<Inspect> = serde_json::from_str(trimmed)
            .map_err(|e| LifecycleError::protocol(op, e.to_string()))?;
        if all.is_empty() {
            return Err(LifecycleError::protocol(op, "empty inspect result"));
        }
        all.swap_remove(0)
    } else {
        serde_json::from_str(trimmed).map_err(|e| LifecycleError::protocol(op, e.to_string()))?
    };

    Ok(ContainerDetail {
        id: raw.id,
        name: raw.name.trim_start_matches('/').to_string(),
        image: raw.config.map(|c| c.image).unwrap_or_default(),
        created: raw.created,
        state: ContainerState {
            status: raw.state.status,
            running: raw.state.running,
            exit_code: raw.state.exit_code,
            error: raw.state.error,
            started_at: raw.state.started_at,
            finished_at: raw.state.finished_at,
        },
    })
}

/// `docker image rm` prints `Untagged: <ref>` / `Deleted: <id>` lines.
pub(crate) fn parse_deletion_records(text: &str) -> Vec<DeletionRecord> {
    text.lines()
        .filter_map(|l| {
            let l = l.trim();
            if let Some(r) = l.strip_prefix("Untagged:") {
                Some(DeletionRecord::Untagged(r.trim().to_string()))
            } else {
                l.strip_prefix("Deleted:")
                    .map(|id| DeletionRecord::Deleted(id.trim().to_string()))
            }
        })
        .collect()
}

impl Engine for DockerCli {
    fn list_images(&self) -> Result<Vec<ImageSummary>> {
        let op = "list images";
        let out = self.run(
            op,
            strs(&["image", "ls", "--no-trunc", "--format", "{{json .}}"]),
            None,
        )?;
        parse_image_lines(op, &out.stdout_lossy())
    }

    fn build_image(&self, context: &[u8], recipe: &str, tag: &str) -> Result<String> {
        let args = vec![
            "build".to_string(),
            "--tag".to_string(),
            tag.to_string(),
            "--file".to_string(),
            recipe.to_string(),
            "-".to_string(),
        ];
        let out = self.run("build image", args, Some(context.to_vec()))?;
        // BuildKit reports progress on stderr; keep both for diagnostics.
        Ok(format!("{}{}", out.stdout_lossy(), out.stderr_lossy()))
    }

    fn tag_image(&self, source: &str, target: &str) -> Result<()> {
        self.run(
            "tag image",
            vec!["tag".into(), source.into(), target.into()],
            None,
        )?;
        Ok(())
    }

    fn pull_image(&self, reference: &str) -> Result<String> {
        let out = self.run("pull image", vec!["pull".into(), reference.into()], None)?;
        Ok(out.stdout_lossy())
    }

    fn push_image(&self, reference: &str) -> Result<String> {
        let out = self.run("push image", vec!["push".into(), reference.into()], None)?;
        Ok(out.stdout_lossy())
    }

    fn remove_image(&self, reference: &str, force: bool) -> Result<Vec<DeletionRecord>> {
        let mut args = strs(&["image", "rm"]);
        if force {
            args.push("--force".into());
        }
        args.push(reference.into());
        let out = self.run("remove image", args, None)?;
        Ok(parse_deletion_records(&out.stdout_lossy()))
    }

    fn create_container(
        &self,
        name: &str,
        config: &ContainerConfig,
        host: Option<&HostConfig>,
    ) -> Result<ContainerHandle> {
        let op = "create container";
        let out = self.run(op, create_args(name, config, host), None)?;
        let id = out
            .stdout_lossy()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(str::to_string)
            .ok_or_else(|| LifecycleError::protocol(op, "docker create printed no container id"))?;
        Ok(ContainerHandle::new(id))
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.run("start container", vec!["start".into(), id.into()], None)?;
        Ok(())
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerDetail> {
        let op = "inspect container";
        let out = self.run(
            op,
            vec![
                "container".into(),
                "inspect".into(),
                "--format".into(),
                "{{json .}}".into(),
                id.into(),
            ],
            None,
        )?;
        parse_inspect(op, &out.stdout_lossy())
    }

    fn remove_container(&self, id: &str, force: bool) -> Result<()> {
        let mut args = vec!["rm".to_string()];
        if force {
            args.push("--force".into());
        }
        args.push(id.into());
        self.run("remove container", args, None)?;
        Ok(())
    }

    fn container_logs(&self, id: &str) -> Result<Vec<u8>> {
        let out = self.run("container logs", vec!["logs".into(), id.into()], None)?;
        let mut combined = out.stdout;
        combined.extend_from_slice(&out.stderr);
        Ok(combined)
    }
}
