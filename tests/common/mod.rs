#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Mutex;
use std::thread;

use dockhand::{
    ContainerConfig, ContainerDetail, ContainerHandle, ContainerState, DeletionRecord, Engine,
    HostConfig, ImageSummary, LifecycleError, Result,
};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListImages,
    Build {
        recipe: String,
        tag: String,
        context_len: usize,
    },
    Tag(String, String),
    Pull(String),
    Push(String),
    RemoveImage(String, bool),
    Create {
        name: String,
        image: String,
        cmd: Vec<String>,
    },
    Start(String),
    Inspect(String),
    RemoveContainer(String, bool),
    Logs(String),
}

/// Engine double: records every call and answers from per-operation scripts.
///
/// An exhausted script answers with success (or `exited` for inspections).
#[derive(Default)]
pub struct ScriptedEngine {
    calls: Mutex<Vec<Call>>,
    create: Mutex<VecDeque<Result<String>>>,
    pull: Mutex<VecDeque<Result<String>>>,
    remove: Mutex<VecDeque<Result<()>>>,
    inspect: Mutex<VecDeque<Result<String>>>,
    build: Mutex<VecDeque<Result<String>>>,
    last_context: Mutex<Vec<u8>>,
    logs: Mutex<Vec<u8>>,
}

pub fn engine_err(message: &str) -> LifecycleError {
    LifecycleError::engine("scripted", message)
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(self, result: Result<&str>) -> Self {
        self.create
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn on_pull(self, result: Result<&str>) -> Self {
        self.pull
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn on_remove(self, result: Result<()>) -> Self {
        self.remove.lock().unwrap().push_back(result);
        self
    }

    pub fn on_inspect(self, result: Result<&str>) -> Self {
        self.inspect
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn on_build(self, result: Result<&str>) -> Self {
        self.build
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn with_logs(self, logs: &[u8]) -> Self {
        *self.logs.lock().unwrap() = logs.to_vec();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn last_context(&self) -> Vec<u8> {
        self.last_context.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Engine for ScriptedEngine {
    fn list_images(&self) -> Result<Vec<ImageSummary>> {
        self.record(Call::ListImages);
        Ok(vec![ImageSummary {
            id: "sha256:abc".to_string(),
            repository: "test_1".to_string(),
            tag: "latest".to_string(),
            created_at: String::new(),
            size: "1kB".to_string(),
        }])
    }

    fn build_image(&self, context: &[u8], recipe: &str, tag: &str) -> Result<String> {
        self.record(Call::Build {
            recipe: recipe.to_string(),
            tag: tag.to_string(),
            context_len: context.len(),
        });
        *self.last_context.lock().unwrap() = context.to_vec();
        self.build
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Successfully tagged {tag}")))
    }

    fn tag_image(&self, source: &str, target: &str) -> Result<()> {
        self.record(Call::Tag(source.to_string(), target.to_string()));
        Ok(())
    }

    fn pull_image(&self, reference: &str) -> Result<String> {
        self.record(Call::Pull(reference.to_string()));
        self.pull
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Status: Downloaded newer image".to_string()))
    }

    fn push_image(&self, reference: &str) -> Result<String> {
        self.record(Call::Push(reference.to_string()));
        Ok("pushed".to_string())
    }

    fn remove_image(&self, reference: &str, force: bool) -> Result<Vec<DeletionRecord>> {
        self.record(Call::RemoveImage(reference.to_string(), force));
        Ok(vec![
            DeletionRecord::Untagged(reference.to_string()),
            DeletionRecord::Deleted("sha256:abc".to_string()),
        ])
    }

    fn create_container(
        &self,
        name: &str,
        config: &ContainerConfig,
        _host: Option<&HostConfig>,
    ) -> Result<ContainerHandle> {
        self.record(Call::Create {
            name: name.to_string(),
            image: config.image.clone(),
            cmd: config.cmd.clone(),
        });
        self.create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("{name}-id")))
            .map(ContainerHandle::new)
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.record(Call::Start(id.to_string()));
        Ok(())
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerDetail> {
        self.record(Call::Inspect(id.to_string()));
        let status = self
            .inspect
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("exited".to_string()))?;
        Ok(ContainerDetail {
            id: id.to_string(),
            name: format!("/{id}"),
            state: ContainerState {
                running: status == "running",
                status,
                ..ContainerState::default()
            },
            ..ContainerDetail::default()
        })
    }

    fn remove_container(&self, id: &str, force: bool) -> Result<()> {
        self.record(Call::RemoveContainer(id.to_string(), force));
        self.remove.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn container_logs(&self, id: &str) -> Result<Vec<u8>> {
        self.record(Call::Logs(id.to_string()));
        Ok(self.logs.lock().unwrap().clone())
    }
}

/// Serve exactly one HTTP request on 127.0.0.1 with a fixed response.
///
/// Returns `host:port` and a handle yielding the request line that was received.
pub fn one_shot_http(status: u16, body: &str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let body = body.to_string();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request");
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
        }
        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let resp = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(resp.as_bytes()).expect("write response");
        let _ = stream.flush();
        request_line.trim().to_string()
    });
    (addr.to_string(), handle)
}

/// Skip helper for tests that need a reachable docker daemon.
pub fn docker_available() -> Option<std::path::PathBuf> {
    let path = dockhand::container_runtime_path(None).ok()?;
    let ok = std::process::Command::new(&path)
        .arg("info")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    ok.then_some(path)
}
