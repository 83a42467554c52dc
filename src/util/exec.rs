use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use wait_timeout::ChildExt;

/// Structured command execution with timeouts and an optional stdin payload.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let mut cmd = Command::new(&request.program);
        for arg in &request.args {
            cmd.arg(arg);
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        cmd.stdin(if request.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        // Feed stdin and drain both pipes concurrently so a chatty child never blocks on a
        // full pipe while we wait for it.
        let writer = match (child.stdin.take(), request.stdin) {
            (Some(mut pipe), Some(payload)) => Some(thread::spawn(move || -> io::Result<()> {
                pipe.write_all(&payload)?;
                pipe.flush()
            })),
            _ => None,
        };
        let stdout_reader = child.stdout.take().map(spawn_drain);
        let stderr_reader = child.stderr.take().map(spawn_drain);

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();
        let status = if timeout.is_zero() {
            child.wait().context("failed to wait for process")?
        } else {
            match child
                .wait_timeout(timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {:?}",
                        request.program,
                        timeout
                    ));
                }
            }
        };
        let duration = started.elapsed();

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                // The child may exit before consuming all of stdin; its status tells the story.
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(e).context("failed to write process stdin"),
                Err(_) => return Err(anyhow!("stdin writer thread panicked")),
            }
        }
        let stdout = join_drain(stdout_reader).context("failed to read process stdout")?;
        let stderr = join_drain(stderr_reader).context("failed to read process stderr")?;

        Ok(ExecOutput {
            status,
            duration,
            stdout,
            stderr,
        })
    }
}

fn spawn_drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_drain(handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| anyhow!("output reader thread panicked"))?
            .map_err(Into::into),
        None => Ok(Vec::new()),
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    stdin: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, payload: Vec<u8>) -> Self {
        self.stdin = Some(payload);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
