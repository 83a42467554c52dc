//! Blocking wait for a container to reach a terminal state.
//!
//! One worker thread polls the container status and hands exactly one outcome to the caller
//! over a channel. The caller may bound the wait with a deadline and abort it with a
//! `CancelToken`; in both cases the worker is told to stop and issues no further status queries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{Settings, DEFAULT_POLL_INTERVAL};
use crate::engine::{ContainerHandle, Engine};
use crate::errors::{LifecycleError, Result};

const WAIT_OP: &str = "wait for container";

/// How often the caller re-checks its cancel token while the worker polls.
const CANCEL_CHECK: Duration = Duration::from_millis(50);

/// Case-insensitive `done` / `exited`.
pub fn is_terminal_status(status: &str) -> bool {
    status.eq_ignore_ascii_case("done") || status.eq_ignore_ascii_case("exited")
}

/// Shared flag a caller can trip from any thread to abandon a wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: None,
        }
    }
}

impl WaitOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.poll_interval,
            timeout: settings.wait_timeout,
            cancel: None,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

#[derive(Clone)]
pub struct ContainerWaiter {
    engine: Arc<dyn Engine>,
    options: WaitOptions,
}

impl ContainerWaiter {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_options(engine, WaitOptions::default())
    }

    pub fn with_options(engine: Arc<dyn Engine>, options: WaitOptions) -> Self {
        Self { engine, options }
    }

    /// Block until the container reports `done`/`exited`, a status query fails, or the
    /// configured deadline/cancellation fires.
    pub fn wait_until_done(&self, handle: &ContainerHandle) -> Result<()> {
        self.wait_until_done_with(handle, &self.options)
    }

    pub fn wait_until_done_with(
        &self,
        handle: &ContainerHandle,
        options: &WaitOptions,
    ) -> Result<()> {
        let (result_tx, result_rx) = mpsc::sync_channel::<Result<()>>(1);
        // Dropping `stop_tx` (any return path below) tells the worker to quit.
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let engine = Arc::clone(&self.engine);
        let id = handle.clone();
        let interval = options.poll_interval;
        let worker = thread::Builder::new()
            .name("dockhand-wait".to_string())
            .spawn(move || {
                if let Some(outcome) = poll_until_terminal(engine.as_ref(), &id, interval, &stop_rx)
                {
                    let _ = result_tx.send(outcome);
                }
            })
            .map_err(|e| LifecycleError::io("spawn status poller", e))?;

        let started = Instant::now();
        let deadline = options.timeout.map(|t| started + t);
        loop {
            let mut slice = if options.cancel.is_some() {
                CANCEL_CHECK
            } else {
                Duration::from_secs(3600)
            };
            if let Some(d) = deadline {
                slice = slice.min(d.saturating_duration_since(Instant::now()));
            }

            match result_rx.recv_timeout(slice) {
                Ok(outcome) => {
                    let _ = worker.join();
                    return outcome;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let _ = worker.join();
                    return Err(LifecycleError::engine(
                        WAIT_OP,
                        format!("status poller for {handle} exited without a result"),
                    ));
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                debug!(container = %handle, "wait cancelled");
                drop(stop_tx);
                return Err(LifecycleError::Cancelled {
                    op: WAIT_OP.to_string(),
                });
            }
            if let (Some(d), Some(limit)) = (deadline, options.timeout) {
                if Instant::now() >= d {
                    warn!(container = %handle, ?limit, "wait timed out");
                    drop(stop_tx);
                    return Err(LifecycleError::Timeout {
                        op: WAIT_OP.to_string(),
                        after: limit,
                    });
                }
            }
        }
    }
}

/// Worker body. Returns None when told to stop before reaching an outcome.
fn poll_until_terminal(
    engine: &dyn Engine,
    handle: &ContainerHandle,
    interval: Duration,
    stop: &mpsc::Receiver<()>,
) -> Option<Result<()>> {
    loop {
        let status = match engine.inspect_container(handle.as_str()) {
            Ok(detail) => detail.state.status,
            Err(e) => {
                debug!(container = %handle, "status query failed: {e}");
                return Some(Err(e));
            }
        };
        debug!(container = %handle, %status, "container status");
        if is_terminal_status(&status) {
            return Some(Ok(()));
        }
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}
