//! Timed contract calls
//!
//! Every contract call goes through [`invoke`], which measures the call from
//! immediately before invocation to immediately after return. With a
//! per-call timeout configured, the call runs on a helper thread and the
//! caller waits with a deadline; a call that misses it is abandoned, never
//! cancelled, and the helper thread is left to finish on its own.
//!
//! A panicking connector is reported as a transient error on both paths.

use conform_core::{ConnectorError, ConnectorResult, RepositoryConnector};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a completed call plus its wall-clock time
#[derive(Debug)]
pub(crate) struct Timed<T> {
    pub result: ConnectorResult<T>,
    pub elapsed: Duration,
}

fn timed<T, C>(repo: &dyn RepositoryConnector, call: C) -> Timed<T>
where
    C: FnOnce(&dyn RepositoryConnector) -> ConnectorResult<T>,
{
    let start = Instant::now();
    let result = call(repo);
    Timed {
        result,
        elapsed: start.elapsed(),
    }
}

fn panicked<T>(elapsed: Duration) -> Timed<T> {
    Timed {
        result: Err(ConnectorError::transient("connector call panicked")),
        elapsed,
    }
}

/// Run `call` against `repo`, returning `None` when it exceeds `timeout`.
pub(crate) fn invoke<T, C>(
    repo: &Arc<dyn RepositoryConnector>,
    timeout: Option<Duration>,
    call: C,
) -> io::Result<Option<Timed<T>>>
where
    T: Send + 'static,
    C: FnOnce(&dyn RepositoryConnector) -> ConnectorResult<T> + Send + 'static,
{
    let limit = match timeout {
        None => {
            let started = Instant::now();
            let done = panic::catch_unwind(AssertUnwindSafe(|| timed(repo.as_ref(), call)))
                .unwrap_or_else(|_| panicked(started.elapsed()));
            return Ok(Some(done));
        }
        Some(limit) => limit,
    };

    let (tx, rx) = mpsc::channel();
    let repo = Arc::clone(repo);
    let waited = Instant::now();
    thread::Builder::new()
        .name("conform-call".to_string())
        .spawn(move || {
            // The receiver is gone once the caller gave up on this call.
            let _ = tx.send(timed(repo.as_ref(), call));
        })?;

    match rx.recv_timeout(limit) {
        Ok(done) => Ok(Some(done)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Ok(Some(panicked(waited.elapsed()))),
    }
}
