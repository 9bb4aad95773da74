//! Debounce and throttle primitives used to rate-limit persistence calls.
//!
//! Both are explicit owned resources: constructing one spawns a worker task,
//! and dropping (or cancelling) the handle aborts it, so nothing fires after
//! the owning scope is gone.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};

/// Trailing-edge debouncer. Every call supersedes the pending one and
/// reschedules execution `wait` in the future with the latest value; only
/// the last call of a burst executes. There is no leading-edge invocation.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(wait: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let worker = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        _ = sleep(wait) => {
                            callback(latest);
                            break;
                        }
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => return,
                        },
                    }
                }
            }
        });
        Self { tx, worker }
    }

    pub fn call(&self, value: T) {
        let _ = self.tx.send(value);
    }

    pub fn cancel(&self) {
        self.worker.abort();
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Leading-edge throttler with a trailing call. The first call executes
/// immediately; calls arriving during the `limit` cooldown are coalesced into
/// exactly one trailing execution with the latest value, which restarts the
/// cooldown. A quiet cooldown ends back at idle.
pub struct Throttler<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Throttler<T> {
    pub fn new<F>(limit: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let worker = tokio::spawn(async move {
            'idle: while let Some(value) = rx.recv().await {
                callback(value);
                loop {
                    let deadline = Instant::now() + limit;
                    let mut pending = None;
                    loop {
                        tokio::select! {
                            _ = sleep_until(deadline) => break,
                            next = rx.recv() => match next {
                                Some(value) => pending = Some(value),
                                None => {
                                    if let Some(value) = pending {
                                        callback(value);
                                    }
                                    return;
                                }
                            },
                        }
                    }
                    match pending {
                        Some(value) => callback(value),
                        None => continue 'idle,
                    }
                }
            }
        });
        Self { tx, worker }
    }

    pub fn call(&self, value: T) {
        let _ = self.tx.send(value);
    }

    pub fn cancel(&self) {
        self.worker.abort();
    }
}

impl<T> Drop for Throttler<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
