//! In-memory queue of ready-to-issue short codes.

use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::{BatchLoader, PoolError};

#[derive(Default)]
struct PoolState {
    queue: VecDeque<String>,
    loading: bool,
}

struct PoolInner {
    state: Mutex<PoolState>,
    loader: Arc<dyn BatchLoader>,
    threshold: usize,
    batch_size: usize,
}

/// Issues each pre-generated code exactly once and refills itself in the
/// background.
///
/// Codes leave the queue in the order they were loaded. When a withdrawal
/// leaves fewer than `threshold` codes queued and no refill is in flight, a
/// refill of `batch_size` codes is started on Tokio's blocking thread pool.
/// Withdrawals never wait for it: while the queue is empty they fail with
/// [`PoolError::Empty`], which callers should treat as retryable.
///
/// Cloning is cheap and every clone shares the same queue.
#[derive(Clone)]
pub struct CodePool {
    inner: Arc<PoolInner>,
}

impl CodePool {
    pub fn new(loader: Arc<dyn BatchLoader>, threshold: usize, batch_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState::default()),
                loader,
                threshold,
                batch_size,
            }),
        }
    }

    /// Performs the initial load and waits for it to finish.
    ///
    /// Returns the number of codes added, or `0` if a refill was already in
    /// flight.
    ///
    /// # Errors
    ///
    /// Returns whatever the loader failed with, or [`PoolError::Task`] if the
    /// blocking task panicked.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn init(&self) -> Result<usize, PoolError> {
        if !self.inner.begin_refill() {
            return Ok(0);
        }

        let inner = self.inner.clone();
        let loaded = tokio::task::spawn_blocking(move || inner.run_refill())
            .await
            .map_err(|e| PoolError::Task(e.to_string()))??;

        info!(loaded, "code pool initialized");
        Ok(loaded)
    }

    /// Withdraws the next code.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Empty`] if no code is queued.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime, since it may start a
    /// background refill.
    pub fn acquire(&self) -> Result<String, PoolError> {
        let (code, remaining, refill) = {
            let mut state = self.inner.state.lock();
            let Some(code) = state.queue.pop_front() else {
                metrics::counter!("pool_empty_total").increment(1);
                return Err(PoolError::Empty);
            };

            let remaining = state.queue.len();
            let refill = remaining < self.inner.threshold && !state.loading;
            if refill {
                state.loading = true;
            }
            (code, remaining, refill)
        };

        metrics::gauge!("pool_available").set(remaining as f64);

        if refill {
            self.spawn_refill(remaining);
        }

        Ok(code)
    }

    /// Number of codes currently queued.
    pub fn count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Returns true while a refill is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().loading
    }

    pub fn threshold(&self) -> usize {
        self.inner.threshold
    }

    pub fn batch_size(&self) -> usize {
        self.inner.batch_size
    }

    fn spawn_refill(&self, remaining: usize) {
        info!(
            remaining,
            threshold = self.inner.threshold,
            "code pool below threshold, refilling"
        );

        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = inner.run_refill() {
                error!(error = %e, "background code pool refill failed");
            }
        });
    }
}

impl PoolInner {
    /// Marks a refill as in flight. Returns false if one already is.
    fn begin_refill(&self) -> bool {
        let mut state = self.state.lock();
        if state.loading {
            return false;
        }
        state.loading = true;
        true
    }

    /// Loads a batch outside the lock, then appends it and clears `loading`.
    ///
    /// Callers must have won [`Self::begin_refill`] (or set `loading` under
    /// the lock themselves).
    fn run_refill(&self) -> Result<usize, PoolError> {
        let guard = LoadingGuard { state: &self.state };
        let result = self.loader.load_batch(self.batch_size);
        mem::forget(guard);

        let mut state = self.state.lock();
        state.loading = false;

        match result {
            Ok(codes) => {
                let loaded = codes.len();
                state.queue.extend(codes);
                let available = state.queue.len();
                drop(state);

                metrics::counter!("pool_refills_total", "result" => "ok").increment(1);
                metrics::gauge!("pool_available").set(available as f64);

                if loaded == 0 {
                    warn!(available, "pool file exhausted, no codes loaded");
                }
                Ok(loaded)
            }
            Err(e) => {
                drop(state);
                metrics::counter!("pool_refills_total", "result" => "error").increment(1);
                Err(e)
            }
        }
    }
}

/// Clears `loading` if the loader unwinds, so later withdrawals can schedule
/// a new refill.
struct LoadingGuard<'a> {
    state: &'a Mutex<PoolState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().loading = false;
        metrics::counter!("pool_refills_total", "result" => "panic").increment(1);
        error!("code pool loader panicked, refill abandoned");
    }
}
