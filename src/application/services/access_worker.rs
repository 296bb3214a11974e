//! Background application of access counter increments.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

use crate::application::services::LayeredResolver;
use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::MappingRepository;

const RETRY_BASE_MILLIS: u64 = 2;
const RETRY_FACTOR: u64 = 5;
const RETRY_ATTEMPTS: usize = 3;

/// Non-blocking handle for queueing access events.
///
/// Cloning is cheap; every clone feeds the same worker.
#[derive(Clone)]
pub struct AccessRecorder {
    tx: mpsc::Sender<AccessEvent>,
}

impl AccessRecorder {
    pub fn new(tx: mpsc::Sender<AccessEvent>) -> Self {
        Self { tx }
    }

    /// Queues one access of `short_code` without waiting.
    ///
    /// Returns false if the event was dropped because the queue is full or
    /// the worker has stopped.
    pub fn record(&self, short_code: &str) -> bool {
        match self.tx.try_send(AccessEvent::new(short_code)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(ev)) => {
                metrics::counter!("access_events_dropped_total").increment(1);
                warn!(short_code = %ev.short_code, "access queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                metrics::counter!("access_events_dropped_total").increment(1);
                error!(short_code = %ev.short_code, "access worker stopped, dropping event");
                false
            }
        }
    }

    /// Returns true once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Number of events that can still be queued.
    pub fn remaining_capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Applies queued access events until every [`AccessRecorder`] is dropped.
///
/// Each increment is retried with jittered exponential backoff. A final
/// failure is logged and counted, and the worker moves on.
pub async fn run_access_worker<R>(
    mut rx: mpsc::Receiver<AccessEvent>,
    resolver: Arc<LayeredResolver<R>>,
) where
    R: MappingRepository + ?Sized,
{
    info!("access worker started");

    while let Some(ev) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(RETRY_BASE_MILLIS)
            .factor(RETRY_FACTOR)
            .map(jitter)
            .take(RETRY_ATTEMPTS);

        let result = Retry::start(strategy, || resolver.increment_access(&ev.short_code)).await;

        if let Err(e) = result {
            metrics::counter!("access_increments_failed_total").increment(1);
            error!(
                short_code = %ev.short_code,
                error = %e,
                "failed to record access after retries"
            );
        }
    }

    info!("access worker stopped");
}
