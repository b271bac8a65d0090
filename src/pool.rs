//! Bounded fan-out over page numbers.
//!
//! Page numbers `1..=N` are pushed into a bounded channel sized to hold all of
//! them, then drained by at most `min(workers, N)` tokio tasks. Each task runs
//! the injected per-page operation; the first failure is kept and returned
//! once every task has exited. Later failures are logged and dropped, and no
//! failure stops the remaining pages from being attempted.

use crate::error::{RipperError, RipperResult};
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// One-based page identifier
pub type PageNumber = u32;

/// Sizing for a single fan-out run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of pages to distribute
    pub total_units: PageNumber,
    /// Requested worker count (clamped to `total_units`)
    pub worker_count: usize,
}

impl PoolConfig {
    #[must_use]
    pub fn new(total_units: PageNumber, worker_count: usize) -> Self {
        Self {
            total_units,
            worker_count,
        }
    }

    /// Number of workers that will actually be spawned
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        let total = usize::try_from(self.total_units).unwrap_or(usize::MAX);
        self.worker_count.max(1).min(total)
    }
}

/// Set-once slot for the first failure of a run
#[derive(Debug, Default)]
pub struct FirstError {
    slot: OnceLock<RipperError>,
}

impl FirstError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` if nothing was recorded yet; returns whether it was kept
    ///
    /// Every offered failure is logged here, exactly once.
    pub fn record(&self, err: RipperError) -> bool {
        match self.slot.set(err) {
            Ok(()) => {
                if let Some(kept) = self.slot.get() {
                    error!("{kept}");
                }
                true
            }
            Err(dropped) => {
                warn!("Additional failure not reported: {dropped}");
                false
            }
        }
    }

    /// Consume the slot, turning a recorded failure into `Err`
    ///
    /// # Errors
    ///
    /// Returns the recorded failure, if any
    pub fn into_result(self) -> RipperResult<()> {
        match self.slot.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Run `operation` once for every page in `1..=config.total_units`
///
/// # Errors
///
/// Returns the first `RipperError::PageExtraction` recorded by any worker. A
/// panicking operation is reported as a failure of its page.
pub async fn run_pool<F, Fut>(config: PoolConfig, operation: F) -> RipperResult<()>
where
    F: Fn(PageNumber) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RipperResult<()>> + Send + 'static,
{
    if config.total_units == 0 {
        debug!("No pages to process, skipping worker launch");
        return Ok(());
    }

    let workers = config.effective_workers();
    info!(
        "Distributing {} pages across {} workers",
        config.total_units, workers
    );

    let capacity = usize::try_from(config.total_units)
        .map_err(|e| RipperError::InvalidConfig(format!("Page count too large: {e}")))?;
    let (sender, receiver) = mpsc::channel::<PageNumber>(capacity);
    let receiver = Arc::new(Mutex::new(receiver));
    let outcome = Arc::new(FirstError::new());
    let operation = Arc::new(operation);

    let mut tasks = JoinSet::new();
    for worker_id in 0..workers {
        tasks.spawn(worker_loop(
            worker_id,
            Arc::clone(&receiver),
            Arc::clone(&operation),
            Arc::clone(&outcome),
        ));
    }

    for page in 1..=config.total_units {
        if sender.send(page).await.is_err() {
            // Every receiver is gone, which only happens if all workers died
            error!("Work queue closed before page {page} could be enqueued");
            break;
        }
    }
    drop(sender);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            outcome.record(RipperError::Worker(format!("worker task failed: {e}")));
        }
    }

    match Arc::try_unwrap(outcome) {
        Ok(outcome) => outcome.into_result(),
        Err(_) => Err(RipperError::Worker(
            "outcome still shared after all workers exited".to_string(),
        )),
    }
}

async fn worker_loop<F, Fut>(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<PageNumber>>>,
    operation: Arc<F>,
    outcome: Arc<FirstError>,
) where
    F: Fn(PageNumber) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RipperResult<()>> + Send + 'static,
{
    let mut handled = 0usize;

    loop {
        // Lock is released before the operation runs
        let next = receiver.lock().await.recv().await;
        let Some(page) = next else {
            break;
        };

        handled += 1;
        // A panicking operation only fails its own page, the worker keeps draining
        let source = match tokio::spawn((*operation)(page)).await {
            Ok(Ok(())) => continue,
            Ok(Err(source)) => source,
            Err(join) => RipperError::Worker(format!("worker {worker_id}: {join}")),
        };
        outcome.record(RipperError::PageExtraction {
            page,
            source: Box::new(source),
        });
    }

    debug!("Worker {worker_id} exiting after {handled} pages");
}
