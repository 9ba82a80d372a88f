use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::loader::{self, LoadError, Source};
use super::model::Dataset;

/// Result of one finished load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub source: Source,
    pub result: Result<Dataset, LoadError>,
}

/// Runs loads on background threads.
///
/// Every request is numbered. Only the outcome of the most recently issued
/// request is handed back by [`LoadWorker::poll`]; outcomes of superseded
/// requests are dropped when they arrive.
pub struct LoadWorker {
    tx: Sender<(u64, LoadOutcome)>,
    rx: Receiver<(u64, LoadOutcome)>,
    latest: u64,
    awaiting: bool,
}

impl Default for LoadWorker {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            latest: 0,
            awaiting: false,
        }
    }
}

impl LoadWorker {
    /// Start loading `source`. `notify` runs on the worker thread once the
    /// outcome has been queued (used to wake the UI).
    pub fn request<F>(&mut self, source: Source, notify: F) -> u64
    where
        F: FnOnce() + Send + 'static,
    {
        self.request_with(source, loader::load, notify)
    }

    /// Like [`LoadWorker::request`] with an explicit load function. A panic
    /// inside `load` is reported as [`LoadError::Worker`].
    fn request_with<L, F>(&mut self, source: Source, load: L, notify: F) -> u64
    where
        L: FnOnce(&Source) -> Result<Dataset, LoadError> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        self.latest += 1;
        self.awaiting = true;
        let generation = self.latest;
        let tx = self.tx.clone();
        let fallback_source = source.clone();

        log::info!("Loading {source} (request #{generation})");
        let spawned = thread::Builder::new()
            .name(format!("sheet-load-{generation}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| load(&source)))
                    .unwrap_or_else(|_| {
                        log::error!("Load of {source} panicked");
                        Err(LoadError::Worker)
                    });
                // The receiver lives as long as the worker; a send error only
                // means the app is shutting down.
                let _ = tx.send((generation, LoadOutcome { source, result }));
                notify();
            });

        if let Err(e) = spawned {
            log::error!("Failed to start load thread: {e}");
            let _ = self.tx.send((
                generation,
                LoadOutcome {
                    source: fallback_source,
                    result: Err(LoadError::Worker),
                },
            ));
        }
        generation
    }

    /// Whether the latest request has not reported back yet.
    pub fn is_loading(&self) -> bool {
        self.awaiting
    }

    /// Drain finished loads and return the outcome of the latest request, if
    /// it has arrived.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let mut accepted = None;
        while let Ok((generation, outcome)) = self.rx.try_recv() {
            if generation == self.latest {
                self.awaiting = false;
                accepted = Some(outcome);
            } else {
                log::warn!(
                    "Discarding stale load of {} (request #{generation}, latest #{})",
                    outcome.source,
                    self.latest
                );
            }
        }
        accepted
    }
}
