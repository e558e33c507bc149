use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Collapses bursts of calls into one callback invocation carrying the last
/// argument, fired once `delay` passes without a new call.
///
/// A single worker task owns the pending argument and its timer. Dropping the
/// debouncer or calling [`Debouncer::cancel`] stops the worker and discards
/// whatever is pending. Must be created inside a tokio runtime.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_worker(delay, rx, cancel.clone(), callback));
        Self {
            tx,
            cancel,
            worker,
        }
    }

    pub fn call(&self, value: T) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.tx.send(value);
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_worker<T, F>(
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<T>,
    cancel: CancellationToken,
    mut callback: F,
) where
    F: FnMut(T),
{
    loop {
        let mut pending = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            next = rx.recv() => match next {
                Some(value) => value,
                None => return,
            },
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                next = rx.recv() => match next {
                    Some(value) => pending = value,
                    None => return,
                },
                _ = tokio::time::sleep(delay) => {
                    callback(pending);
                    break;
                }
            }
        }
    }
}
