use super::BgEvent;
use lazyaz_core::{Record, RecordSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Whether a completed list fetch keeps the selection where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// Filter-driven fetch: selection goes back to the first row.
    Reset,
    /// Manual refresh: keep the selected index, clamped to the new rows.
    Preserve,
}

/// Single-slot ownership of the one list fetch allowed per view.
#[derive(Debug, Clone, Default)]
pub struct FetchToken {
    held: Arc<AtomicBool>,
}

impl FetchToken {
    /// Non-blocking. `None` when another fetch already holds the token.
    pub fn try_acquire(&self) -> Option<FetchPermit> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchPermit {
                held: Arc::clone(&self.held),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Releases the token when dropped.
#[must_use = "the token is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct FetchPermit {
    held: Arc<AtomicBool>,
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

/// Runs `RecordSource::list` on a blocking worker, at most one at a time.
pub struct FetchCoordinator<R: Record> {
    source: Arc<dyn RecordSource<R>>,
    token: FetchToken,
    runtime: Handle,
    tx: Sender<BgEvent<R>>,
}

impl<R: Record> FetchCoordinator<R> {
    pub(crate) fn new(source: Arc<dyn RecordSource<R>>, runtime: Handle, tx: Sender<BgEvent<R>>) -> Self {
        Self {
            source,
            token: FetchToken::default(),
            runtime,
            tx,
        }
    }

    /// Returns false when the request was dropped because a fetch is
    /// already in flight. Dropped requests are not queued. The permit
    /// travels with the result and is released once the controller has
    /// applied it.
    pub fn request_fetch(&self, filter: &str, continuity: Continuity) -> bool {
        let Some(permit) = self.token.try_acquire() else {
            tracing::debug!(domain = %R::DOMAIN, filter, "fetch already in flight; request dropped");
            return false;
        };

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let filter = filter.to_string();
        tracing::debug!(domain = %R::DOMAIN, filter = %filter, "fetching records");
        self.runtime.spawn_blocking(move || {
            let result = source.list(&filter);
            if let Err(err) = &result {
                tracing::warn!(domain = %R::DOMAIN, filter = %filter, error = %err, "record fetch failed");
            }
            let _ = tx.send(BgEvent::ListLoaded {
                filter,
                result,
                continuity,
                permit,
            });
        });
        true
    }

    pub fn in_flight(&self) -> bool {
        self.token.is_held()
    }
}
