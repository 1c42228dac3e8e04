use super::BgEvent;
use lazyaz_core::{Record, RecordSource, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;

/// What the detail panel should show for the selected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailView<'a, D> {
    Hidden,
    /// Fetch pending; list fields render with loading placeholders.
    Placeholder,
    Loaded(&'a D),
    Failed(&'a str),
}

/// Lazily fetches detail payloads and caches them for the life of the view.
///
/// Results are applied only when their record is still selected at
/// completion time; anything else is dropped.
pub struct DetailLoader<R: Record> {
    source: Arc<dyn RecordSource<R>>,
    runtime: Handle,
    tx: Sender<BgEvent<R>>,
    cache: HashMap<R::Id, R::Detail>,
    failures: HashMap<R::Id, String>,
    in_flight: HashSet<R::Id>,
}

impl<R: Record> DetailLoader<R> {
    pub(crate) fn new(source: Arc<dyn RecordSource<R>>, runtime: Handle, tx: Sender<BgEvent<R>>) -> Self {
        Self {
            source,
            runtime,
            tx,
            cache: HashMap::new(),
            failures: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Returns true when the detail is already cached. Otherwise starts a
    /// fetch (unless one for the same id is outstanding) and returns false.
    pub fn ensure_detail(&mut self, record: &R) -> bool {
        let id = record.id();
        if self.cache.contains_key(&id) {
            return true;
        }

        self.failures.remove(&id);
        if !self.in_flight.insert(id.clone()) {
            return false;
        }

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tracing::debug!(domain = %R::DOMAIN, id = %id, "fetching detail");
        self.runtime.spawn_blocking(move || {
            let result = source.fetch_detail(&id);
            let _ = tx.send(BgEvent::DetailLoaded { id, result });
        });
        false
    }

    /// Apply a finished fetch. Returns true when the result was kept.
    pub fn complete(
        &mut self,
        id: R::Id,
        result: Result<R::Detail, SourceError>,
        selected: Option<&R::Id>,
    ) -> bool {
        self.in_flight.remove(&id);
        if selected != Some(&id) {
            tracing::debug!(domain = %R::DOMAIN, id = %id, "discarding detail for deselected record");
            return false;
        }

        match result {
            Ok(detail) => {
                self.cache.insert(id, detail);
            }
            Err(err) => {
                tracing::warn!(domain = %R::DOMAIN, id = %id, error = %err, "detail fetch failed");
                self.failures.insert(id, err.to_string());
            }
        }
        true
    }

    pub fn cached(&self, id: &R::Id) -> Option<&R::Detail> {
        self.cache.get(id)
    }

    pub fn view(&self, id: &R::Id) -> DetailView<'_, R::Detail> {
        if let Some(detail) = self.cache.get(id) {
            return DetailView::Loaded(detail);
        }
        match self.failures.get(id) {
            Some(reason) => DetailView::Failed(reason),
            None => DetailView::Placeholder,
        }
    }
}
