use super::detail::{DetailLoader, DetailView};
use super::fetch::{Continuity, FetchCoordinator};
use super::search::SearchState;
use super::signal::{AnnounceDuration, Announcement, ViewSignal};
use super::BgEvent;
use crate::extensions::{ActionDispatcher, ActionOutcome, ExtensionDescriptor, Indicator};
use lazyaz_core::{FilterOption, Record, RecordSource, SourceError};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Where the list is in its fetch lifecycle.
///
/// `Idle` only exists before the first request; an accepted request moves
/// straight to `Fetching`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Fetching,
    Populated,
    Empty,
    Error(String),
}

/// Per-page state. Mutated only by [`BrowserController`].
#[derive(Debug, Clone)]
pub struct ViewState<R: Record> {
    pub records: Vec<R>,
    /// Filter most recently requested by the user.
    pub filter: String,
    /// Filter the current `records` were fetched with.
    pub records_filter: Option<String>,
    pub selected_index: usize,
    pub details_visible: bool,
    pub details_expanded: bool,
    pub phase: FetchPhase,
}

impl<R: Record> ViewState<R> {
    fn new(filter: String) -> Self {
        Self {
            records: Vec::new(),
            filter,
            records_filter: None,
            selected_index: 0,
            details_visible: false,
            details_expanded: false,
            phase: FetchPhase::Idle,
        }
    }

    fn clamp(&self, index: isize) -> usize {
        if self.records.is_empty() || index <= 0 {
            return 0;
        }
        index.unsigned_abs().min(self.records.len() - 1)
    }
}

/// Owns one page: list, selection, filter, search, detail panel and
/// extension indicators.
pub struct BrowserController<R: Record> {
    source: Arc<dyn RecordSource<R>>,
    runtime: Handle,
    tx: Sender<BgEvent<R>>,
    rx: Receiver<BgEvent<R>>,
    fetcher: FetchCoordinator<R>,
    details: DetailLoader<R>,
    state: ViewState<R>,
    search: SearchState,
    filter_options: Vec<FilterOption>,
    indicators: HashMap<String, Indicator>,
    signals: Vec<ViewSignal>,
}

impl<R: Record> BrowserController<R> {
    pub fn new(source: Arc<dyn RecordSource<R>>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        let filter = source.initial_filter();
        Self {
            fetcher: FetchCoordinator::new(Arc::clone(&source), runtime.clone(), tx.clone()),
            details: DetailLoader::new(Arc::clone(&source), runtime.clone(), tx.clone()),
            source,
            runtime,
            tx,
            rx,
            state: ViewState::new(filter),
            search: SearchState::default(),
            filter_options: Vec::new(),
            indicators: HashMap::new(),
            signals: Vec::new(),
        }
    }

    /// Load filter options and the first page of records.
    pub fn start(&mut self) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.runtime.spawn_blocking(move || {
            let _ = tx.send(BgEvent::FiltersLoaded(source.filter_options()));
        });
        let filter = self.state.filter.clone();
        self.request_fetch(&filter, Continuity::Reset);
    }

    fn request_fetch(&mut self, filter: &str, continuity: Continuity) -> bool {
        let accepted = self.fetcher.request_fetch(filter, continuity);
        if accepted {
            self.state.phase = FetchPhase::Fetching;
            self.signals.push(ViewSignal::RedrawTable);
        }
        accepted
    }

    /// Switch filters. Same filter is a no-op. While a fetch is in flight
    /// the new request is dropped and the list keeps the earlier result.
    pub fn set_filter(&mut self, filter: &str) {
        if filter == self.state.filter {
            return;
        }
        tracing::debug!(domain = %R::DOMAIN, filter, "filter changed");
        self.state.filter = filter.to_string();
        self.search.clear();
        self.state.selected_index = 0;
        self.state.details_visible = false;
        self.state.details_expanded = false;
        self.signals.push(ViewSignal::RedrawDetail);
        self.request_fetch(filter, Continuity::Reset);
    }

    /// Refetch the current filter, keeping the selection where possible.
    pub fn refresh(&mut self) -> bool {
        let filter = self.state.filter.clone();
        let accepted = self.request_fetch(&filter, Continuity::Preserve);
        if accepted {
            self.announce(
                Announcement::info(format!(
                    "⏳ Refreshing {}...",
                    R::DOMAIN.title().to_lowercase()
                ))
                .with_duration(AnnounceDuration::Sticky),
            );
        }
        accepted
    }

    pub fn select_index(&mut self, index: isize) {
        let clamped = self.state.clamp(index);
        if clamped == self.state.selected_index {
            return;
        }
        self.state.selected_index = clamped;
        self.signals.push(ViewSignal::RedrawTable);
        if self.state.details_visible {
            self.load_selected_detail();
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let current = isize::try_from(self.state.selected_index).unwrap_or(isize::MAX);
        self.select_index(current.saturating_add(delta));
    }

    pub fn select_last(&mut self) {
        self.select_index(isize::MAX);
    }

    pub fn toggle_details(&mut self) {
        self.state.details_visible = !self.state.details_visible;
        if self.state.details_visible {
            self.load_selected_detail();
        } else {
            self.state.details_expanded = false;
        }
        self.signals.push(ViewSignal::RedrawDetail);
    }

    /// Layout hint for the renderer; ignored while details are hidden.
    pub fn toggle_expanded(&mut self) {
        if !self.state.details_visible {
            return;
        }
        self.state.details_expanded = !self.state.details_expanded;
        self.signals.push(ViewSignal::RedrawDetail);
    }

    pub fn close_details(&mut self) {
        if self.state.details_visible {
            self.toggle_details();
        }
    }

    fn load_selected_detail(&mut self) {
        if let Some(record) = self.state.records.get(self.state.selected_index) {
            self.details.ensure_detail(record);
            self.signals.push(ViewSignal::RedrawDetail);
        }
    }

    pub fn submit_search(&mut self, query: &str) {
        self.search.submit(query, &self.state.records);
        self.highlight_current();
    }

    /// Step to the next match of the last query.
    pub fn repeat_search(&mut self) {
        if !self.search.is_active() {
            return;
        }
        let query = self.search.query().to_string();
        self.submit_search(&query);
    }

    fn highlight_current(&mut self) {
        if !self.search.is_active() {
            return;
        }
        if let Some((row, col)) = self.search.current_match() {
            self.select_index(isize::try_from(row).unwrap_or(isize::MAX));
            self.signals.push(ViewSignal::Highlight { row, col });
        }
        self.announce(Announcement::info(self.search.status()));
    }

    /// Run an extension against the selected record on a worker thread.
    /// Returns false when nothing was started.
    pub fn invoke_extension(&mut self, descriptor: &ExtensionDescriptor) -> bool {
        if !descriptor.applies_to(R::DOMAIN) {
            tracing::warn!(extension = %descriptor.id, domain = %R::DOMAIN, "extension does not apply here");
            return false;
        }
        let Some(record) = self.selected_record() else {
            self.announce(Announcement::info("No record selected"));
            return false;
        };
        if self.indicators.get(&descriptor.id) == Some(&Indicator::Running) {
            return false;
        }

        let subject = record.subject(self.details.cached(&record.id()));
        self.indicators.insert(descriptor.id.clone(), Indicator::Running);
        self.signals.push(ViewSignal::RedrawDetail);

        let descriptor = descriptor.clone();
        let tx = self.tx.clone();
        self.runtime.spawn_blocking(move || {
            let outcome = ActionDispatcher::invoke(&descriptor, &subject);
            let _ = tx.send(BgEvent::ActionFinished(outcome));
        });
        true
    }

    /// Apply every completed background result. Returns true when anything
    /// was applied.
    pub fn pump(&mut self) -> bool {
        let mut applied = false;
        while let Ok(event) = self.rx.try_recv() {
            applied = true;
            match event {
                BgEvent::ListLoaded {
                    filter,
                    result,
                    continuity,
                    permit,
                } => {
                    self.on_fetch_complete(filter, result, continuity);
                    drop(permit);
                }
                BgEvent::DetailLoaded { id, result } => self.on_detail_complete(id, result),
                BgEvent::FiltersLoaded(result) => self.on_filters_loaded(result),
                BgEvent::ActionFinished(outcome) => self.on_action_finished(outcome),
            }
        }
        applied
    }

    fn on_fetch_complete(
        &mut self,
        filter: String,
        result: Result<Vec<R>, SourceError>,
        continuity: Continuity,
    ) {
        let records = match result {
            Ok(records) => records,
            Err(err) => {
                self.state.phase = FetchPhase::Error(err.to_string());
                self.announce(Announcement::error(format!(
                    "Failed to load {}: {err}",
                    R::DOMAIN.title()
                )));
                self.signals.push(ViewSignal::RedrawTable);
                return;
            }
        };

        tracing::debug!(domain = %R::DOMAIN, filter = %filter, count = records.len(), "records loaded");
        let previous = self.state.selected_index;
        self.state.records = records;
        self.state.records_filter = Some(filter);
        self.state.selected_index = match continuity {
            Continuity::Reset => 0,
            Continuity::Preserve => self.state.clamp(isize::try_from(previous).unwrap_or(isize::MAX)),
        };
        match continuity {
            Continuity::Reset => self.search.clear(),
            Continuity::Preserve => {
                self.search.refresh(&self.state.records);
                self.announce(
                    Announcement::success("✅ Refresh done")
                        .with_duration(AnnounceDuration::Seconds(3)),
                );
            }
        }

        if self.state.records.is_empty() {
            self.state.phase = FetchPhase::Empty;
        } else {
            self.state.phase = FetchPhase::Populated;
            if self.state.details_visible {
                self.load_selected_detail();
            }
        }
        self.signals.push(ViewSignal::RedrawTable);
        self.signals.push(ViewSignal::RedrawDetail);
    }

    fn on_detail_complete(&mut self, id: R::Id, result: Result<R::Detail, SourceError>) {
        let selected = self.selected_record().map(|record| record.id());
        if self.details.complete(id, result, selected.as_ref()) {
            self.signals.push(ViewSignal::RedrawDetail);
        }
    }

    fn on_filters_loaded(&mut self, result: Result<Vec<FilterOption>, SourceError>) {
        match result {
            Ok(options) => self.filter_options = options,
            Err(err) => {
                tracing::warn!(domain = %R::DOMAIN, error = %err, "failed to load filter options");
                self.announce(Announcement::error(format!(
                    "Failed to load {} filters: {err}",
                    R::DOMAIN.title()
                )));
            }
        }
    }

    fn on_action_finished(&mut self, outcome: ActionOutcome) {
        self.indicators
            .insert(outcome.extension_id.clone(), outcome.indicator());
        self.announce(outcome.announcement());
        self.signals.push(ViewSignal::RedrawDetail);
    }

    fn announce(&mut self, announcement: Announcement) {
        self.signals.push(ViewSignal::Announce(announcement));
    }

    pub fn take_signals(&mut self) -> Vec<ViewSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn state(&self) -> &ViewState<R> {
        &self.state
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn filter_options(&self) -> &[FilterOption] {
        &self.filter_options
    }

    pub fn selected_record(&self) -> Option<&R> {
        self.state.records.get(self.state.selected_index)
    }

    /// Detail panel contents for the selected record.
    pub fn detail_view(&self) -> DetailView<'_, R::Detail> {
        match self.selected_record() {
            Some(record) if self.state.details_visible => self.details.view(&record.id()),
            _ => DetailView::Hidden,
        }
    }

    pub fn cached_detail(&self, id: &R::Id) -> Option<&R::Detail> {
        self.details.cached(id)
    }

    pub fn indicator(&self, extension_id: &str) -> Option<Indicator> {
        self.indicators.get(extension_id).copied()
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetcher.in_flight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyaz_core::testing::{ScriptedSource, Ticket, tickets};
    use std::time::{Duration, Instant};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn pump_until(
        controller: &mut BrowserController<Ticket>,
        done: impl Fn(&BrowserController<Ticket>) -> bool,
    ) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(controller) {
            assert!(Instant::now() < deadline, "timed out waiting for controller");
            controller.pump();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn select_index_always_clamps() {
        let rt = runtime();
        let source = Arc::new(ScriptedSource::<Ticket>::new());
        source.set_list("all", tickets(&["A", "B", "C"]));
        let mut controller = BrowserController::<Ticket>::new(source.clone(), rt.handle().clone());

        controller.select_index(2);
        assert_eq!(controller.state().selected_index, 0, "empty list pins to 0");

        controller.start();
        pump_until(&mut controller, |c| c.state().phase == FetchPhase::Populated);
        for (requested, expected) in [(-5, 0), (1, 1), (3, 2), (isize::MAX, 2), (isize::MIN, 0)] {
            controller.select_index(requested);
            assert_eq!(controller.state().selected_index, expected, "index {requested}");
        }
    }

    #[test]
    fn same_filter_is_a_no_op() {
        let rt = runtime();
        let source = Arc::new(ScriptedSource::<Ticket>::new());
        let mut controller = BrowserController::<Ticket>::new(source.clone(), rt.handle().clone());
        controller.start();
        assert!(source.wait_for_finished_lists(1));
        pump_until(&mut controller, |c| c.state().phase == FetchPhase::Empty);

        controller.set_filter("all");
        assert_eq!(controller.state().phase, FetchPhase::Empty);
        assert_eq!(source.list_calls(), vec!["all".to_string()]);
    }

    #[test]
    fn fetch_error_keeps_previous_records() {
        let rt = runtime();
        let source = Arc::new(ScriptedSource::<Ticket>::new());
        source.set_list("all", tickets(&["A", "B"]));
        let mut controller = BrowserController::<Ticket>::new(source.clone(), rt.handle().clone());
        controller.start();
        pump_until(&mut controller, |c| c.state().phase == FetchPhase::Populated);

        source.fail_list("all", "boom");
        assert!(controller.refresh());
        pump_until(&mut controller, |c| matches!(c.state().phase, FetchPhase::Error(_)));
        assert_eq!(controller.state().records.len(), 2);
        assert!(controller.take_signals().iter().any(|s| matches!(
            s,
            ViewSignal::Announce(a) if a.message.contains("boom")
        )));
    }

    #[test]
    fn toggle_expanded_requires_visible_details() {
        let rt = runtime();
        let source = Arc::new(ScriptedSource::<Ticket>::new());
        let mut controller = BrowserController::<Ticket>::new(source, rt.handle().clone());
        controller.toggle_expanded();
        assert!(!controller.state().details_expanded);
        controller.toggle_details();
        controller.toggle_expanded();
        assert!(controller.state().details_expanded);
        controller.close_details();
        assert!(!controller.state().details_visible);
        assert!(!controller.state().details_expanded);
    }
}
