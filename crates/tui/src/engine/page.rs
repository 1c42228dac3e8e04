use super::controller::{BrowserController, FetchPhase};
use super::detail::DetailView;
use super::search::SearchState;
use super::signal::ViewSignal;
use crate::extensions::{ExtensionDescriptor, Indicator};
use lazyaz_core::{Column, DetailField, Domain, FilterOption, Record};

/// One table row as the renderer needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub cells: Vec<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailStatus {
    Loading,
    Loaded,
    Failed(String),
}

/// Detail panel contents for the selected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub title: String,
    pub status: DetailStatus,
    pub fields: Vec<DetailField>,
}

/// Object-safe view of a controller so the shell can hold pages of
/// different record kinds side by side.
pub trait BrowserPage {
    fn domain(&self) -> Domain;
    fn start(&mut self);
    fn pump(&mut self) -> bool;
    fn take_signals(&mut self) -> Vec<ViewSignal>;

    fn set_filter(&mut self, filter: &str);
    fn refresh(&mut self) -> bool;
    fn select_index(&mut self, index: isize);
    fn move_selection(&mut self, delta: isize);
    fn select_last(&mut self);
    fn toggle_details(&mut self);
    fn toggle_expanded(&mut self);
    fn close_details(&mut self);
    fn submit_search(&mut self, query: &str);
    fn repeat_search(&mut self);
    fn invoke_extension(&mut self, descriptor: &ExtensionDescriptor) -> bool;

    fn columns(&self) -> &'static [Column];
    fn rows(&self) -> Vec<RowView>;
    fn selected_index(&self) -> usize;
    fn phase(&self) -> &FetchPhase;
    fn filter(&self) -> &str;
    fn records_filter(&self) -> Option<&str>;
    fn filter_options(&self) -> &[FilterOption];
    fn details_visible(&self) -> bool;
    fn details_expanded(&self) -> bool;
    fn detail_panel(&self) -> Option<DetailPanel>;
    fn search(&self) -> &SearchState;
    fn indicator(&self, extension_id: &str) -> Option<Indicator>;
}

impl<R: Record> BrowserPage for BrowserController<R> {
    fn domain(&self) -> Domain {
        R::DOMAIN
    }

    fn start(&mut self) {
        BrowserController::start(self);
    }

    fn pump(&mut self) -> bool {
        BrowserController::pump(self)
    }

    fn take_signals(&mut self) -> Vec<ViewSignal> {
        BrowserController::take_signals(self)
    }

    fn set_filter(&mut self, filter: &str) {
        BrowserController::set_filter(self, filter);
    }

    fn refresh(&mut self) -> bool {
        BrowserController::refresh(self)
    }

    fn select_index(&mut self, index: isize) {
        BrowserController::select_index(self, index);
    }

    fn move_selection(&mut self, delta: isize) {
        BrowserController::move_selection(self, delta);
    }

    fn select_last(&mut self) {
        BrowserController::select_last(self);
    }

    fn toggle_details(&mut self) {
        BrowserController::toggle_details(self);
    }

    fn toggle_expanded(&mut self) {
        BrowserController::toggle_expanded(self);
    }

    fn close_details(&mut self) {
        BrowserController::close_details(self);
    }

    fn submit_search(&mut self, query: &str) {
        BrowserController::submit_search(self, query);
    }

    fn repeat_search(&mut self) {
        BrowserController::repeat_search(self);
    }

    fn invoke_extension(&mut self, descriptor: &ExtensionDescriptor) -> bool {
        BrowserController::invoke_extension(self, descriptor)
    }

    fn columns(&self) -> &'static [Column] {
        R::columns()
    }

    fn rows(&self) -> Vec<RowView> {
        self.state()
            .records
            .iter()
            .map(|record| RowView {
                cells: record.cells(),
                owner: record.owner().map(str::to_string),
            })
            .collect()
    }

    fn selected_index(&self) -> usize {
        self.state().selected_index
    }

    fn phase(&self) -> &FetchPhase {
        &self.state().phase
    }

    fn filter(&self) -> &str {
        &self.state().filter
    }

    fn records_filter(&self) -> Option<&str> {
        self.state().records_filter.as_deref()
    }

    fn filter_options(&self) -> &[FilterOption] {
        BrowserController::filter_options(self)
    }

    fn details_visible(&self) -> bool {
        self.state().details_visible
    }

    fn details_expanded(&self) -> bool {
        self.state().details_expanded
    }

    fn detail_panel(&self) -> Option<DetailPanel> {
        let record = self.selected_record()?;
        let (status, detail) = match self.detail_view() {
            DetailView::Hidden => return None,
            DetailView::Placeholder => (DetailStatus::Loading, None),
            DetailView::Loaded(detail) => (DetailStatus::Loaded, Some(detail)),
            DetailView::Failed(reason) => (DetailStatus::Failed(reason.to_string()), None),
        };
        Some(DetailPanel {
            title: format!("{} {}", record.id(), record.title()),
            status,
            fields: record.detail_fields(detail),
        })
    }

    fn search(&self) -> &SearchState {
        BrowserController::search(self)
    }

    fn indicator(&self, extension_id: &str) -> Option<Indicator> {
        BrowserController::indicator(self, extension_id)
    }
}
