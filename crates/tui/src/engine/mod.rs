//! Record browser engine.
//!
//! One [`BrowserController`] per page owns that page's view state. Fetches,
//! detail loads and extension runs happen on blocking worker threads and
//! report back through a per-controller channel; the controller drains it in
//! [`BrowserController::pump`] on the event-loop thread, which is the only
//! place view state is mutated.

pub mod controller;
pub mod detail;
pub mod fetch;
pub mod page;
pub mod search;
pub mod signal;

pub use controller::{BrowserController, FetchPhase, ViewState};
pub use detail::{DetailLoader, DetailView};
pub use fetch::{Continuity, FetchCoordinator, FetchPermit, FetchToken};
pub use page::{BrowserPage, DetailPanel, DetailStatus, RowView};
pub use search::{MatchCoord, SearchState};
pub use signal::{AnnounceDuration, AnnounceLevel, Announcement, ViewSignal};

use crate::extensions::ActionOutcome;
use lazyaz_core::{FilterOption, Record, SourceError};

/// Completion messages from background tasks to their controller.
pub enum BgEvent<R: Record> {
    ListLoaded {
        filter: String,
        result: Result<Vec<R>, SourceError>,
        continuity: Continuity,
        permit: FetchPermit,
    },
    DetailLoaded {
        id: R::Id,
        result: Result<R::Detail, SourceError>,
    },
    FiltersLoaded(Result<Vec<FilterOption>, SourceError>),
    ActionFinished(ActionOutcome),
}
