use crate::record::{FilterOption, Record};

/// Failure reported by a [`RecordSource`]. The engine only distinguishes
/// success from failure; the text is what gets announced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("az command failed: {0}")]
    Command(String),

    #[error("failed to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("missing required configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn parse(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            what,
            reason: err.to_string(),
        }
    }
}

/// Supplies records and their detail payloads for one domain.
///
/// Every method may block on I/O and is only called from background tasks.
pub trait RecordSource<R: Record>: Send + Sync {
    fn list(&self, filter: &str) -> Result<Vec<R>, SourceError>;

    fn fetch_detail(&self, id: &R::Id) -> Result<R::Detail, SourceError>;

    fn filter_options(&self) -> Result<Vec<FilterOption>, SourceError>;

    /// Filter key used when the page first opens.
    fn initial_filter(&self) -> String;
}
