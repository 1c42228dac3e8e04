pub mod domain;
pub mod pipeline;
pub mod pullrequest;
pub mod record;
pub mod source;
pub mod text;
pub mod user;
pub mod workitem;

pub use domain::Domain;
pub use pipeline::{PipelineDefinition, PipelineRun, PipelineRunDetail};
pub use pullrequest::{PullRequest, PullRequestDetail, VoteInfo};
pub use record::{ActionSubject, Column, DetailField, FilterOption, Record};
pub use source::{RecordSource, SourceError};
pub use user::UserProfile;
pub use workitem::{WorkItem, WorkItemDetail};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
