use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of record domains the browser knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    WorkItems,
    PullRequests,
    Pipelines,
}

impl Domain {
    /// Page order, left to right.
    pub const ALL: [Domain; 3] = [Domain::WorkItems, Domain::PullRequests, Domain::Pipelines];

    pub fn tag(self) -> &'static str {
        match self {
            Self::WorkItems => "workitems",
            Self::PullRequests => "pullrequests",
            Self::Pipelines => "pipelines",
        }
    }

    /// Parse a domain tag. Only the exact lowercase tags are accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "workitems" => Some(Self::WorkItems),
            "pullrequests" => Some(Self::PullRequests),
            "pipelines" => Some(Self::Pipelines),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::WorkItems => "Work Items",
            Self::PullRequests => "Pull Requests",
            Self::Pipelines => "Pipelines",
        }
    }

    /// Base file name used when looking up export templates.
    pub fn template_name(self) -> &'static str {
        match self {
            Self::WorkItems => "workitem",
            Self::PullRequests => "pullrequest",
            Self::Pipelines => "pipelinerun",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::WorkItems => 0,
            Self::PullRequests => 1,
            Self::Pipelines => 2,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
