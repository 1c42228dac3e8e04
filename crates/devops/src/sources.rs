use crate::client::{DevOpsClient, PullRequestQuery};
use crate::identity::Identity;
use crate::queries;
use lazyaz_core::{
    FilterOption, PipelineRun, PipelineRunDetail, PullRequest, PullRequestDetail, RecordSource,
    SourceError, WorkItem, WorkItemDetail,
};
use std::sync::Arc;

pub struct WorkItemSource {
    client: Arc<DevOpsClient>,
}

impl WorkItemSource {
    pub fn new(client: Arc<DevOpsClient>) -> Self {
        Self { client }
    }
}

impl RecordSource<WorkItem> for WorkItemSource {
    fn list(&self, filter: &str) -> Result<Vec<WorkItem>, SourceError> {
        let wiql = match filter {
            "was-ever-me" => queries::WIQL_EVER_ASSIGNED_TO_ME,
            "all" => queries::WIQL_ALL,
            _ => queries::WIQL_ASSIGNED_TO_ME,
        };
        self.client.work_items(wiql)
    }

    fn fetch_detail(&self, id: &u32) -> Result<WorkItemDetail, SourceError> {
        self.client.work_item_detail(*id)
    }

    fn filter_options(&self) -> Result<Vec<FilterOption>, SourceError> {
        Ok(vec![
            FilterOption::new("me", "Assigned to me"),
            FilterOption::new("was-ever-me", "Was ever assigned to me"),
            FilterOption::new("all", "All"),
        ])
    }

    fn initial_filter(&self) -> String {
        "me".to_string()
    }
}

pub struct PullRequestSource {
    client: Arc<DevOpsClient>,
    identity: Arc<Identity>,
}

impl PullRequestSource {
    pub fn new(client: Arc<DevOpsClient>, identity: Arc<Identity>) -> Self {
        Self { client, identity }
    }
}

impl RecordSource<PullRequest> for PullRequestSource {
    fn list(&self, filter: &str) -> Result<Vec<PullRequest>, SourceError> {
        let status = match filter {
            "all" => Some("all"),
            "active" => Some("active"),
            "completed" => Some("completed"),
            "abandoned" => Some("abandoned"),
            _ => None,
        };
        if let Some(status) = status {
            return self.client.pull_requests(PullRequestQuery::Status(status));
        }

        let user = self.identity.profile()?;
        match filter {
            "assigned-to-me" => self
                .client
                .pull_requests(PullRequestQuery::ReviewedBy(&user.mail)),
            _ => self
                .client
                .pull_requests(PullRequestQuery::CreatedBy(&user.mail)),
        }
    }

    fn fetch_detail(&self, id: &u32) -> Result<PullRequestDetail, SourceError> {
        self.client.pull_request_detail(*id)
    }

    fn filter_options(&self) -> Result<Vec<FilterOption>, SourceError> {
        Ok(vec![
            FilterOption::new("mine", "Mine"),
            FilterOption::new("assigned-to-me", "Assigned to me"),
            FilterOption::new("all", "All"),
            FilterOption::new("active", "Active"),
            FilterOption::new("completed", "Completed"),
            FilterOption::new("abandoned", "Abandoned"),
        ])
    }

    fn initial_filter(&self) -> String {
        "mine".to_string()
    }
}

/// Pipeline runs. Filter keys are `all` or a pipeline definition id.
pub struct PipelineRunSource {
    client: Arc<DevOpsClient>,
}

impl PipelineRunSource {
    pub fn new(client: Arc<DevOpsClient>) -> Self {
        Self { client }
    }
}

impl RecordSource<PipelineRun> for PipelineRunSource {
    fn list(&self, filter: &str) -> Result<Vec<PipelineRun>, SourceError> {
        let definition = match filter {
            "all" => None,
            other => match other.parse::<u32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(filter = other, "unknown pipeline filter; listing all runs");
                    None
                }
            },
        };
        self.client.pipeline_runs(definition)
    }

    fn fetch_detail(&self, id: &u32) -> Result<PipelineRunDetail, SourceError> {
        self.client.pipeline_run_detail(*id)
    }

    fn filter_options(&self) -> Result<Vec<FilterOption>, SourceError> {
        let mut definitions = self.client.pipeline_definitions()?;
        definitions.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        let mut options = vec![FilterOption::new("all", "All")];
        options.extend(
            definitions
                .into_iter()
                .map(|d| FilterOption::new(d.id.to_string(), d.name)),
        );
        Ok(options)
    }

    fn initial_filter(&self) -> String {
        "all".to_string()
    }
}
