use crate::config::DevOpsConfig;
use crate::queries;
use crate::runner::CommandRunner;
use lazyaz_core::{
    PipelineDefinition, PipelineRun, PipelineRunDetail, PullRequest, PullRequestDetail,
    SourceError, UserProfile, WorkItem, WorkItemDetail,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Pipeline runs fetched per request.
const PIPELINE_RUNS_TOP: &str = "40";

/// Pull requests fetched per request for the broad listings.
const PULL_REQUESTS_TOP: &str = "100";

/// Which pull requests to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestQuery<'a> {
    /// Active pull requests created by this unique name.
    CreatedBy(&'a str),
    /// Active pull requests where this unique name is a reviewer.
    ReviewedBy(&'a str),
    /// Any creator, by status (`all`, `active`, `completed`, `abandoned`).
    Status(&'static str),
}

/// Typed wrapper over the `az devops` command groups.
pub struct DevOpsClient {
    runner: Arc<dyn CommandRunner>,
    config: DevOpsConfig,
}

impl DevOpsClient {
    pub fn new(runner: Arc<dyn CommandRunner>, config: DevOpsConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &DevOpsConfig {
        &self.config
    }

    fn args(&self, base: &[&str], with_project: bool) -> Vec<String> {
        let mut args: Vec<String> = base.iter().map(|s| s.to_string()).collect();
        args.push("--org".to_string());
        args.push(self.config.organization.clone());
        if with_project && !self.config.project.is_empty() {
            args.push("--project".to_string());
            args.push(self.config.project.clone());
        }
        args
    }

    fn query<T: DeserializeOwned>(
        &self,
        what: &'static str,
        mut args: Vec<String>,
        projection: &str,
    ) -> Result<T, SourceError> {
        args.extend([
            "--query".to_string(),
            projection.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ]);
        let output = self.runner.run(&args)?;
        serde_json::from_slice(&output).map_err(|e| SourceError::parse(what, e))
    }

    /// Signed-in user. Falls back to `az account show` when the directory
    /// profile has no mail address.
    pub fn user_profile(&self) -> Result<UserProfile, SourceError> {
        let args = vec!["ad".into(), "signed-in-user".into(), "show".into()];
        let profile: UserProfile = self.query("user profile", args, queries::USER_PROFILE)?;
        if !profile.mail.trim().is_empty() {
            let mail = profile.mail.clone();
            return Ok(profile.with_mail(&mail));
        }

        tracing::warn!("directory profile has no mail; falling back to az account show");
        let fallback = self.runner.run(&[
            "account".to_string(),
            "show".to_string(),
            "--query".to_string(),
            "user.name".to_string(),
            "--output".to_string(),
            "tsv".to_string(),
        ]);
        match fallback {
            Ok(output) => {
                let mail = String::from_utf8_lossy(&output).trim().to_string();
                if mail.is_empty() {
                    return Err(SourceError::Unavailable(
                        "cannot continue without a user profile mail".to_string(),
                    ));
                }
                Ok(profile.with_mail(&mail))
            }
            Err(err) => {
                tracing::warn!(error = %err, "az account show failed");
                Err(SourceError::Unavailable(
                    "cannot continue without a user profile mail".to_string(),
                ))
            }
        }
    }

    pub fn work_items(&self, wiql: &str) -> Result<Vec<WorkItem>, SourceError> {
        let args = self.args(&["boards", "query", "--wiql", wiql], true);
        let mut items: Vec<WorkItem> = self.query("work items", args, queries::WORK_ITEMS)?;
        for item in &mut items {
            item.organization_url = self.config.organization.clone();
            item.project = self.config.project.clone();
        }
        Ok(items)
    }

    pub fn work_item_detail(&self, id: u32) -> Result<WorkItemDetail, SourceError> {
        let id = id.to_string();
        let args = self.args(&["boards", "work-item", "show", "--id", id.as_str()], false);
        self.query("work item details", args, queries::WORK_ITEM_DETAIL)
    }

    pub fn pull_requests(&self, query: PullRequestQuery<'_>) -> Result<Vec<PullRequest>, SourceError> {
        let mut base = vec!["repos", "pr", "list", "--include-links"];
        match query {
            PullRequestQuery::CreatedBy(user) => {
                base.extend(["--creator", user, "--status", "active"]);
            }
            PullRequestQuery::ReviewedBy(user) => {
                base.extend(["--reviewer", user, "--status", "active", "--top", PULL_REQUESTS_TOP]);
            }
            PullRequestQuery::Status(status) => {
                base.extend(["--status", status, "--top", PULL_REQUESTS_TOP]);
            }
        }
        let args = self.args(&base, true);
        let mut prs: Vec<PullRequest> = self.query("pull requests", args, queries::PULL_REQUESTS)?;
        for pr in &mut prs {
            pr.organization_url = self.config.organization.clone();
        }
        Ok(prs)
    }

    pub fn pull_request_detail(&self, id: u32) -> Result<PullRequestDetail, SourceError> {
        let id = id.to_string();
        let args = self.args(&["repos", "pr", "show", "--id", id.as_str()], false);
        self.query("pull request details", args, queries::PULL_REQUEST)
    }

    pub fn pipeline_definitions(&self) -> Result<Vec<PipelineDefinition>, SourceError> {
        let args = self.args(&["pipelines", "list"], true);
        self.query("pipelines", args, queries::PIPELINE_DEFINITIONS)
    }

    /// Most recent runs, optionally for a single pipeline definition.
    pub fn pipeline_runs(&self, definition: Option<u32>) -> Result<Vec<PipelineRun>, SourceError> {
        let definition = definition.map(|id| id.to_string());
        let mut base = vec!["pipelines", "runs", "list", "--top", PIPELINE_RUNS_TOP];
        if let Some(id) = definition.as_deref() {
            base.extend(["--pipeline-ids", id]);
        }
        let args = self.args(&base, true);
        self.query("pipeline runs", args, queries::PIPELINE_RUNS)
    }

    pub fn pipeline_run_detail(&self, id: u32) -> Result<PipelineRunDetail, SourceError> {
        let id = id.to_string();
        let args = self.args(&["pipelines", "runs", "show", "--id", id.as_str()], true);
        self.query("pipeline run details", args, queries::PIPELINE_RUN_DETAIL)
    }
}
