use crate::record::{ActionSubject, Column, DetailField, LOADING, Record};
use crate::text::{format_date, null_as_default, or_dash, short_ref, strip_html};
use crate::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Title", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "Status", default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "Author", default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(rename = "Created Date", default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "Description", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "Is Draft", default, deserialize_with = "null_as_default")]
    pub is_draft: bool,
    #[serde(rename = "Merge Status", default, deserialize_with = "null_as_default")]
    pub merge_status: String,
    #[serde(rename = "Repository", default, deserialize_with = "null_as_default")]
    pub repository: String,
    #[serde(rename = "Repository URL", default, deserialize_with = "null_as_default")]
    pub repository_url: String,
    #[serde(rename = "Project", default, deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(rename = "Reviewers", default, deserialize_with = "null_as_default")]
    pub reviewers: Vec<String>,
    #[serde(rename = "Reviewers Votes", default, deserialize_with = "null_as_default")]
    pub reviewers_votes: Vec<i32>,
    #[serde(rename = "Source Ref Name", default, deserialize_with = "null_as_default")]
    pub source_ref_name: String,
    #[serde(rename = "Target Ref Name", default, deserialize_with = "null_as_default")]
    pub target_ref_name: String,
    #[serde(rename = "Work Item Refs", default, deserialize_with = "null_as_default")]
    pub work_item_refs: Vec<String>,
    #[serde(rename = "Closed By", default, deserialize_with = "null_as_default")]
    pub closed_by: String,
    #[serde(rename = "Closed Date", default)]
    pub closed_date: Option<DateTime<Utc>>,
    #[serde(rename = "Author Unique Name", default, deserialize_with = "null_as_default")]
    pub author_unique_name: String,
    #[serde(skip)]
    pub organization_url: String,
}

/// Fields refreshed from `az repos pr show`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestDetail {
    #[serde(rename = "Description", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "Repository URL", default, deserialize_with = "null_as_default")]
    pub repository_url: String,
    #[serde(rename = "Work Item Refs", default, deserialize_with = "null_as_default")]
    pub work_item_refs: Vec<String>,
    #[serde(rename = "Merge Failure Message", default)]
    pub merge_failure_message: Option<String>,
    #[serde(rename = "Labels", default)]
    pub labels: Option<serde_json::Value>,
}

impl PullRequestDetail {
    pub fn label_names(&self) -> Vec<String> {
        match &self.labels {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Object(map) => {
                        map.get("name").and_then(|n| n.as_str()).map(str::to_string)
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteInfo {
    pub reviewer: String,
    pub description: &'static str,
    pub value: i32,
}

fn vote_description(vote: i32) -> &'static str {
    match vote {
        10 => "approved",
        5 => "approved with suggestions",
        0 => "no vote",
        -5 => "waiting for author",
        -10 => "rejected",
        _ => "unknown",
    }
}

impl PullRequest {
    /// Votes of 10 (approved) and 5 (approved with suggestions).
    pub fn approvals(&self) -> usize {
        self.reviewers_votes
            .iter()
            .filter(|v| matches!(v, 10 | 5))
            .count()
    }

    /// Reviewer votes, strongest first, then by reviewer name.
    pub fn votes(&self) -> Vec<VoteInfo> {
        let mut votes: Vec<VoteInfo> = self
            .reviewers
            .iter()
            .zip(self.reviewers_votes.iter().copied())
            .map(|(reviewer, value)| VoteInfo {
                reviewer: reviewer.clone(),
                description: vote_description(value),
                value,
            })
            .collect();
        votes.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.reviewer.cmp(&b.reviewer)));
        votes
    }

    pub fn source_branch(&self) -> &str {
        short_ref(&self.source_ref_name)
    }

    pub fn target_branch(&self) -> &str {
        short_ref(&self.target_ref_name)
    }

    fn url_with(&self, repository_url: &str) -> Option<String> {
        if !repository_url.is_empty() {
            return Some(format!("{repository_url}/pullrequest/{}", self.id));
        }
        if self.organization_url.is_empty() || self.repository.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}/_git/{}/pullrequest/{}",
            self.organization_url, self.project, self.repository, self.id
        ))
    }

    fn status_label(&self) -> String {
        if self.is_draft {
            format!("{} (draft)", self.status)
        } else {
            self.status.clone()
        }
    }
}

static COLUMNS: [Column; 8] = [
    Column::fixed("ID"),
    Column::fixed("Title"),
    Column::fixed("Status"),
    Column::fixed("Merge"),
    Column::fixed("Author"),
    Column::fixed("Created"),
    Column::fixed("Approvals"),
    Column::expanding("Repository"),
];

impl Record for PullRequest {
    type Id = u32;
    type Detail = PullRequestDetail;

    const DOMAIN: Domain = Domain::PullRequests;

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [Column] {
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.status_label(),
            self.merge_status.clone(),
            self.author.clone(),
            format_date(self.created_date.as_ref()),
            format!("{}/{}", self.approvals(), self.reviewers.len()),
            self.repository.clone(),
        ]
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn web_url(&self) -> Option<String> {
        self.url_with(&self.repository_url)
    }

    fn owner(&self) -> Option<&str> {
        Some(self.author_unique_name.as_str()).filter(|s| !s.is_empty())
    }

    fn detail_fields(&self, detail: Option<&PullRequestDetail>) -> Vec<DetailField> {
        let votes = self
            .votes()
            .iter()
            .map(|v| format!("{} ({})", v.reviewer, v.description))
            .collect::<Vec<_>>()
            .join("\n");
        let mut fields = vec![
            DetailField::inline("Title", &self.title),
            DetailField::inline("ID", self.id.to_string()),
            DetailField::inline("Status", self.status_label()),
            DetailField::inline("Merge Status", or_dash(&self.merge_status)),
            DetailField::inline("Author", &self.author),
            DetailField::inline("Created", format_date(self.created_date.as_ref())),
            DetailField::inline(
                "Branches",
                format!("{} -> {}", self.source_branch(), self.target_branch()),
            ),
            DetailField::inline("Repository", format!("{} ({})", self.repository, self.project)),
            DetailField::inline(
                "Approvals",
                format!("{} of {}", self.approvals(), self.reviewers.len()),
            ),
        ];
        if !self.closed_by.is_empty() {
            fields.push(DetailField::inline(
                "Closed",
                format!("{} by {}", format_date(self.closed_date.as_ref()), self.closed_by),
            ));
        }
        match detail {
            Some(d) => {
                fields.push(DetailField::inline(
                    "Work Items",
                    or_dash(&d.work_item_refs.join(", ")),
                ));
                fields.push(DetailField::inline("Labels", or_dash(&d.label_names().join(", "))));
                if let Some(message) = d.merge_failure_message.as_deref() {
                    fields.push(DetailField::inline("Merge Failure", message));
                }
                fields.push(DetailField::block("Reviewers", or_dash(&votes)));
                fields.push(DetailField::block(
                    "Description",
                    or_dash(&strip_html(&d.description)),
                ));
            }
            None => {
                fields.push(DetailField::inline("Work Items", LOADING));
                fields.push(DetailField::inline("Labels", LOADING));
                fields.push(DetailField::block("Reviewers", or_dash(&votes)));
                fields.push(DetailField::block("Description", LOADING));
            }
        }
        fields
    }

    fn subject(&self, detail: Option<&PullRequestDetail>) -> ActionSubject {
        let description = detail.map_or(self.description.as_str(), |d| d.description.as_str());
        let url = detail
            .and_then(|d| self.url_with(&d.repository_url))
            .or_else(|| self.web_url());
        let reviewers: Vec<String> = self
            .votes()
            .iter()
            .map(|v| format!("{} ({})", v.reviewer, v.description))
            .collect();
        let work_items = detail.map_or(&self.work_item_refs, |d| &d.work_item_refs);
        ActionSubject::new(Self::DOMAIN, self.id.to_string(), &self.title)
            .with_url(url.clone())
            .with_fields(json!({
                "ID": self.id,
                "Title": self.title,
                "Status": self.status,
                "IsDraft": self.is_draft,
                "Author": self.author,
                "CreatedDate": format_date(self.created_date.as_ref()),
                "Description": strip_html(description),
                "MergeStatus": self.merge_status,
                "Repository": self.repository,
                "Project": self.project,
                "SourceBranch": self.source_branch(),
                "TargetBranch": self.target_branch(),
                "Approvals": self.approvals(),
                "Reviewers": reviewers,
                "WorkItemRefs": work_items,
                "ClosedBy": self.closed_by,
                "MergeFailureMessage": detail
                    .and_then(|d| d.merge_failure_message.clone())
                    .unwrap_or_default(),
                "URL": url.unwrap_or_default(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn approvals_count_approve_and_approve_with_suggestions() {
        let mut pr = testing::pull_request(1, "Bump deps");
        pr.reviewers = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        pr.reviewers_votes = vec![10, 5, 0, -10];
        assert_eq!(pr.approvals(), 2);
        assert_eq!(pr.cells()[6], "2/4");
    }

    #[test]
    fn votes_sorted_by_value_then_name() {
        let mut pr = testing::pull_request(1, "Bump deps");
        pr.reviewers = vec!["zed".into(), "amy".into(), "bob".into()];
        pr.reviewers_votes = vec![10, -5, 10];
        let votes = pr.votes();
        let order: Vec<_> = votes.iter().map(|v| v.reviewer.as_str()).collect();
        assert_eq!(order, vec!["bob", "zed", "amy"]);
        assert_eq!(votes[2].description, "waiting for author");
    }

    #[test]
    fn web_url_prefers_repository_url() {
        let mut pr = testing::pull_request(12, "Fix");
        pr.repository_url = "https://dev.azure.com/contoso/Widgets/_git/api".into();
        assert_eq!(
            pr.web_url().as_deref(),
            Some("https://dev.azure.com/contoso/Widgets/_git/api/pullrequest/12")
        );

        pr.repository_url.clear();
        pr.organization_url = "https://dev.azure.com/contoso/".into();
        pr.project = "Widgets".into();
        pr.repository = "api".into();
        assert_eq!(
            pr.web_url().as_deref(),
            Some("https://dev.azure.com/contoso/Widgets/_git/api/pullrequest/12")
        );
    }

    #[test]
    fn branches_drop_heads_prefix() {
        let mut pr = testing::pull_request(3, "Feature");
        pr.source_ref_name = "refs/heads/feature/login".into();
        pr.target_ref_name = "refs/heads/main".into();
        assert_eq!(pr.source_branch(), "feature/login");
        assert_eq!(pr.target_branch(), "main");
    }

    #[test]
    fn label_names_accept_strings_and_objects() {
        let detail: PullRequestDetail = serde_json::from_str(
            r#"{"Description": null, "Repository URL": "u", "Work Item Refs": null,
                "Labels": [{"name": "urgent", "active": true}, "infra"]}"#,
        )
        .unwrap();
        assert_eq!(detail.label_names(), vec!["urgent", "infra"]);
        assert!(detail.work_item_refs.is_empty());
    }
}
