use crate::record::{ActionSubject, Column, DetailField, LOADING, Record};
use crate::text::{format_date, null_as_default, or_dash, strip_html};
use crate::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// An Azure Boards work item as projected by the list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(rename = "Id")]
    pub id: u32,
    #[serde(rename = "Work Item Type", default, deserialize_with = "null_as_default")]
    pub work_item_type: String,
    #[serde(rename = "Title", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "Assigned To", default, deserialize_with = "null_as_default")]
    pub assigned_to: String,
    #[serde(
        rename = "Assigned To Unique Name",
        default,
        deserialize_with = "null_as_default"
    )]
    pub assigned_to_unique_name: String,
    #[serde(rename = "State", default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(rename = "Tags", default, deserialize_with = "null_as_default")]
    pub tags: String,
    #[serde(rename = "Iteration Path", default, deserialize_with = "null_as_default")]
    pub iteration_path: String,
    #[serde(rename = "CreatedDate", default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "CreatedBy", default, deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(rename = "ChangedDate", default)]
    pub changed_date: Option<DateTime<Utc>>,
    #[serde(rename = "ChangedBy", default, deserialize_with = "null_as_default")]
    pub changed_by: String,
    #[serde(rename = "Description", default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Organization URL (with trailing slash) and project, stamped by the source.
    #[serde(skip)]
    pub organization_url: String,
    #[serde(skip)]
    pub project: String,
}

/// Fields only available from `az boards work-item show`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkItemDetail {
    #[serde(rename = "Repro Steps", default, deserialize_with = "null_as_default")]
    pub repro_steps: String,
    #[serde(rename = "System.AreaPath", default, deserialize_with = "null_as_default")]
    pub area_path: String,
    #[serde(
        rename = "Acceptance Criteria",
        default,
        deserialize_with = "null_as_default"
    )]
    pub acceptance_criteria: String,
    #[serde(rename = "Board Column", default, deserialize_with = "null_as_default")]
    pub board_column: String,
    #[serde(rename = "Board Column Done", default, deserialize_with = "null_as_default")]
    pub board_column_done: bool,
    #[serde(rename = "Comment Count", default, deserialize_with = "null_as_default")]
    pub comment_count: u32,
    #[serde(rename = "Latest Comment", default, deserialize_with = "null_as_default")]
    pub latest_comment: String,
    #[serde(
        rename = "PR refs",
        alias = "PR Refs",
        default,
        deserialize_with = "null_as_default"
    )]
    pub pr_refs: Vec<String>,
    #[serde(rename = "Priority", default)]
    pub priority: Option<u32>,
    #[serde(rename = "Severity", default, deserialize_with = "null_as_default")]
    pub severity: String,
}

impl WorkItemDetail {
    /// Pull request ids from artifact links such as
    /// `vstfs:///Git/PullRequestId/proj%2Frepo%2F42`.
    pub fn linked_pull_requests(&self) -> Vec<String> {
        self.pr_refs
            .iter()
            .filter_map(|r| r.rsplit("%2F").next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl WorkItem {
    pub fn is_bug(&self) -> bool {
        self.work_item_type.eq_ignore_ascii_case("bug")
    }

    fn description_text(&self, detail: Option<&WorkItemDetail>) -> String {
        if self.is_bug() && self.description.trim().is_empty() {
            return detail
                .map(|d| strip_html(&d.repro_steps))
                .unwrap_or_default();
        }
        strip_html(&self.description)
    }
}

static COLUMNS: [Column; 6] = [
    Column::fixed("ID"),
    Column::fixed("Type"),
    Column::fixed("Created"),
    Column::fixed("Assigned To"),
    Column::fixed("State"),
    Column::expanding("Title"),
];

impl Record for WorkItem {
    type Id = u32;
    type Detail = WorkItemDetail;

    const DOMAIN: Domain = Domain::WorkItems;

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [Column] {
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.work_item_type.clone(),
            format_date(self.created_date.as_ref()),
            self.assigned_to.clone(),
            self.state.clone(),
            self.title.clone(),
        ]
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn web_url(&self) -> Option<String> {
        if self.organization_url.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}/_workitems/edit/{}",
            self.organization_url, self.project, self.id
        ))
    }

    fn owner(&self) -> Option<&str> {
        Some(self.assigned_to_unique_name.as_str()).filter(|s| !s.is_empty())
    }

    fn detail_fields(&self, detail: Option<&WorkItemDetail>) -> Vec<DetailField> {
        let from_detail = |f: fn(&WorkItemDetail) -> String| match detail {
            Some(d) => or_dash(&f(d)),
            None => LOADING.to_string(),
        };
        let mut fields = vec![
            DetailField::inline("Title", &self.title),
            DetailField::inline("ID", self.id.to_string()),
            DetailField::inline("Type", &self.work_item_type),
            DetailField::inline("State", or_dash(&self.state)),
            DetailField::inline("Assigned To", or_dash(&self.assigned_to)),
            DetailField::inline("Iteration", or_dash(&self.iteration_path)),
            DetailField::inline("Area", from_detail(|d| d.area_path.clone())),
            DetailField::inline("Board Column", from_detail(|d| d.board_column.clone())),
            DetailField::inline(
                "Priority",
                from_detail(|d| d.priority.map(|p| p.to_string()).unwrap_or_default()),
            ),
        ];
        if self.is_bug() {
            fields.push(DetailField::inline(
                "Severity",
                from_detail(|d| d.severity.clone()),
            ));
        }
        fields.extend([
            DetailField::inline("Tags", or_dash(&self.tags)),
            DetailField::inline(
                "Created",
                format!("{} by {}", format_date(self.created_date.as_ref()), self.created_by),
            ),
            DetailField::inline(
                "Changed",
                format!("{} by {}", format_date(self.changed_date.as_ref()), self.changed_by),
            ),
            DetailField::inline("Comments", from_detail(|d| d.comment_count.to_string())),
            DetailField::inline(
                "Linked PRs",
                from_detail(|d| d.linked_pull_requests().join(", ")),
            ),
        ]);
        let description = match (self.is_bug() && self.description.trim().is_empty(), detail) {
            (true, None) => LOADING.to_string(),
            _ => or_dash(&self.description_text(detail)),
        };
        fields.push(DetailField::block("Description", description));
        fields.push(DetailField::block(
            "Acceptance Criteria",
            from_detail(|d| strip_html(&d.acceptance_criteria)),
        ));
        fields.push(DetailField::block(
            "Latest Comment",
            from_detail(|d| strip_html(&d.latest_comment)),
        ));
        fields
    }

    fn subject(&self, detail: Option<&WorkItemDetail>) -> ActionSubject {
        let subject = ActionSubject::new(Self::DOMAIN, self.id.to_string(), &self.title)
            .with_url(self.web_url())
            .with_fields(json!({
                "ID": self.id,
                "Title": self.title,
                "WorkItemType": self.work_item_type,
                "State": self.state,
                "AssignedTo": self.assigned_to,
                "Tags": self.tags,
                "IterationPath": self.iteration_path,
                "CreatedDate": format_date(self.created_date.as_ref()),
                "CreatedBy": self.created_by,
                "ChangedDate": format_date(self.changed_date.as_ref()),
                "ChangedBy": self.changed_by,
                "Description": self.description_text(detail),
                "URL": self.web_url().unwrap_or_default(),
            }));
        // Detail keys are present whether or not the detail is cached.
        let fallback = WorkItemDetail::default();
        let d = detail.unwrap_or(&fallback);
        subject.with_fields(json!({
            "AreaPath": d.area_path,
            "ReproSteps": strip_html(&d.repro_steps),
            "AcceptanceCriteria": strip_html(&d.acceptance_criteria),
            "BoardColumn": d.board_column,
            "Priority": d.priority.unwrap_or_default(),
            "Severity": d.severity,
            "CommentCount": d.comment_count,
            "LatestComment": strip_html(&d.latest_comment),
            "LinkedPRs": d.linked_pull_requests(),
        }))
    }
}
