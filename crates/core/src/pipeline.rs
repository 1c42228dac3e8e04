use crate::record::{ActionSubject, Column, DetailField, LOADING, Record};
use crate::text::{format_datetime, null_as_default, or_dash, short_ref};
use crate::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// A pipeline definition; used to build the pipelines page filter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDefinition {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_queue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub definition_id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub definition_name: String,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keep_forever: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub queue: String,
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requested_for: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requested_for_unique_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_branch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_version: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_url: String,
}

/// Extra run data from `az pipelines runs show`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trigger_info: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub template_parameters: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retained_by_release: bool,
}

impl PipelineRun {
    /// Wall-clock duration, when the run has both started and finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.finish_time) {
            (Some(start), Some(finish)) if finish >= start => Some(finish - start),
            _ => None,
        }
    }

    fn duration_label(&self) -> String {
        match self.duration() {
            Some(d) if d.num_hours() > 0 => {
                format!("{}h {}m", d.num_hours(), d.num_minutes() % 60)
            }
            Some(d) => format!("{}m {}s", d.num_minutes(), d.num_seconds() % 60),
            None => "-".to_string(),
        }
    }
}

fn format_pairs(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

static COLUMNS: [Column; 8] = [
    Column::fixed("Run"),
    Column::fixed("Build"),
    Column::fixed("Status"),
    Column::fixed("Result"),
    Column::fixed("Pipeline"),
    Column::fixed("Branch"),
    Column::fixed("Queued"),
    Column::expanding("Requested For"),
];

impl Record for PipelineRun {
    type Id = u32;
    type Detail = PipelineRunDetail;

    const DOMAIN: Domain = Domain::Pipelines;

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [Column] {
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.build_number.clone(),
            self.status.clone(),
            self.result.clone(),
            self.definition_name.clone(),
            short_ref(&self.source_branch).to_string(),
            format_datetime(self.queue_time.as_ref()),
            self.requested_for.clone(),
        ]
    }

    fn title(&self) -> &str {
        &self.build_number
    }

    fn web_url(&self) -> Option<String> {
        if self.project_url.is_empty() {
            return None;
        }
        let base = self.project_url.split("_apis").next().unwrap_or_default();
        Some(format!(
            "{base}{}/_build/results?buildId={}",
            self.project_id, self.id
        ))
    }

    fn owner(&self) -> Option<&str> {
        Some(self.requested_for_unique_name.as_str()).filter(|s| !s.is_empty())
    }

    fn detail_fields(&self, detail: Option<&PipelineRunDetail>) -> Vec<DetailField> {
        let mut fields = vec![
            DetailField::inline("Pipeline", &self.definition_name),
            DetailField::inline("Run", format!("{} ({})", self.build_number, self.id)),
            DetailField::inline("Status", or_dash(&self.status)),
            DetailField::inline("Result", or_dash(&self.result)),
            DetailField::inline("Reason", or_dash(&self.reason)),
            DetailField::inline("Branch", short_ref(&self.source_branch)),
            DetailField::inline("Commit", or_dash(&self.source_version)),
            DetailField::inline("Requested For", &self.requested_for),
            DetailField::inline("Queue", or_dash(&self.queue)),
            DetailField::inline("Queued", format_datetime(self.queue_time.as_ref())),
            DetailField::inline("Started", format_datetime(self.start_time.as_ref())),
            DetailField::inline("Finished", format_datetime(self.finish_time.as_ref())),
            DetailField::inline("Duration", self.duration_label()),
            DetailField::inline("Keep Forever", self.keep_forever.to_string()),
        ];
        match detail {
            Some(d) => {
                fields.push(DetailField::inline("Tags", or_dash(&d.tags.join(", "))));
                fields.push(DetailField::inline(
                    "Retained By Release",
                    d.retained_by_release.to_string(),
                ));
                fields.push(DetailField::block("Trigger", or_dash(&format_pairs(&d.trigger_info))));
                fields.push(DetailField::block(
                    "Parameters",
                    or_dash(&format_pairs(&d.template_parameters)),
                ));
            }
            None => {
                fields.push(DetailField::inline("Tags", LOADING));
                fields.push(DetailField::block("Parameters", LOADING));
            }
        }
        fields
    }

    fn subject(&self, detail: Option<&PipelineRunDetail>) -> ActionSubject {
        let subject = ActionSubject::new(Self::DOMAIN, self.id.to_string(), &self.build_number)
            .with_url(self.web_url())
            .with_fields(json!({
                "ID": self.id,
                "BuildNumber": self.build_number,
                "DefinitionName": self.definition_name,
                "Status": self.status,
                "Result": self.result,
                "Reason": self.reason,
                "SourceBranch": short_ref(&self.source_branch),
                "SourceVersion": self.source_version,
                "RequestedFor": self.requested_for,
                "QueueTime": format_datetime(self.queue_time.as_ref()),
                "StartTime": format_datetime(self.start_time.as_ref()),
                "FinishTime": format_datetime(self.finish_time.as_ref()),
                "Duration": self.duration_label(),
                "LogsURL": self.logs_url,
                "URL": self.web_url().unwrap_or_default(),
            }));
        let fallback = PipelineRunDetail::default();
        let d = detail.unwrap_or(&fallback);
        subject.with_fields(json!({
            "Tags": d.tags,
            "TriggerInfo": d.trigger_info,
            "TemplateParameters": d.template_parameters,
            "RetainedByRelease": d.retained_by_release,
        }))
    }
}
