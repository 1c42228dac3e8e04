use crate::record::{ActionSubject, Column, DetailField, FilterOption, LOADING, Record};
use crate::{Domain, PipelineRun, PullRequest, RecordSource, SourceError, WorkItem};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Work item with only id and title filled in.
pub fn work_item(id: u32, title: &str) -> WorkItem {
    WorkItem {
        id,
        work_item_type: "Task".to_string(),
        title: title.to_string(),
        assigned_to: "Ada Lovelace".to_string(),
        assigned_to_unique_name: "ada@contoso.com".to_string(),
        state: "Active".to_string(),
        tags: String::new(),
        iteration_path: "Widgets".to_string(),
        created_date: None,
        created_by: "Ada Lovelace".to_string(),
        changed_date: None,
        changed_by: "Ada Lovelace".to_string(),
        description: "<p>Body</p>".to_string(),
        organization_url: String::new(),
        project: String::new(),
    }
}

pub fn pull_request(id: u32, title: &str) -> PullRequest {
    PullRequest {
        id,
        title: title.to_string(),
        status: "active".to_string(),
        author: "Ada Lovelace".to_string(),
        created_date: None,
        description: String::new(),
        is_draft: false,
        merge_status: "succeeded".to_string(),
        repository: String::new(),
        repository_url: String::new(),
        project: String::new(),
        reviewers: Vec::new(),
        reviewers_votes: Vec::new(),
        source_ref_name: "refs/heads/topic".to_string(),
        target_ref_name: "refs/heads/main".to_string(),
        work_item_refs: Vec::new(),
        closed_by: String::new(),
        closed_date: None,
        author_unique_name: "ada@contoso.com".to_string(),
        organization_url: String::new(),
    }
}

pub fn pipeline_run(id: u32, build_number: &str) -> PipelineRun {
    PipelineRun {
        id,
        build_number: build_number.to_string(),
        definition_id: 1,
        definition_name: "ci".to_string(),
        finish_time: None,
        keep_forever: false,
        queue: "Azure Pipelines".to_string(),
        queue_time: None,
        reason: "manual".to_string(),
        requested_for: "Ada Lovelace".to_string(),
        requested_for_unique_name: "ada@contoso.com".to_string(),
        result: "succeeded".to_string(),
        source_branch: "refs/heads/main".to_string(),
        source_version: "abc123".to_string(),
        start_time: None,
        status: "completed".to_string(),
        logs_url: String::new(),
        project_id: String::new(),
        project_url: String::new(),
    }
}

/// Minimal record with a single searchable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: u32,
    pub title: String,
}

static TICKET_COLUMNS: [Column; 1] = [Column::expanding("Title")];

impl Record for Ticket {
    type Id = u32;
    type Detail = String;

    const DOMAIN: Domain = Domain::WorkItems;

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [Column] {
        &TICKET_COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![self.title.clone()]
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn web_url(&self) -> Option<String> {
        Some(format!("https://example.test/tickets/{}", self.id))
    }

    fn detail_fields(&self, detail: Option<&String>) -> Vec<DetailField> {
        vec![
            DetailField::inline("Title", &self.title),
            DetailField::block("Body", detail.map_or(LOADING, String::as_str)),
        ]
    }

    fn subject(&self, detail: Option<&String>) -> ActionSubject {
        ActionSubject::new(Self::DOMAIN, self.id.to_string(), &self.title)
            .with_url(self.web_url())
            .with_fields(json!({
                "ID": self.id,
                "Title": self.title,
                "Body": detail.cloned().unwrap_or_default(),
            }))
    }
}

/// Tickets numbered from 1 in the given order.
pub fn tickets(titles: &[&str]) -> Vec<Ticket> {
    titles
        .iter()
        .enumerate()
        .map(|(idx, title)| Ticket {
            id: idx as u32 + 1,
            title: title.to_string(),
        })
        .collect()
}

struct Script<R: Record> {
    lists: HashMap<String, Result<Vec<R>, SourceError>>,
    details: HashMap<R::Id, Result<R::Detail, SourceError>>,
    lists_held: bool,
    held_details: HashSet<R::Id>,
    list_calls: Vec<String>,
    detail_calls: Vec<R::Id>,
    finished_lists: usize,
    finished_details: usize,
}

/// In-memory [`RecordSource`] whose calls can be held open and released,
/// for reproducing in-flight races deterministically.
pub struct ScriptedSource<R: Record> {
    script: Mutex<Script<R>>,
    changed: Condvar,
    filters: Vec<FilterOption>,
    initial: String,
}

const WAIT_LIMIT: Duration = Duration::from_secs(5);

impl<R: Record> Default for ScriptedSource<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> ScriptedSource<R> {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                lists: HashMap::new(),
                details: HashMap::new(),
                lists_held: false,
                held_details: HashSet::new(),
                list_calls: Vec::new(),
                detail_calls: Vec::new(),
                finished_lists: 0,
                finished_details: 0,
            }),
            changed: Condvar::new(),
            filters: vec![
                FilterOption::new("all", "All"),
                FilterOption::new("mine", "Mine"),
            ],
            initial: "all".to_string(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<FilterOption>, initial: &str) -> Self {
        self.filters = filters;
        self.initial = initial.to_string();
        self
    }

    pub fn set_list(&self, filter: &str, records: Vec<R>) {
        self.update(|s| {
            s.lists.insert(filter.to_string(), Ok(records));
        });
    }

    pub fn fail_list(&self, filter: &str, message: &str) {
        self.update(|s| {
            s.lists.insert(
                filter.to_string(),
                Err(SourceError::Command(message.to_string())),
            );
        });
    }

    pub fn set_detail(&self, id: R::Id, detail: R::Detail) {
        self.update(|s| {
            s.details.insert(id, Ok(detail));
        });
    }

    pub fn fail_detail(&self, id: R::Id, message: &str) {
        self.update(|s| {
            s.details
                .insert(id, Err(SourceError::Command(message.to_string())));
        });
    }

    /// Block every subsequent `list` call until [`Self::release_lists`].
    pub fn hold_lists(&self) {
        self.update(|s| s.lists_held = true);
    }

    pub fn release_lists(&self) {
        self.update(|s| s.lists_held = false);
    }

    pub fn hold_detail(&self, id: R::Id) {
        self.update(|s| {
            s.held_details.insert(id);
        });
    }

    pub fn release_detail(&self, id: &R::Id) {
        self.update(|s| {
            s.held_details.remove(id);
        });
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.lock().list_calls.clone()
    }

    pub fn detail_calls(&self) -> Vec<R::Id> {
        self.lock().detail_calls.clone()
    }

    /// Wait until `count` list calls have started.
    pub fn wait_for_list_calls(&self, count: usize) -> bool {
        self.wait_until(|s| s.list_calls.len() >= count)
    }

    /// Wait until `count` list calls have returned.
    pub fn wait_for_finished_lists(&self, count: usize) -> bool {
        self.wait_until(|s| s.finished_lists >= count)
    }

    pub fn wait_for_detail_calls(&self, count: usize) -> bool {
        self.wait_until(|s| s.detail_calls.len() >= count)
    }

    pub fn wait_for_finished_details(&self, count: usize) -> bool {
        self.wait_until(|s| s.finished_details >= count)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script<R>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut Script<R>)) {
        f(&mut self.lock());
        self.changed.notify_all();
    }

    fn wait_until(&self, done: impl Fn(&Script<R>) -> bool) -> bool {
        let deadline = Instant::now() + WAIT_LIMIT;
        let mut guard = self.lock();
        while !done(&guard) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = match self.changed.wait_timeout(guard, deadline - now) {
                Ok((g, _)) => g,
                Err(e) => e.into_inner().0,
            };
        }
        true
    }

    fn wait_while(&self, blocked: impl Fn(&Script<R>) -> bool) -> std::sync::MutexGuard<'_, Script<R>> {
        let mut guard = self.lock();
        while blocked(&guard) {
            guard = match self.changed.wait(guard) {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
        }
        guard
    }
}

impl<R: Record> RecordSource<R> for ScriptedSource<R> {
    fn list(&self, filter: &str) -> Result<Vec<R>, SourceError> {
        self.update(|s| s.list_calls.push(filter.to_string()));
        let result = {
            let mut guard = self.wait_while(|s| s.lists_held);
            guard.finished_lists += 1;
            guard.lists.get(filter).cloned().unwrap_or_else(|| Ok(Vec::new()))
        };
        self.changed.notify_all();
        result
    }

    fn fetch_detail(&self, id: &R::Id) -> Result<R::Detail, SourceError> {
        self.update(|s| s.detail_calls.push(id.clone()));
        let result = {
            let mut guard = self.wait_while(|s| s.held_details.contains(id));
            guard.finished_details += 1;
            guard.details.get(id).cloned().unwrap_or_else(|| {
                Err(SourceError::Unavailable(format!("no detail scripted for {id}")))
            })
        };
        self.changed.notify_all();
        result
    }

    fn filter_options(&self) -> Result<Vec<FilterOption>, SourceError> {
        Ok(self.filters.clone())
    }

    fn initial_filter(&self) -> String {
        self.initial.clone()
    }
}
