use crate::Domain;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Placeholder shown for fields whose value comes from the detail payload.
pub const LOADING: &str = "Loading...";

/// A table column header. Exactly one column per record kind should expand
/// to take the remaining width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub expand: bool,
}

impl Column {
    pub const fn fixed(header: &'static str) -> Self {
        Self {
            header,
            expand: false,
        }
    }

    pub const fn expanding(header: &'static str) -> Self {
        Self {
            header,
            expand: true,
        }
    }
}

/// One selectable entry in a page's filter picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    /// Value handed to `RecordSource::list`.
    pub key: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A labelled value in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: String,
    pub value: String,
    /// Multi-line values render below their label instead of beside it.
    pub block: bool,
}

impl DetailField {
    pub fn inline(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            block: false,
        }
    }

    pub fn block(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            block: true,
        }
    }
}

/// What an extension action receives: a flattened view of the selected
/// record (merged with its detail payload when cached).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSubject {
    pub domain: Domain,
    pub id: String,
    pub title: String,
    pub web_url: Option<String>,
    /// PascalCase field names mapped to their values, for template rendering.
    pub fields: Map<String, Value>,
}

impl ActionSubject {
    pub fn new(domain: Domain, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            domain,
            id: id.into(),
            title: title.into(),
            web_url: None,
            fields: Map::new(),
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.web_url = url;
        self
    }

    /// Merge a JSON object into `fields`. Non-object values are ignored.
    pub fn with_fields(mut self, value: Value) -> Self {
        if let Value::Object(map) = value {
            self.fields.extend(map);
        }
        self
    }
}

/// Capability shared by every record kind the browser can page through.
///
/// Records are immutable snapshots returned by a `RecordSource`. The engine
/// never looks inside them beyond this trait.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;
    type Detail: Clone + Send + Sync + 'static;

    const DOMAIN: Domain;

    fn id(&self) -> Self::Id;

    fn columns() -> &'static [Column];

    /// Rendered cell text in column order. Search scans exactly these strings.
    fn cells(&self) -> Vec<String>;

    fn title(&self) -> &str;

    fn web_url(&self) -> Option<String>;

    /// Unique name of the person this record belongs to, if any.
    fn owner(&self) -> Option<&str> {
        None
    }

    fn detail_fields(&self, detail: Option<&Self::Detail>) -> Vec<DetailField>;

    fn subject(&self, detail: Option<&Self::Detail>) -> ActionSubject;
}
