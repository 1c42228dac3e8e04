use super::error::ActionError;
use lazyaz_core::Domain;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

const WORK_ITEM_TEMPLATE: &str =
    "\n# Work Item {{.ID}}\n\nTitle: {{.Title}}\n\nDescription:\n{{.Description}}\n\n";

const PULL_REQUEST_TEMPLATE: &str =
    "\n# Pull Request {{.ID}}\n\nTitle: {{.Title}}\n\nDescription:\n{{.Description}}\n";

const PIPELINE_RUN_TEMPLATE: &str = "\n# Pipeline Run {{.ID}}\n\n{{.BuildNumber}}\n";

pub fn default_template(domain: Domain) -> &'static str {
    match domain {
        Domain::WorkItems => WORK_ITEM_TEMPLATE,
        Domain::PullRequests => PULL_REQUEST_TEMPLATE,
        Domain::Pipelines => PIPELINE_RUN_TEMPLATE,
    }
}

/// Template text for a domain: `<dir>/<template_name>.md` when present,
/// otherwise the built-in default.
pub fn load_template(directory: &Path, domain: Domain) -> Result<String, ActionError> {
    let path = directory.join(format!("{}.md", domain.template_name()));
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "template not found; using built-in default");
            Ok(default_template(domain).to_string())
        }
        Err(err) => Err(ActionError::io("failed to read template", path, err)),
    }
}

/// Substitute `{{.Field}}` placeholders. Unknown fields are an error.
pub fn render(name: &str, template: &str, fields: &Map<String, Value>) -> Result<String, ActionError> {
    let mut missing = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        match fields.get(key) {
            Some(value) => format_value(value),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });
    if let Some(key) = missing {
        return Err(ActionError::Template {
            path: name.to_string(),
            reason: format!("unknown field {key:?}"),
        });
    }
    Ok(rendered.into_owned())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
