//! Configuration file types.
//!
//! `lazyaz.toml` is looked up in the working directory first, then as
//! `~/.lazyaz.toml`. File discovery lives in the TUI crate; this crate only
//! defines the shape and its defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "lazyaz.toml";

/// Config file name looked up in the home directory.
pub const HOME_CONFIG_FILE_NAME: &str = ".lazyaz.toml";

/// Default announcement lifetime when none (or zero) is configured.
pub const DEFAULT_ANNOUNCE_SECS: u64 = 5;

/// Top-level application configuration (persisted as `lazyaz.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub devops: DevOpsSettings,
    /// Extension entries keyed by extension id.
    #[serde(default = "default_extensions")]
    pub extensions: BTreeMap<String, ExtensionEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ui: UiSettings::default(),
            devops: DevOpsSettings::default(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default = "default_announce_secs")]
    pub announce_secs: u64,
    /// Domain tag of the page shown at startup.
    #[serde(default = "default_start_page")]
    pub start_page: String,
    /// Highlight rows that belong to the signed-in user.
    #[serde(default = "default_true")]
    pub highlight_mine: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            announce_secs: DEFAULT_ANNOUNCE_SECS,
            start_page: default_start_page(),
            highlight_mine: true,
        }
    }
}

/// Explicit connection settings. Empty values defer to the Azure CLI
/// config file and then to the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevOpsSettings {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
}

/// One configured extension. The table key is the extension id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub templates_directory: String,
    /// Directory to write output to. Empty means the clipboard.
    #[serde(default)]
    pub output_target: String,
    /// Domain tags: `workitems`, `pullrequests`, `pipelines`.
    #[serde(default)]
    pub applies_to: Vec<String>,
}

impl ExtensionEntry {
    fn builtin(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            applies_to: vec![
                "workitems".to_string(),
                "pullrequests".to_string(),
                "pipelines".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Configured name, or the id when none was given.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        if self.name.trim().is_empty() {
            id
        } else {
            self.name.trim()
        }
    }
}

fn default_announce_secs() -> u64 {
    DEFAULT_ANNOUNCE_SECS
}

fn default_start_page() -> String {
    "workitems".to_string()
}

fn default_true() -> bool {
    true
}

/// Extensions enabled when the config does not list any.
pub fn default_extensions() -> BTreeMap<String, ExtensionEntry> {
    BTreeMap::from([
        (
            "export_to_template".to_string(),
            ExtensionEntry::builtin("Export", "Render the record with a markdown template"),
        ),
        (
            "open_in_browser".to_string(),
            ExtensionEntry::builtin("Open", "Open the record in the browser"),
        ),
        (
            "copy_link".to_string(),
            ExtensionEntry::builtin("Copy Link", "Copy the record URL to the clipboard"),
        ),
    ])
}

/// Apply fallbacks after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut AppConfig) -> bool {
    let mut changed = false;

    if config.ui.announce_secs == 0 {
        config.ui.announce_secs = DEFAULT_ANNOUNCE_SECS;
        changed = true;
    }

    let start_page = config.ui.start_page.trim().to_ascii_lowercase();
    if start_page != config.ui.start_page {
        config.ui.start_page = start_page;
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_sections_use_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("parse empty toml");
        assert_eq!(cfg.ui.announce_secs, DEFAULT_ANNOUNCE_SECS);
        assert_eq!(cfg.ui.start_page, "workitems");
        assert!(cfg.devops.organization.is_empty());
        assert_eq!(
            cfg.extensions.keys().collect::<Vec<_>>(),
            vec!["copy_link", "export_to_template", "open_in_browser"]
        );
    }

    #[test]
    fn extension_tables_replace_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
[extensions.export_to_template]
name = "Export"
templates_directory = "~/.lazyaz/templates"
output_target = "/tmp/out"
applies_to = ["workitems", "pullrequests"]

[extensions.nonexistent]
applies_to = ["pipelines"]
"#,
        )
        .expect("parse extensions");

        assert_eq!(cfg.extensions.len(), 2);
        let export = &cfg.extensions["export_to_template"];
        assert_eq!(export.output_target, "/tmp/out");
        assert_eq!(export.applies_to, vec!["workitems", "pullrequests"]);
        let unnamed = &cfg.extensions["nonexistent"];
        assert_eq!(unnamed.display_name("nonexistent"), "nonexistent");
    }

    #[test]
    fn apply_compat_fallbacks_restores_zero_duration() {
        let mut cfg: AppConfig = toml::from_str(
            r#"
[ui]
announce_secs = 0
start_page = " Pipelines "
"#,
        )
        .expect("parse ui");

        assert!(apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg.ui.announce_secs, DEFAULT_ANNOUNCE_SECS);
        assert_eq!(cfg.ui.start_page, "pipelines");
        assert!(!apply_compat_fallbacks(&mut cfg));
    }

    #[test]
    fn devops_overrides_deserialize() {
        let cfg: AppConfig = toml::from_str(
            r#"
[devops]
organization = "https://dev.azure.com/contoso"
project = "Widgets"
"#,
        )
        .expect("parse devops");
        assert_eq!(cfg.devops.project, "Widgets");
    }
}
