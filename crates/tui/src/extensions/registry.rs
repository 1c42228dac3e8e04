use super::builtin;
use super::error::ActionError;
use lazyaz_core::{ActionSubject, Domain};
use lazyaz_runtime_config::ExtensionEntry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Callable behind an extension. Returns a short status text on success.
pub type EntryPoint = fn(&ActionSubject, &ExtensionSettings) -> Result<String, ActionError>;

/// Per-entry settings handed to the entry point, with `~` expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSettings {
    pub templates_directory: Option<PathBuf>,
    /// Directory for file output; `None` means the clipboard.
    pub output_target: Option<PathBuf>,
}

impl ExtensionSettings {
    fn from_entry(entry: &ExtensionEntry) -> Self {
        Self {
            templates_directory: expand_path(&entry.templates_directory),
            output_target: expand_path(&entry.output_target),
        }
    }
}

fn expand_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(PathBuf::from(shellexpand::tilde(raw).into_owned()))
}

/// A configured extension whose entry point resolved.
#[derive(Debug, Clone)]
pub struct ExtensionDescriptor {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub applies_to: BTreeSet<Domain>,
    pub settings: ExtensionSettings,
    pub entry_point: EntryPoint,
}

impl ExtensionDescriptor {
    pub fn applies_to(&self, domain: Domain) -> bool {
        self.applies_to.contains(&domain)
    }
}

/// Lowercase, with `.` and `-` folded to `_`.
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '.' || c == '-' { '_' } else { c })
        .collect()
}

/// Startup-time mapping from extension id to callable.
#[derive(Debug, Clone, Default)]
pub struct EntryPointTable {
    entries: BTreeMap<String, EntryPoint>,
}

impl EntryPointTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The actions shipped with lazyaz.
    pub fn builtin() -> Self {
        Self::empty()
            .register("export_to_template", builtin::export_to_template)
            .register("open_in_browser", builtin::open_in_browser)
            .register("copy_link", builtin::copy_link)
    }

    pub fn register(mut self, id: &str, entry_point: EntryPoint) -> Self {
        self.entries.insert(normalize_id(id), entry_point);
        self
    }

    pub fn resolve(&self, id: &str) -> Option<EntryPoint> {
        self.entries.get(&normalize_id(id)).copied()
    }
}

/// Resolved extensions, built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    descriptors: Vec<ExtensionDescriptor>,
    warnings: Vec<String>,
}

impl ExtensionRegistry {
    /// Resolve every configured entry. Entries that cannot be resolved are
    /// skipped and recorded in [`Self::warnings`]; loading never fails.
    pub fn load(entries: &BTreeMap<String, ExtensionEntry>, table: &EntryPointTable) -> Self {
        let mut registry = Self::default();
        for (id, entry) in entries {
            if let Some(descriptor) = resolve_entry(id, entry, table, &mut registry.warnings) {
                registry.descriptors.push(descriptor);
            }
        }
        for warning in &registry.warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            loaded = registry.descriptors.len(),
            skipped = entries.len() - registry.descriptors.len(),
            "extensions loaded"
        );
        registry
    }

    /// Descriptors applicable to a domain tag. Unknown tags yield nothing.
    pub fn get_for(&self, tag: &str) -> Vec<&ExtensionDescriptor> {
        Domain::from_tag(tag)
            .map(|domain| self.for_domain(domain))
            .unwrap_or_default()
    }

    pub fn for_domain(&self, domain: Domain) -> Vec<&ExtensionDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.applies_to(domain))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&ExtensionDescriptor> {
        let id = normalize_id(id);
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn resolve_entry(
    id: &str,
    entry: &ExtensionEntry,
    table: &EntryPointTable,
    warnings: &mut Vec<String>,
) -> Option<ExtensionDescriptor> {
    let Some(entry_point) = table.resolve(id) else {
        warnings.push(format!("extension {id}: no entry point registered; skipped"));
        return None;
    };

    let mut applies_to = BTreeSet::new();
    for tag in &entry.applies_to {
        match Domain::from_tag(tag.trim()) {
            Some(domain) => {
                applies_to.insert(domain);
            }
            None => warnings.push(format!("extension {id}: unknown domain {tag:?} ignored")),
        }
    }
    if applies_to.is_empty() {
        warnings.push(format!("extension {id}: applies to no known domain; skipped"));
        return None;
    }

    Some(ExtensionDescriptor {
        id: normalize_id(id),
        display_name: entry.display_name(id).to_string(),
        description: entry.description.clone(),
        applies_to,
        settings: ExtensionSettings::from_entry(entry),
        entry_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyaz_runtime_config::default_extensions;

    fn noop(_: &ActionSubject, _: &ExtensionSettings) -> Result<String, ActionError> {
        Ok("ok".to_string())
    }

    fn entry(applies_to: &[&str]) -> ExtensionEntry {
        ExtensionEntry {
            applies_to: applies_to.iter().map(|s| s.to_string()).collect(),
            ..ExtensionEntry::default()
        }
    }

    #[test]
    fn normalize_folds_case_and_separators() {
        assert_eq!(normalize_id("Export-To.Template"), "export_to_template");
    }

    #[test]
    fn default_config_resolves_every_builtin() {
        let registry = ExtensionRegistry::load(&default_extensions(), &EntryPointTable::builtin());
        assert_eq!(registry.len(), 3);
        assert!(registry.warnings().is_empty());
        assert_eq!(registry.get_for("pipelines").len(), 3);
        assert_eq!(
            registry.get("open_in_browser").map(|d| d.display_name.as_str()),
            Some("Open")
        );
    }

    #[test]
    fn unresolved_entries_are_skipped_with_a_warning() {
        let entries = BTreeMap::from([
            ("known".to_string(), entry(&["workitems"])),
            ("missing".to_string(), entry(&["workitems"])),
        ]);
        let table = EntryPointTable::empty().register("known", noop);
        let registry = ExtensionRegistry::load(&entries, &table);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("missing").is_none());
        assert!(registry.warnings()[0].contains("missing"));
        assert!(registry.get_for("workitems").iter().all(|d| d.id == "known"));
    }

    #[test]
    fn get_for_unknown_domain_is_empty() {
        let entries = BTreeMap::from([("known".to_string(), entry(&["workitems"]))]);
        let table = EntryPointTable::empty().register("known", noop);
        let registry = ExtensionRegistry::load(&entries, &table);
        assert!(registry.get_for("boards").is_empty());
        assert!(registry.get_for("WorkItems").is_empty());
    }

    #[test]
    fn domain_tags_are_validated() {
        let entries = BTreeMap::from([
            ("partial".to_string(), entry(&["pullrequests", "wiki"])),
            ("nowhere".to_string(), entry(&["wiki"])),
        ]);
        let table = EntryPointTable::empty()
            .register("partial", noop)
            .register("nowhere", noop);
        let registry = ExtensionRegistry::load(&entries, &table);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_for("pullrequests").len(), 1);
        assert_eq!(registry.warnings().len(), 3);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let entries = BTreeMap::from([("known".to_string(), entry(&["pipelines"]))]);
        let table = EntryPointTable::empty().register("known", noop);
        let registry = ExtensionRegistry::load(&entries, &table);
        assert_eq!(registry.get("KNOWN").map(|d| d.display_name.as_str()), Some("known"));
    }

    #[test]
    fn settings_expand_home() {
        let settings = ExtensionSettings::from_entry(&ExtensionEntry {
            output_target: "  ".to_string(),
            templates_directory: "/tmp/templates".to_string(),
            ..ExtensionEntry::default()
        });
        assert_eq!(settings.output_target, None);
        assert_eq!(settings.templates_directory, Some(PathBuf::from("/tmp/templates")));
    }
}
