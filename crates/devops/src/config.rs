use lazyaz_runtime_config::DevOpsSettings;
use std::path::{Path, PathBuf};

pub const ORG_ENV: &str = "AZURE_DEVOPS_ORG";
pub const PROJECT_ENV: &str = "AZURE_DEVOPS_PROJECT";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// Organization and project the `az` calls are scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevOpsConfig {
    /// Organization URL, always ending in `/`.
    pub organization: String,
    pub project: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct AzDefaults {
    organization: String,
    project: String,
}

impl DevOpsConfig {
    /// Resolve from explicit settings, then the Azure CLI config under
    /// `home`, then the environment. First non-empty value wins per key.
    pub fn resolve(
        settings: &DevOpsSettings,
        home: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = home.map(read_az_defaults).unwrap_or_default();
        let pick = |explicit: &str, from_file: &str, var: &str| -> String {
            [explicit.trim(), from_file.trim()]
                .into_iter()
                .find(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| env(var).map(|v| v.trim().to_string()))
                .unwrap_or_default()
        };

        let organization = pick(&settings.organization, &defaults.organization, ORG_ENV);
        if organization.is_empty() {
            return Err(ConfigError::Missing(ORG_ENV));
        }
        let project = pick(&settings.project, &defaults.project, PROJECT_ENV);

        Ok(Self {
            organization: normalize_organization(&organization),
            project,
        })
    }

    /// Resolve against the real home directory and process environment.
    pub fn from_environment(settings: &DevOpsSettings) -> Result<Self, ConfigError> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);
        Self::resolve(settings, home.as_deref(), |var| {
            std::env::var(var).ok().filter(|v| !v.is_empty())
        })
    }

    /// Short organization name for the header (`contoso` for
    /// `https://dev.azure.com/contoso/`).
    pub fn organization_name(&self) -> &str {
        self.organization
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.organization)
    }
}

fn normalize_organization(value: &str) -> String {
    let mut url = if value.contains("://") {
        value.to_string()
    } else {
        format!("https://dev.azure.com/{value}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// `~/.azure/azuredevops/config`, or `~/.azure/config` when that is absent.
fn read_az_defaults(home: &Path) -> AzDefaults {
    let primary = home.join(".azure").join("azuredevops").join("config");
    let path = if primary.exists() {
        primary
    } else {
        home.join(".azure").join("config")
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_az_defaults(&contents),
        Err(_) => AzDefaults::default(),
    }
}

fn parse_az_defaults(contents: &str) -> AzDefaults {
    let mut defaults = AzDefaults::default();
    let mut in_defaults = false;
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_defaults = line[1..line.len() - 1].trim().eq_ignore_ascii_case("defaults");
            continue;
        }
        if !in_defaults {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "organization" => defaults.organization = value,
                "project" => defaults.project = value,
                _ => {}
            }
        }
    }
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_defaults_section_only() {
        let parsed = parse_az_defaults(
            "[core]\norganization = nope\n\n# comment\n[Defaults]\nOrganization = https://dev.azure.com/contoso/\n; other\nproject=Widgets\n",
        );
        assert_eq!(parsed.organization, "https://dev.azure.com/contoso/");
        assert_eq!(parsed.project, "Widgets");
    }

    #[test]
    fn falls_back_to_plain_azure_config() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join(".azure")).unwrap();
        std::fs::write(
            home.path().join(".azure").join("config"),
            "[defaults]\norganization = https://dev.azure.com/fabrikam\n",
        )
        .unwrap();

        let cfg = DevOpsConfig::resolve(&DevOpsSettings::default(), Some(home.path()), no_env)
            .unwrap();
        assert_eq!(cfg.organization, "https://dev.azure.com/fabrikam/");
        assert_eq!(cfg.organization_name(), "fabrikam");
        assert!(cfg.project.is_empty());
    }

    #[test]
    fn azuredevops_config_wins_over_plain_config() {
        let home = tempfile::tempdir().unwrap();
        let devops_dir = home.path().join(".azure").join("azuredevops");
        std::fs::create_dir_all(&devops_dir).unwrap();
        std::fs::write(
            devops_dir.join("config"),
            "[defaults]\norganization = https://dev.azure.com/contoso/\nproject = Widgets\n",
        )
        .unwrap();
        std::fs::write(
            home.path().join(".azure").join("config"),
            "[defaults]\norganization = https://dev.azure.com/other/\n",
        )
        .unwrap();

        let cfg = DevOpsConfig::resolve(&DevOpsSettings::default(), Some(home.path()), no_env)
            .unwrap();
        assert_eq!(cfg.organization, "https://dev.azure.com/contoso/");
        assert_eq!(cfg.project, "Widgets");
    }

    #[test]
    fn explicit_settings_then_env() {
        let settings = DevOpsSettings {
            organization: "contoso".to_string(),
            project: String::new(),
        };
        let cfg = DevOpsConfig::resolve(&settings, None, |var| {
            (var == PROJECT_ENV).then(|| "FromEnv".to_string())
        })
        .unwrap();
        assert_eq!(cfg.organization, "https://dev.azure.com/contoso/");
        assert_eq!(cfg.project, "FromEnv");
    }

    #[test]
    fn missing_organization_names_env_var() {
        let err = DevOpsConfig::resolve(&DevOpsSettings::default(), None, no_env).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ORG_ENV));
        assert_eq!(
            err.to_string(),
            "missing required configuration: AZURE_DEVOPS_ORG"
        );
    }
}
