use anyhow::{Context, Result};
use lazyaz_runtime_config::{
    AppConfig, CONFIG_FILE_NAME, HOME_CONFIG_FILE_NAME, apply_compat_fallbacks,
};
use std::path::{Path, PathBuf};

pub fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home))
}

/// `~/.lazyaz`, home of the log file and default templates.
pub fn data_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".lazyaz"))
}

/// First existing config file: `./lazyaz.toml`, then `~/.lazyaz.toml`.
pub fn discover_config_path(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    home.map(|h| h.join(HOME_CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Load config from an explicit path, or from the discovered one.
/// No file at all means defaults; an explicit path must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Could not determine working directory")?;
            discover_config_path(&cwd, home_dir().ok().as_deref())
        }
    };

    let Some(path) = path else {
        tracing::info!("no config file found; using defaults");
        return Ok((AppConfig::default(), None));
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if apply_compat_fallbacks(&mut config) {
        tracing::debug!(path = %path.display(), "config values normalized");
    }
    tracing::info!(path = %path.display(), "config loaded");
    Ok((config, Some(path)))
}

fn parse_config(content: &str) -> Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_directory_config_wins() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join(CONFIG_FILE_NAME), "").unwrap();
        std::fs::write(home.path().join(HOME_CONFIG_FILE_NAME), "").unwrap();

        let found = discover_config_path(cwd.path(), Some(home.path())).unwrap();
        assert_eq!(found, cwd.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn falls_back_to_home_config() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        assert!(discover_config_path(cwd.path(), Some(home.path())).is_none());

        std::fs::write(home.path().join(HOME_CONFIG_FILE_NAME), "").unwrap();
        let found = discover_config_path(cwd.path(), Some(home.path())).unwrap();
        assert_eq!(found, home.path().join(HOME_CONFIG_FILE_NAME));
    }

    #[test]
    fn explicit_path_is_loaded_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[ui]
announce_secs = 0
start_page = " Pipelines "

[extensions.copy_link]
name = "Copy"
applies_to = ["pullrequests"]
"#,
        )
        .unwrap();

        let (config, loaded) = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(config.ui.announce_secs, 5);
        assert_eq!(config.ui.start_page, "pipelines");
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.extensions["copy_link"].applies_to, vec!["pullrequests"]);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
