use super::clipboard;
use super::error::ActionError;
use super::registry::ExtensionSettings;
use super::template;
use lazyaz_core::ActionSubject;
use std::path::PathBuf;

/// Templates directory used when an entry does not configure one.
pub const DEFAULT_TEMPLATES_DIR: &str = "~/.lazyaz/templates";

fn web_url(subject: &ActionSubject) -> Result<&str, ActionError> {
    subject
        .web_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            ActionError::Unsupported(format!("{} {} has no web link", subject.domain.title(), subject.id))
        })
}

/// Render the subject through its domain template, then write it to
/// `output_target` or the clipboard.
pub fn export_to_template(
    subject: &ActionSubject,
    settings: &ExtensionSettings,
) -> Result<String, ActionError> {
    let directory = settings
        .templates_directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(shellexpand::tilde(DEFAULT_TEMPLATES_DIR).into_owned()));
    let name = subject.domain.template_name();
    let text = template::load_template(&directory, subject.domain)?;
    let rendered = template::render(name, &text, &subject.fields)?;

    match &settings.output_target {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| ActionError::io("failed to create output directory", dir, e))?;
            let path = dir.join(format!("{name}-{}.md", subject.id));
            std::fs::write(&path, rendered)
                .map_err(|e| ActionError::io("failed to write", &path, e))?;
            Ok(format!("exported to {}", path.display()))
        }
        None => {
            clipboard::copy(&rendered)?;
            Ok("copied to clipboard".to_string())
        }
    }
}

pub fn open_in_browser(
    subject: &ActionSubject,
    _settings: &ExtensionSettings,
) -> Result<String, ActionError> {
    let url = web_url(subject)?;
    open::that(url).map_err(|e| ActionError::Command {
        program: "browser".to_string(),
        reason: e.to_string(),
    })?;
    Ok(format!("opened {url}"))
}

pub fn copy_link(subject: &ActionSubject, _settings: &ExtensionSettings) -> Result<String, ActionError> {
    let url = web_url(subject)?;
    clipboard::copy(url)?;
    Ok("link copied".to_string())
}
