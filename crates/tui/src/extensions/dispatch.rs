use super::error::ActionError;
use super::registry::ExtensionDescriptor;
use crate::engine::{AnnounceDuration, Announcement};
use lazyaz_core::ActionSubject;

/// Visual state of an extension button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Running,
    Succeeded,
    Failed,
}

impl Indicator {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Running => "…",
            Self::Succeeded => "✓",
            Self::Failed => "✗",
        }
    }
}

/// Result of one invocation, carried back to the controller.
#[derive(Debug)]
pub struct ActionOutcome {
    pub extension_id: String,
    pub display_name: String,
    pub result: Result<String, ActionError>,
}

impl ActionOutcome {
    pub fn indicator(&self) -> Indicator {
        if self.result.is_ok() {
            Indicator::Succeeded
        } else {
            Indicator::Failed
        }
    }

    pub fn is_sink_unavailable(&self) -> bool {
        matches!(self.result, Err(ActionError::SinkUnavailable))
    }

    /// Status bar text for the outcome. The missing-clipboard case keeps
    /// its own wording and stays a little longer.
    pub fn announcement(&self) -> Announcement {
        match &self.result {
            Ok(_) => Announcement::success(format!("✅ {} done", self.display_name)),
            Err(ActionError::SinkUnavailable) => Announcement::error(format!(
                "❌ {} failed: {}",
                self.display_name,
                ActionError::SinkUnavailable
            ))
            .with_duration(AnnounceDuration::Seconds(10)),
            Err(_) => Announcement::error(format!("❌ {} failed", self.display_name)),
        }
    }
}

/// Runs an entry point once. Failures are final; nothing is retried.
pub struct ActionDispatcher;

impl ActionDispatcher {
    pub fn invoke(descriptor: &ExtensionDescriptor, subject: &ActionSubject) -> ActionOutcome {
        tracing::info!(extension = %descriptor.id, domain = %subject.domain, id = %subject.id, "invoking extension");
        let result = (descriptor.entry_point)(subject, &descriptor.settings);
        match &result {
            Ok(status) => {
                tracing::info!(extension = %descriptor.id, status = %status, "extension finished");
            }
            Err(err) => {
                tracing::warn!(extension = %descriptor.id, error = %err, "extension failed");
            }
        }
        ActionOutcome {
            extension_id: descriptor.id.clone(),
            display_name: descriptor.display_name.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnnounceLevel;
    use crate::extensions::registry::ExtensionSettings;
    use lazyaz_core::Domain;
    use std::collections::BTreeSet;

    fn descriptor(
        entry_point: fn(&ActionSubject, &ExtensionSettings) -> Result<String, ActionError>,
    ) -> ExtensionDescriptor {
        ExtensionDescriptor {
            id: "copy_link".to_string(),
            display_name: "Copy Link".to_string(),
            description: String::new(),
            applies_to: BTreeSet::from([Domain::WorkItems]),
            settings: ExtensionSettings::default(),
            entry_point,
        }
    }

    fn subject() -> ActionSubject {
        ActionSubject::new(Domain::WorkItems, "7", "Fix login")
    }

    #[test]
    fn success_announces_done() {
        let outcome = ActionDispatcher::invoke(&descriptor(|_, _| Ok("copied".into())), &subject());
        assert_eq!(outcome.indicator(), Indicator::Succeeded);
        let announcement = outcome.announcement();
        assert_eq!(announcement.message, "✅ Copy Link done");
        assert_eq!(announcement.level, AnnounceLevel::Success);
    }

    #[test]
    fn sink_unavailable_has_its_own_message() {
        let outcome =
            ActionDispatcher::invoke(&descriptor(|_, _| Err(ActionError::SinkUnavailable)), &subject());
        assert!(outcome.is_sink_unavailable());
        assert_eq!(outcome.indicator(), Indicator::Failed);
        assert_eq!(
            outcome.announcement().message,
            "❌ Copy Link failed: no clipboard utility found (install xsel or xclip)"
        );
    }

    #[test]
    fn other_failures_are_generic() {
        let outcome = ActionDispatcher::invoke(
            &descriptor(|_, _| Err(ActionError::Unsupported("no url".into()))),
            &subject(),
        );
        assert!(!outcome.is_sink_unavailable());
        let announcement = outcome.announcement();
        assert_eq!(announcement.message, "❌ Copy Link failed");
        assert_eq!(announcement.level, AnnounceLevel::Error);
    }
}
