use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceLevel {
    Info,
    Success,
    Error,
}

/// How long an announcement stays in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceDuration {
    /// The configured default (`ui.announce_secs`).
    Default,
    Seconds(u64),
    /// Stays until replaced.
    Sticky,
}

impl AnnounceDuration {
    pub fn resolve(self, default_secs: u64) -> Option<Duration> {
        match self {
            Self::Default => Some(Duration::from_secs(default_secs)),
            Self::Seconds(secs) => Some(Duration::from_secs(secs)),
            Self::Sticky => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub level: AnnounceLevel,
    pub duration: AnnounceDuration,
}

impl Announcement {
    fn new(message: impl Into<String>, level: AnnounceLevel) -> Self {
        Self {
            message: message.into(),
            level,
            duration: AnnounceDuration::Default,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, AnnounceLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, AnnounceLevel::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, AnnounceLevel::Error)
    }

    pub fn with_duration(mut self, duration: AnnounceDuration) -> Self {
        self.duration = duration;
        self
    }
}

/// What a controller asks of the rendering layer. Drained once per loop
/// iteration by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSignal {
    RedrawTable,
    RedrawDetail,
    /// Scroll to and emphasize a search match.
    Highlight { row: usize, col: usize },
    Announce(Announcement),
}
