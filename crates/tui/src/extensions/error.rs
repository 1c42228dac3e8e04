use std::path::PathBuf;

/// Failure returned by an extension entry point.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// No tool exists to receive the output; an environment problem rather
    /// than a data one.
    #[error("no clipboard utility found (install xsel or xclip)")]
    SinkUnavailable,

    #[error("{0}")]
    Unsupported(String),

    #[error("template {path}: {reason}")]
    Template { path: String, reason: String },

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {reason}")]
    Command { program: String, reason: String },
}

impl ActionError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
