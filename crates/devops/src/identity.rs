use crate::client::DevOpsClient;
use lazyaz_core::{SourceError, UserProfile};
use std::sync::{Arc, OnceLock};

/// The signed-in user, looked up once on first use.
///
/// The outcome is memoized either way: a failed lookup stays failed for the
/// rest of the session.
pub struct Identity {
    client: Arc<DevOpsClient>,
    profile: OnceLock<Result<UserProfile, SourceError>>,
}

impl Identity {
    pub fn new(client: Arc<DevOpsClient>) -> Self {
        Self {
            client,
            profile: OnceLock::new(),
        }
    }

    /// Blocks on the first call; later calls return the memoized outcome.
    pub fn profile(&self) -> Result<UserProfile, SourceError> {
        self.profile
            .get_or_init(|| {
                let result = self.client.user_profile();
                match &result {
                    Ok(profile) => tracing::info!(user = %profile.mail, "resolved signed-in user"),
                    Err(err) => tracing::warn!(error = %err, "could not resolve signed-in user"),
                }
                result
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{FakeRunner, client};

    #[test]
    fn looks_up_once() {
        let (client, runner) = client(FakeRunner::default().with(
            "signed-in-user",
            r#"{"id": "u", "displayName": "Ada", "mail": "ada@contoso.com"}"#,
        ));
        let identity = Identity::new(Arc::new(client));
        assert_eq!(identity.profile().unwrap().username, "ada");
        assert_eq!(identity.profile().unwrap().display_name, "Ada");
        assert_eq!(runner.calls().len(), 1);
    }
}
