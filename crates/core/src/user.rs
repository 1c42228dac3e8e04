use crate::text::null_as_default;
use serde::{Deserialize, Serialize};

/// The signed-in Azure DevOps user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub given_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub surname: String,
    /// Mail without the domain part.
    #[serde(skip)]
    pub username: String,
}

impl UserProfile {
    pub fn with_mail(mut self, mail: &str) -> Self {
        self.mail = mail.trim().to_string();
        self.username = self
            .mail
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();
        self
    }

    /// Azure DevOps unique names are mail addresses; compare them loosely.
    pub fn is_same_as(&self, unique_name: &str) -> bool {
        !self.mail.is_empty() && self.mail.eq_ignore_ascii_case(unique_name.trim())
    }

    pub fn label(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if !self.username.is_empty() {
            &self.username
        } else {
            &self.mail
        }
    }
}
