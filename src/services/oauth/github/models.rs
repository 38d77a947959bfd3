// services/oauth/github/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Default)]
pub struct GitHubCallback {
    pub code: Option<String>,
}

#[derive(Deserialize, Clone, Default)]
pub struct GitHubToken {
    pub access_token: String,
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubToken")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// The authenticated GitHub user, as needed to save a login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubUser {
    pub login: String,
    pub name: String,
    pub email: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepository {
    pub id: i64,
    pub full_name: String,
}

#[derive(Deserialize)]
pub(crate) struct RawTokenResponse {
    pub(crate) access_token: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) error_description: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawUser {
    pub(crate) id: i64,
    pub(crate) login: String,
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
}

impl From<RawUser> for GitHubUser {
    fn from(raw: RawUser) -> Self {
        GitHubUser {
            login: raw.login,
            name: raw.name.unwrap_or_default(),
            email: raw.email,
            id: raw.id.to_string(),
        }
    }
}

#[derive(Default, Deserialize)]
pub(crate) struct RawPermissions {
    #[serde(default)]
    pub(crate) admin: bool,
    #[serde(default)]
    pub(crate) maintain: bool,
}

#[derive(Deserialize)]
pub(crate) struct RawRepository {
    pub(crate) id: i64,
    pub(crate) full_name: String,
    #[serde(default)]
    pub(crate) permissions: Option<RawPermissions>,
}

impl RawRepository {
    /// Owners always hold `admin`, so this covers owned, administered and maintained repos.
    pub(crate) fn is_managed(&self) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|perms| perms.admin || perms.maintain)
    }
}

impl From<RawRepository> for GitHubRepository {
    fn from(raw: RawRepository) -> Self {
        GitHubRepository {
            id: raw.id,
            full_name: raw.full_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_debug_hides_secret() {
        let token = GitHubToken {
            access_token: "gho_secret".into(),
        };
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("gho_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn repository_serializes_full_name_in_camel_case() {
        let repo = GitHubRepository {
            id: 10,
            full_name: "alice/repo1".into(),
        };
        assert_eq!(
            serde_json::to_value(&repo).unwrap(),
            serde_json::json!({ "id": 10, "fullName": "alice/repo1" })
        );
    }

    #[test]
    fn raw_user_without_name_maps_to_empty_name() {
        let raw: RawUser =
            serde_json::from_str(r#"{"id":42,"login":"octo","name":null,"email":null}"#).unwrap();
        let user = GitHubUser::from(raw);
        assert_eq!(user.id, "42");
        assert_eq!(user.login, "octo");
        assert_eq!(user.name, "");
        assert_eq!(user.email, None);
    }
}
