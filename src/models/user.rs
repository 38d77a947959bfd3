use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Login details to upsert, keyed by the provider's user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub name: String,
    pub email: Option<String>,
    pub github_id: Option<String>,
    pub gitlab_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SavedUser {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub email: Option<String>,
}
