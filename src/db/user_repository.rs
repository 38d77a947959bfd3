use async_trait::async_trait;

use crate::models::user::{NewUser, SavedUser};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates or updates the user keyed by provider id. `Ok(None)` means nothing was written.
    async fn save_user(&self, user: &NewUser) -> Result<Option<SavedUser>, sqlx::Error>;
}
