use crate::models::user::{NewUser, SavedUser};
use async_trait::async_trait;
use std::sync::Mutex;

use super::user_repository::UserRepository;

#[derive(Default)]
pub struct MockDb {
    pub save_user_result: Option<SavedUser>,
    pub should_fail: bool,
    pub saved_users: Mutex<Vec<NewUser>>,
}

impl MockDb {
    pub fn returning(user: SavedUser) -> Self {
        Self {
            save_user_result: Some(user),
            ..Default::default()
        }
    }

    pub fn save_calls(&self) -> usize {
        self.saved_users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn save_user(&self, user: &NewUser) -> Result<Option<SavedUser>, sqlx::Error> {
        self.saved_users.lock().unwrap().push(user.clone());
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(self.save_user_result.clone())
    }
}
