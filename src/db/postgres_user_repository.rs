use crate::{
    db::user_repository::UserRepository,
    models::user::{NewUser, SavedUser},
};
use async_trait::async_trait;
use sqlx::PgPool;

/// Expects `users(id BIGSERIAL, login, name, email, github_id UNIQUE, gitlab_id)`.
pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save_user(&self, user: &NewUser) -> Result<Option<SavedUser>, sqlx::Error> {
        if user.github_id.is_none() {
            tracing::warn!(login = %user.login, "refusing to save user without a GitHub id");
            return Ok(None);
        }

        sqlx::query_as::<_, SavedUser>(
            r#"
            INSERT INTO users (login, name, email, github_id, gitlab_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (github_id) DO UPDATE
            SET login = EXCLUDED.login,
                name = EXCLUDED.name,
                email = EXCLUDED.email
            RETURNING id, name, login, email
            "#,
        )
        .bind(&user.login)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.github_id)
        .bind(&user.gitlab_id)
        .fetch_optional(&self.pool)
        .await
    }
}
