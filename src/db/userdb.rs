// db/userdb.rs
use async_trait::async_trait;
use uuid::Uuid;
use sqlx::Error;

use super::db::DBClient;
use crate::models::usermodel::User;

#[async_trait]
pub trait UserExt {
    /// Fetch a user together with the client/freelancer profile ids they own.
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn user_id_for_client_profile(&self, profile_id: Uuid) -> Result<Option<Uuid>, Error>;

    async fn user_id_for_freelancer_profile(&self, profile_id: Uuid) -> Result<Option<Uuid>, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email,
                   cp.id AS client_profile_id,
                   fp.id AS freelancer_profile_id,
                   u.created_at
            FROM users u
            LEFT JOIN client_profiles cp ON cp.user_id = u.id
            LEFT JOIN freelancer_profiles fp ON fp.user_id = u.id
            WHERE u.id = $1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn user_id_for_client_profile(&self, profile_id: Uuid) -> Result<Option<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id FROM client_profiles WHERE id = $1
            "#
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn user_id_for_freelancer_profile(&self, profile_id: Uuid) -> Result<Option<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id FROM freelancer_profiles WHERE id = $1
            "#
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }
}
