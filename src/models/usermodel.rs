// models/usermodel.rs
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved caller identity, including which order-listing profiles the user
/// owns. Registration and profile management live outside this service; rows
/// here are read-only collaborator surface.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub client_profile_id: Option<Uuid>,
    pub freelancer_profile_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_client(&self, client_profile: Uuid) -> bool {
        self.client_profile_id == Some(client_profile)
    }

    pub fn is_freelancer(&self, freelancer_profile: Uuid) -> bool {
        self.freelancer_profile_id == Some(freelancer_profile)
    }
}
