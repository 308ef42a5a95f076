// models/chatmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ordermodels::OrderKind;
use crate::models::usermodel::User;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    File,
    Payment,
    Voice,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessagePaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// One durable two-party chat channel, tied to exactly one order. Uniqueness
/// over (order_kind, order_id, client_id, freelancer_id) is enforced by the
/// store so concurrent first-contact from both sides cannot duplicate it.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub order_kind: OrderKind,
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn is_participant(&self, user: &User) -> bool {
        user.client_profile_id == Some(self.client_id)
            || user.freelancer_profile_id == Some(self.freelancer_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub url: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub message_type: MessageType,
    pub content: String,
    pub attachment_id: Option<Uuid>,
    pub payment_amount: Option<f64>,
    pub payment_status: Option<MessagePaymentStatus>,
    pub status: Option<MessageStatus>,
    pub is_edited: Option<bool>,
    pub is_active: Option<bool>,
    pub reactions: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-user read position, upserted whenever the user lists a conversation's
/// messages.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ConversationReadStatus {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub last_read_at: Option<DateTime<Utc>>,
}
