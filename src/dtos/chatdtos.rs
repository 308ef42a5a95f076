// dtos/chatdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chatmodels::*;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationDto {
    #[validate(length(min = 1, message = "order_type is required"))]
    pub order_type: String,
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttachmentDto {
    #[validate(length(min = 1, max = 255, message = "file_name is required"))]
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    pub message_type: Option<MessageType>,
    #[validate(length(max = 5000, message = "content must be at most 5000 characters"))]
    pub content: Option<String>,
    #[validate]
    pub attachment: Option<AttachmentDto>,
    pub payment_amount: Option<f64>,
    pub payment_status: Option<MessagePaymentStatus>,
}

impl SendMessageDto {
    pub fn message_type(&self) -> MessageType {
        self.message_type.unwrap_or(MessageType::Text)
    }

    /// Type-dependent shape rules: file/voice messages carry an attachment,
    /// text messages carry non-empty content.
    pub fn check_shape(&self) -> Result<(), String> {
        match self.message_type() {
            MessageType::File | MessageType::Voice => {
                if self.attachment.is_none() {
                    return Err("an attachment is required for file and voice messages".to_string());
                }
            }
            MessageType::Text => {
                let empty = self
                    .content
                    .as_deref()
                    .map(|c| c.trim().is_empty())
                    .unwrap_or(true);
                if empty {
                    return Err("text messages require non-empty content".to_string());
                }
            }
            MessageType::Payment => {}
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditMessageDto {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReactDto {
    #[validate(length(min = 1, max = 16, message = "emoji is required"))]
    pub emoji: String,
}

/// Message shaped the same way for REST responses and socket broadcasts, so
/// a client receiving a broadcast sees exactly what a history fetch returns.
#[derive(Debug, Serialize, Clone)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub message_type: MessageType,
    pub content: String,
    pub attachment: Option<Attachment>,
    pub payment_amount: Option<f64>,
    pub payment_status: Option<MessagePaymentStatus>,
    pub status: Option<MessageStatus>,
    pub is_edited: Option<bool>,
    pub is_active: Option<bool>,
    pub reactions: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MessageResponse {
    pub fn from_parts(message: Message, attachment: Option<Attachment>) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            message_type: message.message_type,
            content: message.content,
            attachment,
            payment_amount: message.payment_amount,
            payment_status: message.payment_status,
            status: message.status,
            is_edited: message.is_edited,
            is_active: message.is_active,
            reactions: message.reactions,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ConversationWithDetails {
    pub conversation: Conversation,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(message_type: Option<MessageType>, content: Option<&str>, attached: bool) -> SendMessageDto {
        SendMessageDto {
            message_type,
            content: content.map(|c| c.to_string()),
            attachment: attached.then(|| AttachmentDto {
                file_name: "brief.pdf".to_string(),
                file_type: Some("application/pdf".to_string()),
                file_size: Some(1024),
                url: "https://files.example.com/brief.pdf".to_string(),
            }),
            payment_amount: None,
            payment_status: None,
        }
    }

    #[test]
    fn file_messages_require_an_attachment() {
        assert!(dto(Some(MessageType::File), Some("see attached"), false)
            .check_shape()
            .is_err());
        assert!(dto(Some(MessageType::File), Some("see attached"), true)
            .check_shape()
            .is_ok());
        assert!(dto(Some(MessageType::Voice), None, false).check_shape().is_err());
    }

    #[test]
    fn text_messages_require_content() {
        assert!(dto(None, None, false).check_shape().is_err());
        assert!(dto(Some(MessageType::Text), Some("   "), false)
            .check_shape()
            .is_err());
        assert!(dto(Some(MessageType::Text), Some("hello"), false)
            .check_shape()
            .is_ok());
    }
}
