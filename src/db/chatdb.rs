// db/chatdb.rs
use async_trait::async_trait;
use uuid::Uuid;
use sqlx::Error;
use super::db::DBClient;
use crate::models::chatmodels::*;
use crate::models::ordermodels::OrderKind;

const CONVERSATION_COLUMNS: &str =
    "id, order_kind, order_id, client_id, freelancer_id, is_active, metadata, created_at, updated_at";

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, message_type, content, attachment_id, payment_amount, \
     payment_status, status, is_edited, is_active, reactions, created_at, updated_at";

#[async_trait]
pub trait ChatExt {
    // Conversation management
    async fn get_or_create_conversation(
        &self,
        kind: OrderKind,
        order_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Conversation, Error>;

    async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, Error>;

    async fn list_user_conversations(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Conversation>, Error>;

    async fn deactivate_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Conversation, Error>;

    // Message management
    async fn create_attachment(
        &self,
        file_name: String,
        file_type: Option<String>,
        file_size: Option<i64>,
        url: String,
    ) -> Result<Attachment, Error>;

    async fn get_attachment(&self, attachment_id: Uuid) -> Result<Option<Attachment>, Error>;

    async fn create_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        message_type: MessageType,
        content: String,
        attachment_id: Option<Uuid>,
        payment_amount: Option<f64>,
        payment_status: Option<MessagePaymentStatus>,
    ) -> Result<Message, Error>;

    async fn get_conversation_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error>;

    async fn get_message(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<Message>, Error>;

    async fn last_message(&self, conversation_id: Uuid) -> Result<Option<Message>, Error>;

    async fn edit_message(&self, message_id: Uuid, content: String) -> Result<Message, Error>;

    async fn soft_delete_message(&self, message_id: Uuid) -> Result<Message, Error>;

    async fn add_reaction(&self, message_id: Uuid, emoji: &str) -> Result<Message, Error>;

    // Read tracking
    async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<ConversationReadStatus, Error>;

    async fn unread_count(&self, conversation_id: Uuid, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn get_or_create_conversation(
        &self,
        kind: OrderKind,
        order_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Conversation, Error> {
        // Insert-or-fetch in one statement so concurrent first-contact from
        // both participants resolves to the same row.
        sqlx::query_as::<_, Conversation>(&format!(
            r#"
            INSERT INTO conversations (order_kind, order_id, client_id, freelancer_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_kind, order_id, client_id, freelancer_id)
            DO UPDATE SET updated_at = conversations.updated_at
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(kind)
        .bind(order_id)
        .bind(client_id)
        .bind(freelancer_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE id = $1
            "#
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_user_conversations(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE is_active = true
              AND (client_id = $1 OR freelancer_id = $2)
            ORDER BY updated_at DESC
            "#
        ))
        .bind(client_profile)
        .bind(freelancer_profile)
        .fetch_all(&self.pool)
        .await
    }

    async fn deactivate_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Conversation, Error> {
        sqlx::query_as::<_, Conversation>(&format!(
            r#"
            UPDATE conversations
            SET is_active = false, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_attachment(
        &self,
        file_name: String,
        file_type: Option<String>,
        file_size: Option<i64>,
        url: String,
    ) -> Result<Attachment, Error> {
        sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (file_name, file_type, file_size, url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, file_name, file_type, file_size, url, uploaded_at
            "#
        )
        .bind(file_name)
        .bind(file_type)
        .bind(file_size)
        .bind(url)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_attachment(&self, attachment_id: Uuid) -> Result<Option<Attachment>, Error> {
        sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, file_name, file_type, file_size, url, uploaded_at
            FROM attachments
            WHERE id = $1
            "#
        )
        .bind(attachment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        message_type: MessageType,
        content: String,
        attachment_id: Option<Uuid>,
        payment_amount: Option<f64>,
        payment_status: Option<MessagePaymentStatus>,
    ) -> Result<Message, Error> {
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages
                (conversation_id, sender_id, message_type, content, attachment_id,
                 payment_amount, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(conversation_id)
        .bind(sender_id)
        .bind(message_type)
        .bind(content)
        .bind(attachment_id)
        .bind(payment_amount)
        .bind(payment_status)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn get_conversation_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
              AND is_active = true
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_message(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<Message>, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE id = $1 AND conversation_id = $2 AND is_active = true
            "#
        ))
        .bind(message_id)
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn last_message(&self, conversation_id: Uuid) -> Result<Option<Message>, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND is_active = true
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn edit_message(&self, message_id: Uuid, content: String) -> Result<Message, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages
            SET content = $2, is_edited = true, updated_at = NOW()
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn soft_delete_message(&self, message_id: Uuid) -> Result<Message, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages
            SET is_active = false, updated_at = NOW()
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn add_reaction(&self, message_id: Uuid, emoji: &str) -> Result<Message, Error> {
        // Single-statement counter bump; concurrent reactions cannot lose
        // increments. There is no decrement path.
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages
            SET reactions = jsonb_set(
                    COALESCE(reactions, '{{}}'::jsonb),
                    ARRAY[$2],
                    to_jsonb(COALESCE((reactions ->> $2)::bigint, 0) + 1)
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message_id)
        .bind(emoji)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<ConversationReadStatus, Error> {
        sqlx::query_as::<_, ConversationReadStatus>(
            r#"
            INSERT INTO conversation_read_statuses (user_id, conversation_id, last_read_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, conversation_id)
            DO UPDATE SET last_read_at = NOW()
            RETURNING id, user_id, conversation_id, last_read_at
            "#
        )
        .bind(user_id)
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn unread_count(&self, conversation_id: Uuid, user_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages m
            WHERE m.conversation_id = $1
              AND m.sender_id != $2
              AND m.is_active = true
              AND m.created_at > COALESCE(
                    (SELECT last_read_at
                     FROM conversation_read_statuses
                     WHERE conversation_id = $1 AND user_id = $2),
                    'epoch'::timestamptz
                  )
            "#
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
