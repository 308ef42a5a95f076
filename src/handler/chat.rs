use std::sync::Arc;
use axum::{extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router
};

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::chatdb::ChatExt,
    dtos::chatdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::chatmodels::*,
    service::order_resolver::{resolve_parties, OrderRef},
    ws::chat_topic,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/conversations", get(list_conversations).post(create_conversation))
        .route("/conversations/:conversation_id", axum::routing::delete(deactivate_conversation))
        .route(
            "/conversations/:conversation_id/messages",
            get(list_messages).post(send_message),
        )
        .route(
            "/conversations/:conversation_id/messages/:message_id",
            put(edit_message).delete(delete_message),
        )
        .route(
            "/conversations/:conversation_id/messages/:message_id/react",
            post(react_to_message),
        )
}

/// Participants see the conversation; everyone else gets the same not-found
/// a missing row would produce.
async fn participant_conversation(
    app_state: &Arc<AppState>,
    conversation_id: Uuid,
    auth: &JWTAuthMiddeware,
) -> Result<Conversation, HttpError> {
    let conversation = app_state
        .db_client
        .get_conversation_by_id(conversation_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Conversation not found"))?;

    if !conversation.is_participant(&auth.user) {
        return Err(HttpError::not_found("Conversation not found"));
    }

    Ok(conversation)
}

async fn conversation_details(
    app_state: &Arc<AppState>,
    conversation: Conversation,
    user_id: Uuid,
) -> Result<ConversationWithDetails, HttpError> {
    let last_message = app_state
        .db_client
        .last_message(conversation.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let unread_count = app_state
        .db_client
        .unread_count(conversation.id, user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(ConversationWithDetails {
        conversation,
        last_message,
        unread_count,
    })
}

async fn message_response(
    app_state: &Arc<AppState>,
    message: Message,
) -> Result<MessageResponse, HttpError> {
    let attachment = match message.attachment_id {
        Some(attachment_id) => app_state
            .db_client
            .get_attachment(attachment_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
        None => None,
    };

    Ok(MessageResponse::from_parts(message, attachment))
}

async fn broadcast_message(app_state: &Arc<AppState>, response: &MessageResponse) {
    if let Ok(payload) = serde_json::to_string(response) {
        app_state
            .channels
            .broadcast(&chat_topic(response.conversation_id), payload)
            .await;
    }
}

pub async fn create_conversation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateConversationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let order = OrderRef::parse(&body.order_type, body.order_id)?;
    let parties = resolve_parties(&app_state.db_client, &order).await?;

    if !auth.user.is_client(parties.client) && !auth.user.is_freelancer(parties.freelancer) {
        return Err(HttpError::forbidden(
            "Only the order participants may open this conversation",
        ));
    }

    let conversation = app_state
        .db_client
        .get_or_create_conversation(order.kind(), order.order_id(), parties.client, parties.freelancer)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let details = conversation_details(&app_state, conversation, auth.user.id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": details
    })))
}

pub async fn list_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let conversations = app_state
        .db_client
        .list_user_conversations(auth.user.client_profile_id, auth.user.freelancer_profile_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut conversation_list = Vec::new();
    for conversation in conversations {
        conversation_list.push(conversation_details(&app_state, conversation, auth.user.id).await?);
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": conversation_list
    })))
}

pub async fn deactivate_conversation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let conversation = participant_conversation(&app_state, conversation_id, &auth).await?;

    // Conversations are never hard-deleted
    let conversation = app_state
        .db_client
        .deactivate_conversation(conversation.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": conversation
    })))
}

pub async fn list_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let conversation = participant_conversation(&app_state, conversation_id, &auth).await?;

    let page = pagination.page.unwrap_or(1);
    let limit = pagination.limit.unwrap_or(50) as i64;
    let offset = ((page - 1) * limit as u32) as i64;

    let messages = app_state
        .db_client
        .get_conversation_messages(conversation.id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut message_list = Vec::new();
    for message in messages {
        message_list.push(message_response(&app_state, message).await?);
    }

    // Listing doubles as the read receipt
    app_state
        .db_client
        .mark_conversation_read(conversation.id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": message_list
    })))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;
    body.check_shape().map_err(HttpError::bad_request)?;

    let conversation = participant_conversation(&app_state, conversation_id, &auth).await?;

    let attachment_id = match &body.attachment {
        Some(attachment) => {
            let stored = app_state
                .db_client
                .create_attachment(
                    attachment.file_name.clone(),
                    attachment.file_type.clone(),
                    attachment.file_size,
                    attachment.url.clone(),
                )
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            Some(stored.id)
        }
        None => None,
    };

    let message = app_state
        .db_client
        .create_message(
            conversation.id,
            auth.user.id,
            body.message_type(),
            body.content.clone().unwrap_or_default(),
            attachment_id,
            body.payment_amount,
            body.payment_status,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = message_response(&app_state, message).await?;

    // Broadcast only after the message is durable
    broadcast_message(&app_state, &response).await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response
    })))
}

pub async fn edit_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((conversation_id, message_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<EditMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let conversation = participant_conversation(&app_state, conversation_id, &auth).await?;

    let message = app_state
        .db_client
        .get_message(conversation.id, message_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    if message.sender_id != auth.user.id {
        return Err(HttpError::forbidden("Only the sender may edit a message"));
    }

    let message = app_state
        .db_client
        .edit_message(message.id, body.content)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = message_response(&app_state, message).await?;
    broadcast_message(&app_state, &response).await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response
    })))
}

pub async fn delete_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((conversation_id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let conversation = participant_conversation(&app_state, conversation_id, &auth).await?;

    let message = app_state
        .db_client
        .get_message(conversation.id, message_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    if message.sender_id != auth.user.id {
        return Err(HttpError::forbidden("Only the sender may delete a message"));
    }

    let message = app_state
        .db_client
        .soft_delete_message(message.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = message_response(&app_state, message).await?;
    broadcast_message(&app_state, &response).await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response
    })))
}

pub async fn react_to_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((conversation_id, message_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<ReactDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let conversation = participant_conversation(&app_state, conversation_id, &auth).await?;

    let message = app_state
        .db_client
        .get_message(conversation.id, message_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    let message = app_state
        .db_client
        .add_reaction(message.id, &body.emoji)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = message_response(&app_state, message).await?;
    broadcast_message(&app_state, &response).await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response
    })))
}
