// ws/chat_socket.rs
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, Query,
    },
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{chatdb::ChatExt, userdb::UserExt},
    dtos::chatdtos::MessageResponse,
    error::{ErrorMessage, HttpError},
    models::chatmodels::{Conversation, MessageType},
    models::usermodel::User,
    utils::token,
    ws::chat_topic,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// Browsers cannot set headers on a WebSocket handshake, so the token also
/// rides in the query string.
pub(crate) async fn authenticate_socket(
    app_state: &Arc<AppState>,
    query_token: Option<String>,
    headers: &HeaderMap,
) -> Result<User, HttpError> {
    let token = query_token.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|auth_header| auth_header.to_str().ok())
            .and_then(|auth_value| {
                if auth_value.starts_with("Bearer ") {
                    Some(auth_value[7..].to_owned())
                } else {
                    None
                }
            })
    });

    let token = token
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let user_id = token::decode_token(token, app_state.env.jwt_secret.as_bytes())?;
    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))
}

/// Simple text frames sent over the socket; files, voice notes and payment
/// messages go through the REST endpoint.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    message: Option<String>,
    message_type: Option<MessageType>,
}

pub async fn chat_socket(
    ws: WebSocketUpgrade,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = authenticate_socket(&app_state, query.token, &headers).await?;

    let conversation = app_state
        .db_client
        .get_conversation_by_id(conversation_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Conversation not found"))?;

    if !conversation.is_participant(&user) {
        return Err(HttpError::not_found("Conversation not found"));
    }

    Ok(ws.on_upgrade(move |socket| run_chat_session(socket, app_state, conversation, user)))
}

async fn run_chat_session(
    socket: WebSocket,
    app_state: Arc<AppState>,
    conversation: Conversation,
    user: User,
) {
    let topic = chat_topic(conversation.id);
    let (subscriber_id, mut rx) = app_state.channels.subscribe(&topic).await;
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            broadcast = rx.recv() => {
                match broadcast {
                    Some(payload) => {
                        if sink.send(WsMessage::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_inbound(&app_state, &conversation, &user, &text).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    app_state.channels.unsubscribe(&topic, subscriber_id).await;
}

async fn handle_inbound(
    app_state: &Arc<AppState>,
    conversation: &Conversation,
    user: &User,
    text: &str,
) {
    let Ok(frame) = serde_json::from_str::<InboundFrame>(text) else {
        return;
    };

    let message_type = frame.message_type.unwrap_or(MessageType::Text);
    if message_type != MessageType::Text {
        return;
    }

    let content = frame.message.unwrap_or_default();
    if content.trim().is_empty() {
        return;
    }

    let message = match app_state
        .db_client
        .create_message(conversation.id, user.id, message_type, content, None, None, None)
        .await
    {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("failed to persist socket message: {}", e);
            return;
        }
    };

    // Durable first, then fan out
    let response = MessageResponse::from_parts(message, None);
    if let Ok(payload) = serde_json::to_string(&response) {
        app_state
            .channels
            .broadcast(&chat_topic(conversation.id), payload)
            .await;
    }
}
