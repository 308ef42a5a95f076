// ws/contract_socket.rs
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, Query,
    },
    http::HeaderMap,
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::{
    error::HttpError,
    service::order_resolver::{resolve_parties, OrderRef},
    ws::chat_socket::{authenticate_socket, WsAuthQuery},
    ws::contract_topic,
    AppState,
};

/// Outbound-only watch channel: contract and payment updates for one order
/// are pushed to both parties; inbound frames are ignored.
pub async fn contract_socket(
    ws: WebSocketUpgrade,
    Path((order_type, order_id)): Path<(String, Uuid)>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = authenticate_socket(&app_state, query.token, &headers).await?;

    let order = OrderRef::parse(&order_type, order_id)?;
    let parties = resolve_parties(&app_state.db_client, &order).await?;

    if !user.is_client(parties.client) && !user.is_freelancer(parties.freelancer) {
        return Err(HttpError::not_found("Order not found"));
    }

    Ok(ws.on_upgrade(move |socket| run_contract_session(socket, app_state, order)))
}

async fn run_contract_session(socket: WebSocket, app_state: Arc<AppState>, order: OrderRef) {
    let topic = contract_topic(order.kind(), order.order_id());
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
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    app_state.channels.unsubscribe(&topic, subscriber_id).await;
}
