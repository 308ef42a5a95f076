// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use tower_http::trace::TraceLayer;
use serde_json::json;

use crate::{
    handler::{
        chat::chat_handler,
        contract::contract_handler,
        order::order_handler,
        payment::payment_handler,
    },
    middleware::auth,
    ws::{chat_socket::chat_socket, contract_socket::contract_socket},
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .merge(chat_handler())
        .merge(order_handler())
        .merge(contract_handler())
        .merge(payment_handler())
        .layer(middleware::from_fn(auth))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    // Socket handshakes carry their own token; admission is checked before
    // the upgrade completes.
    let ws_route = Router::new()
        .route("/ws/chat/:conversation_id", get(chat_socket))
        .route("/ws/contracts/:order_type/:order_id", get(contract_socket))
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .merge(ws_route)
}
