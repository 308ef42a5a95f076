use std::sync::Arc;
use axum::{
    extract::Path,
    response::IntoResponse,
    routing::put,
    Extension, Json, Router,
};

use uuid::Uuid;

use crate::{
    db::{chatdb::ChatExt, orderdb::OrderExt},
    dtos::orderdtos::UpdateOrderStatusDto,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::ordermodels::OrderStatus,
    service::order_resolver::{resolve_parties, OrderRef},
    AppState,
};

pub fn order_handler() -> Router {
    Router::new().route("/orders/:order_type/:order_id/status", put(update_order_status))
}

/// Order CRUD lives in the listing flows; this endpoint only moves the
/// status. Acceptance materializes the conversation for the pair, so the
/// parties can talk without an explicit create call.
pub async fn update_order_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((order_type, order_id)): Path<(String, Uuid)>,
    Json(body): Json<UpdateOrderStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let order = OrderRef::parse(&order_type, order_id)?;
    let parties = resolve_parties(&app_state.db_client, &order).await?;

    if !auth.user.is_client(parties.client) && !auth.user.is_freelancer(parties.freelancer) {
        return Err(HttpError::not_found("Order not found"));
    }

    let summary = app_state
        .db_client
        .update_order_status(order.kind(), order.order_id(), body.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Order not found"))?;

    if body.status == OrderStatus::Accepted {
        app_state
            .db_client
            .get_or_create_conversation(order.kind(), order.order_id(), parties.client, parties.freelancer)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": summary
    })))
}
