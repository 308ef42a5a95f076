use std::sync::Arc;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::paymentdb::PaymentExt,
    dtos::paymentdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn payment_handler() -> Router {
    Router::new()
        .route("/payments", get(list_payment_requests).post(create_payment_request))
        .route("/payments/:request_id/status", put(update_payment_status))
        .route("/payments/:request_id/gateway-order", post(create_gateway_order))
        .route("/payments/:request_id/verify", post(verify_settlement))
}

pub async fn create_payment_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreatePaymentRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .payment_service
        .create_request(&auth.user, body.contract_id, body.amount)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": request
    })))
}

pub async fn list_payment_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = match query.contract_id {
        Some(contract_id) => {
            app_state
                .payment_service
                .list_for_contract(&auth.user, contract_id)
                .await?
        }
        None => app_state
            .db_client
            .list_requests_for_user(auth.user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": requests
    })))
}

pub async fn update_payment_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<UpdatePaymentStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .payment_service
        .update_status(&auth.user, request_id, body.status)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": request
    })))
}

pub async fn create_gateway_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let gateway_order = app_state
        .payment_service
        .create_gateway_order(&auth.user, request_id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": gateway_order
    })))
}

pub async fn verify_settlement(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<VerifySettlementDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .payment_service
        .verify_settlement(
            &auth.user,
            request_id,
            &body.gateway_order_id,
            &body.gateway_payment_id,
            &body.signature,
        )
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": request
    })))
}
