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
    db::contractdb::ContractExt,
    dtos::contractdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    service::order_resolver::OrderRef,
    AppState,
};

pub fn contract_handler() -> Router {
    Router::new()
        .route("/contracts", get(list_contracts).post(propose_contract))
        .route("/contracts/active", get(active_contracts))
        .route("/contracts/counterparts", get(contract_counterparts))
        .route("/contracts/:contract_id", get(get_contract))
        .route("/contracts/:contract_id/accept", put(accept_contract))
        .route("/contracts/:contract_id/reject", put(reject_contract))
        .route("/contracts/:contract_id/stage", put(advance_contract_stage))
}

pub async fn propose_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<ProposeContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = app_state
        .contract_service
        .propose(
            &auth.user,
            body.amount,
            body.deadline,
            body.terms,
            body.milestones.unwrap_or_default(),
            body.service_order_id,
            body.proposal_order_id,
        )
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": ContractResponse::from(contract)
    })))
}

pub async fn list_contracts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<AnchorQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let contracts = match (query.order_type, query.order_id) {
        (Some(order_type), Some(order_id)) => {
            let order = OrderRef::parse(&order_type, order_id)?;
            app_state
                .contract_service
                .list_for_anchor(&auth.user, order)
                .await?
        }
        (None, None) => app_state
            .db_client
            .list_contracts_for_parties(auth.user.client_profile_id, auth.user.freelancer_profile_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?,
        _ => {
            return Err(HttpError::bad_request(
                "order_type and order_id must be provided together",
            ))
        }
    };

    let contract_list: Vec<ContractResponse> =
        contracts.into_iter().map(ContractResponse::from).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": contract_list
    })))
}

pub async fn active_contracts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let contracts = app_state
        .db_client
        .list_active_contracts_for_parties(
            auth.user.client_profile_id,
            auth.user.freelancer_profile_id,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let contract_list: Vec<ContractResponse> =
        contracts.into_iter().map(ContractResponse::from).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": contract_list
    })))
}

pub async fn contract_counterparts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let counterpart_user_ids = app_state
        .db_client
        .counterpart_user_ids(auth.user.client_profile_id, auth.user.freelancer_profile_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total = counterpart_user_ids.len();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": CounterpartsResponse { counterpart_user_ids, total }
    })))
}

pub async fn get_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (contract, _, _) = app_state
        .contract_service
        .get_for_participant(contract_id, &auth.user)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": ContractResponse::from(contract)
    })))
}

pub async fn accept_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state
        .contract_service
        .accept(contract_id, &auth.user)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": ContractResponse::from(contract)
    })))
}

pub async fn reject_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state
        .contract_service
        .reject(contract_id, &auth.user)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": ContractResponse::from(contract)
    })))
}

pub async fn advance_contract_stage(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
    Json(body): Json<AdvanceStageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = app_state
        .contract_service
        .advance_stage(contract_id, &auth.user, &body.workflow_status)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": ContractResponse::from(contract)
    })))
}
